//! Convergence guard.
//!
//! Idempotency check for the enforcement sidecar: the reserved container
//! name is the sole marker of presence. Re-running the engine against a
//! workload that already carries the sidecar must never inject it twice.

use super::sidecar::SIDECAR_CONTAINER_NAME;
use crate::workload::Workload;

/// Whether the reserved-name sidecar container is already present.
///
/// An empty container list reads as "not present". No error paths.
pub fn sidecar_present(workload: &Workload) -> bool {
    workload
        .spec
        .containers
        .iter()
        .any(|c| c.name == SIDECAR_CONTAINER_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ObjectMeta;
    use crate::workload::{Container, WorkloadSpec};

    fn workload_with(names: &[&str]) -> Workload {
        Workload {
            metadata: ObjectMeta::new("default", "api"),
            spec: WorkloadSpec {
                containers: names
                    .iter()
                    .map(|n| Container {
                        name: (*n).into(),
                        image: "img".into(),
                        command: vec![],
                        volume_mounts: vec![],
                        ports: vec![],
                    })
                    .collect(),
                volumes: vec![],
            },
        }
    }

    #[test]
    fn detects_reserved_name() {
        assert!(sidecar_present(&workload_with(&["api", "envoy-sidecar"])));
    }

    #[test]
    fn absent_when_only_app_containers() {
        assert!(!sidecar_present(&workload_with(&["api", "worker"])));
    }

    #[test]
    fn empty_container_list_is_not_present() {
        assert!(!sidecar_present(&workload_with(&[])));
    }
}
