//! Workload mutator.
//!
//! Appends the enforcement sidecar container and its configuration volume
//! to a workload definition. Append-only: the caller must have checked
//! [`super::guard::sidecar_present`] first, because a second attach would
//! duplicate the container.

use crate::workload::{ArtifactRef, Container, ContainerPort, Volume, VolumeMount, Workload};

/// Reserved container name; doubles as the presence marker the guard checks.
pub const SIDECAR_CONTAINER_NAME: &str = "envoy-sidecar";

/// Enforcement proxy image.
pub const SIDECAR_IMAGE: &str = "envoyproxy/envoy:v1.31-latest";

/// Volume the artifact is projected through.
pub const CONFIG_VOLUME_NAME: &str = "envoy-config";

/// Mount path inside the sidecar container.
pub const CONFIG_MOUNT_PATH: &str = "/etc/envoy";

/// Key the rendered document lives under in the artifact; also the filename
/// the sidecar startup command reads.
pub const ARTIFACT_KEY: &str = "envoy.yaml";

/// Attach the sidecar container and config volume to `workload`.
pub fn attach_sidecar(workload: &mut Workload, artifact_name: &str, proxy_port: u16) {
    workload.spec.containers.push(Container {
        name: SIDECAR_CONTAINER_NAME.to_string(),
        image: SIDECAR_IMAGE.to_string(),
        command: vec![
            "envoy".to_string(),
            "-c".to_string(),
            format!("{CONFIG_MOUNT_PATH}/{ARTIFACT_KEY}"),
        ],
        volume_mounts: vec![VolumeMount {
            name: CONFIG_VOLUME_NAME.to_string(),
            mount_path: CONFIG_MOUNT_PATH.to_string(),
        }],
        ports: vec![ContainerPort {
            container_port: proxy_port,
        }],
    });
    workload.spec.volumes.push(Volume {
        name: CONFIG_VOLUME_NAME.to_string(),
        config_artifact: ArtifactRef {
            name: artifact_name.to_string(),
        },
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ObjectMeta;
    use crate::workload::WorkloadSpec;

    fn bare_workload() -> Workload {
        Workload {
            metadata: ObjectMeta::new("default", "api"),
            spec: WorkloadSpec {
                containers: vec![Container {
                    name: "api".into(),
                    image: "api:1.0".into(),
                    command: vec![],
                    volume_mounts: vec![],
                    ports: vec![],
                }],
                volumes: vec![],
            },
        }
    }

    #[test]
    fn appends_sidecar_and_volume() {
        let mut workload = bare_workload();
        attach_sidecar(&mut workload, "api-ratelimit-config", 8080);

        assert_eq!(workload.spec.containers.len(), 2);
        let sidecar = &workload.spec.containers[1];
        assert_eq!(sidecar.name, SIDECAR_CONTAINER_NAME);
        assert_eq!(sidecar.image, SIDECAR_IMAGE);
        assert_eq!(sidecar.command, vec!["envoy", "-c", "/etc/envoy/envoy.yaml"]);
        assert_eq!(sidecar.ports, vec![ContainerPort { container_port: 8080 }]);
        assert_eq!(
            sidecar.volume_mounts,
            vec![VolumeMount {
                name: CONFIG_VOLUME_NAME.into(),
                mount_path: CONFIG_MOUNT_PATH.into(),
            }]
        );

        assert_eq!(workload.spec.volumes.len(), 1);
        assert_eq!(workload.spec.volumes[0].name, CONFIG_VOLUME_NAME);
        assert_eq!(
            workload.spec.volumes[0].config_artifact.name,
            "api-ratelimit-config"
        );
    }

    #[test]
    fn sidecar_port_follows_intent_port() {
        let mut workload = bare_workload();
        attach_sidecar(&mut workload, "cfg", 9901);
        assert_eq!(
            workload.spec.containers[1].ports,
            vec![ContainerPort { container_port: 9901 }]
        );
    }
}
