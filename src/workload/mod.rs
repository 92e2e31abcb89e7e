//! Workload and configuration-artifact object models.
//!
//! Trimmed to what the controller reads and writes: a workload is a set of
//! named containers plus a set of named volumes; container identity is by
//! name. The artifact is a named text blob holding one rendered document.

use crate::store::{Kind, ObjectKey, ObjectMeta};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workload {
    pub metadata: ObjectMeta,
    pub spec: WorkloadSpec,
}

impl Workload {
    pub fn key(&self) -> ObjectKey {
        self.metadata.key(Kind::Workload)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkloadSpec {
    #[serde(default)]
    pub containers: Vec<Container>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<Volume>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub name: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub command: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub volume_mounts: Vec<VolumeMount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMount {
    pub name: String,
    pub mount_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    pub container_port: u16,
}

/// A named volume backed by a configuration artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub name: String,
    pub config_artifact: ArtifactRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub name: String,
}

/// Named text-blob record holding the rendered proxy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigArtifact {
    pub metadata: ObjectMeta,
    /// Name of the intent that owns this artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub data: BTreeMap<String, String>,
}

impl ConfigArtifact {
    pub fn key(&self) -> ObjectKey {
        self.metadata.key(Kind::ConfigArtifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_container_list_deserializes() {
        let workload: Workload = serde_json::from_value(json!({
            "metadata": {"namespace": "default", "name": "api"},
            "spec": {}
        }))
        .unwrap();
        assert!(workload.spec.containers.is_empty());
        assert!(workload.spec.volumes.is_empty());
    }

    #[test]
    fn container_round_trips_with_camel_case_fields() {
        let container = Container {
            name: "api".into(),
            image: "api:1.0".into(),
            command: vec![],
            volume_mounts: vec![VolumeMount {
                name: "cfg".into(),
                mount_path: "/etc/cfg".into(),
            }],
            ports: vec![ContainerPort { container_port: 3000 }],
        };
        let raw = serde_json::to_value(&container).unwrap();
        assert_eq!(raw["volumeMounts"][0]["mountPath"], "/etc/cfg");
        assert_eq!(raw["ports"][0]["containerPort"], 3000);
        assert!(raw.get("command").is_none());
    }
}
