//! Rate-limit intent object model.
//!
//! The desired-state record the controller converges on. Field names follow
//! the external camelCase JSON representation. Validation (non-empty names,
//! positive limits) happens in the schema layer before records reach the
//! controller; here every optional limit distinguishes "absent" from
//! "present with a value" — a zero limit is preserved as `Some(0)`, never
//! collapsed into absence.

use crate::store::{Kind, ObjectKey, ObjectMeta};
use serde::{Deserialize, Serialize};

/// Listener port used when the intent does not name one.
pub const DEFAULT_PROXY_PORT: u16 = 8080;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitIntent {
    pub metadata: ObjectMeta,
    pub spec: RateLimitIntentSpec,
    #[serde(default)]
    pub status: EnforcementStatus,
}

impl RateLimitIntent {
    pub fn key(&self) -> ObjectKey {
        self.metadata.key(Kind::RateLimitIntent)
    }
}

/// Desired rate-limiting state for one workload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitIntentSpec {
    /// Workload the enforcement sidecar is attached to.
    pub target_workload_name: String,

    /// Logical upstream cluster the proxy routes to.
    pub cluster_name: String,

    /// Port the proxy listens on; defaults to [`DEFAULT_PROXY_PORT`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_port: Option<u16>,

    /// Requests per second allowed per source address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_ip_limit: Option<u32>,

    /// Requests per second allowed per user (identified by header).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_user_limit: Option<u32>,

    /// Requests per second allowed per route path pattern.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_route_pattern_limit: Option<u32>,

    /// Per-header limits, applied independently, order preserved.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub named_header_limits: Vec<HeaderLimit>,
}

impl RateLimitIntentSpec {
    pub fn proxy_port(&self) -> u16 {
        self.proxy_port.unwrap_or(DEFAULT_PROXY_PORT)
    }
}

/// One named-header limit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderLimit {
    pub header_name: String,
    pub rps: u32,
}

/// Observed enforcement state, written only by the reconciliation engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementStatus {
    /// True once the sidecar and configuration artifact are confirmed
    /// present. Recomputed from the live workload each pass, never trusted
    /// from a stale record.
    #[serde(default)]
    pub applied: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_external_camel_case_form() {
        let intent: RateLimitIntent = serde_json::from_value(json!({
            "metadata": {"namespace": "default", "name": "checkout"},
            "spec": {
                "targetWorkloadName": "checkout",
                "clusterName": "checkout-upstream",
                "perIpLimit": 50,
                "namedHeaderLimits": [{"headerName": "X-Tenant", "rps": 5}]
            }
        }))
        .unwrap();
        assert_eq!(intent.spec.target_workload_name, "checkout");
        assert_eq!(intent.spec.per_ip_limit, Some(50));
        assert_eq!(intent.spec.per_user_limit, None);
        assert_eq!(intent.spec.named_header_limits[0].header_name, "X-Tenant");
        assert!(!intent.status.applied);
    }

    #[test]
    fn zero_limit_is_distinct_from_absent() {
        let spec: RateLimitIntentSpec = serde_json::from_value(json!({
            "targetWorkloadName": "w",
            "clusterName": "c",
            "perIpLimit": 0
        }))
        .unwrap();
        assert_eq!(spec.per_ip_limit, Some(0));
        assert_eq!(spec.per_user_limit, None);
    }

    #[test]
    fn proxy_port_defaults_to_8080() {
        let spec: RateLimitIntentSpec = serde_json::from_value(json!({
            "targetWorkloadName": "w",
            "clusterName": "c"
        }))
        .unwrap();
        assert_eq!(spec.proxy_port(), 8080);

        let spec: RateLimitIntentSpec = serde_json::from_value(json!({
            "targetWorkloadName": "w",
            "clusterName": "c",
            "proxyPort": 9901
        }))
        .unwrap();
        assert_eq!(spec.proxy_port(), 9901);
    }
}
