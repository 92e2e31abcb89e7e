//! Configuration synthesizer.
//!
//! Pure, deterministic compiler from a rate-limit intent spec to a complete
//! Envoy bootstrap document. No I/O and no state: identical inputs always
//! produce byte-identical output, which is what makes the artifact
//! reconciler's compare-before-write check meaningful.

pub mod document;

use crate::intent::RateLimitIntentSpec;
use crate::Result;
use document::*;

/// Rate-limit enforcement domain the HTTP filter is bound to.
pub const ENFORCEMENT_DOMAIN: &str = "miniflex";

/// Header the per-user dimension keys on.
pub const USER_ID_HEADER: &str = "X-User-ID";

/// The workload is assumed to listen on this well-known local port; the
/// sidecar always forwards there. A deliberate simplification, not a
/// discovered value.
pub const UPSTREAM_ADDRESS: &str = "127.0.0.1";
pub const UPSTREAM_PORT: u16 = 3000;

const LISTEN_ADDRESS: &str = "0.0.0.0";
const CONNECT_TIMEOUT: &str = "0.25s";
const DISCOVERY_TYPE: &str = "logical_dns";
const LB_POLICY: &str = "round_robin";

/// Render the proxy configuration document for `spec`, listening on
/// `proxy_port`.
pub fn synthesize(spec: &RateLimitIntentSpec, proxy_port: u16) -> Result<String> {
    let doc = build_document(spec, proxy_port);
    Ok(serde_yaml::to_string(&doc)?)
}

/// Build the ordered clause list for `spec`.
///
/// Order is fixed: per-IP, per-user, per-route-pattern, then each named
/// header entry in input order. The order affects document bytes only, not
/// enforcement semantics.
pub fn rate_limit_clauses(spec: &RateLimitIntentSpec) -> Vec<RateLimitClause> {
    let mut clauses = Vec::new();

    if let Some(rps) = spec.per_ip_limit {
        clauses.push(clause(RateLimitAction::RemoteAddress {}, rps));
    }
    if let Some(rps) = spec.per_user_limit {
        clauses.push(clause(
            RateLimitAction::HeaderValue {
                header_name: USER_ID_HEADER.to_string(),
            },
            rps,
        ));
    }
    if let Some(rps) = spec.per_route_pattern_limit {
        clauses.push(clause(
            RateLimitAction::RequestHeaders {
                header_name: ":path".to_string(),
                descriptor_key: "route".to_string(),
            },
            rps,
        ));
    }
    for entry in &spec.named_header_limits {
        clauses.push(clause(
            RateLimitAction::HeaderValue {
                header_name: entry.header_name.clone(),
            },
            entry.rps,
        ));
    }

    clauses
}

fn clause(action: RateLimitAction, rps: u32) -> RateLimitClause {
    RateLimitClause {
        actions: vec![action],
        limit: ClauseLimit {
            requests_per_time_unit: rps,
            time_unit: TimeUnit::Second,
        },
    }
}

fn build_document(spec: &RateLimitIntentSpec, proxy_port: u16) -> Document {
    let listener = Listener {
        address: Address {
            socket_address: SocketAddress {
                address: LISTEN_ADDRESS.to_string(),
                port_value: proxy_port,
            },
        },
        filter_chains: vec![FilterChain {
            filters: vec![NetworkFilter {
                name: HCM_FILTER_NAME,
                typed_config: HttpConnectionManager {
                    type_url: HCM_TYPE_URL,
                    stat_prefix: "ingress_http",
                    route_config: RouteConfig {
                        virtual_hosts: vec![VirtualHost {
                            name: "backend",
                            domains: vec!["*".to_string()],
                            routes: vec![Route {
                                route_match: RouteMatch { prefix: "/" },
                                route: RouteAction {
                                    cluster: spec.cluster_name.clone(),
                                },
                                rate_limits: rate_limit_clauses(spec),
                            }],
                        }],
                    },
                    http_filters: vec![HttpFilter {
                        name: RATELIMIT_FILTER_NAME,
                        typed_config: RateLimitFilterConfig {
                            type_url: RATELIMIT_TYPE_URL,
                            domain: ENFORCEMENT_DOMAIN,
                        },
                    }],
                },
            }],
        }],
    };

    let cluster = Cluster {
        name: spec.cluster_name.clone(),
        connect_timeout: CONNECT_TIMEOUT,
        discovery_type: DISCOVERY_TYPE,
        lb_policy: LB_POLICY,
        load_assignment: LoadAssignment {
            cluster_name: spec.cluster_name.clone(),
            endpoints: vec![LocalityEndpoints {
                lb_endpoints: vec![LbEndpoint {
                    endpoint: Endpoint {
                        address: Address {
                            socket_address: SocketAddress {
                                address: UPSTREAM_ADDRESS.to_string(),
                                port_value: UPSTREAM_PORT,
                            },
                        },
                    },
                }],
            }],
        },
    };

    Document {
        static_resources: StaticResources {
            listeners: vec![listener],
            clusters: vec![cluster],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::HeaderLimit;

    fn base_spec() -> RateLimitIntentSpec {
        RateLimitIntentSpec {
            target_workload_name: "api".into(),
            cluster_name: "api-upstream".into(),
            proxy_port: None,
            per_ip_limit: None,
            per_user_limit: None,
            per_route_pattern_limit: None,
            named_header_limits: Vec::new(),
        }
    }

    #[test]
    fn identical_inputs_render_identical_bytes() {
        let mut spec = base_spec();
        spec.per_ip_limit = Some(100);
        spec.named_header_limits = vec![HeaderLimit {
            header_name: "X-A".into(),
            rps: 5,
        }];
        let a = synthesize(&spec, 8080).unwrap();
        let b = synthesize(&spec, 8080).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn clause_order_is_ip_user_route_then_named_headers() {
        let mut spec = base_spec();
        spec.per_ip_limit = Some(10);
        spec.per_user_limit = Some(20);
        spec.named_header_limits = vec![
            HeaderLimit {
                header_name: "X-A".into(),
                rps: 5,
            },
            HeaderLimit {
                header_name: "X-B".into(),
                rps: 7,
            },
        ];

        let clauses = rate_limit_clauses(&spec);
        assert_eq!(clauses.len(), 4);
        assert_eq!(clauses[0].actions[0], document::RateLimitAction::RemoteAddress {});
        assert_eq!(
            clauses[1].actions[0],
            document::RateLimitAction::HeaderValue {
                header_name: USER_ID_HEADER.into()
            }
        );
        assert_eq!(
            clauses[2].actions[0],
            document::RateLimitAction::HeaderValue {
                header_name: "X-A".into()
            }
        );
        assert_eq!(
            clauses[3].actions[0],
            document::RateLimitAction::HeaderValue {
                header_name: "X-B".into()
            }
        );
        assert_eq!(clauses[0].limit.requests_per_time_unit, 10);
        assert_eq!(clauses[3].limit.requests_per_time_unit, 7);
    }

    #[test]
    fn route_pattern_clause_uses_path_descriptor() {
        let mut spec = base_spec();
        spec.per_route_pattern_limit = Some(30);
        let clauses = rate_limit_clauses(&spec);
        assert_eq!(
            clauses[0].actions[0],
            document::RateLimitAction::RequestHeaders {
                header_name: ":path".into(),
                descriptor_key: "route".into(),
            }
        );
    }

    #[test]
    fn no_limits_omits_rate_limits_key() {
        let doc = synthesize(&base_spec(), 8080).unwrap();
        assert!(!doc.contains("rate_limits"));
    }

    #[test]
    fn default_port_binds_8080() {
        let doc = synthesize(&base_spec(), base_spec().proxy_port()).unwrap();
        assert!(doc.contains("port_value: 8080"));
    }

    #[test]
    fn document_routes_to_named_cluster() {
        let mut spec = base_spec();
        spec.per_ip_limit = Some(100);
        let doc = synthesize(&spec, 8080).unwrap();
        assert!(doc.contains("cluster: api-upstream"));
        assert!(doc.contains("name: api-upstream"));
        assert!(doc.contains("remote_address: {}"));
        assert!(doc.contains("requests_per_time_unit: 100"));
        assert!(doc.contains("time_unit: SECOND"));
        assert!(doc.contains(&format!("domain: {ENFORCEMENT_DOMAIN}")));
        assert!(doc.contains("address: 127.0.0.1"));
        assert!(doc.contains("port_value: 3000"));
    }

    #[test]
    fn clause_actions_render_as_mappings_not_tags() {
        let mut spec = base_spec();
        spec.per_ip_limit = Some(10);
        spec.per_user_limit = Some(20);
        spec.per_route_pattern_limit = Some(30);
        let doc = synthesize(&spec, 8080).unwrap();

        // Envoy's loader rejects application tags; every action must be a
        // single-key mapping.
        assert!(!doc.contains('!'), "unexpected yaml tag in:\n{doc}");
        assert!(doc.contains("remote_address: {}"));

        let parsed: serde_yaml::Value = serde_yaml::from_str(&doc).unwrap();
        let route = &parsed["static_resources"]["listeners"][0]["filter_chains"][0]["filters"]
            [0]["typed_config"]["route_config"]["virtual_hosts"][0]["routes"][0];
        let clauses = &route["rate_limits"];
        assert!(clauses[0]["actions"][0]["remote_address"].is_mapping());
        assert_eq!(
            clauses[1]["actions"][0]["header_value"]["header_name"].as_str(),
            Some(USER_ID_HEADER)
        );
        assert_eq!(
            clauses[2]["actions"][0]["request_headers"]["header_name"].as_str(),
            Some(":path")
        );
        assert_eq!(
            clauses[2]["actions"][0]["request_headers"]["descriptor_key"].as_str(),
            Some("route")
        );
    }

    #[test]
    fn rendered_document_is_valid_yaml() {
        let mut spec = base_spec();
        spec.per_user_limit = Some(20);
        let doc = synthesize(&spec, 9000).unwrap();
        let parsed: serde_yaml::Value = serde_yaml::from_str(&doc).unwrap();
        let port =
            &parsed["static_resources"]["listeners"][0]["address"]["socket_address"]["port_value"];
        assert_eq!(port.as_u64(), Some(9000));
    }
}
