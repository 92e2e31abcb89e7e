//! Typed Envoy bootstrap document tree.
//!
//! The synthesizer builds this tree and renders it with a single serializer
//! pass; the grammar is fixed and small, so the tree only models the nodes
//! the controller actually emits. Field order in each struct is the emission
//! order, which keeps rendering byte-deterministic.

use serde::Serialize;

pub const HCM_FILTER_NAME: &str = "envoy.filters.network.http_connection_manager";
pub const HCM_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.network.http_connection_manager.v3.HttpConnectionManager";
pub const RATELIMIT_FILTER_NAME: &str = "envoy.filters.http.ratelimit";
pub const RATELIMIT_TYPE_URL: &str =
    "type.googleapis.com/envoy.extensions.filters.http.ratelimit.v3.RateLimit";

#[derive(Debug, Serialize)]
pub struct Document {
    pub static_resources: StaticResources,
}

#[derive(Debug, Serialize)]
pub struct StaticResources {
    pub listeners: Vec<Listener>,
    pub clusters: Vec<Cluster>,
}

#[derive(Debug, Serialize)]
pub struct Listener {
    pub address: Address,
    pub filter_chains: Vec<FilterChain>,
}

#[derive(Debug, Serialize)]
pub struct Address {
    pub socket_address: SocketAddress,
}

#[derive(Debug, Serialize)]
pub struct SocketAddress {
    pub address: String,
    pub port_value: u16,
}

#[derive(Debug, Serialize)]
pub struct FilterChain {
    pub filters: Vec<NetworkFilter>,
}

#[derive(Debug, Serialize)]
pub struct NetworkFilter {
    pub name: &'static str,
    pub typed_config: HttpConnectionManager,
}

#[derive(Debug, Serialize)]
pub struct HttpConnectionManager {
    #[serde(rename = "@type")]
    pub type_url: &'static str,
    pub stat_prefix: &'static str,
    pub route_config: RouteConfig,
    pub http_filters: Vec<HttpFilter>,
}

#[derive(Debug, Serialize)]
pub struct RouteConfig {
    pub virtual_hosts: Vec<VirtualHost>,
}

#[derive(Debug, Serialize)]
pub struct VirtualHost {
    pub name: &'static str,
    pub domains: Vec<String>,
    pub routes: Vec<Route>,
}

#[derive(Debug, Serialize)]
pub struct Route {
    #[serde(rename = "match")]
    pub route_match: RouteMatch,
    pub route: RouteAction,
    /// Omitted entirely when no limits are configured; an empty
    /// `rate_limits:` key must never appear in the output.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rate_limits: Vec<RateLimitClause>,
}

#[derive(Debug, Serialize)]
pub struct RouteMatch {
    pub prefix: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RouteAction {
    pub cluster: String,
}

/// One rate-limit clause: an action selecting the descriptor dimension plus
/// the per-second budget.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct RateLimitClause {
    /// Rendered through `singleton_map_recursive` so each action emits the
    /// `action_name: {fields}` mapping form Envoy expects, not a YAML tag.
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub actions: Vec<RateLimitAction>,
    pub limit: ClauseLimit,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitAction {
    /// Match by request source address.
    RemoteAddress {},
    /// Match by the value of a single header.
    HeaderValue { header_name: String },
    /// Match by a request header with an explicit descriptor key (used for
    /// the `:path` route-pattern dimension).
    RequestHeaders {
        header_name: String,
        descriptor_key: String,
    },
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct ClauseLimit {
    pub requests_per_time_unit: u32,
    pub time_unit: TimeUnit,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeUnit {
    Second,
}

#[derive(Debug, Serialize)]
pub struct HttpFilter {
    pub name: &'static str,
    pub typed_config: RateLimitFilterConfig,
}

#[derive(Debug, Serialize)]
pub struct RateLimitFilterConfig {
    #[serde(rename = "@type")]
    pub type_url: &'static str,
    pub domain: &'static str,
}

#[derive(Debug, Serialize)]
pub struct Cluster {
    pub name: String,
    pub connect_timeout: &'static str,
    #[serde(rename = "type")]
    pub discovery_type: &'static str,
    pub lb_policy: &'static str,
    pub load_assignment: LoadAssignment,
}

#[derive(Debug, Serialize)]
pub struct LoadAssignment {
    pub cluster_name: String,
    pub endpoints: Vec<LocalityEndpoints>,
}

#[derive(Debug, Serialize)]
pub struct LocalityEndpoints {
    pub lb_endpoints: Vec<LbEndpoint>,
}

#[derive(Debug, Serialize)]
pub struct LbEndpoint {
    pub endpoint: Endpoint,
}

#[derive(Debug, Serialize)]
pub struct Endpoint {
    pub address: Address,
}
