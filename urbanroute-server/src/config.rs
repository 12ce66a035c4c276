use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;
use urbanroute_core::DatasetConfig;
use urbanroute_core::algo::{DelayParameters, MstWeights};
use urbanroute_core::algo::interchange::{DEFAULT_LIMIT, DEFAULT_MAX_DISTANCE};
use urbanroute_core::routing::CachePolicy;

use crate::error::ServerError;

/// Server settings, read from a TOML file. Every field has a default so an
/// empty file is a valid configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub request_timeout_secs: u64,
    pub max_concurrent_requests: usize,
    pub dataset: DatasetConfig,
    pub planning: PlanningDefaults,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            request_timeout_secs: 30,
            max_concurrent_requests: 64,
            dataset: DatasetConfig::default(),
            planning: PlanningDefaults::default(),
        }
    }
}

/// Fallback parameters for planning endpoints when a request leaves them out.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlanningDefaults {
    pub mst: MstWeights,
    /// Million currency units available for new roads
    pub construction_budget: f64,
    /// Million currency units available for repairs
    pub maintenance_budget: f64,
    pub delay: DelayParameters,
    pub interchange_max_distance: f64,
    pub interchange_limit: usize,
    /// Memoization policy of batch route requests
    pub batch_cache: CachePolicy,
}

impl Default for PlanningDefaults {
    fn default() -> Self {
        Self {
            mst: MstWeights::default(),
            construction_budget: 1000.0,
            maintenance_budget: 100.0,
            delay: DelayParameters::default(),
            interchange_max_distance: DEFAULT_MAX_DISTANCE,
            interchange_limit: DEFAULT_LIMIT,
            batch_cache: CachePolicy::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ServerError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ServerError> {
        toml::from_str(raw).map_err(|e| ServerError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config.bind.port(), 8080);
        assert_eq!(config.dataset.neighborhoods, "neighborhoods.csv");
        assert_eq!(config.planning.mst, MstWeights::default());
    }

    #[test]
    fn sections_override_defaults() {
        let config = ServerConfig::from_toml(
            r#"
            bind = "0.0.0.0:9000"
            request_timeout_secs = 5

            [dataset]
            dir = "/srv/cairo"
            traffic_flow = "flows.csv"

            [planning]
            construction_budget = 250.0
            batch_cache = { bounded = 128 }

            [planning.mst]
            alpha = 0.5
            beta = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.bind.port(), 9000);
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.dataset.dir.to_str(), Some("/srv/cairo"));
        assert_eq!(config.dataset.traffic_flow, "flows.csv");
        assert_eq!(config.dataset.bus_routes, "bus_routes.csv");
        assert_eq!(config.planning.construction_budget, 250.0);
        assert_eq!(config.planning.batch_cache, CachePolicy::Bounded(128));
        assert_eq!(config.planning.mst.alpha, 0.5);
        assert_eq!(config.planning.maintenance_budget, 100.0);
    }

    #[test]
    fn malformed_file_is_rejected() {
        assert!(matches!(
            ServerConfig::from_toml("bind = 12"),
            Err(ServerError::Config(_))
        ));
    }
}
