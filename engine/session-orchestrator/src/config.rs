//! Session configuration

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use symbol_coordinator::PoolSizing;

use crate::error::ConfigError;
use crate::DEFAULT_CONSUMER_QUEUE_DEPTH;

/// Per-run options for the orchestrator
///
/// Scanner and strategy entries are opaque to the orchestrator: they are handed to
/// the workers untouched, keyed by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Start the topology without waiting for (or checking) the market window
    pub bypass_market_schedule: bool,

    /// Run only the scanner worker; no producer and no consumers
    #[serde(rename = "test_scanners")]
    pub scanners_only: bool,

    /// Do not seed the tracked symbols from currently open positions
    #[serde(rename = "skip_existing")]
    pub skip_existing_positions: bool,

    /// Explicit consumer pool size; 0 derives it from the host
    pub fixed_consumer_count: usize,

    /// Multiplier on the host-derived pool size
    pub load_factor: f64,

    /// Bound on each consumer's input queue
    pub consumer_queue_depth: usize,

    pub scanners: BTreeMap<String, serde_json::Value>,

    pub strategies: BTreeMap<String, serde_json::Value>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bypass_market_schedule: false,
            scanners_only: false,
            skip_existing_positions: false,
            fixed_consumer_count: 0,
            load_factor: 1.0,
            consumer_queue_depth: DEFAULT_CONSUMER_QUEUE_DEPTH,
            scanners: BTreeMap::new(),
            strategies: BTreeMap::new(),
        }
    }
}

impl SessionConfig {
    /// Check the configuration before anything is started
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.strategies.is_empty() {
            return Err(ConfigError::NoStrategies);
        }

        if self.scanners.is_empty() {
            return Err(ConfigError::NoScanners);
        }

        if self.fixed_consumer_count == 0
            && (!self.load_factor.is_finite() || self.load_factor <= 0.0)
        {
            return Err(ConfigError::invalid(format!(
                "load_factor must be a positive number, got {}",
                self.load_factor
            )));
        }

        if self.consumer_queue_depth == 0 {
            return Err(ConfigError::invalid("consumer_queue_depth must be greater than 0"));
        }

        Ok(())
    }

    pub fn pool_sizing(&self) -> PoolSizing {
        PoolSizing { fixed_consumer_count: self.fixed_consumer_count, load_factor: self.load_factor }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn configured() -> SessionConfig {
        let mut config = SessionConfig::default();
        config.scanners.insert("momentum".to_string(), json!({ "min_volume": 10000 }));
        config.strategies.insert("MomentumLong".to_string(), json!({}));
        config
    }

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert!(!config.bypass_market_schedule);
        assert!(!config.scanners_only);
        assert_eq!(config.fixed_consumer_count, 0);
        assert_eq!(config.load_factor, 1.0);
        assert_eq!(config.consumer_queue_depth, DEFAULT_CONSUMER_QUEUE_DEPTH);
    }

    #[test]
    fn test_configured_passes_validation() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_empty_strategies_rejected() {
        let mut config = configured();
        config.strategies.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoStrategies)));
    }

    #[test]
    fn test_empty_scanners_rejected() {
        let mut config = configured();
        config.scanners.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoScanners)));
    }

    #[test]
    fn test_load_factor_ignored_with_fixed_count() {
        let mut config = configured();
        config.load_factor = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.fixed_consumer_count = 3;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_queue_depth_rejected() {
        let mut config = configured();
        config.consumer_queue_depth = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_deserialize_uses_runtime_flag_names() {
        let config: SessionConfig = serde_json::from_value(json!({
            "test_scanners": true,
            "skip_existing": true,
            "strategies": { "MomentumLong": { "stop": 0.02 } }
        }))
        .unwrap();

        assert!(config.scanners_only);
        assert!(config.skip_existing_positions);
        assert_eq!(config.load_factor, 1.0);
        assert!(config.strategies.contains_key("MomentumLong"));
    }
}
