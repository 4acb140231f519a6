//! Engine and service configuration

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for the matching engine and its owner task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Resting orders to preallocate room for, per side.
    pub order_capacity: usize,
    /// Bound on commands queued for the owner task.
    pub command_queue_capacity: usize,
    /// Events retained for slow subscribers before they start lagging.
    pub event_buffer: usize,
    /// Levels per side in published snapshots (0 = all).
    pub snapshot_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            order_capacity: 1_024,
            command_queue_capacity: 1_024,
            event_buffer: 4_096,
            snapshot_depth: 0,
        }
    }
}

impl EngineConfig {
    /// Reject settings the channels cannot be built with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.command_queue_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("command_queue_capacity"));
        }
        if self.event_buffer == 0 {
            return Err(ConfigError::ZeroCapacity("event_buffer"));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    ZeroCapacity(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"snapshot_depth": 10}"#).unwrap();
        assert_eq!(config.snapshot_depth, 10);
        assert_eq!(config.command_queue_capacity, EngineConfig::default().command_queue_capacity);
    }

    #[test]
    fn test_zero_queue_rejected() {
        let config = EngineConfig {
            command_queue_capacity: 0,
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroCapacity("command_queue_capacity"))
        );
        assert_eq!(
            config.validate().unwrap_err().to_string(),
            "command_queue_capacity must be greater than zero"
        );
    }
}
