use serde::{Deserialize, Serialize};

/// Orchestrator configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OrchestratorConfig {
    /// Photos fetched per polling cycle (default: 5)
    #[serde(default = "default_poll_batch_size")]
    pub poll_batch_size: usize,
    /// Photos fetched per manual print-event request (default: 50)
    #[serde(default = "default_manual_batch_size")]
    pub manual_batch_size: usize,
    /// Print attempts before a job fails terminally (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Consecutive rate-limited fetches that open the circuit breaker (default: 3)
    #[serde(default = "default_breaker_threshold")]
    pub breaker_threshold: u32,
    /// How long the breaker stays open, in milliseconds (default: 60000)
    #[serde(default = "default_breaker_open_ms")]
    pub breaker_open_ms: u64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_batch_size: default_poll_batch_size(),
            manual_batch_size: default_manual_batch_size(),
            max_attempts: default_max_attempts(),
            breaker_threshold: default_breaker_threshold(),
            breaker_open_ms: default_breaker_open_ms(),
        }
    }
}

fn default_poll_batch_size() -> usize {
    5
}

fn default_manual_batch_size() -> usize {
    50
}

fn default_max_attempts() -> u32 {
    3
}

fn default_breaker_threshold() -> u32 {
    3
}

fn default_breaker_open_ms() -> u64 {
    60_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.poll_batch_size, 5);
        assert_eq!(config.manual_batch_size, 50);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.breaker_threshold, 3);
        assert_eq!(config.breaker_open_ms, 60_000);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: OrchestratorConfig = toml::from_str("max_attempts = 5").unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.poll_batch_size, 5);
        assert_eq!(config.breaker_open_ms, 60_000);
    }
}
