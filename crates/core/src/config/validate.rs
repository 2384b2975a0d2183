use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Gateway base URL is a non-empty http(s) URL
/// - Server port is not 0
/// - Printer copy count is at least 1
/// - Orchestrator retry and breaker parameters are non-zero
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Gateway validation
    if !config.gateway.base_url.starts_with("http://")
        && !config.gateway.base_url.starts_with("https://")
    {
        return Err(ConfigError::ValidationError(format!(
            "gateway.base_url must be an http(s) URL, got {:?}",
            config.gateway.base_url
        )));
    }

    // Printer validation
    if config.printer.copies == 0 {
        return Err(ConfigError::ValidationError(
            "printer.copies must be at least 1".to_string(),
        ));
    }

    // Orchestrator validation
    if config.orchestrator.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.max_attempts must be at least 1".to_string(),
        ));
    }
    if config.orchestrator.breaker_threshold == 0 {
        return Err(ConfigError::ValidationError(
            "orchestrator.breaker_threshold must be at least 1".to_string(),
        ));
    }

    Ok(())
}
