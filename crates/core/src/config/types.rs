use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::orchestrator::OrchestratorConfig;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub printer: PrinterConfig,
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Remote photo service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GatewayConfig {
    /// Photo service base URL (e.g., "https://photos.example.com/api")
    pub base_url: String,
    /// Optional API key sent as `x-api-key` header
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    30
}

/// Local printing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PrinterConfig {
    /// Target printer name. When unset, the platform's default printer is used.
    #[serde(default)]
    pub printer_name: Option<String>,
    /// Number of copies per print (default: 1)
    #[serde(default = "default_copies")]
    pub copies: u32,
    /// Directory for materialized print files (default: the OS temp dir)
    #[serde(default = "default_spool_dir")]
    pub spool_dir: PathBuf,
    /// Skip the OS print command and report success (for running without hardware)
    #[serde(default)]
    pub simulate: bool,
    /// Sample image printed by the self-test. A small embedded placeholder
    /// is used when this file is missing.
    #[serde(default)]
    pub sample_image: Option<PathBuf>,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            printer_name: None,
            copies: default_copies(),
            spool_dir: default_spool_dir(),
            simulate: false,
            sample_image: None,
        }
    }
}

fn default_copies() -> u32 {
    1
}

fn default_spool_dir() -> PathBuf {
    std::env::temp_dir()
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub gateway: SanitizedGatewayConfig,
    pub server: ServerConfig,
    pub printer: PrinterConfig,
    pub orchestrator: OrchestratorConfig,
}

/// Sanitized gateway config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedGatewayConfig {
    pub base_url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            gateway: SanitizedGatewayConfig {
                base_url: config.gateway.base_url.clone(),
                api_key_configured: config
                    .gateway
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
                timeout_secs: config.gateway.timeout_secs,
            },
            server: config.server.clone(),
            printer: config.printer.clone(),
            orchestrator: config.orchestrator.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let toml = r#"
[gateway]
base_url = "http://localhost:4000/api"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.gateway.base_url, "http://localhost:4000/api");
        assert!(config.gateway.api_key.is_none());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.printer.copies, 1);
        assert!(!config.printer.simulate);
    }

    #[test]
    fn test_deserialize_missing_gateway_fails() {
        let toml = r#"
[server]
port = 8080
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[gateway]
base_url = "https://photos.example.com/api"
api_key = "secret"
timeout_secs = 10

[server]
host = "127.0.0.1"
port = 9000

[printer]
printer_name = "Canon_SELPHY"
copies = 2
simulate = true

[orchestrator]
poll_batch_size = 10
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.gateway.api_key.as_deref(), Some("secret"));
        assert_eq!(config.printer.printer_name.as_deref(), Some("Canon_SELPHY"));
        assert_eq!(config.printer.copies, 2);
        assert!(config.printer.simulate);
        assert_eq!(config.orchestrator.poll_batch_size, 10);
    }

    #[test]
    fn test_sanitized_config_redacts_api_key() {
        let toml = r#"
[gateway]
base_url = "https://photos.example.com/api"
api_key = "secret"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.gateway.api_key_configured);

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret"));
    }
}
