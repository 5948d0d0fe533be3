//! Telemetry configuration from environment variables.

use serde::{Deserialize, Serialize};
use std::env;

/// Logging and metrics configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log filter directive (`info`, `fcp_06_network_deployer=debug`, ...)
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output
    pub json_logs: bool,

    /// Write logs at all (disabled for quiet CLI runs)
    pub console_output: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "fabric-control-plane".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            console_output: true,
        }
    }
}

fn flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: fabric-control-plane)
    /// - `FCP_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `FCP_JSON_LOGS`: JSON output (default: true inside containers)
    /// - `FCP_CONSOLE_OUTPUT`: Set to `false` to silence logs
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();
        let defaults = Self::default();

        Self {
            service_name: env::var("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),
            log_level: env::var("FCP_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            json_logs: env::var("FCP_JSON_LOGS")
                .map(|v| flag(&v))
                .unwrap_or(is_container),
            console_output: env::var("FCP_CONSOLE_OUTPUT")
                .map(|v| !v.eq_ignore_ascii_case("false") && v != "0")
                .unwrap_or(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TelemetryConfig::default();
        assert_eq!(config.service_name, "fabric-control-plane");
        assert_eq!(config.log_level, "info");
        assert!(!config.json_logs);
    }

    #[test]
    fn test_flag_parsing() {
        assert!(flag("TRUE"));
        assert!(flag("1"));
        assert!(!flag("no"));
    }
}
