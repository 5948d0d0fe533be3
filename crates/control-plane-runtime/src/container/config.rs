//! # Control Plane Configuration
//!
//! One TOML file covers every component; each section is the config struct
//! of the crate it tunes. Missing sections fall back to defaults, and
//! `FCP_*` environment variables override the file.
//!
//! ```toml
//! [storage]
//! state_file = "/var/lib/fcp/state.json"
//! key_dir = "/var/lib/fcp/keys"
//!
//! [grpc]
//! connect_timeout_ms = 5000
//! signer_msp_id = "Org1MSP"
//!
//! [submitter]
//! broadcast_timeout_ms = 30000
//!
//! [deployer]
//! refresh_timeout_ms = 30000
//! ```

use control_plane_telemetry::TelemetryConfig;
use fcp_03_orderer_resolver::ResolverConfig;
use fcp_04_config_proposer::ProposerConfig;
use fcp_05_signature_submitter::SubmitterConfig;
use fcp_06_network_deployer::{DeployerConfig, PipelineConfig};
use fcp_07_block_query::QueryConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for {name}")]
    InvalidEnv { name: &'static str, value: String },
}

/// Where records and keys live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON record store.
    pub state_file: PathBuf,
    /// Directory of `<key_id>.key.pem` / `<key_id>.cert.pem` pairs.
    pub key_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_file: PathBuf::from("./fcp-state.json"),
            key_dir: PathBuf::from("./keys"),
        }
    }
}

/// gRPC client settings shared by the orderer and peer adapters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrpcConfig {
    pub connect_timeout_ms: u64,
    /// Organization whose admin signs Deliver requests to orderers. The
    /// first managed organization by MSP ID when unset.
    pub signer_msp_id: Option<String>,
}

impl Default for GrpcConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5_000,
            signer_msp_id: None,
        }
    }
}

impl GrpcConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlPlaneConfig {
    pub storage: StorageConfig,
    pub grpc: GrpcConfig,
    pub telemetry: TelemetryConfig,
    pub resolver: ResolverConfig,
    pub proposer: ProposerConfig,
    pub submitter: SubmitterConfig,
    pub deployer: DeployerConfig,
    pub query: QueryConfig,
}

fn millis(name: &'static str, value: String) -> Result<u64, ConfigError> {
    match value.parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(ms),
        _ => Err(ConfigError::InvalidEnv { name, value }),
    }
}

impl ControlPlaneConfig {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Read `path` (defaults when `None`), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::parse(&content)?
            }
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Apply `FCP_*` overrides read through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(path) = lookup("FCP_STATE_FILE") {
            self.storage.state_file = PathBuf::from(path);
        }
        if let Some(path) = lookup("FCP_KEY_DIR") {
            self.storage.key_dir = PathBuf::from(path);
        }
        if let Some(msp_id) = lookup("FCP_SIGNER_MSP_ID") {
            self.grpc.signer_msp_id = Some(msp_id);
        }
        if let Some(v) = lookup("FCP_CONNECT_TIMEOUT_MS") {
            self.grpc.connect_timeout_ms = millis("FCP_CONNECT_TIMEOUT_MS", v)?;
        }
        if let Some(v) = lookup("FCP_FETCH_TIMEOUT_MS") {
            self.resolver.fetch_timeout_ms = millis("FCP_FETCH_TIMEOUT_MS", v)?;
        }
        if let Some(v) = lookup("FCP_BROADCAST_TIMEOUT_MS") {
            self.submitter.broadcast_timeout_ms = millis("FCP_BROADCAST_TIMEOUT_MS", v)?;
        }
        if let Some(v) = lookup("FCP_REFRESH_TIMEOUT_MS") {
            self.deployer.refresh_timeout_ms = millis("FCP_REFRESH_TIMEOUT_MS", v)?;
        }
        if let Some(v) = lookup("FCP_QUERY_TIMEOUT_MS") {
            self.query.request_timeout_ms = millis("FCP_QUERY_TIMEOUT_MS", v)?;
        }
        if let Some(level) = lookup("FCP_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            self.telemetry.log_level = level;
        }
        if let Some(v) = lookup("FCP_JSON_LOGS") {
            self.telemetry.json_logs = v.eq_ignore_ascii_case("true") || v == "1";
        }
        Ok(())
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            resolver: self.resolver.clone(),
            proposer: self.proposer.clone(),
            submitter: self.submitter.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = ControlPlaneConfig::parse(
            r#"
            [storage]
            state_file = "/tmp/state.json"

            [submitter]
            broadcast_timeout_ms = 1500
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.state_file, PathBuf::from("/tmp/state.json"));
        assert_eq!(config.storage.key_dir, PathBuf::from("./keys"));
        assert_eq!(config.submitter.broadcast_timeout_ms, 1500);
        assert_eq!(config.deployer, DeployerConfig::default());
    }

    #[test]
    fn test_env_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("FCP_KEY_DIR", "/keys"),
            ("FCP_SIGNER_MSP_ID", "Org2MSP"),
            ("FCP_QUERY_TIMEOUT_MS", "750"),
            ("RUST_LOG", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = ControlPlaneConfig::default();
        config
            .apply_env(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.storage.key_dir, PathBuf::from("/keys"));
        assert_eq!(config.grpc.signer_msp_id.as_deref(), Some("Org2MSP"));
        assert_eq!(config.query.request_timeout_ms, 750);
        assert_eq!(config.telemetry.log_level, "debug");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = ControlPlaneConfig::default();
        let err = config
            .apply_env(|name| (name == "FCP_BROADCAST_TIMEOUT_MS").then(|| "0".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                name: "FCP_BROADCAST_TIMEOUT_MS",
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_field_type_is_parse_error() {
        let err = ControlPlaneConfig::parse("[grpc]\nconnect_timeout_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
