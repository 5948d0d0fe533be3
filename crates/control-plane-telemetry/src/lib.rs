//! # Control Plane Telemetry
//!
//! Structured logging and Prometheus metrics for the Fabric control plane.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use control_plane_telemetry::{init_telemetry, TelemetryConfig};
//!
//! init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `fabric-control-plane` | Service name in logs |
//! | `FCP_LOG_LEVEL` / `RUST_LOG` | `info` | Log filter |
//! | `FCP_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |
//! | `FCP_CONSOLE_OUTPUT` | `true` | Emit logs at all |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_logging;
pub use metrics::{encode_metrics, register_metrics, HistogramTimer};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Register metrics, then install the log subscriber.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)
}
