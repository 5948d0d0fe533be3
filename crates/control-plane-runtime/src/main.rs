//! # fcp
//!
//! Runs one control plane command and prints its JSON result on stdout.
//! Failures print the classified error payload and exit with status 1.
//!
//! ## Startup Sequence
//!
//! 1. Parse arguments
//! 2. Load configuration (file, then `FCP_*` overrides)
//! 3. Initialize logging and metrics
//! 4. Open the state file and key directory, wire the services
//! 5. Execute the command

use anyhow::{Context, Result};
use clap::Parser;
use control_plane_runtime::{execute, Cli, ControlPlaneConfig, Ports, ServiceContainer};
use shared_types::ClassifiedError;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config =
        ControlPlaneConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    control_plane_telemetry::init_telemetry(&config.telemetry)
        .context("Failed to initialize telemetry")?;
    info!(
        state_file = %config.storage.state_file.display(),
        key_dir = %config.storage.key_dir.display(),
        "Starting fcp"
    );

    let ports = Ports::production(&config).context("Failed to open the state file")?;
    let services = ServiceContainer::new(&config, ports);

    match execute(cli.command, &services).await {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) => {
            error!(code = e.code(), error = %e, "Command failed");
            println!("{}", serde_json::to_string_pretty(&e.to_payload())?);
            std::process::exit(1);
        }
    }
}
