//! # Commands
//!
//! The `fcp` subcommands. Each maps to one facade or query operation and
//! yields the operation's result as JSON.

use clap::{Parser, Subcommand};
use fcp_02_config_operations::{AnchorPeerSpec, ConfigUpdateOperation};
use fcp_06_network_deployer::DeployerError;
use fcp_07_block_query::QueryError;
use serde::Serialize;
use serde_json::Value;
use shared_types::{ClassifiedError, ErrorCategory, NetworkId, OrganizationId};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::container::ServiceContainer;

#[derive(Debug, Parser)]
#[command(name = "fcp", version, about = "Hyperledger Fabric channel configuration control plane")]
pub struct Cli {
    /// TOML configuration file.
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Propose, sign and submit a batch of config update operations.
    UpdateConfig {
        network_id: NetworkId,
        /// JSON file holding an array of `{"type": ..., "payload": ...}`.
        #[arg(long)]
        operations: PathBuf,
        #[arg(long)]
        created_by: Option<String>,
    },
    /// Replace an organization's anchor peers.
    AnchorPeers {
        network_id: NetworkId,
        #[arg(long)]
        org: OrganizationId,
        /// Anchor peer as `host:port`; repeat for several.
        #[arg(long = "peer", value_parser = parse_anchor_peer)]
        peers: Vec<AnchorPeerSpec>,
    },
    /// Fetch the current config block from the orderers and cache it.
    ReloadBlock { network_id: NetworkId },
    /// List the orderers the network resolves to.
    Orderers { network_id: NetworkId },
    /// Page through blocks on a joined peer.
    Blocks {
        network_id: NetworkId,
        #[arg(long, default_value_t = 10)]
        limit: u64,
        #[arg(long, default_value_t = 0)]
        offset: u64,
        /// Newest first.
        #[arg(long)]
        reverse: bool,
    },
    /// Show one block, or only its transactions.
    Block {
        network_id: NetworkId,
        number: u64,
        #[arg(long)]
        transactions: bool,
    },
    /// Find a transaction by ID.
    Transaction { network_id: NetworkId, tx_id: String },
    /// Chain height and newest block hash.
    ChainInfo { network_id: NetworkId },
}

fn parse_anchor_peer(value: &str) -> Result<AnchorPeerSpec, String> {
    let (host, port) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("expected host:port, got {value:?}"))?;
    let port = port
        .parse::<u32>()
        .map_err(|_| format!("invalid port in {value:?}"))?;
    Ok(AnchorPeerSpec {
        host: host.to_string(),
        port,
    })
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    Input(String),

    #[error(transparent)]
    Deployer(#[from] DeployerError),

    #[error(transparent)]
    Query(#[from] QueryError),
}

impl ClassifiedError for CommandError {
    fn code(&self) -> &'static str {
        match self {
            Self::Input(_) => "invalid_input",
            Self::Deployer(e) => e.code(),
            Self::Query(e) => e.code(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Input(_) => ErrorCategory::Validation,
            Self::Deployer(e) => e.category(),
            Self::Query(e) => e.category(),
        }
    }
}

fn to_json(value: impl Serialize) -> Result<Value, CommandError> {
    serde_json::to_value(value).map_err(|e| CommandError::Input(e.to_string()))
}

async fn read_operations(path: &Path) -> Result<Vec<ConfigUpdateOperation>, CommandError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| CommandError::Input(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| CommandError::Input(format!("{}: {}", path.display(), e)))
}

/// Run `command` against the container.
pub async fn execute(
    command: Command,
    services: &ServiceContainer,
) -> Result<Value, CommandError> {
    match command {
        Command::UpdateConfig {
            network_id,
            operations,
            created_by,
        } => {
            let operations = read_operations(&operations).await?;
            let deployer = services.deployers.for_network(network_id).await?;
            let outcome = deployer
                .fabric()?
                .update_channel_config(network_id, operations, created_by)
                .await?;
            to_json(outcome)
        }
        Command::AnchorPeers {
            network_id,
            org,
            peers,
        } => {
            let deployer = services.deployers.for_network(network_id).await?;
            let outcome = deployer
                .fabric()?
                .set_anchor_peers(network_id, org, peers)
                .await?;
            to_json(outcome)
        }
        Command::ReloadBlock { network_id } => {
            let deployer = services.deployers.for_network(network_id).await?;
            to_json(deployer.fabric()?.reload_network_block(network_id).await?)
        }
        Command::Orderers { network_id } => {
            let deployer = services.deployers.for_network(network_id).await?;
            to_json(deployer.fabric()?.get_orderers(network_id).await?)
        }
        Command::Blocks {
            network_id,
            limit,
            offset,
            reverse,
        } => to_json(
            services
                .query
                .get_blocks(network_id, limit, offset, reverse)
                .await?,
        ),
        Command::Block {
            network_id,
            number,
            transactions: true,
        } => to_json(
            services
                .query
                .get_block_transactions(network_id, number)
                .await?,
        ),
        Command::Block {
            network_id, number, ..
        } => to_json(services.query.get_block(network_id, number).await?),
        Command::Transaction { network_id, tx_id } => {
            to_json(services.query.get_transaction(network_id, &tx_id).await?)
        }
        Command::ChainInfo { network_id } => {
            to_json(services.query.get_chain_info(network_id).await?)
        }
    }
}
