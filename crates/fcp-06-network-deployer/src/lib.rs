//! # Network Deployer Facade (fcp-06)
//!
//! The externally callable network operations. Each one composes the
//! resolver, proposer and submitter and owns the resulting record-store
//! writes:
//!
//! | Operation | Effect |
//! |-----------|--------|
//! | `join_node` | node joins the channel, membership `joined` |
//! | `unjoin_node` / `remove_node` | node leaves, membership `unjoined` / `removed` |
//! | `add_node_to_network` | new `pending` membership |
//! | `update_channel_config` | propose, sign, broadcast |
//! | `set_anchor_peers` / `update_organization_crl` | same pipeline, then refresh |
//! | `reload_network_block` | cache the live config block |
//!
//! Every operation emits an audit event.
//!
//! ## Crate Structure
//!
//! - `domain/` - config, errors, outcomes, per-network locks
//! - `ports/` - `NodeManager` (join / leave) and its mock
//! - `service/` - `FabricDeployer`, `NetworkDeployer`, `DeployerRegistry`

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    ConfigUpdateOutcome, DeployerConfig, DeployerError, NetworkLocks, OrgUpdateOutcome,
    RefreshStatus, ReloadedBlock,
};
pub use ports::{MockNodeManager, NodeCall, NodeManager};
pub use service::{
    BesuDeployer, ConfigPipeline, DeployerRegistry, FabricDeployer, NetworkDeployer,
    PipelineConfig,
};
