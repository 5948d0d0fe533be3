//! # Configuration Update Proposer (fcp-04)
//!
//! Produces a [`ConfigUpdateProposal`] from a list of client-specified
//! operations:
//!
//! 1. Fetch the current channel config block (orderer resolver).
//! 2. Wrap the `Config` in a `ConfigTx`.
//! 3. Build, validate and apply each operation in order. The first failure
//!    aborts with `failed_to_apply_operation_<index>`.
//! 4. Diff before/after into a `ConfigUpdate`.
//! 5. Wrap it in an unsigned CONFIG_UPDATE envelope.
//! 6. Return the proposal with a fresh UUID and status `proposed`.
//!
//! Nothing is persisted.
//!
//! ## Crate Structure
//!
//! - `domain/proposal` - planning and proposal construction (pure)
//! - `domain/envelope` - CONFIG_UPDATE envelope wrap / unwrap
//! - `domain/config`, `domain/errors`
//! - `service` - `ConfigUpdateProposer` (fetch + build)

pub mod domain;
pub mod service;

pub use domain::{
    build_proposal, config_update_envelope, open_config_update_envelope, plan_operations,
    ConfigUpdateProposal, OpenedEnvelope, PlannedOperation, ProposalStatus, ProposerConfig,
    ProposerError,
};
pub use service::ConfigUpdateProposer;
