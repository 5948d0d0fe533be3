pub mod config;
pub mod envelope;
pub mod errors;
pub mod proposal;

pub use config::ProposerConfig;
pub use envelope::{config_update_envelope, open_config_update_envelope, OpenedEnvelope};
pub use errors::ProposerError;
pub use proposal::{
    build_proposal, plan_operations, ConfigUpdateProposal, PlannedOperation, ProposalStatus,
};
