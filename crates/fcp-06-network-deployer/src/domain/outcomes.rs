//! Results returned by the facade.

use fcp_04_config_proposer::ConfigUpdateProposal;
use fcp_05_signature_submitter::SubmissionResult;
use serde::{Deserialize, Serialize};

/// Whether the cached config block caught up with a submitted update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RefreshStatus {
    /// The ordering service reports the new config; the cache holds it.
    Refreshed { sequence: u64 },
    /// Still at the old sequence when the refresh deadline passed.
    Pending,
}

impl RefreshStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Refreshed { .. } => "refreshed",
            Self::Pending => "pending",
        }
    }
}

/// `UpdateChannelConfig` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigUpdateOutcome {
    pub proposal: ConfigUpdateProposal,
    pub submission: SubmissionResult,
}

/// `SetAnchorPeers` / `UpdateOrganizationCRL` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgUpdateOutcome {
    /// Broadcast status of the submitted update.
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    pub refresh: RefreshStatus,
}

/// `ReloadNetworkBlock` result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadedBlock {
    pub orderer: String,
    pub sequence: u64,
    pub message: String,
}
