//! # Proposal Construction
//!
//! ```text
//! Config ──ConfigTx──→ op[0].validate/modify ──→ ... ──→ op[n]
//!                                                         │
//!                         compute_marshaled_update ←──────┘
//!                                   │
//!                    CONFIG_UPDATE envelope + preview ──→ ConfigUpdateProposal
//! ```
//!
//! Operations are applied strictly in list order. The first failure discards
//! the whole transaction; no partial envelope is ever produced.

use chrono::{DateTime, Utc};
use fcp_01_block_codec::proto::common::Config;
use fcp_02_config_operations::{
    apply, build_operation, update_preview, ConfigOpError, ConfigOperation, ConfigTx,
    ConfigUpdateOperation,
};
use prost::Message;
use serde::{Deserialize, Serialize};
use shared_types::NetworkId;
use tracing::{debug, info};
use uuid::Uuid;

use super::config::ProposerConfig;
use super::envelope::config_update_envelope;
use super::errors::ProposerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    Proposed,
    Submitted,
    Failed,
}

/// A computed, unsigned configuration update. Ephemeral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigUpdateProposal {
    pub id: Uuid,
    pub network_id: NetworkId,
    pub channel_name: String,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub operations: Vec<ConfigUpdateOperation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_json: Option<serde_json::Value>,
    /// Config sequence the update was computed against.
    pub base_sequence: u64,
    /// Marshaled unsigned `Envelope`.
    #[serde(skip)]
    pub envelope: Vec<u8>,
}

/// An operation paired with the request that describes it.
#[derive(Debug)]
pub struct PlannedOperation {
    pub request: ConfigUpdateOperation,
    pub operation: Box<dyn ConfigOperation>,
}

impl PlannedOperation {
    /// Build through the registry.
    pub fn from_request(request: ConfigUpdateOperation) -> Result<Self, ConfigOpError> {
        let operation = build_operation(&request)?;
        Ok(Self { request, operation })
    }

    /// Wrap an already typed operation, including ones outside the catalog.
    pub fn typed<O>(operation: O) -> Result<Self, ConfigOpError>
    where
        O: ConfigOperation + Serialize + 'static,
    {
        let payload = serde_json::to_value(&operation).map_err(|e| {
            ConfigOpError::InvalidPayload {
                op_type: operation.name().to_string(),
                message: e.to_string(),
            }
        })?;
        Ok(Self {
            request: ConfigUpdateOperation::new(operation.name(), payload),
            operation: Box::new(operation),
        })
    }
}

/// Build every request, failing with the index of the first bad one.
pub fn plan_operations(
    requests: Vec<ConfigUpdateOperation>,
) -> Result<Vec<PlannedOperation>, ProposerError> {
    requests
        .into_iter()
        .enumerate()
        .map(|(index, request)| {
            let op_type = request.op_type.clone();
            PlannedOperation::from_request(request).map_err(|source| {
                ProposerError::FailedToApplyOperation {
                    index,
                    op_type,
                    source,
                }
            })
        })
        .collect()
}

/// Apply `planned` to `config` and wrap the resulting delta.
pub fn build_proposal(
    network_id: NetworkId,
    channel: &str,
    config: Config,
    planned: Vec<PlannedOperation>,
    settings: &ProposerConfig,
) -> Result<ConfigUpdateProposal, ProposerError> {
    if planned.is_empty() {
        return Err(ProposerError::NoOperations);
    }
    if planned.len() > settings.max_operations {
        return Err(ProposerError::TooManyOperations {
            count: planned.len(),
            max: settings.max_operations,
        });
    }

    let mut tx = ConfigTx::new(config);
    let base_sequence = tx.sequence();
    for (index, step) in planned.iter().enumerate() {
        apply(step.operation.as_ref(), &mut tx).map_err(|source| {
            ProposerError::FailedToApplyOperation {
                index,
                op_type: step.request.op_type.clone(),
                source,
            }
        })?;
        debug!(
            network_id,
            operation_index = index,
            op_type = %step.request.op_type,
            "Operation applied"
        );
    }

    let update = tx
        .compute_update(channel)
        .map_err(ProposerError::ComputeUpdate)?;
    let created_at = Utc::now();
    let envelope = config_update_envelope(channel, update.encode_to_vec(), created_at);

    let proposal = ConfigUpdateProposal {
        id: Uuid::new_v4(),
        network_id,
        channel_name: channel.to_string(),
        status: ProposalStatus::Proposed,
        created_at,
        created_by: None,
        operations: planned.into_iter().map(|p| p.request).collect(),
        preview_json: settings.include_preview.then(|| update_preview(&update)),
        base_sequence,
        envelope: envelope.encode_to_vec(),
    };
    info!(
        network_id,
        channel = %channel,
        proposal_id = %proposal.id,
        operations = proposal.operations.len(),
        base_sequence,
        "Config update proposed"
    );
    Ok(proposal)
}
