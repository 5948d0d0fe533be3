//! Config Update Proposer Service
//!
//! Fetches the live channel config through the orderer resolver, then hands
//! off to [`build_proposal`].

use fcp_02_config_operations::ConfigUpdateOperation;
use fcp_03_orderer_resolver::{ChannelConfigSnapshot, OrdererResolver};
use shared_types::NetworkId;
use std::sync::Arc;

use crate::domain::{
    build_proposal, plan_operations, ConfigUpdateProposal, PlannedOperation, ProposerConfig,
    ProposerError,
};

pub struct ConfigUpdateProposer {
    resolver: Arc<OrdererResolver>,
    config: ProposerConfig,
}

impl ConfigUpdateProposer {
    pub fn new(resolver: Arc<OrdererResolver>, config: ProposerConfig) -> Self {
        Self { resolver, config }
    }

    /// Propose client-specified `{type, payload}` operations.
    pub async fn propose(
        &self,
        network_id: NetworkId,
        operations: Vec<ConfigUpdateOperation>,
    ) -> Result<ConfigUpdateProposal, ProposerError> {
        let planned = plan_operations(operations)?;
        self.propose_planned(network_id, planned).await
    }

    /// Propose already built operations against the live channel config.
    pub async fn propose_planned(
        &self,
        network_id: NetworkId,
        planned: Vec<PlannedOperation>,
    ) -> Result<ConfigUpdateProposal, ProposerError> {
        let snapshot = self.resolver.fetch_current_channel_config(network_id).await?;
        self.propose_against(network_id, &snapshot, planned)
    }

    /// Propose against a snapshot the caller already holds.
    pub fn propose_against(
        &self,
        network_id: NetworkId,
        snapshot: &ChannelConfigSnapshot,
        planned: Vec<PlannedOperation>,
    ) -> Result<ConfigUpdateProposal, ProposerError> {
        build_proposal(
            network_id,
            &snapshot.channel,
            snapshot.config.clone(),
            planned,
            &self.config,
        )
    }
}
