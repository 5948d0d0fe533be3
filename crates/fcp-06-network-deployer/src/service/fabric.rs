//! Fabric Deployer
//!
//! Every channel-altering call runs under the network's lock:
//!
//! ```text
//! update_channel_config ─┐
//! set_anchor_peers ──────┼─ lock(network) ─ fetch ─ propose ─ sign ─ broadcast
//! update_organization_crl┘                                     │
//!                          (anchor peers, CRL) ── poll until sequence > base
//! reload_network_block ──── lock(network) ─ fetch ─ persist
//! ```
//!
//! Join and leave only touch the node and its membership row and are not
//! serialized.

use control_plane_telemetry::metrics::{self, HistogramTimer};
use fcp_01_block_codec::block_bytes_to_b64;
use fcp_02_config_operations::{
    AnchorPeerSpec, ConfigUpdateOperation, RevocationListUpdate, SetAnchorPeers,
};
use fcp_03_orderer_resolver::ChannelConfigSnapshot;
use fcp_04_config_proposer::{plan_operations, PlannedOperation, ProposalStatus};
use serde_json::{json, Value};
use shared_types::{
    AuditEvent, AuditOutcome, AuditSink, FabricOrganization, NetworkId, NetworkNode,
    NetworkNodeStatus, NodeId, NodeRole, OrdererInfo, OrganizationId, RecordStore,
    RegisteredNode, TransportError,
};
use std::future::Future;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::pipeline::ConfigPipeline;
use crate::domain::{
    ConfigUpdateOutcome, DeployerConfig, DeployerError, NetworkLocks, OrgUpdateOutcome,
    RefreshStatus, ReloadedBlock,
};
use crate::ports::NodeManager;

pub struct FabricDeployer {
    store: Arc<dyn RecordStore>,
    pipeline: ConfigPipeline,
    nodes: Arc<dyn NodeManager>,
    audit: Arc<dyn AuditSink>,
    locks: NetworkLocks,
    config: DeployerConfig,
}

impl FabricDeployer {
    pub fn new(
        store: Arc<dyn RecordStore>,
        pipeline: ConfigPipeline,
        nodes: Arc<dyn NodeManager>,
        audit: Arc<dyn AuditSink>,
        config: DeployerConfig,
    ) -> Self {
        Self {
            store,
            pipeline,
            nodes,
            audit,
            locks: NetworkLocks::new(),
            config,
        }
    }

    fn record<T>(
        &self,
        action: &str,
        network_id: NetworkId,
        details: Value,
        result: &Result<T, DeployerError>,
    ) {
        let outcome = match result {
            Ok(_) => AuditOutcome::Success,
            Err(e) => AuditOutcome::Failure {
                message: e.to_string(),
            },
        };
        self.audit
            .record(AuditEvent::new(action, network_id, details, outcome));
    }

    async fn node_call<F>(&self, node: &RegisteredNode, call: F) -> Result<(), DeployerError>
    where
        F: Future<Output = Result<(), TransportError>>,
    {
        let timeout = self.config.node_timeout();
        tokio::time::timeout(timeout, call)
            .await
            .unwrap_or_else(|_| Err(TransportError::timeout(&node.name, timeout)))
            .map_err(DeployerError::Node)
    }

    async fn channel_node(
        &self,
        node_id: NodeId,
    ) -> Result<(RegisteredNode, NodeRole), DeployerError> {
        let node = self.store.get_node(node_id).await?;
        let role = node
            .node_type
            .role()
            .ok_or(DeployerError::UnsupportedNodeType {
                node_id,
                node_type: node.node_type,
            })?;
        Ok((node, role))
    }

    // -------------------------------------------------------------------------
    // Node membership
    // -------------------------------------------------------------------------

    /// `JoinNode`: join the node to the channel of `genesis_block`, then mark
    /// its membership joined.
    pub async fn join_node(
        &self,
        network_id: NetworkId,
        genesis_block: &[u8],
        node_id: NodeId,
    ) -> Result<(), DeployerError> {
        let result: Result<(), DeployerError> = async {
            let (node, role) = self.channel_node(node_id).await?;
            match role {
                NodeRole::Peer => {
                    self.node_call(&node, self.nodes.join_peer(&node, genesis_block))
                        .await?
                }
                NodeRole::Orderer => {
                    self.node_call(&node, self.nodes.join_orderer(&node, genesis_block))
                        .await?
                }
            }
            self.store
                .update_network_node_status(network_id, node_id, NetworkNodeStatus::Joined)
                .await?;
            info!(network_id, node_id, %role, "Node joined channel");
            Ok(())
        }
        .await;
        self.record("join_node", network_id, json!({ "node_id": node_id }), &result);
        result
    }

    async fn leave(
        &self,
        network_id: NetworkId,
        node_id: NodeId,
        status: NetworkNodeStatus,
    ) -> Result<(), DeployerError> {
        let network = self.store.get_network(network_id).await?;
        let channel = network.channel_name();
        let (node, role) = self.channel_node(node_id).await?;
        match role {
            NodeRole::Peer => {
                self.node_call(&node, self.nodes.leave_peer(&node, channel))
                    .await?
            }
            NodeRole::Orderer => {
                self.node_call(&node, self.nodes.leave_orderer(&node, channel))
                    .await?
            }
        }
        self.store
            .update_network_node_status(network_id, node_id, status)
            .await?;
        info!(network_id, node_id, %role, %status, "Node left channel");
        Ok(())
    }

    /// `UnjoinNode`: the node leaves the channel but stays registered.
    pub async fn unjoin_node(
        &self,
        network_id: NetworkId,
        node_id: NodeId,
    ) -> Result<(), DeployerError> {
        let result = self
            .leave(network_id, node_id, NetworkNodeStatus::Unjoined)
            .await;
        self.record("unjoin_node", network_id, json!({ "node_id": node_id }), &result);
        result
    }

    /// `RemoveNode`: same leave call as unjoin, recorded as removed.
    pub async fn remove_node(
        &self,
        network_id: NetworkId,
        node_id: NodeId,
    ) -> Result<(), DeployerError> {
        let result = self
            .leave(network_id, node_id, NetworkNodeStatus::Removed)
            .await;
        self.record("remove_node", network_id, json!({ "node_id": node_id }), &result);
        result
    }

    /// `AddNodeToNetwork`: create a pending membership row.
    pub async fn add_node_to_network(
        &self,
        network_id: NetworkId,
        node_id: NodeId,
    ) -> Result<NetworkNode, DeployerError> {
        let result: Result<NetworkNode, DeployerError> = async {
            let (_, role) = self.channel_node(node_id).await?;
            Ok(self
                .store
                .create_network_node(network_id, node_id, role)
                .await?)
        }
        .await;
        self.record(
            "add_node_to_network",
            network_id,
            json!({ "node_id": node_id }),
            &result,
        );
        result
    }

    // -------------------------------------------------------------------------
    // Channel configuration
    // -------------------------------------------------------------------------

    /// Fetch, propose, sign and broadcast. Caller holds the network lock.
    async fn propose_and_submit(
        &self,
        network_id: NetworkId,
        planned: Vec<PlannedOperation>,
        created_by: Option<String>,
    ) -> Result<ConfigUpdateOutcome, DeployerError> {
        let _timer = HistogramTimer::new(&metrics::CONFIG_UPDATE_DURATION);
        let result: Result<ConfigUpdateOutcome, DeployerError> = async {
            let snapshot = self.fetch(network_id).await?;
            let mut proposal =
                self.pipeline
                    .proposer
                    .propose_against(network_id, &snapshot, planned)?;
            proposal.created_by = created_by;
            let submission = self
                .pipeline
                .submitter
                .submit(network_id, &proposal.envelope)
                .await?;
            proposal.status = ProposalStatus::Submitted;
            metrics::record_signatures(submission.signers.len());
            Ok(ConfigUpdateOutcome {
                proposal,
                submission,
            })
        }
        .await;
        metrics::record_config_update(result.is_ok());
        result
    }

    /// `UpdateChannelConfig`: propose, sign and submit client operations.
    ///
    /// The cached config block is not refreshed; call
    /// [`reload_network_block`](Self::reload_network_block) afterwards.
    pub async fn update_channel_config(
        &self,
        network_id: NetworkId,
        operations: Vec<ConfigUpdateOperation>,
        created_by: Option<String>,
    ) -> Result<ConfigUpdateOutcome, DeployerError> {
        let types: Vec<String> = operations.iter().map(|o| o.op_type.clone()).collect();
        let result: Result<ConfigUpdateOutcome, DeployerError> = async {
            let planned = plan_operations(operations)?;
            let _guard = self.locks.acquire(network_id).await;
            self.propose_and_submit(network_id, planned, created_by)
                .await
        }
        .await;
        match &result {
            Ok(outcome) => info!(
                network_id,
                proposal_id = %outcome.proposal.id,
                status = %outcome.submission.status,
                "Channel config update submitted"
            ),
            Err(e) => warn!(network_id, error = %e, "Channel config update failed"),
        }
        self.record(
            "update_channel_config",
            network_id,
            json!({ "operations": types }),
            &result,
        );
        result
    }

    /// First peer registered in `network_id` that belongs to `org`.
    async fn org_peer(
        &self,
        network_id: NetworkId,
        org: &FabricOrganization,
    ) -> Result<RegisteredNode, DeployerError> {
        let rows = self.store.list_network_nodes(network_id).await?;
        for row in rows
            .iter()
            .filter(|r| r.role == NodeRole::Peer && r.is_joined())
        {
            let node = self.store.get_node(row.node_id).await?;
            if node.organization_id == Some(org.id) {
                return Ok(node);
            }
        }
        Err(DeployerError::NoPeerFound {
            organization_id: org.id,
        })
    }

    /// Submit a single-operation org update and wait for it to commit.
    async fn submit_org_update(
        &self,
        network_id: NetworkId,
        operation: PlannedOperation,
    ) -> Result<OrgUpdateOutcome, DeployerError> {
        let _guard = self.locks.acquire(network_id).await;
        let outcome = self
            .propose_and_submit(network_id, vec![operation], None)
            .await?;
        let refresh = self
            .refresh_after(network_id, outcome.proposal.base_sequence)
            .await;
        Ok(OrgUpdateOutcome {
            transaction_id: outcome.submission.status,
            refresh,
        })
    }

    /// `SetAnchorPeers`: replace the anchor peers of `organization_id`.
    pub async fn set_anchor_peers(
        &self,
        network_id: NetworkId,
        organization_id: OrganizationId,
        anchor_peers: Vec<AnchorPeerSpec>,
    ) -> Result<OrgUpdateOutcome, DeployerError> {
        let details = json!({
            "organization_id": organization_id,
            "anchor_peers": anchor_peers
                .iter()
                .map(|p| format!("{}:{}", p.host, p.port))
                .collect::<Vec<_>>(),
        });
        let result: Result<OrgUpdateOutcome, DeployerError> = async {
            let org = self.store.get_fabric_organization(organization_id).await?;
            let peer = self.org_peer(network_id, &org).await?;
            debug!(network_id, msp_id = %org.msp_id, peer = %peer.name, "Anchor peer update");
            let operation = PlannedOperation::typed(SetAnchorPeers {
                msp_id: org.msp_id,
                anchor_peers,
            })?;
            self.submit_org_update(network_id, operation).await
        }
        .await;
        self.record("set_anchor_peers", network_id, details, &result);
        result
    }

    /// `UpdateOrganizationCRL`: replace the revocation list of an org's MSP.
    pub async fn update_organization_crl(
        &self,
        network_id: NetworkId,
        organization_id: OrganizationId,
        revocation_list: Vec<String>,
    ) -> Result<OrgUpdateOutcome, DeployerError> {
        let details = json!({
            "organization_id": organization_id,
            "crl_count": revocation_list.len(),
        });
        let result: Result<OrgUpdateOutcome, DeployerError> = async {
            let org = self.store.get_fabric_organization(organization_id).await?;
            let operation = PlannedOperation::typed(RevocationListUpdate {
                msp_id: org.msp_id,
                revocation_list,
            })?;
            self.submit_org_update(network_id, operation).await
        }
        .await;
        self.record("update_organization_crl", network_id, details, &result);
        result
    }

    // -------------------------------------------------------------------------
    // Config block cache
    // -------------------------------------------------------------------------

    async fn fetch(
        &self,
        network_id: NetworkId,
    ) -> Result<ChannelConfigSnapshot, DeployerError> {
        let snapshot = self
            .pipeline
            .resolver
            .fetch_current_channel_config(network_id)
            .await?;
        metrics::record_orderer_fetch_failures(snapshot.failed_attempts);
        Ok(snapshot)
    }

    async fn persist(
        &self,
        network_id: NetworkId,
        snapshot: &ChannelConfigSnapshot,
    ) -> Result<ReloadedBlock, DeployerError> {
        let result = self
            .store
            .update_current_config_block(network_id, block_bytes_to_b64(&snapshot.block_bytes))
            .await;
        metrics::record_block_reload(result.is_ok());
        result?;
        info!(
            network_id,
            orderer = %snapshot.orderer.url,
            sequence = snapshot.sequence(),
            "Current config block reloaded"
        );
        Ok(ReloadedBlock {
            orderer: snapshot.orderer.url.clone(),
            sequence: snapshot.sequence(),
            message: "config block reloaded".to_string(),
        })
    }

    /// Poll until the channel config moves past `base_sequence`. Failures
    /// are logged and retried; they never fail the caller.
    async fn refresh_after(&self, network_id: NetworkId, base_sequence: u64) -> RefreshStatus {
        let deadline = Instant::now() + self.config.refresh_timeout();
        let poll = self.config.refresh_poll_interval();
        loop {
            // a slow orderer must not hold the refresh past its deadline
            let Ok(fetched) = tokio::time::timeout_at(deadline, self.fetch(network_id)).await
            else {
                break;
            };
            match fetched {
                Ok(snapshot) if snapshot.sequence() > base_sequence => {
                    match self.persist(network_id, &snapshot).await {
                        Ok(reloaded) => {
                            metrics::record_refresh("refreshed");
                            return RefreshStatus::Refreshed {
                                sequence: reloaded.sequence,
                            };
                        }
                        Err(e) => {
                            warn!(network_id, error = %e, "Failed to persist refreshed block")
                        }
                    }
                }
                Ok(snapshot) => debug!(
                    network_id,
                    sequence = snapshot.sequence(),
                    "Update not committed yet"
                ),
                Err(e) => warn!(network_id, error = %e, "Config refresh attempt failed"),
            }
            if Instant::now() + poll > deadline {
                break;
            }
            tokio::time::sleep(poll).await;
        }
        warn!(
            network_id,
            base_sequence, "Config block not refreshed before deadline; reload manually"
        );
        metrics::record_refresh("pending");
        RefreshStatus::Pending
    }

    /// `ReloadNetworkBlock`: fetch the live config block and cache it.
    pub async fn reload_network_block(
        &self,
        network_id: NetworkId,
    ) -> Result<ReloadedBlock, DeployerError> {
        let result: Result<ReloadedBlock, DeployerError> = async {
            let _guard = self.locks.acquire(network_id).await;
            let snapshot = self.fetch(network_id).await?;
            self.persist(network_id, &snapshot).await
        }
        .await;
        self.record("reload_network_block", network_id, json!({}), &result);
        result
    }

    /// `GetOrderersForNetwork`.
    pub async fn get_orderers(
        &self,
        network_id: NetworkId,
    ) -> Result<Vec<OrdererInfo>, DeployerError> {
        Ok(self
            .pipeline
            .resolver
            .get_orderers_for_network(network_id)
            .await?)
    }
}
