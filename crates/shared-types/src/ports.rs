//! # Collaborator Ports
//!
//! Interfaces to the systems the control plane orchestrates but does not
//! own: the relational record store, key management and the audit sink.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::entities::{
    FabricOrganization, KeyId, Network, NetworkId, NetworkNode, NetworkNodeStatus, NodeId,
    NodeRole, OrganizationId, RegisteredNode,
};
use crate::errors::{KeyStoreError, StoreError};

/// Record store offering get/list/update-by-id over the rows the
/// configuration pipeline needs.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn get_network(&self, id: NetworkId) -> Result<Network, StoreError>;

    /// Overwrite the cached current configuration block.
    ///
    /// Last writer wins; no concurrency guard is taken.
    async fn update_current_config_block(
        &self,
        id: NetworkId,
        block_b64: String,
    ) -> Result<(), StoreError>;

    async fn get_node(&self, id: NodeId) -> Result<RegisteredNode, StoreError>;

    async fn list_network_nodes(
        &self,
        network_id: NetworkId,
    ) -> Result<Vec<NetworkNode>, StoreError>;

    async fn get_network_node(
        &self,
        network_id: NetworkId,
        node_id: NodeId,
    ) -> Result<NetworkNode, StoreError>;

    /// Create a membership row. Fails if the pair already exists.
    async fn create_network_node(
        &self,
        network_id: NetworkId,
        node_id: NodeId,
        role: NodeRole,
    ) -> Result<NetworkNode, StoreError>;

    async fn update_network_node_status(
        &self,
        network_id: NetworkId,
        node_id: NodeId,
        status: NetworkNodeStatus,
    ) -> Result<(), StoreError>;

    async fn get_fabric_organization(
        &self,
        id: OrganizationId,
    ) -> Result<FabricOrganization, StoreError>;

    /// All organizations this instance has signing authority for.
    async fn list_fabric_organizations(&self) -> Result<Vec<FabricOrganization>, StoreError>;
}

/// Key-management capability returning PEM material by key ID.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Decrypt and return a PEM private key. Callers must not cache it.
    async fn private_key_pem(&self, key_id: KeyId) -> Result<Zeroizing<String>, KeyStoreError>;

    /// PEM certificate associated with the key.
    async fn certificate_pem(&self, key_id: KeyId) -> Result<String, KeyStoreError>;
}

/// Outcome recorded with an audit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    Success,
    Failure { message: String },
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub action: String,
    pub network_id: NetworkId,
    pub details: serde_json::Value,
    pub outcome: AuditOutcome,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        action: impl Into<String>,
        network_id: NetworkId,
        details: serde_json::Value,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            action: action.into(),
            network_id,
            details,
            outcome,
            occurred_at: Utc::now(),
        }
    }
}

/// Best-effort audit sink. Recording must never block or fail the caller.
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}
