//! # Core Domain Entities
//!
//! Record-store rows shared by every component of the control plane:
//! networks (channels), registered nodes, their per-network membership and
//! the Fabric organizations (MSPs) this instance manages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary key of a `Network` row.
pub type NetworkId = i64;

/// Primary key of a registered node row.
pub type NodeId = i64;

/// Primary key of a `FabricOrganization` row.
pub type OrganizationId = i64;

/// Identifier of key material owned by the key-management collaborator.
pub type KeyId = i64;

/// Blockchain platform a network runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Fabric,
    Besu,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fabric => write!(f, "fabric"),
            Self::Besu => write!(f, "besu"),
        }
    }
}

/// Lifecycle status of a network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkStatus {
    Creating,
    GenesisBlockCreated,
    Running,
    Stopped,
    Error,
    Imported,
}

/// A logical channel / blockchain instance.
///
/// `genesis_block_b64` is immutable once set. `current_config_block_b64` is a
/// point-in-time cache that is only refreshed by an explicit reload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: NetworkId,
    /// Channel name.
    pub name: String,
    pub platform: Platform,
    pub status: NetworkStatus,
    pub genesis_block_b64: Option<String>,
    pub current_config_block_b64: Option<String>,
    /// Free-form JSON configuration blob.
    #[serde(default)]
    pub config: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Network {
    /// The channel this network maps to.
    pub fn channel_name(&self) -> &str {
        &self.name
    }

    /// Cached configuration block, falling back to the genesis block.
    pub fn latest_known_config_block_b64(&self) -> Option<&str> {
        self.current_config_block_b64
            .as_deref()
            .or(self.genesis_block_b64.as_deref())
    }
}

/// Kind of physical node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Peer,
    Orderer,
    /// Any node type this system cannot join to a channel (e.g. Besu).
    Other,
}

impl NodeType {
    /// Channel role of this node type, if it can join a channel at all.
    pub fn role(self) -> Option<NodeRole> {
        match self {
            Self::Peer => Some(NodeRole::Peer),
            Self::Orderer => Some(NodeRole::Orderer),
            Self::Other => None,
        }
    }
}

/// Role a node plays inside one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Peer,
    Orderer,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Peer => write!(f, "peer"),
            Self::Orderer => write!(f, "orderer"),
        }
    }
}

/// Channel membership status of a node in one network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkNodeStatus {
    Pending,
    Joined,
    Unjoined,
    Removed,
}

impl fmt::Display for NetworkNodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Joined => "joined",
            Self::Unjoined => "unjoined",
            Self::Removed => "removed",
        };
        write!(f, "{}", s)
    }
}

/// Many-to-many join between a network and a registered node.
///
/// The `(network_id, node_id)` pair is unique. Rows are never deleted; the
/// status tracks channel membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub network_id: NetworkId,
    pub node_id: NodeId,
    pub role: NodeRole,
    pub status: NetworkNodeStatus,
}

impl NetworkNode {
    pub fn is_joined(&self) -> bool {
        self.status == NetworkNodeStatus::Joined
    }
}

/// Deployment data of a locally managed node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDeploymentConfig {
    /// Externally reachable `host:port`.
    pub external_endpoint: String,
    /// PEM-encoded TLS CA certificate used to reach the node.
    pub tls_ca_cert: String,
    pub msp_id: String,
}

/// A physical node registered with this control plane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredNode {
    pub id: NodeId,
    pub name: String,
    pub node_type: NodeType,
    pub organization_id: Option<OrganizationId>,
    /// `None` for nodes that are not deployed by this instance.
    pub deployment: Option<NodeDeploymentConfig>,
}

/// An MSP managed by this instance.
///
/// Key material is owned by the key-management collaborator and referenced
/// by ID only. Every signing operation requires `admin_sign_key_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricOrganization {
    pub id: OrganizationId,
    pub msp_id: String,
    pub sign_key_id: Option<KeyId>,
    pub tls_root_key_id: Option<KeyId>,
    pub admin_tls_key_id: Option<KeyId>,
    pub admin_sign_key_id: Option<KeyId>,
    pub client_sign_key_id: Option<KeyId>,
}

/// A reachable ordering node: `host:port` plus its TLS certificate.
///
/// Purely a resolution result, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrdererInfo {
    pub url: String,
    pub tls_cert_pem: String,
}

impl OrdererInfo {
    pub fn new(url: impl Into<String>, tls_cert_pem: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tls_cert_pem: tls_cert_pem.into(),
        }
    }

    /// Host part of `url` (used as TLS server name).
    pub fn host(&self) -> &str {
        match self.url.rsplit_once(':') {
            Some((host, _)) => host,
            None => &self.url,
        }
    }
}

/// A reachable peer chosen for ledger reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerEndpoint {
    pub node_id: NodeId,
    pub url: String,
    pub tls_cert_pem: String,
    pub msp_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network() -> Network {
        Network {
            id: 1,
            name: "mychannel".to_string(),
            platform: Platform::Fabric,
            status: NetworkStatus::Running,
            genesis_block_b64: Some("genesis".to_string()),
            current_config_block_b64: None,
            config: serde_json::Value::Null,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn test_latest_config_falls_back_to_genesis() {
        let mut net = network();
        assert_eq!(net.latest_known_config_block_b64(), Some("genesis"));

        net.current_config_block_b64 = Some("current".to_string());
        assert_eq!(net.latest_known_config_block_b64(), Some("current"));
    }

    #[test]
    fn test_orderer_host() {
        let info = OrdererInfo::new("orderer0.example.com:7050", "");
        assert_eq!(info.host(), "orderer0.example.com");
        assert_eq!(OrdererInfo::new("localhost", "").host(), "localhost");
    }

    #[test]
    fn test_status_serde_names() {
        let json = serde_json::to_string(&NetworkStatus::GenesisBlockCreated).unwrap();
        assert_eq!(json, "\"genesis_block_created\"");
        assert_eq!(NetworkNodeStatus::Unjoined.to_string(), "unjoined");
    }
}
