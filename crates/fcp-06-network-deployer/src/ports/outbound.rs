//! # Outbound Ports
//!
//! The node-management collaborator: each peer or orderer joins and leaves
//! channels through its own admin API.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{NodeId, RegisteredNode, TransportError};
use std::collections::HashSet;

#[async_trait]
pub trait NodeManager: Send + Sync {
    /// Join a peer to the channel whose genesis block is given.
    async fn join_peer(
        &self,
        node: &RegisteredNode,
        genesis_block: &[u8],
    ) -> Result<(), TransportError>;

    /// Join an orderer through its channel participation API.
    async fn join_orderer(
        &self,
        node: &RegisteredNode,
        genesis_block: &[u8],
    ) -> Result<(), TransportError>;

    async fn leave_peer(
        &self,
        node: &RegisteredNode,
        channel: &str,
    ) -> Result<(), TransportError>;

    async fn leave_orderer(
        &self,
        node: &RegisteredNode,
        channel: &str,
    ) -> Result<(), TransportError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

/// One recorded node-management call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeCall {
    JoinPeer(NodeId),
    JoinOrderer(NodeId),
    LeavePeer(NodeId, String),
    LeaveOrderer(NodeId, String),
}

/// Succeeds for every node except those marked failing.
#[derive(Default)]
pub struct MockNodeManager {
    failing: Mutex<HashSet<NodeId>>,
    calls: Mutex<Vec<NodeCall>>,
}

impl MockNodeManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_node(self, node_id: NodeId) -> Self {
        self.failing.lock().insert(node_id);
        self
    }

    pub fn calls(&self) -> Vec<NodeCall> {
        self.calls.lock().clone()
    }

    fn record(&self, node: &RegisteredNode, call: NodeCall) -> Result<(), TransportError> {
        self.calls.lock().push(call);
        if self.failing.lock().contains(&node.id) {
            return Err(TransportError::Connect {
                endpoint: node.name.clone(),
                message: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl NodeManager for MockNodeManager {
    async fn join_peer(
        &self,
        node: &RegisteredNode,
        _genesis_block: &[u8],
    ) -> Result<(), TransportError> {
        self.record(node, NodeCall::JoinPeer(node.id))
    }

    async fn join_orderer(
        &self,
        node: &RegisteredNode,
        _genesis_block: &[u8],
    ) -> Result<(), TransportError> {
        self.record(node, NodeCall::JoinOrderer(node.id))
    }

    async fn leave_peer(
        &self,
        node: &RegisteredNode,
        channel: &str,
    ) -> Result<(), TransportError> {
        self.record(node, NodeCall::LeavePeer(node.id, channel.to_string()))
    }

    async fn leave_orderer(
        &self,
        node: &RegisteredNode,
        channel: &str,
    ) -> Result<(), TransportError> {
        self.record(node, NodeCall::LeaveOrderer(node.id, channel.to_string()))
    }
}
