//! Node management is owned by the node-provisioning service, which this
//! binary does not embed. Join and leave calls fail with a connect error
//! naming the node.

use async_trait::async_trait;
use fcp_06_network_deployer::NodeManager;
use shared_types::{RegisteredNode, TransportError};

#[derive(Debug, Default)]
pub struct UnmanagedNodes;

fn unavailable(node: &RegisteredNode) -> TransportError {
    TransportError::Connect {
        endpoint: node.name.clone(),
        message: "node management is not available in this runtime".to_string(),
    }
}

#[async_trait]
impl NodeManager for UnmanagedNodes {
    async fn join_peer(
        &self,
        node: &RegisteredNode,
        _genesis_block: &[u8],
    ) -> Result<(), TransportError> {
        Err(unavailable(node))
    }

    async fn join_orderer(
        &self,
        node: &RegisteredNode,
        _genesis_block: &[u8],
    ) -> Result<(), TransportError> {
        Err(unavailable(node))
    }

    async fn leave_peer(
        &self,
        node: &RegisteredNode,
        _channel: &str,
    ) -> Result<(), TransportError> {
        Err(unavailable(node))
    }

    async fn leave_orderer(
        &self,
        node: &RegisteredNode,
        _channel: &str,
    ) -> Result<(), TransportError> {
        Err(unavailable(node))
    }
}
