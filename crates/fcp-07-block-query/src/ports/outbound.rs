//! # Outbound Ports
//!
//! Ledger reads against a joined peer.

use async_trait::async_trait;
use fcp_01_block_codec::proto::common::Block;
use parking_lot::RwLock;
use shared_types::{PeerEndpoint, TransportError};
use std::time::Duration;

#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Number of blocks the peer has committed on `channel`.
    async fn chain_height(
        &self,
        peer: &PeerEndpoint,
        channel: &str,
    ) -> Result<u64, TransportError>;

    async fn block_by_number(
        &self,
        peer: &PeerEndpoint,
        channel: &str,
        number: u64,
    ) -> Result<Block, TransportError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

/// Serves a fixed chain; block `n` is `blocks[n]`.
#[derive(Default)]
pub struct MockLedgerReader {
    blocks: RwLock<Vec<Block>>,
    delay: Option<Duration>,
    reads: RwLock<Vec<u64>>,
}

impl MockLedgerReader {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks: RwLock::new(blocks),
            ..Self::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_block(&self, block: Block) {
        self.blocks.write().push(block);
    }

    /// Block numbers fetched so far, in request order.
    pub fn reads(&self) -> Vec<u64> {
        self.reads.read().clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl LedgerReader for MockLedgerReader {
    async fn chain_height(
        &self,
        _peer: &PeerEndpoint,
        _channel: &str,
    ) -> Result<u64, TransportError> {
        self.pause().await;
        Ok(self.blocks.read().len() as u64)
    }

    async fn block_by_number(
        &self,
        peer: &PeerEndpoint,
        _channel: &str,
        number: u64,
    ) -> Result<Block, TransportError> {
        self.pause().await;
        self.reads.write().push(number);
        self.blocks
            .read()
            .get(number as usize)
            .cloned()
            .ok_or_else(|| TransportError::Rejected {
                endpoint: peer.url.clone(),
                status: "NOT_FOUND".to_string(),
                info: format!("block {number} not found"),
            })
    }
}
