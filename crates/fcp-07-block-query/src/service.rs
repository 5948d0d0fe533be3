//! # Block Query Service
//!
//! Read-only pagination over the ledger of one joined peer. Every ledger
//! read runs under `QueryConfig::request_timeout`.

use crate::domain::{
    block_transactions, block_window, chain_info, find_transaction, summarize_block,
    transaction_at, BlockSummary, BlockWindow, ChainInfo, QueryConfig, QueryError,
    TransactionSummary,
};
use crate::ports::LedgerReader;
use fcp_01_block_codec::proto::common::Block;
use serde::{Deserialize, Serialize};
use shared_types::{Network, NetworkId, NodeRole, PeerEndpoint, RecordStore, TransportError};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

/// One page of `get_blocks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPage {
    pub height: u64,
    /// `None` when the page is empty.
    pub window: Option<BlockWindow>,
    pub blocks: Vec<BlockSummary>,
}

/// A transaction together with the block that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionLocation {
    pub block_number: u64,
    pub index: usize,
    pub transaction: TransactionSummary,
}

pub struct BlockQueryService {
    store: Arc<dyn RecordStore>,
    ledger: Arc<dyn LedgerReader>,
    config: QueryConfig,
}

impl BlockQueryService {
    pub fn new(
        store: Arc<dyn RecordStore>,
        ledger: Arc<dyn LedgerReader>,
        config: QueryConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            config,
        }
    }

    /// First joined peer of the network that this instance can reach.
    async fn select_peer(
        &self,
        network_id: NetworkId,
    ) -> Result<(Network, PeerEndpoint), QueryError> {
        let network = self.store.get_network(network_id).await?;
        let rows = self.store.list_network_nodes(network_id).await?;
        for row in rows.iter().filter(|r| r.role == NodeRole::Peer && r.is_joined()) {
            let node = self.store.get_node(row.node_id).await?;
            if let Some(deployment) = node.deployment {
                debug!(network_id, peer = %node.name, "Selected peer for ledger reads");
                let peer = PeerEndpoint {
                    node_id: node.id,
                    url: deployment.external_endpoint,
                    tls_cert_pem: deployment.tls_ca_cert,
                    msp_id: deployment.msp_id,
                };
                return Ok((network, peer));
            }
        }
        Err(QueryError::NoPeerFound { network_id })
    }

    async fn timed<T>(
        &self,
        peer: &PeerEndpoint,
        read: impl Future<Output = Result<T, TransportError>>,
    ) -> Result<T, QueryError> {
        let timeout = self.config.request_timeout();
        match tokio::time::timeout(timeout, read).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(TransportError::timeout(peer.url.as_str(), timeout).into()),
        }
    }

    async fn height(&self, network: &Network, peer: &PeerEndpoint) -> Result<u64, QueryError> {
        self.timed(peer, self.ledger.chain_height(peer, network.channel_name()))
            .await
    }

    async fn block(
        &self,
        network: &Network,
        peer: &PeerEndpoint,
        number: u64,
    ) -> Result<Block, QueryError> {
        self.timed(
            peer,
            self.ledger
                .block_by_number(peer, network.channel_name(), number),
        )
        .await
    }

    async fn block_in_range(
        &self,
        network: &Network,
        peer: &PeerEndpoint,
        number: u64,
    ) -> Result<Block, QueryError> {
        let height = self.height(network, peer).await?;
        if number >= height {
            return Err(QueryError::BlockNotFound { number, height });
        }
        self.block(network, peer, number).await
    }

    /// `GetBlocks`: a page of `limit` blocks after skipping `offset`, oldest
    /// first or, when `reverse`, newest first. `limit` is capped at
    /// `max_page_size`.
    pub async fn get_blocks(
        &self,
        network_id: NetworkId,
        limit: u64,
        offset: u64,
        reverse: bool,
    ) -> Result<BlockPage, QueryError> {
        let (network, peer) = self.select_peer(network_id).await?;
        let height = self.height(&network, &peer).await?;
        let limit = limit.min(self.config.max_page_size);
        let window = block_window(height, limit, offset, reverse);

        let mut blocks = Vec::new();
        if let Some(window) = window {
            for number in window.numbers() {
                let block = self.block(&network, &peer, number).await?;
                blocks.push(summarize_block(&block)?);
            }
        }
        info!(network_id, height, returned = blocks.len(), reverse, "Listed blocks");
        Ok(BlockPage {
            height,
            window,
            blocks,
        })
    }

    pub async fn get_block(
        &self,
        network_id: NetworkId,
        number: u64,
    ) -> Result<BlockSummary, QueryError> {
        let (network, peer) = self.select_peer(network_id).await?;
        let block = self.block_in_range(&network, &peer, number).await?;
        Ok(summarize_block(&block)?)
    }

    /// `GetBlockTransactions`: every transaction of block `number`, in block
    /// order.
    pub async fn get_block_transactions(
        &self,
        network_id: NetworkId,
        number: u64,
    ) -> Result<Vec<TransactionSummary>, QueryError> {
        let (network, peer) = self.select_peer(network_id).await?;
        let block = self.block_in_range(&network, &peer, number).await?;
        Ok(block_transactions(&block)?)
    }

    /// `GetTransaction`: scan the chain from the newest block down to
    /// genesis for `tx_id`.
    pub async fn get_transaction(
        &self,
        network_id: NetworkId,
        tx_id: &str,
    ) -> Result<TransactionLocation, QueryError> {
        let (network, peer) = self.select_peer(network_id).await?;
        let height = self.height(&network, &peer).await?;
        for number in (0..height).rev() {
            let block = self.block(&network, &peer, number).await?;
            if let Some(index) = find_transaction(&block, tx_id)? {
                debug!(network_id, tx_id, block = number, "Found transaction");
                return Ok(TransactionLocation {
                    block_number: number,
                    index,
                    transaction: transaction_at(&block, index)?,
                });
            }
        }
        Err(QueryError::TransactionNotFound {
            tx_id: tx_id.to_string(),
        })
    }

    /// `GetChainInfo`: height plus the hashes of the newest block.
    pub async fn get_chain_info(&self, network_id: NetworkId) -> Result<ChainInfo, QueryError> {
        let (network, peer) = self.select_peer(network_id).await?;
        let height = self.height(&network, &peer).await?;
        if height == 0 {
            return Err(QueryError::EmptyLedger);
        }
        let newest = self.block(&network, &peer, height - 1).await?;
        Ok(chain_info(height, &newest)?)
    }
}
