//! Peer Deliver client backing ledger queries. The chain height is one past
//! the number of the newest block.

use async_trait::async_trait;
use fcp_01_block_codec::block_number;
use fcp_01_block_codec::proto::common::Block;
use fcp_01_block_codec::proto::orderer::{SeekInfo, SeekPosition};
use fcp_05_signature_submitter::seek_envelope;
use fcp_07_block_query::LedgerReader;
use shared_types::{PeerEndpoint, TransportError};
use std::sync::Arc;
use std::time::Duration;

use super::{connect, open_stream, read_block, PEER_DELIVER_PATH};
use crate::adapters::signer::AdminSigner;

pub struct GrpcLedgerReader {
    signer: Arc<AdminSigner>,
    connect_timeout: Duration,
}

impl GrpcLedgerReader {
    pub fn new(signer: Arc<AdminSigner>, connect_timeout: Duration) -> Self {
        Self {
            signer,
            connect_timeout,
        }
    }

    async fn deliver(
        &self,
        peer: &PeerEndpoint,
        channel_name: &str,
        position: SeekPosition,
    ) -> Result<Block, TransportError> {
        // Peers only serve Deliver to members of their own organization.
        let identity = self.signer.identity(&peer.url, Some(&peer.msp_id)).await?;
        let envelope = seek_envelope(channel_name, &SeekInfo::single(position), &identity);
        let channel = connect(&peer.url, &peer.tls_cert_pem, self.connect_timeout).await?;
        let stream = open_stream(channel, &peer.url, PEER_DELIVER_PATH, envelope).await?;
        read_block(stream, &peer.url).await
    }
}

#[async_trait]
impl LedgerReader for GrpcLedgerReader {
    async fn chain_height(
        &self,
        peer: &PeerEndpoint,
        channel: &str,
    ) -> Result<u64, TransportError> {
        let newest = self.deliver(peer, channel, SeekPosition::newest()).await?;
        let number = block_number(&newest).map_err(|e| TransportError::Protocol {
            endpoint: peer.url.clone(),
            message: e.to_string(),
        })?;
        Ok(number + 1)
    }

    async fn block_by_number(
        &self,
        peer: &PeerEndpoint,
        channel: &str,
        number: u64,
    ) -> Result<Block, TransportError> {
        self.deliver(peer, channel, SeekPosition::specified(number))
            .await
    }
}
