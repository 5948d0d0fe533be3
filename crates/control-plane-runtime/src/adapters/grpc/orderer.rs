//! Ordering service clients: Broadcast for config updates, Deliver for the
//! current config block.

use async_trait::async_trait;
use fcp_01_block_codec::proto::common::{Block, Envelope};
use fcp_01_block_codec::proto::orderer::{BroadcastResponse, SeekInfo, SeekPosition};
use fcp_01_block_codec::{block_number, encode_block, last_config_index};
use fcp_03_orderer_resolver::ConfigBlockSource;
use fcp_05_signature_submitter::{seek_envelope, BroadcastStatus, OrdererBroadcaster};
use shared_types::{OrdererInfo, TransportError};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::{connect, open_stream, read_block, status_error, BROADCAST_PATH, ORDERER_DELIVER_PATH};
use crate::adapters::signer::AdminSigner;

fn codec_error(orderer: &OrdererInfo, e: impl std::fmt::Display) -> TransportError {
    TransportError::Protocol {
        endpoint: orderer.url.clone(),
        message: e.to_string(),
    }
}

pub struct GrpcBroadcaster {
    connect_timeout: Duration,
}

impl GrpcBroadcaster {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

#[async_trait]
impl OrdererBroadcaster for GrpcBroadcaster {
    async fn broadcast(
        &self,
        orderer: &OrdererInfo,
        envelope: Envelope,
    ) -> Result<BroadcastStatus, TransportError> {
        let channel = connect(&orderer.url, &orderer.tls_cert_pem, self.connect_timeout).await?;
        let mut stream =
            open_stream::<BroadcastResponse>(channel, &orderer.url, BROADCAST_PATH, envelope)
                .await?;
        let response = stream
            .message()
            .await
            .map_err(|status| status_error(&orderer.url, status))?
            .ok_or_else(|| TransportError::Protocol {
                endpoint: orderer.url.clone(),
                message: "broadcast stream closed without a response".to_string(),
            })?;
        debug!(orderer = %orderer.url, status = response.status, "Broadcast answered");
        Ok(BroadcastStatus {
            status: response.status,
            info: response.info,
        })
    }
}

/// Fetches the newest block, then the config block its metadata points at.
pub struct GrpcConfigBlockSource {
    signer: Arc<AdminSigner>,
    connect_timeout: Duration,
}

impl GrpcConfigBlockSource {
    pub fn new(signer: Arc<AdminSigner>, connect_timeout: Duration) -> Self {
        Self {
            signer,
            connect_timeout,
        }
    }

    async fn deliver(
        &self,
        orderer: &OrdererInfo,
        channel_name: &str,
        position: SeekPosition,
    ) -> Result<Block, TransportError> {
        let identity = self.signer.identity(&orderer.url, None).await?;
        let envelope = seek_envelope(channel_name, &SeekInfo::single(position), &identity);
        let channel = connect(&orderer.url, &orderer.tls_cert_pem, self.connect_timeout).await?;
        let stream = open_stream(channel, &orderer.url, ORDERER_DELIVER_PATH, envelope).await?;
        read_block(stream, &orderer.url).await
    }
}

#[async_trait]
impl ConfigBlockSource for GrpcConfigBlockSource {
    async fn fetch_config_block(
        &self,
        orderer: &OrdererInfo,
        channel: &str,
    ) -> Result<Vec<u8>, TransportError> {
        let newest = self.deliver(orderer, channel, SeekPosition::newest()).await?;
        let newest_number = block_number(&newest).map_err(|e| codec_error(orderer, e))?;
        let config_index = last_config_index(&newest).map_err(|e| codec_error(orderer, e))?;
        debug!(
            orderer = %orderer.url,
            channel,
            newest = newest_number,
            config_index,
            "Resolved last config block"
        );
        if config_index == newest_number {
            return Ok(encode_block(&newest));
        }
        let config_block = self
            .deliver(orderer, channel, SeekPosition::specified(config_index))
            .await?;
        Ok(encode_block(&config_block))
    }
}
