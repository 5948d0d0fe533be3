use fcp_01_block_codec::proto::common::Config;
use shared_types::OrdererInfo;

/// A config block fetched live from the ordering service.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelConfigSnapshot {
    pub channel: String,
    /// Orderer that answered.
    pub orderer: OrdererInfo,
    pub block_bytes: Vec<u8>,
    pub config: Config,
    /// Orderers tried and skipped before this one answered.
    pub failed_attempts: usize,
}

impl ChannelConfigSnapshot {
    pub fn sequence(&self) -> u64 {
        self.config.sequence
    }
}
