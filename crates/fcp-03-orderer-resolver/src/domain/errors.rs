//! Resolution failures are fatal for the call; nothing here retries.

use fcp_01_block_codec::CodecError;
use shared_types::{ClassifiedError, ErrorCategory, NetworkId, StoreError, TransportError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolverError {
    /// Neither the node registry nor the config block yields an orderer.
    #[error("no orderer found for network {network_id}")]
    NoOrdererFound { network_id: NetworkId },

    /// Every known orderer failed to serve the channel config.
    #[error("failed to get channel config for {channel} from {attempts} orderer(s): {last_error}")]
    FailedToGetChannelConfig {
        channel: String,
        attempts: usize,
        last_error: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl ClassifiedError for ResolverError {
    fn code(&self) -> &'static str {
        match self {
            Self::NoOrdererFound { .. } => "no_orderer_found",
            Self::FailedToGetChannelConfig { .. } => "failed_to_get_channel_config",
            Self::Store(e) => e.code(),
            Self::Codec(e) => e.code(),
            Self::Transport(e) => e.code(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::NoOrdererFound { .. } => ErrorCategory::NotFound,
            Self::FailedToGetChannelConfig { .. } => ErrorCategory::Unavailable,
            Self::Store(e) => e.category(),
            Self::Codec(e) => e.category(),
            Self::Transport(e) => e.category(),
        }
    }
}
