use fcp_01_block_codec::CodecError;
use shared_types::{ClassifiedError, ErrorCategory, NetworkId, StoreError, TransportError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("no joined peer found for network {network_id}")]
    NoPeerFound { network_id: NetworkId },

    #[error("block {number} not found (height {height})")]
    BlockNotFound { number: u64, height: u64 },

    #[error("transaction {tx_id} not found")]
    TransactionNotFound { tx_id: String },

    #[error("ledger is empty")]
    EmptyLedger,

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ClassifiedError for QueryError {
    fn code(&self) -> &'static str {
        match self {
            Self::NoPeerFound { .. } => "no_peer_found",
            Self::BlockNotFound { .. } => "block_not_found",
            Self::TransactionNotFound { .. } => "transaction_not_found",
            Self::EmptyLedger => "empty_ledger",
            Self::Codec(e) => e.code(),
            Self::Transport(e) => e.code(),
            Self::Store(e) => e.code(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::NoPeerFound { .. }
            | Self::BlockNotFound { .. }
            | Self::TransactionNotFound { .. }
            | Self::EmptyLedger => ErrorCategory::NotFound,
            Self::Codec(e) => e.category(),
            Self::Transport(e) => e.category(),
            Self::Store(e) => e.category(),
        }
    }
}
