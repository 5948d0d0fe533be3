//! # Domain Errors
//!
//! Malformed-input failures raised while decoding blocks and configuration.
//! None of these are retryable.

use shared_types::{ClassifiedError, ErrorCategory};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    /// Block is structurally unusable (no data, no envelope, ...).
    #[error("invalid block: {0}")]
    InvalidBlock(String),

    /// A protobuf layer failed to decode.
    #[error("failed to decode {message}: {source}")]
    Decode {
        message: &'static str,
        #[source]
        source: prost::DecodeError,
    },

    #[error("invalid base64 block encoding: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The block is not a configuration block.
    #[error("block {number} is not a config block (header type {header_type})")]
    NotConfigBlock { number: u64, header_type: i32 },

    #[error("config group {0} not found")]
    MissingGroup(String),

    #[error("config value {0} not found")]
    MissingValue(String),

    #[error("no consenters found in channel configuration")]
    NoConsenters,

    #[error("consensus type {0} does not carry etcdraft metadata")]
    UnsupportedConsensus(String),

    #[error("invalid certificate: {0}")]
    InvalidCertificate(String),
}

impl CodecError {
    pub(crate) fn decode(message: &'static str, source: prost::DecodeError) -> Self {
        Self::Decode { message, source }
    }
}

impl ClassifiedError for CodecError {
    fn code(&self) -> &'static str {
        match self {
            Self::InvalidBlock(_) | Self::Decode { .. } | Self::Base64(_) => "invalid_block",
            Self::NotConfigBlock { .. } => "not_config_block",
            Self::MissingGroup(_) => "config_group_not_found",
            Self::MissingValue(_) => "config_value_not_found",
            Self::NoConsenters => "no_consenters",
            Self::UnsupportedConsensus(_) => "unsupported_consensus_type",
            Self::InvalidCertificate(_) => "invalid_certificate",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingGroup(_) | Self::MissingValue(_) | Self::NoConsenters => {
                ErrorCategory::NotFound
            }
            _ => ErrorCategory::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_block_code() {
        let err = CodecError::InvalidBlock("no data".into());
        assert_eq!(err.code(), "invalid_block");
        assert!(err.to_string().contains("no data"));
    }

    #[test]
    fn test_no_consenters_is_not_found() {
        assert_eq!(CodecError::NoConsenters.category(), ErrorCategory::NotFound);
    }
}
