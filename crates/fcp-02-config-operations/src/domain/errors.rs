//! # Domain Errors
//!
//! Validation errors name the offending field. Everything here is a
//! malformed-input or resolution failure: fatal for the call, never retried.

use fcp_01_block_codec::CodecError;
use shared_types::{ClassifiedError, ErrorCategory};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigOpError {
    #[error("unsupported operation type: {0}")]
    UnsupportedOperationType(String),

    /// Payload JSON does not match the operation's schema.
    #[error("invalid payload for {op_type}: {message}")]
    InvalidPayload { op_type: String, message: String },

    /// A required field is missing, zero or empty.
    #[error("{field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("consenter not found: {host}:{port}")]
    ConsenterNotFound { host: String, port: u32 },

    #[error("consenter already exists: {host}:{port}")]
    ConsenterExists { host: String, port: u32 },

    #[error("organization {0} not found in channel configuration")]
    OrganizationNotFound(String),

    #[error("invalid policy expression {expression:?}: {reason}")]
    InvalidPolicy { expression: String, reason: String },

    #[error("no differences detected between original and updated config")]
    NoDifferences,

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ConfigOpError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn required(field: impl Into<String>) -> Self {
        Self::validation(field, "is required")
    }
}

impl ClassifiedError for ConfigOpError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedOperationType(_) => "unsupported_operation_type",
            Self::InvalidPayload { .. } => "invalid_operation_payload",
            Self::Validation { .. } => "validation_failed",
            Self::ConsenterNotFound { .. } => "consenter_not_found",
            Self::ConsenterExists { .. } => "consenter_exists",
            Self::OrganizationNotFound(_) => "organization_not_found",
            Self::InvalidPolicy { .. } => "invalid_policy",
            Self::NoDifferences => "no_differences",
            Self::Codec(e) => e.code(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::ConsenterNotFound { .. } | Self::OrganizationNotFound(_) => {
                ErrorCategory::NotFound
            }
            Self::ConsenterExists { .. } => ErrorCategory::Conflict,
            Self::Codec(e) => e.category(),
            _ => ErrorCategory::Validation,
        }
    }
}
