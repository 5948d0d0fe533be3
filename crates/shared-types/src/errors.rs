//! # Error Types
//!
//! Collaborator errors shared across components, and the transport-neutral
//! error payload an HTTP layer renders as `{error, code, message}`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{KeyId, NetworkId, NodeId, OrganizationId};

/// Errors raised by the record store collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Network {0} not found")]
    NetworkNotFound(NetworkId),

    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Node {node_id} is not part of network {network_id}")]
    NetworkNodeNotFound { network_id: NetworkId, node_id: NodeId },

    #[error("Node {node_id} already belongs to network {network_id}")]
    NetworkNodeExists { network_id: NetworkId, node_id: NodeId },

    #[error("Organization {0} not found")]
    OrganizationNotFound(OrganizationId),

    #[error("Database error: {0}")]
    Database(String),
}

/// Errors raised by the key-management collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyStoreError {
    #[error("Key {0} not found")]
    KeyNotFound(KeyId),

    #[error("Key {0} has no certificate")]
    CertificateMissing(KeyId),

    #[error("Failed to decrypt key {key_id}: {message}")]
    Decryption { key_id: KeyId, message: String },

    #[error("Key store unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while talking to a remote Fabric node (orderer or peer).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("failed to connect to {endpoint}: {message}")]
    Connect { endpoint: String, message: String },

    #[error("request to {endpoint} timed out after {timeout_ms}ms")]
    Timeout { endpoint: String, timeout_ms: u64 },

    /// The node answered with a non-success status.
    #[error("{endpoint} rejected request with status {status}: {info}")]
    Rejected {
        endpoint: String,
        status: String,
        info: String,
    },

    /// The node answered with something unexpected (closed stream, garbage).
    #[error("protocol error from {endpoint}: {message}")]
    Protocol { endpoint: String, message: String },
}

impl TransportError {
    pub fn timeout(endpoint: impl Into<String>, timeout: std::time::Duration) -> Self {
        Self::Timeout {
            endpoint: endpoint.into(),
            timeout_ms: timeout.as_millis() as u64,
        }
    }
}

/// Broad classification of a failure, used to pick a transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Malformed input (bad block bytes, invalid payload, unknown type).
    Validation,
    /// A referenced record does not exist.
    NotFound,
    /// State conflict (duplicate membership, stale config).
    Conflict,
    /// Remote node or ordering service failure.
    Unavailable,
    Internal,
}

impl ErrorCategory {
    /// HTTP status an API layer should answer with.
    pub fn http_status(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Unavailable => 502,
            Self::Internal => 500,
        }
    }
}

/// Serializable error body.
///
/// Only the message string of the underlying error crosses this boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorPayload {
    pub error: String,
    pub code: String,
    pub message: String,
}

/// Implemented by component errors so they can be rendered uniformly.
pub trait ClassifiedError: std::error::Error {
    /// Short machine-readable code (`no_orderer_found`, ...).
    fn code(&self) -> &'static str;

    fn category(&self) -> ErrorCategory;

    fn to_payload(&self) -> ApiErrorPayload {
        let category = self.category();
        ApiErrorPayload {
            error: match category.http_status() {
                400..=499 => "bad_request".to_string(),
                _ => "internal_error".to_string(),
            },
            code: self.code().to_string(),
            message: self.to_string(),
        }
    }
}

impl ClassifiedError for StoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::NetworkNotFound(_) => "network_not_found",
            Self::NodeNotFound(_) => "node_not_found",
            Self::NetworkNodeNotFound { .. } => "network_node_not_found",
            Self::NetworkNodeExists { .. } => "network_node_exists",
            Self::OrganizationNotFound(_) => "organization_not_found",
            Self::Database(_) => "database_error",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Database(_) => ErrorCategory::Internal,
            Self::NetworkNodeExists { .. } => ErrorCategory::Conflict,
            _ => ErrorCategory::NotFound,
        }
    }
}

impl ClassifiedError for KeyStoreError {
    fn code(&self) -> &'static str {
        match self {
            Self::KeyNotFound(_) => "key_not_found",
            Self::CertificateMissing(_) => "certificate_missing",
            Self::Decryption { .. } => "key_decryption_failed",
            Self::Unavailable(_) => "key_store_unavailable",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::KeyNotFound(_) | Self::CertificateMissing(_) => ErrorCategory::NotFound,
            Self::Decryption { .. } => ErrorCategory::Internal,
            Self::Unavailable(_) => ErrorCategory::Unavailable,
        }
    }
}

impl ClassifiedError for TransportError {
    fn code(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connection_failed",
            Self::Timeout { .. } => "request_timeout",
            Self::Rejected { .. } => "request_rejected",
            Self::Protocol { .. } => "protocol_error",
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Unavailable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_payload() {
        let payload = StoreError::NetworkNotFound(7).to_payload();
        assert_eq!(payload.code, "network_not_found");
        assert_eq!(payload.error, "bad_request");
        assert!(payload.message.contains('7'));
    }

    #[test]
    fn test_category_status_mapping() {
        assert_eq!(ErrorCategory::Validation.http_status(), 400);
        assert_eq!(ErrorCategory::NotFound.http_status(), 404);
        assert_eq!(ErrorCategory::Unavailable.http_status(), 502);
        assert_eq!(StoreError::Database("x".into()).to_payload().error, "internal_error");
    }

    #[test]
    fn test_transport_timeout_message() {
        let err = TransportError::timeout("orderer0:7050", std::time::Duration::from_secs(2));
        assert_eq!(err.code(), "request_timeout");
        assert!(err.to_string().contains("2000ms"));
        assert_eq!(err.category().http_status(), 502);
    }
}
