use fcp_02_config_operations::ConfigOpError;
use fcp_03_orderer_resolver::ResolverError;
use fcp_04_config_proposer::ProposerError;
use fcp_05_signature_submitter::SubmitterError;
use shared_types::{
    ClassifiedError, ErrorCategory, NetworkId, NodeId, NodeType, OrganizationId, Platform,
    StoreError, TransportError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployerError {
    /// Only peers and orderers can join or leave a channel.
    #[error("node {node_id} has unsupported type {node_type:?}")]
    UnsupportedNodeType { node_id: NodeId, node_type: NodeType },

    #[error("no peer found for organization {organization_id}")]
    NoPeerFound { organization_id: OrganizationId },

    #[error("network {network_id} runs on {platform}, which does not support this operation")]
    UnsupportedPlatform {
        network_id: NetworkId,
        platform: Platform,
    },

    #[error(transparent)]
    Operation(#[from] ConfigOpError),

    /// The node-management call (join / leave) failed.
    #[error("node operation failed: {0}")]
    Node(#[source] TransportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Resolver(#[from] ResolverError),

    #[error(transparent)]
    Proposer(#[from] ProposerError),

    #[error(transparent)]
    Submitter(#[from] SubmitterError),
}

impl ClassifiedError for DeployerError {
    fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedNodeType { .. } => "unsupported_node_type",
            Self::NoPeerFound { .. } => "no_peer_found",
            Self::UnsupportedPlatform { .. } => "unsupported_platform",
            Self::Operation(e) => e.code(),
            Self::Node(e) => e.code(),
            Self::Store(e) => e.code(),
            Self::Resolver(e) => e.code(),
            Self::Proposer(e) => e.code(),
            Self::Submitter(e) => e.code(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::UnsupportedNodeType { .. } | Self::UnsupportedPlatform { .. } => {
                ErrorCategory::Validation
            }
            Self::NoPeerFound { .. } => ErrorCategory::NotFound,
            Self::Operation(e) => e.category(),
            Self::Node(e) => e.category(),
            Self::Store(e) => e.category(),
            Self::Resolver(e) => e.category(),
            Self::Proposer(e) => e.category(),
            Self::Submitter(e) => e.category(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_pass_through() {
        let err = DeployerError::from(ResolverError::NoOrdererFound { network_id: 4 });
        assert_eq!(err.code(), "no_orderer_found");
        assert_eq!(err.to_payload().code, "no_orderer_found");

        let err = DeployerError::NoPeerFound { organization_id: 2 };
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }
}
