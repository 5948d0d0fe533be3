use fcp_02_config_operations::ConfigOpError;
use fcp_03_orderer_resolver::ResolverError;
use shared_types::{ClassifiedError, ErrorCategory};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProposerError {
    #[error("at least one operation is required")]
    NoOperations,

    #[error("too many operations: {count} (max {max})")]
    TooManyOperations { count: usize, max: usize },

    /// Operation `index` (zero-based) could not be built, validated or applied.
    #[error("failed_to_apply_operation_{index}: {source}")]
    FailedToApplyOperation {
        index: usize,
        op_type: String,
        #[source]
        source: ConfigOpError,
    },

    /// Diffing the before/after configs failed (including "no differences").
    #[error("failed to compute config update: {0}")]
    ComputeUpdate(#[source] ConfigOpError),

    #[error("invalid config update envelope: {0}")]
    InvalidEnvelope(String),

    #[error(transparent)]
    Resolver(#[from] ResolverError),
}

impl ClassifiedError for ProposerError {
    fn code(&self) -> &'static str {
        match self {
            Self::NoOperations | Self::TooManyOperations { .. } => "invalid_operations",
            Self::FailedToApplyOperation { source, .. } => source.code(),
            Self::ComputeUpdate(e) => e.code(),
            Self::InvalidEnvelope(_) => "invalid_envelope",
            Self::Resolver(e) => e.code(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::FailedToApplyOperation { source, .. } => source.category(),
            Self::ComputeUpdate(e) => e.category(),
            Self::Resolver(e) => e.category(),
            _ => ErrorCategory::Validation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_failure_names_index() {
        let err = ProposerError::FailedToApplyOperation {
            index: 2,
            op_type: "remove_consenter".into(),
            source: ConfigOpError::ConsenterNotFound {
                host: "orderer2.example.com".into(),
                port: 7050,
            },
        };
        assert!(err.to_string().starts_with("failed_to_apply_operation_2"));
        assert!(err.to_string().contains("consenter not found"));
        assert_eq!(err.code(), "consenter_not_found");
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[test]
    fn test_unknown_operation_type_keeps_its_code() {
        let err = ProposerError::FailedToApplyOperation {
            index: 0,
            op_type: "rename_channel".into(),
            source: ConfigOpError::UnsupportedOperationType("rename_channel".into()),
        };
        assert!(err.to_string().starts_with("failed_to_apply_operation_0"));
        assert_eq!(err.code(), "unsupported_operation_type");
        assert_eq!(err.to_payload().code, "unsupported_operation_type");
    }

    #[test]
    fn test_no_differences_keeps_code() {
        let err = ProposerError::ComputeUpdate(ConfigOpError::NoDifferences);
        assert_eq!(err.code(), "no_differences");
    }
}
