use fcp_01_block_codec::CodecError;
use fcp_03_orderer_resolver::ResolverError;
use shared_types::{
    ClassifiedError, ErrorCategory, KeyStoreError, StoreError, TransportError,
};
use thiserror::Error;

/// Failures while assembling one organization's signing identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("organization {msp_id} has no admin sign key")]
    MissingAdminSignKey { msp_id: String },

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid signing certificate: {0}")]
    InvalidCertificate(#[source] CodecError),

    #[error(transparent)]
    Key(#[from] KeyStoreError),
}

#[derive(Debug, Error)]
pub enum SubmitterError {
    #[error("no managed organizations available to sign")]
    NoSigners,

    /// Signing for one organization failed; nothing was submitted.
    #[error("failed_to_sign_config_update_for_org_{msp_id}: {source}")]
    FailedToSignConfigUpdate {
        msp_id: String,
        #[source]
        source: IdentityError,
    },

    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// The orderer answered with a non-success broadcast status.
    #[error("broadcast rejected by {orderer} with status {status}: {info}")]
    Rejected {
        orderer: String,
        status: String,
        info: String,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Resolver(#[from] ResolverError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ClassifiedError for SubmitterError {
    fn code(&self) -> &'static str {
        match self {
            Self::NoSigners => "no_signers",
            Self::FailedToSignConfigUpdate { .. } => "failed_to_sign_config_update_for_org",
            Self::InvalidEnvelope(_) => "invalid_envelope",
            Self::Rejected { .. } => "broadcast_rejected",
            Self::Transport(e) => e.code(),
            Self::Resolver(e) => e.code(),
            Self::Store(e) => e.code(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::NoSigners => ErrorCategory::NotFound,
            Self::FailedToSignConfigUpdate { source, .. } => match source {
                IdentityError::MissingAdminSignKey { .. } => ErrorCategory::NotFound,
                IdentityError::Key(e) => e.category(),
                _ => ErrorCategory::Internal,
            },
            Self::InvalidEnvelope(_) => ErrorCategory::Validation,
            Self::Rejected { .. } => ErrorCategory::Unavailable,
            Self::Transport(e) => e.category(),
            Self::Resolver(e) => e.category(),
            Self::Store(e) => e.category(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_failure_names_org() {
        let err = SubmitterError::FailedToSignConfigUpdate {
            msp_id: "Org2MSP".into(),
            source: IdentityError::MissingAdminSignKey {
                msp_id: "Org2MSP".into(),
            },
        };
        assert!(err
            .to_string()
            .starts_with("failed_to_sign_config_update_for_org_Org2MSP"));
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }
}
