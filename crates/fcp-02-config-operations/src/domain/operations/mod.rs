//! # Configuration Operations
//!
//! Each operation is a one-shot transform with a two-phase contract:
//!
//! 1. [`ConfigOperation::validate`] - pure, no I/O, never mutates. Fails with
//!    an error naming the missing or invalid field.
//! 2. [`ConfigOperation::modify`] - applies the change to a [`ConfigTx`]. May
//!    fail on deeper parsing (X.509, CRLs) and on lookups (org, consenter).
//!    A failing `modify` leaves the transaction untouched.
//!
//! Payload structs default every field so that a missing field reaches
//! `validate` and is reported by name instead of as a JSON schema error.

pub mod consenter;
pub mod orderer;
pub mod org;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::configtx::ConfigTx;
use super::errors::ConfigOpError;

pub use consenter::{AddConsenter, RemoveConsenter, UpdateConsenter};
pub use orderer::{UpdateBatchSize, UpdateBatchTimeout, UpdateEtcdRaftOptions};
pub use org::{
    AddOrg, AnchorPeerSpec, RemoveOrg, RevocationListUpdate, SetAnchorPeers, UpdateOrgMsp,
};

/// A typed, validated modification to a channel configuration.
pub trait ConfigOperation: fmt::Debug + Send + Sync {
    /// Wire name of the operation (`add_org`, ...).
    fn name(&self) -> &'static str;

    fn validate(&self) -> Result<(), ConfigOpError>;

    fn modify(&self, tx: &mut ConfigTx) -> Result<(), ConfigOpError>;
}

/// The closed catalog of client-selectable operation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    AddOrg,
    RemoveOrg,
    UpdateOrgMsp,
    SetAnchorPeers,
    AddConsenter,
    RemoveConsenter,
    UpdateConsenter,
    UpdateEtcdRaftOptions,
    UpdateBatchSize,
    UpdateBatchTimeout,
}

impl OperationType {
    pub const ALL: [OperationType; 10] = [
        Self::AddOrg,
        Self::RemoveOrg,
        Self::UpdateOrgMsp,
        Self::SetAnchorPeers,
        Self::AddConsenter,
        Self::RemoveConsenter,
        Self::UpdateConsenter,
        Self::UpdateEtcdRaftOptions,
        Self::UpdateBatchSize,
        Self::UpdateBatchTimeout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddOrg => "add_org",
            Self::RemoveOrg => "remove_org",
            Self::UpdateOrgMsp => "update_org_msp",
            Self::SetAnchorPeers => "set_anchor_peers",
            Self::AddConsenter => "add_consenter",
            Self::RemoveConsenter => "remove_consenter",
            Self::UpdateConsenter => "update_consenter",
            Self::UpdateEtcdRaftOptions => "update_etcd_raft_options",
            Self::UpdateBatchSize => "update_batch_size",
            Self::UpdateBatchTimeout => "update_batch_timeout",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = ConfigOpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ConfigOpError::UnsupportedOperationType(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

pub(crate) fn require_text(field: &str, value: &str) -> Result<(), ConfigOpError> {
    if value.trim().is_empty() {
        return Err(ConfigOpError::required(field));
    }
    Ok(())
}

pub(crate) fn require_certs(field: &str, certs: &[String]) -> Result<(), ConfigOpError> {
    if certs.is_empty() {
        return Err(ConfigOpError::validation(field, "must contain at least one certificate"));
    }
    for (i, cert) in certs.iter().enumerate() {
        require_text(&format!("{field}[{i}]"), cert)?;
    }
    Ok(())
}

pub(crate) fn require_positive(field: &str, value: u32) -> Result<(), ConfigOpError> {
    if value == 0 {
        return Err(ConfigOpError::validation(field, "must be greater than zero"));
    }
    Ok(())
}

pub(crate) fn require_port(field: &str, port: u32) -> Result<(), ConfigOpError> {
    if port == 0 || port > u32::from(u16::MAX) {
        return Err(ConfigOpError::validation(field, "must be between 1 and 65535"));
    }
    Ok(())
}

/// Parse a positive duration such as `2s` or `500ms`.
pub(crate) fn require_duration(field: &str, value: &str) -> Result<Duration, ConfigOpError> {
    require_text(field, value)?;
    let duration = humantime::parse_duration(value.trim())
        .map_err(|e| ConfigOpError::validation(field, format!("invalid duration {value:?}: {e}")))?;
    if duration.is_zero() {
        return Err(ConfigOpError::validation(field, "must be greater than zero"));
    }
    Ok(duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_type_round_trip() {
        for t in OperationType::ALL {
            assert_eq!(t.as_str().parse::<OperationType>().unwrap(), t);
            assert_eq!(serde_json::to_value(t).unwrap(), t.as_str());
        }
        assert!(matches!(
            "add_channel".parse::<OperationType>(),
            Err(ConfigOpError::UnsupportedOperationType(_))
        ));
    }

    #[test]
    fn test_duration_parsing() {
        assert_eq!(require_duration("timeout", "2s").unwrap(), Duration::from_secs(2));
        assert_eq!(
            require_duration("timeout", "500ms").unwrap(),
            Duration::from_millis(500)
        );
        assert!(require_duration("timeout", "abc").is_err());
        assert!(require_duration("timeout", "-1s").is_err());
        assert!(require_duration("timeout", "0s").is_err());
        assert!(require_duration("timeout", "").is_err());
    }

    #[test]
    fn test_port_bounds() {
        assert!(require_port("port", 7050).is_ok());
        assert!(require_port("port", 0).is_err());
        assert!(require_port("port", 70000).is_err());
    }
}
