//! # Configuration Operation Registry (fcp-02)
//!
//! A closed catalog of channel configuration changes, each validated and
//! applied independently to an in-memory [`ConfigTx`]:
//!
//! ```text
//! {type, payload} ──build_operation──→ Box<dyn ConfigOperation>
//!                                           │ validate()   pure
//!                                           ▼ modify(tx)   in-memory
//! ConfigTx{original, updated} ──compute_marshaled_update──→ ConfigUpdate bytes
//! ```
//!
//! Applying a list is sequential and not transactional across operations:
//! a failure part-way leaves earlier changes in the working copy, so callers
//! discard the whole transaction on error.
//!
//! ## Crate Structure
//!
//! - `domain/operations` - the ten catalog operations plus revocation list updates
//! - `domain/configtx` - original/updated config pair and typed setters
//! - `domain/update` - read-set / write-set diff
//! - `domain/policy` - `OR`/`AND`/`OutOf` signature policy compiler
//! - `domain/msp` - MSP material and default org group layout
//! - `domain/preview` - JSON summary of an update
//! - `registry` - `{type, payload}` dispatch

pub mod domain;
pub mod registry;

pub use domain::configtx::{set_value, ConfigTx};
pub use domain::errors::ConfigOpError;
pub use domain::msp::{application_org_group, build_fabric_msp, decode_fabric_msp, MspMaterial};
pub use domain::operations::{
    AddConsenter, AddOrg, AnchorPeerSpec, ConfigOperation, OperationType, RemoveConsenter,
    RemoveOrg, RevocationListUpdate, SetAnchorPeers, UpdateBatchSize, UpdateBatchTimeout,
    UpdateConsenter, UpdateEtcdRaftOptions, UpdateOrgMsp,
};
pub use domain::policy::{compile_signature_policy, signature_config_policy};
pub use domain::preview::{changed_paths, update_preview};
pub use domain::update::compute_update;
pub use registry::{apply, build_operation, ConfigUpdateOperation};
