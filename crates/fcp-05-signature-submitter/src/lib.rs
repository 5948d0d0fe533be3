//! # Signature Collector & Submitter (fcp-05)
//!
//! Turns an unsigned CONFIG_UPDATE envelope into a submitted transaction:
//! every organization this instance manages signs the update, the outer
//! envelope is signed by the first of them, and the result goes to the
//! ordering service's `Broadcast` RPC.
//!
//! ## Security
//!
//! - Admin private keys are read from the [`shared_types::KeyStore`] per
//!   call and dropped (zeroized) as soon as the identity goes out of scope.
//! - No partial-signature submission: the first signing failure aborts.
//!
//! ## Crate Structure
//!
//! - `domain/identity` - `SigningIdentity` (P-256, low-S DER)
//! - `domain/signing` - config signatures, envelope signing, Deliver seek
//!   envelopes
//! - `ports/` - `OrdererBroadcaster` and its mock
//! - `service` - `ConfigUpdateSubmitter`

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    add_config_signature, create_config_signature, seek_envelope, sign_envelope, IdentityError,
    SigningIdentity, SubmitterConfig, SubmitterError, NONCE_LEN,
};
pub use ports::{BroadcastStatus, MockOrdererBroadcaster, OrdererBroadcaster};
pub use service::{load_admin_identity, ConfigUpdateSubmitter, SignedConfigUpdate, SubmissionResult};
