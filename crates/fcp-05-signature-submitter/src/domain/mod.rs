pub mod config;
pub mod errors;
pub mod identity;
pub mod signing;

pub use config::SubmitterConfig;
pub use errors::{IdentityError, SubmitterError};
pub use identity::{SigningIdentity, NONCE_LEN};
pub use signing::{add_config_signature, create_config_signature, seek_envelope, sign_envelope};
