//! Domain layer: config transaction, diff, policies, MSP layout and the
//! operation catalog.

pub mod configtx;
pub mod errors;
pub mod msp;
pub mod operations;
pub mod policy;
pub mod preview;
pub mod update;

pub use configtx::{set_value, ConfigTx};
pub use errors::ConfigOpError;
pub use msp::MspMaterial;
pub use operations::*;
