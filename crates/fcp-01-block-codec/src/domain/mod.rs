//! Pure decoding logic over the protobuf model.

pub mod certs;
pub mod codec;
pub mod config_values;
pub mod errors;
pub mod orderers;
