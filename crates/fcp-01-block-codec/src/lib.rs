//! # Block Codec (fcp-01)
//!
//! Translates between the Fabric block / envelope wire format and structured
//! channel configuration. Genesis and current config blocks are stored as
//! base64 text; this crate is the only one that decodes that text and
//! unwraps the protobuf layers:
//!
//! ```text
//! base64 ──→ Block ──→ Envelope ──→ Payload ──→ ConfigEnvelope ──→ Config
//!              │
//!              └── metadata ──→ OrdererBlockMetadata.last_config
//! ```
//!
//! ## Crate Structure
//!
//! - `proto/` - prost message definitions (`common`, `msp`, `orderer`, `peer`)
//! - `domain/codec` - block unwrapping, base64, last-config index
//! - `domain/config_values` - well-known config keys and typed value accessors
//! - `domain/orderers` - consenter extraction (`GetOrderersFromConfigBlock`)
//! - `domain/certs` - PEM / X.509 normalisation
//! - `test_utils` - channel fixtures with real certificates (feature `test-utils`)
//!
//! All failures are malformed-input errors and are never retried.

pub mod domain;
pub mod proto;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use domain::certs::{certificate_bytes_to_pem, der_to_pem, parse_certificate_pem, parse_crl_pem};
pub use domain::codec::{
    block_bytes_from_b64, block_bytes_to_b64, block_number, channel_id_from_block,
    config_from_block_bytes, decode_block, decode_block_b64, encode_block, envelope_at,
    extract_config_envelope, extract_config_from_block, last_config_index, unmarshal_channel_header,
    unmarshal_payload, unmarshal_signature_header,
};
pub use domain::config_values;
pub use domain::errors::CodecError;
pub use domain::orderers::{get_orderers_from_config_block, orderers_from_config};

pub use prost::Message;
