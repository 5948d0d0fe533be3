//! # Runtime Adapters
//!
//! Production implementations of the pipeline ports:
//!
//! - `state_file` - `RecordStore` over a JSON file
//! - `key_dir` - `KeyStore` over a directory of PEM files
//! - `grpc` - orderer Broadcast/Deliver and peer Deliver clients
//! - `signer` - admin identity selection for Deliver requests
//! - `nodes` - `NodeManager` that refuses join and leave

pub mod grpc;
pub mod key_dir;
pub mod nodes;
pub mod signer;
pub mod state_file;

pub use grpc::{GrpcBroadcaster, GrpcConfigBlockSource, GrpcLedgerReader};
pub use key_dir::PemDirKeyStore;
pub use nodes::UnmanagedNodes;
pub use signer::AdminSigner;
pub use state_file::JsonStateStore;
