pub mod candidates;
pub mod config;
pub mod errors;
pub mod snapshot;

pub use candidates::{merge_candidates, registry_orderer};
pub use config::ResolverConfig;
pub use errors::ResolverError;
pub use snapshot::ChannelConfigSnapshot;
