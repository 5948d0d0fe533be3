//! # Orderer Resolver (fcp-03)
//!
//! Finds `(address, TLS certificate)` for at least one live orderer of a
//! network, and fetches the current channel config from the ordering
//! service.
//!
//! ```text
//! get_orderers_for_network
//!   ├── registry: joined NetworkNode(role=orderer) + deployment endpoint
//!   └── fallback: cached current/genesis block ──→ etcdraft consenters
//!                        neither ──→ no_orderer_found
//! ```
//!
//! ## Crate Structure
//!
//! - `domain/` - candidate selection, config, errors, fetched snapshot
//! - `ports/` - `ConfigBlockSource` (ordering service Deliver) and its mock
//! - `service` - `OrdererResolver`

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{ChannelConfigSnapshot, ResolverConfig, ResolverError};
pub use ports::{ConfigBlockSource, MockConfigBlockSource};
pub use service::OrdererResolver;
