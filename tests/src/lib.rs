//! # Fabric Control Plane Test Suite
//!
//! Cross-crate scenarios run against the full service container, wired over
//! in-memory stores and scripted orderer/peer ports.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs              # two-org channel, keys, joined peer, mock ports
//! └── integration/
//!     ├── config_updates.rs   # add org, anchor peers, consenter errors
//!     ├── orderer_resolution.rs # registry/genesis fallback, reload idempotence
//!     ├── ledger_queries.rs   # block pagination and lookups
//!     └── commands.rs         # `fcp` subcommand dispatch
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p fcp-tests
//! cargo test -p fcp-tests integration::config_updates::
//! ```

pub mod harness;

#[cfg(test)]
mod integration;
