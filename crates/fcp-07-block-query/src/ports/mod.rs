//! Ports for the query service.

pub mod outbound;

pub use outbound::{LedgerReader, MockLedgerReader};
