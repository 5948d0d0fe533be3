//! # Block / Transaction Query
//!
//! Read-only access to the ledger of a network's joined peer.
//!
//! ## Crate Structure
//!
//! ```text
//! fcp-07-block-query/
//! ├── domain/
//! │   ├── config.rs   # QueryConfig
//! │   ├── errors.rs   # QueryError
//! │   ├── summary.rs  # block/transaction summaries, DER header hash
//! │   └── window.rs   # page window arithmetic
//! ├── ports/
//! │   └── outbound.rs # LedgerReader
//! └── service.rs      # BlockQueryService
//! ```
//!
//! ## Pagination
//!
//! Pages are inclusive block-number windows derived from the peer's chain
//! height. In reverse mode the window ends at `height - 1 - offset` and
//! reaches back `limit - 1` blocks, clamped at genesis:
//!
//! | height | limit | offset | reverse | blocks        |
//! |--------|-------|--------|---------|---------------|
//! | 31     | 10    | 0      | yes     | 30, 29 .. 21  |
//! | 31     | 10    | 25     | yes     | 5, 4 .. 0     |
//! | 31     | 10    | 0      | no      | 0, 1 .. 9     |
//! | 31     | 10    | 31     | either  | (empty)       |
//!
//! Transaction lookups scan from the newest block down and are linear in the
//! chain height.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    block_window, BlockSummary, BlockWindow, ChainInfo, QueryConfig, QueryError,
    TransactionSummary,
};
pub use ports::{LedgerReader, MockLedgerReader};
pub use service::{BlockPage, BlockQueryService, TransactionLocation};
