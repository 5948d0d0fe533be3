//! Query domain: page windows, block summaries and header hashing.

pub mod config;
pub mod errors;
pub mod summary;
pub mod window;

pub use config::QueryConfig;
pub use errors::QueryError;
pub use summary::{
    block_transactions, chain_info, find_transaction, header_der, header_hash, summarize_block,
    transaction_at, BlockSummary, ChainInfo, TransactionSummary,
};
pub use window::{block_window, BlockWindow};
