use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ledger query configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Largest page `get_blocks` returns; bigger limits are capped.
    pub max_page_size: u64,
    /// Deadline for one ledger read against the peer (milliseconds).
    pub request_timeout_ms: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_page_size: 100,
            request_timeout_ms: 10_000,
        }
    }
}

impl QueryConfig {
    pub fn for_testing() -> Self {
        Self {
            max_page_size: 20,
            request_timeout_ms: 200,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
