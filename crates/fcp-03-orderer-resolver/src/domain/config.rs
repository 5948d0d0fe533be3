use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Orderer resolver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Deadline for one config fetch against one orderer (milliseconds).
    pub fetch_timeout_ms: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
        }
    }
}

impl ResolverConfig {
    /// Short deadlines for tests.
    pub fn for_testing() -> Self {
        Self {
            fetch_timeout_ms: 200,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}
