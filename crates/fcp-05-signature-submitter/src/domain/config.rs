use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Submitter configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitterConfig {
    /// Deadline for one broadcast send + status receive (milliseconds).
    pub broadcast_timeout_ms: u64,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            broadcast_timeout_ms: 30_000,
        }
    }
}

impl SubmitterConfig {
    pub fn for_testing() -> Self {
        Self {
            broadcast_timeout_ms: 200,
        }
    }

    pub fn broadcast_timeout(&self) -> Duration {
        Duration::from_millis(self.broadcast_timeout_ms)
    }
}
