use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Deployer facade configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployerConfig {
    /// Deadline for one join / leave call against a node (milliseconds).
    pub node_timeout_ms: u64,
    /// Delay between config polls while waiting for an update to commit.
    pub refresh_poll_interval_ms: u64,
    /// Give up waiting for the commit after this long and report `pending`.
    pub refresh_timeout_ms: u64,
}

impl Default for DeployerConfig {
    fn default() -> Self {
        Self {
            node_timeout_ms: 60_000,
            refresh_poll_interval_ms: 1_000,
            refresh_timeout_ms: 30_000,
        }
    }
}

impl DeployerConfig {
    pub fn for_testing() -> Self {
        Self {
            node_timeout_ms: 200,
            refresh_poll_interval_ms: 10,
            refresh_timeout_ms: 100,
        }
    }

    pub fn node_timeout(&self) -> Duration {
        Duration::from_millis(self.node_timeout_ms)
    }

    pub fn refresh_poll_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_poll_interval_ms)
    }

    pub fn refresh_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh_timeout_ms)
    }
}
