//! # Outbound Ports
//!
//! The ordering service as seen by the resolver.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{OrdererInfo, TransportError};
use std::collections::HashMap;
use std::time::Duration;

/// Reads the current configuration block of a channel from one orderer.
#[async_trait]
pub trait ConfigBlockSource: Send + Sync {
    /// Marshaled config block (the block the newest block's last-config
    /// index points at).
    async fn fetch_config_block(
        &self,
        orderer: &OrdererInfo,
        channel: &str,
    ) -> Result<Vec<u8>, TransportError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

/// Scripted per-URL responses. Unknown URLs fail to connect.
#[derive(Default)]
pub struct MockConfigBlockSource {
    responses: Mutex<HashMap<String, Result<Vec<u8>, TransportError>>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<String>>,
}

impl MockConfigBlockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block(self, url: &str, block: Vec<u8>) -> Self {
        self.set_block(url, block);
        self
    }

    pub fn with_failure(self, url: &str, error: TransportError) -> Self {
        self.responses.lock().insert(url.to_string(), Err(error));
        self
    }

    /// Answer `url` only after `delay`.
    pub fn with_delay(self, url: &str, delay: Duration) -> Self {
        self.set_delay(url, delay);
        self
    }

    pub fn set_delay(&self, url: &str, delay: Duration) {
        self.delays.lock().insert(url.to_string(), delay);
    }

    /// Replace the block served by `url` (simulates a committed update).
    pub fn set_block(&self, url: &str, block: Vec<u8>) {
        self.responses.lock().insert(url.to_string(), Ok(block));
    }

    /// URLs contacted so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl ConfigBlockSource for MockConfigBlockSource {
    async fn fetch_config_block(
        &self,
        orderer: &OrdererInfo,
        _channel: &str,
    ) -> Result<Vec<u8>, TransportError> {
        self.calls.lock().push(orderer.url.clone());
        let delay = self.delays.lock().get(&orderer.url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .get(&orderer.url)
            .cloned()
            .unwrap_or_else(|| {
                Err(TransportError::Connect {
                    endpoint: orderer.url.clone(),
                    message: "connection refused".to_string(),
                })
            })
    }
}
