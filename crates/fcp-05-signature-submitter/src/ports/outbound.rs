//! # Outbound Ports
//!
//! The ordering service's AtomicBroadcast `Broadcast` stream, reduced to
//! one envelope in and one status out. Adapters own the connection and
//! release it on every path.

use async_trait::async_trait;
use fcp_01_block_codec::proto::common::{Envelope, Status};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared_types::{OrdererInfo, TransportError};
use std::time::Duration;

/// Status of one broadcast, as returned by the orderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastStatus {
    pub status: i32,
    pub info: String,
}

impl BroadcastStatus {
    pub fn success() -> Self {
        Self {
            status: Status::Success as i32,
            info: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success as i32
    }

    /// `SUCCESS`, `BAD_REQUEST`, ... or the raw number when unknown.
    pub fn status_name(&self) -> String {
        Status::try_from(self.status)
            .map(|s| s.as_str_name().to_string())
            .unwrap_or_else(|_| self.status.to_string())
    }
}

#[async_trait]
pub trait OrdererBroadcaster: Send + Sync {
    /// Send `envelope` and wait for the single broadcast response.
    async fn broadcast(
        &self,
        orderer: &OrdererInfo,
        envelope: Envelope,
    ) -> Result<BroadcastStatus, TransportError>;
}

// =============================================================================
// Mock Implementation for Testing
// =============================================================================

/// Records every envelope and answers with a scripted status.
pub struct MockOrdererBroadcaster {
    response: Mutex<Result<BroadcastStatus, TransportError>>,
    delay: Mutex<Option<Duration>>,
    sent: Mutex<Vec<(String, Envelope)>>,
}

impl Default for MockOrdererBroadcaster {
    fn default() -> Self {
        Self {
            response: Mutex::new(Ok(BroadcastStatus::success())),
            delay: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
        }
    }
}

impl MockOrdererBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(self, status: Status, info: &str) -> Self {
        *self.response.lock() = Ok(BroadcastStatus {
            status: status as i32,
            info: info.to_string(),
        });
        self
    }

    pub fn with_failure(self, error: TransportError) -> Self {
        *self.response.lock() = Err(error);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock() = Some(delay);
        self
    }

    /// `(orderer url, envelope)` pairs in send order.
    pub fn sent(&self) -> Vec<(String, Envelope)> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl OrdererBroadcaster for MockOrdererBroadcaster {
    async fn broadcast(
        &self,
        orderer: &OrdererInfo,
        envelope: Envelope,
    ) -> Result<BroadcastStatus, TransportError> {
        self.sent.lock().push((orderer.url.clone(), envelope));
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.response.lock().clone()
    }
}
