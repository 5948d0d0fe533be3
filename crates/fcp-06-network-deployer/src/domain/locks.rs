//! Per-network serialization of channel-altering work.
//!
//! The map itself is guarded by a `parking_lot` mutex that is never held
//! across an await; the per-network `tokio` mutex is.

use parking_lot::Mutex;
use shared_types::NetworkId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex as TokioMutex, OwnedMutexGuard};

#[derive(Default)]
pub struct NetworkLocks {
    locks: Mutex<HashMap<NetworkId, Arc<TokioMutex<()>>>>,
}

impl NetworkLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `network_id`. Released on drop.
    pub async fn acquire(&self, network_id: NetworkId) -> OwnedMutexGuard<()> {
        let lock = self.locks.lock().entry(network_id).or_default().clone();
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_network_is_serialized() {
        let locks = Arc::new(NetworkLocks::new());
        let guard = locks.acquire(1).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(1).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(guard);
        waiter.await.unwrap();
    }

    #[tokio::test]
    async fn test_other_networks_are_independent() {
        let locks = NetworkLocks::new();
        let _one = locks.acquire(1).await;
        let two = tokio::time::timeout(Duration::from_millis(50), locks.acquire(2)).await;
        assert!(two.is_ok());
    }
}
