//! Ordering service tuning: raft options, batch size, batch timeout.

use fcp_01_block_codec::proto::orderer::{etcdraft, BatchSize, BatchTimeout};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{require_duration, require_positive, ConfigOperation};
use crate::domain::configtx::ConfigTx;
use crate::domain::errors::ConfigOpError;

/// `update_etcd_raft_options`: replace the raft options block wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateEtcdRaftOptions {
    pub tick_interval: String,
    pub election_tick: u32,
    pub heartbeat_tick: u32,
    pub max_inflight_blocks: u32,
    pub snapshot_interval_size: u32,
}

impl ConfigOperation for UpdateEtcdRaftOptions {
    fn name(&self) -> &'static str {
        "update_etcd_raft_options"
    }

    fn validate(&self) -> Result<(), ConfigOpError> {
        require_duration("tick_interval", &self.tick_interval)?;
        require_positive("election_tick", self.election_tick)?;
        require_positive("heartbeat_tick", self.heartbeat_tick)?;
        require_positive("max_inflight_blocks", self.max_inflight_blocks)?;
        require_positive("snapshot_interval_size", self.snapshot_interval_size)
    }

    fn modify(&self, tx: &mut ConfigTx) -> Result<(), ConfigOpError> {
        let mut metadata = tx.raft_metadata()?;
        metadata.options = Some(etcdraft::Options {
            tick_interval: self.tick_interval.trim().to_string(),
            election_tick: self.election_tick,
            heartbeat_tick: self.heartbeat_tick,
            max_inflight_blocks: self.max_inflight_blocks,
            snapshot_interval_size: self.snapshot_interval_size,
        });
        tx.set_raft_metadata(&metadata)?;
        debug!(tick_interval = %self.tick_interval, "Updated raft options");
        Ok(())
    }
}

/// `update_batch_size`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateBatchSize {
    pub absolute_max_bytes: u32,
    pub max_message_count: u32,
    pub preferred_max_bytes: u32,
}

impl ConfigOperation for UpdateBatchSize {
    fn name(&self) -> &'static str {
        "update_batch_size"
    }

    fn validate(&self) -> Result<(), ConfigOpError> {
        require_positive("absolute_max_bytes", self.absolute_max_bytes)?;
        require_positive("max_message_count", self.max_message_count)?;
        require_positive("preferred_max_bytes", self.preferred_max_bytes)
    }

    fn modify(&self, tx: &mut ConfigTx) -> Result<(), ConfigOpError> {
        tx.set_batch_size(&BatchSize {
            max_message_count: self.max_message_count,
            absolute_max_bytes: self.absolute_max_bytes,
            preferred_max_bytes: self.preferred_max_bytes,
        })?;
        debug!(max_message_count = self.max_message_count, "Updated batch size");
        Ok(())
    }
}

/// `update_batch_timeout`: `timeout` is a duration string such as `2s`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateBatchTimeout {
    pub timeout: String,
}

impl ConfigOperation for UpdateBatchTimeout {
    fn name(&self) -> &'static str {
        "update_batch_timeout"
    }

    fn validate(&self) -> Result<(), ConfigOpError> {
        require_duration("timeout", &self.timeout).map(|_| ())
    }

    fn modify(&self, tx: &mut ConfigTx) -> Result<(), ConfigOpError> {
        tx.set_batch_timeout(&BatchTimeout {
            timeout: self.timeout.trim().to_string(),
        })?;
        debug!(timeout = %self.timeout, "Updated batch timeout");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcp_01_block_codec::config_values;
    use fcp_01_block_codec::test_utils::{ChannelFixture, FixtureOptions};
    use proptest::prelude::*;

    fn tx() -> ConfigTx {
        ConfigTx::new(ChannelFixture::new(FixtureOptions::default()).config)
    }

    #[test]
    fn test_batch_timeout_examples() {
        let ok = UpdateBatchTimeout {
            timeout: "2s".into(),
        };
        assert!(ok.validate().is_ok());
        for bad in ["abc", "-1s", "0s", ""] {
            let op = UpdateBatchTimeout {
                timeout: bad.into(),
            };
            assert!(op.validate().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_raft_options_replaced_wholesale() {
        let mut tx = tx();
        let op = UpdateEtcdRaftOptions {
            tick_interval: "250ms".into(),
            election_tick: 20,
            heartbeat_tick: 2,
            max_inflight_blocks: 10,
            snapshot_interval_size: 1024,
        };
        op.validate().unwrap();
        op.modify(&mut tx).unwrap();
        let options = tx.raft_metadata().unwrap().options.unwrap();
        assert_eq!(options.tick_interval, "250ms");
        assert_eq!(options.election_tick, 20);
        // consenters untouched
        assert_eq!(tx.raft_metadata().unwrap().consenters.len(), 3);
    }

    #[test]
    fn test_batch_size_applied() {
        let mut tx = tx();
        UpdateBatchSize {
            absolute_max_bytes: 1024,
            max_message_count: 50,
            preferred_max_bytes: 512,
        }
        .modify(&mut tx)
        .unwrap();
        let size = config_values::batch_size(tx.updated()).unwrap();
        assert_eq!(size.max_message_count, 50);
    }

    proptest! {
        #[test]
        fn prop_batch_size_valid_iff_all_positive(a in 0u32..4, m in 0u32..4, p in 0u32..4) {
            let op = UpdateBatchSize {
                absolute_max_bytes: a,
                max_message_count: m,
                preferred_max_bytes: p,
            };
            let first = op.validate().is_ok();
            prop_assert_eq!(first, a > 0 && m > 0 && p > 0);
            prop_assert_eq!(op.validate().is_ok(), first);
        }

        #[test]
        fn prop_raft_options_valid_iff_all_positive(
            tick in prop_oneof![Just(""), Just("0s"), Just("100ms"), Just("1s")],
            e in 0u32..3,
            h in 0u32..3,
            m in 0u32..3,
            s in 0u32..3,
        ) {
            let op = UpdateEtcdRaftOptions {
                tick_interval: tick.to_string(),
                election_tick: e,
                heartbeat_tick: h,
                max_inflight_blocks: m,
                snapshot_interval_size: s,
            };
            let expected = !tick.is_empty() && tick != "0s" && e > 0 && h > 0 && m > 0 && s > 0;
            prop_assert_eq!(op.validate().is_ok(), expected);
            prop_assert_eq!(op.validate().is_ok(), expected);
        }

        #[test]
        fn prop_batch_timeout_validation_is_stable(timeout in "\\PC{0,8}") {
            let op = UpdateBatchTimeout { timeout };
            let first = op.validate().map_err(|e| e.to_string());
            let second = op.validate().map_err(|e| e.to_string());
            prop_assert_eq!(first, second);
        }
    }
}
