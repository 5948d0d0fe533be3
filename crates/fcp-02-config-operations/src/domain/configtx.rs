//! # Configuration Transaction Builder
//!
//! Holds the channel config as read from the block (`original`) and a working
//! copy that operations mutate (`updated`). Nothing leaves memory until
//! [`ConfigTx::compute_marshaled_update`] diffs the two.

use fcp_01_block_codec::config_values::{
    self, ADMINS_POLICY, APPLICATION_GROUP, BATCH_SIZE_KEY, BATCH_TIMEOUT_KEY, CONSENSUS_TYPE_KEY,
    ORDERER_GROUP,
};
use fcp_01_block_codec::proto::common::{Config, ConfigGroup, ConfigUpdate, ConfigValue};
use fcp_01_block_codec::proto::orderer::{etcdraft, BatchSize, BatchTimeout, ConsensusType};
use fcp_01_block_codec::CodecError;
use prost::Message;

use super::errors::ConfigOpError;
use super::update::compute_update;

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigTx {
    original: Config,
    updated: Config,
}

/// Replace the value under `key`, keeping its version and mod policy.
pub fn set_value<M: Message>(group: &mut ConfigGroup, key: &str, message: &M) {
    let bytes = message.encode_to_vec();
    match group.values.get_mut(key) {
        Some(existing) => existing.value = bytes,
        None => {
            group.values.insert(
                key.to_string(),
                ConfigValue {
                    version: 0,
                    value: bytes,
                    mod_policy: ADMINS_POLICY.to_string(),
                },
            );
        }
    }
}

fn child_mut<'a>(
    group: &'a mut ConfigGroup,
    name: &str,
) -> Result<&'a mut ConfigGroup, ConfigOpError> {
    group
        .groups
        .get_mut(name)
        .ok_or_else(|| CodecError::MissingGroup(name.to_string()).into())
}

impl ConfigTx {
    pub fn new(config: Config) -> Self {
        Self {
            updated: config.clone(),
            original: config,
        }
    }

    pub fn original(&self) -> &Config {
        &self.original
    }

    pub fn updated(&self) -> &Config {
        &self.updated
    }

    pub fn sequence(&self) -> u64 {
        self.original.sequence
    }

    fn channel_mut(&mut self) -> Result<&mut ConfigGroup, ConfigOpError> {
        self.updated
            .channel_group
            .as_mut()
            .ok_or_else(|| CodecError::MissingGroup("Channel".to_string()).into())
    }

    pub fn application_mut(&mut self) -> Result<&mut ConfigGroup, ConfigOpError> {
        child_mut(self.channel_mut()?, APPLICATION_GROUP)
    }

    pub fn orderer_mut(&mut self) -> Result<&mut ConfigGroup, ConfigOpError> {
        child_mut(self.channel_mut()?, ORDERER_GROUP)
    }

    /// Application org group in the working copy.
    pub fn application_org(&self, msp_id: &str) -> Option<&ConfigGroup> {
        config_values::application_group(&self.updated)
            .ok()
            .and_then(|app| app.groups.get(msp_id))
    }

    pub fn application_org_mut(
        &mut self,
        msp_id: &str,
    ) -> Result<&mut ConfigGroup, ConfigOpError> {
        self.application_mut()?
            .groups
            .get_mut(msp_id)
            .ok_or_else(|| ConfigOpError::OrganizationNotFound(msp_id.to_string()))
    }

    /// Org group for `msp_id`, searching the application orgs first and then
    /// the orderer orgs.
    pub fn org_mut(&mut self, msp_id: &str) -> Result<&mut ConfigGroup, ConfigOpError> {
        let channel = self.channel_mut()?;
        let in_application = channel
            .groups
            .get(APPLICATION_GROUP)
            .is_some_and(|app| app.groups.contains_key(msp_id));
        let parent = if in_application {
            APPLICATION_GROUP
        } else {
            ORDERER_GROUP
        };
        channel
            .groups
            .get_mut(parent)
            .and_then(|g| g.groups.get_mut(msp_id))
            .ok_or_else(|| ConfigOpError::OrganizationNotFound(msp_id.to_string()))
    }

    /// Raft metadata of the working copy.
    pub fn raft_metadata(&self) -> Result<etcdraft::ConfigMetadata, ConfigOpError> {
        Ok(config_values::raft_metadata(&self.updated)?)
    }

    /// Write raft metadata back into the orderer `ConsensusType` value.
    pub fn set_raft_metadata(
        &mut self,
        metadata: &etcdraft::ConfigMetadata,
    ) -> Result<(), ConfigOpError> {
        let mut consensus: ConsensusType = config_values::consensus_type(&self.updated)?;
        consensus.metadata = metadata.encode_to_vec();
        set_value(self.orderer_mut()?, CONSENSUS_TYPE_KEY, &consensus);
        Ok(())
    }

    pub fn set_batch_size(&mut self, batch_size: &BatchSize) -> Result<(), ConfigOpError> {
        set_value(self.orderer_mut()?, BATCH_SIZE_KEY, batch_size);
        Ok(())
    }

    pub fn set_batch_timeout(&mut self, timeout: &BatchTimeout) -> Result<(), ConfigOpError> {
        set_value(self.orderer_mut()?, BATCH_TIMEOUT_KEY, timeout);
        Ok(())
    }

    /// Diff `original` against `updated` for `channel_id`.
    pub fn compute_update(&self, channel_id: &str) -> Result<ConfigUpdate, ConfigOpError> {
        let mut update = compute_update(&self.original, &self.updated)?;
        update.channel_id = channel_id.to_string();
        Ok(update)
    }

    /// `ComputeMarshaledUpdate`: the protobuf-encoded `ConfigUpdate`.
    pub fn compute_marshaled_update(&self, channel_id: &str) -> Result<Vec<u8>, ConfigOpError> {
        Ok(self.compute_update(channel_id)?.encode_to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcp_01_block_codec::test_utils::{ChannelFixture, FixtureOptions};

    #[test]
    fn test_untouched_tx_has_no_update() {
        let fixture = ChannelFixture::new(FixtureOptions::default());
        let tx = ConfigTx::new(fixture.config.clone());
        assert!(matches!(
            tx.compute_marshaled_update("mychannel"),
            Err(ConfigOpError::NoDifferences)
        ));
    }

    #[test]
    fn test_batch_timeout_keeps_version_in_working_copy() {
        let fixture = ChannelFixture::new(FixtureOptions::default());
        let mut tx = ConfigTx::new(fixture.config.clone());
        tx.set_batch_timeout(&BatchTimeout {
            timeout: "5s".to_string(),
        })
        .unwrap();

        let update = tx.compute_update("mychannel").unwrap();
        assert_eq!(update.channel_id, "mychannel");
        let write = update.write_set.unwrap();
        let orderer = &write.groups[ORDERER_GROUP];
        let value = &orderer.values[BATCH_TIMEOUT_KEY];
        assert_eq!(value.version, 1);
        assert_eq!(BatchTimeout::decode(value.value.as_slice()).unwrap().timeout, "5s");
        assert_eq!(config_values::batch_timeout(tx.original()).unwrap().timeout, "2s");
    }

    #[test]
    fn test_org_lookup_falls_back_to_orderer_orgs() {
        let fixture = ChannelFixture::new(FixtureOptions::default());
        let mut tx = ConfigTx::new(fixture.config.clone());
        assert!(tx.org_mut("OrdererMSP").is_ok());
        assert!(tx.org_mut("Org1MSP").is_ok());
        assert!(matches!(
            tx.org_mut("Org9MSP"),
            Err(ConfigOpError::OrganizationNotFound(_))
        ));
    }
}
