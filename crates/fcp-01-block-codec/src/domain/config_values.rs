//! Well-known config tree keys and typed accessors for config values.

use prost::Message;

use super::errors::CodecError;
use crate::proto::common::{Config, ConfigGroup, OrdererAddresses};
use crate::proto::orderer::{
    etcdraft, BatchSize, BatchTimeout, ConsensusType, ETCDRAFT_CONSENSUS_TYPE,
};

pub const APPLICATION_GROUP: &str = "Application";
pub const ORDERER_GROUP: &str = "Orderer";

pub const MSP_KEY: &str = "MSP";
pub const ANCHOR_PEERS_KEY: &str = "AnchorPeers";
pub const CONSENSUS_TYPE_KEY: &str = "ConsensusType";
pub const BATCH_SIZE_KEY: &str = "BatchSize";
pub const BATCH_TIMEOUT_KEY: &str = "BatchTimeout";
pub const ORDERER_ADDRESSES_KEY: &str = "OrdererAddresses";
pub const ENDPOINTS_KEY: &str = "Endpoints";

pub const ADMINS_POLICY: &str = "Admins";
pub const READERS_POLICY: &str = "Readers";
pub const WRITERS_POLICY: &str = "Writers";
pub const ENDORSEMENT_POLICY: &str = "Endorsement";

/// Root group of a config, or an error if the config is empty.
pub fn channel_group(config: &Config) -> Result<&ConfigGroup, CodecError> {
    config
        .channel_group
        .as_ref()
        .ok_or_else(|| CodecError::MissingGroup("Channel".to_string()))
}

pub fn child_group<'a>(group: &'a ConfigGroup, name: &str) -> Result<&'a ConfigGroup, CodecError> {
    group
        .groups
        .get(name)
        .ok_or_else(|| CodecError::MissingGroup(name.to_string()))
}

/// Decode the value stored under `key` in `group`.
pub fn decode_value<M: Message + Default>(group: &ConfigGroup, key: &str) -> Result<M, CodecError> {
    let value = group
        .values
        .get(key)
        .ok_or_else(|| CodecError::MissingValue(key.to_string()))?;
    M::decode(value.value.as_slice()).map_err(|source| CodecError::Decode {
        message: "config value",
        source,
    })
}

pub fn orderer_group(config: &Config) -> Result<&ConfigGroup, CodecError> {
    child_group(channel_group(config)?, ORDERER_GROUP)
}

pub fn application_group(config: &Config) -> Result<&ConfigGroup, CodecError> {
    child_group(channel_group(config)?, APPLICATION_GROUP)
}

pub fn consensus_type(config: &Config) -> Result<ConsensusType, CodecError> {
    decode_value(orderer_group(config)?, CONSENSUS_TYPE_KEY)
}

/// Raft metadata carried in the orderer `ConsensusType` value.
pub fn raft_metadata(config: &Config) -> Result<etcdraft::ConfigMetadata, CodecError> {
    let consensus = consensus_type(config)?;
    if consensus.r#type != ETCDRAFT_CONSENSUS_TYPE {
        return Err(CodecError::UnsupportedConsensus(consensus.r#type));
    }
    etcdraft::ConfigMetadata::decode(consensus.metadata.as_slice()).map_err(|source| {
        CodecError::Decode {
            message: "etcdraft metadata",
            source,
        }
    })
}

pub fn batch_size(config: &Config) -> Result<BatchSize, CodecError> {
    decode_value(orderer_group(config)?, BATCH_SIZE_KEY)
}

pub fn batch_timeout(config: &Config) -> Result<BatchTimeout, CodecError> {
    decode_value(orderer_group(config)?, BATCH_TIMEOUT_KEY)
}

/// Orderer endpoints advertised by the config.
///
/// Per-organization `Endpoints` values take precedence over the channel-level
/// `OrdererAddresses`, which newer channels leave empty.
pub fn orderer_endpoints(config: &Config) -> Result<Vec<String>, CodecError> {
    let channel = channel_group(config)?;
    let mut endpoints = Vec::new();
    if let Some(orderer) = channel.groups.get(ORDERER_GROUP) {
        for org in orderer.groups.values() {
            if org.values.contains_key(ENDPOINTS_KEY) {
                let addrs: OrdererAddresses = decode_value(org, ENDPOINTS_KEY)?;
                endpoints.extend(addrs.addresses);
            }
        }
    }
    if endpoints.is_empty() && channel.values.contains_key(ORDERER_ADDRESSES_KEY) {
        let addrs: OrdererAddresses = decode_value(channel, ORDERER_ADDRESSES_KEY)?;
        endpoints.extend(addrs.addresses);
    }
    endpoints.dedup();
    Ok(endpoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::common::ConfigValue;

    fn value<M: Message>(m: &M) -> ConfigValue {
        ConfigValue {
            version: 0,
            value: m.encode_to_vec(),
            mod_policy: ADMINS_POLICY.to_string(),
        }
    }

    #[test]
    fn test_missing_orderer_group() {
        let config = Config {
            sequence: 0,
            channel_group: Some(ConfigGroup::default()),
        };
        let err = orderer_group(&config).unwrap_err();
        assert!(matches!(err, CodecError::MissingGroup(ref g) if g == "Orderer"));
    }

    #[test]
    fn test_non_raft_consensus_rejected() {
        let mut orderer = ConfigGroup::default();
        orderer.values.insert(
            CONSENSUS_TYPE_KEY.to_string(),
            value(&ConsensusType {
                r#type: "solo".to_string(),
                ..Default::default()
            }),
        );
        let mut channel = ConfigGroup::default();
        channel.groups.insert(ORDERER_GROUP.to_string(), orderer);
        let config = Config {
            sequence: 0,
            channel_group: Some(channel),
        };
        assert!(matches!(
            raft_metadata(&config),
            Err(CodecError::UnsupportedConsensus(t)) if t == "solo"
        ));
    }

    #[test]
    fn test_org_endpoints_preferred_over_channel_addresses() {
        let mut org = ConfigGroup::default();
        org.values.insert(
            ENDPOINTS_KEY.to_string(),
            value(&OrdererAddresses {
                addresses: vec!["orderer0.example.com:7050".to_string()],
            }),
        );
        let mut orderer = ConfigGroup::default();
        orderer.groups.insert("OrdererMSP".to_string(), org);
        let mut channel = ConfigGroup::default();
        channel.groups.insert(ORDERER_GROUP.to_string(), orderer);
        channel.values.insert(
            ORDERER_ADDRESSES_KEY.to_string(),
            value(&OrdererAddresses {
                addresses: vec!["legacy.example.com:7050".to_string()],
            }),
        );
        let config = Config {
            sequence: 0,
            channel_group: Some(channel),
        };
        assert_eq!(
            orderer_endpoints(&config).unwrap(),
            vec!["orderer0.example.com:7050".to_string()]
        );
    }
}
