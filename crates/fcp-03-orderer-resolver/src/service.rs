//! Orderer Resolver Service
//!
//! Two-tier resolution:
//! 1. Registry: joined orderer nodes with deployment data.
//! 2. Config block: consenters of the cached current (or genesis) config
//!    block of the network.
//!
//! Live config fetches try every known orderer in sequence. That linear
//! fan-out is the only retry in the resolver.

use fcp_01_block_codec::{
    config_from_block_bytes, decode_block_b64, extract_config_from_block, orderers_from_config,
};
use shared_types::{Network, NetworkId, NodeRole, OrdererInfo, RecordStore, TransportError};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{
    merge_candidates, registry_orderer, ChannelConfigSnapshot, ResolverConfig, ResolverError,
};
use crate::ports::ConfigBlockSource;

pub struct OrdererResolver {
    store: Arc<dyn RecordStore>,
    source: Arc<dyn ConfigBlockSource>,
    config: ResolverConfig,
}

/// Consenters of the network's cached config block.
fn config_block_orderers(network: &Network) -> Result<Vec<OrdererInfo>, ResolverError> {
    let Some(block_b64) = network.latest_known_config_block_b64() else {
        return Ok(Vec::new());
    };
    let block = decode_block_b64(block_b64)?;
    let config = extract_config_from_block(&block)?;
    Ok(orderers_from_config(&config)?)
}

impl OrdererResolver {
    pub fn new(
        store: Arc<dyn RecordStore>,
        source: Arc<dyn ConfigBlockSource>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            store,
            source,
            config,
        }
    }

    /// Joined orderers from the node registry.
    async fn registry_orderers(
        &self,
        network_id: NetworkId,
    ) -> Result<Vec<OrdererInfo>, ResolverError> {
        let rows = self.store.list_network_nodes(network_id).await?;
        let mut found = Vec::new();
        for row in rows
            .iter()
            .filter(|r| r.role == NodeRole::Orderer && r.is_joined())
        {
            match self.store.get_node(row.node_id).await {
                Ok(node) => found.extend(registry_orderer(row, &node)),
                Err(e) => {
                    warn!(network_id, node_id = row.node_id, error = %e, "Skipping orderer row")
                }
            }
        }
        Ok(found)
    }

    /// `GetOrderersForNetwork`: registry first, config block second.
    pub async fn get_orderers_for_network(
        &self,
        network_id: NetworkId,
    ) -> Result<Vec<OrdererInfo>, ResolverError> {
        let registry = self.registry_orderers(network_id).await?;
        if !registry.is_empty() {
            debug!(network_id, count = registry.len(), "Resolved orderers from registry");
            return Ok(registry);
        }

        let network = self.store.get_network(network_id).await?;
        match config_block_orderers(&network) {
            Ok(found) if !found.is_empty() => {
                debug!(
                    network_id,
                    count = found.len(),
                    "Resolved orderers from config block"
                );
                Ok(found)
            }
            Ok(_) => Err(ResolverError::NoOrdererFound { network_id }),
            Err(e) => {
                warn!(network_id, error = %e, "Config block fallback failed");
                Err(ResolverError::NoOrdererFound { network_id })
            }
        }
    }

    /// First orderer `get_orderers_for_network` yields.
    pub async fn resolve_orderer(
        &self,
        network_id: NetworkId,
    ) -> Result<OrdererInfo, ResolverError> {
        self.get_orderers_for_network(network_id)
            .await?
            .into_iter()
            .next()
            .ok_or(ResolverError::NoOrdererFound { network_id })
    }

    /// Every orderer we know of: registry entries, then config-block
    /// consenters not already listed.
    pub async fn known_orderers(
        &self,
        network: &Network,
    ) -> Result<Vec<OrdererInfo>, ResolverError> {
        let registry = self.registry_orderers(network.id).await?;
        let from_block = config_block_orderers(network).unwrap_or_else(|e| {
            debug!(network_id = network.id, error = %e, "No orderers in cached config block");
            Vec::new()
        });
        Ok(merge_candidates(registry, from_block))
    }

    /// `FetchCurrentChannelConfig`: ask each known orderer in turn until one
    /// returns a decodable config block.
    pub async fn fetch_current_channel_config(
        &self,
        network_id: NetworkId,
    ) -> Result<ChannelConfigSnapshot, ResolverError> {
        let network = self.store.get_network(network_id).await?;
        let channel = network.channel_name().to_string();
        let candidates = self.known_orderers(&network).await?;
        if candidates.is_empty() {
            return Err(ResolverError::NoOrdererFound { network_id });
        }

        let timeout = self.config.fetch_timeout();
        let mut last_error = String::new();
        for (attempt, orderer) in candidates.iter().enumerate() {
            let fetched = tokio::time::timeout(
                timeout,
                self.source.fetch_config_block(orderer, &channel),
            )
            .await
            .unwrap_or_else(|_| Err(TransportError::timeout(&orderer.url, timeout)));

            let result = fetched
                .map_err(|e| e.to_string())
                .and_then(|bytes| match config_from_block_bytes(&bytes) {
                    Ok(config) => Ok((bytes, config)),
                    Err(e) => Err(e.to_string()),
                });

            match result {
                Ok((block_bytes, config)) => {
                    info!(
                        network_id,
                        channel = %channel,
                        orderer = %orderer.url,
                        sequence = config.sequence,
                        "Fetched channel config"
                    );
                    return Ok(ChannelConfigSnapshot {
                        channel,
                        orderer: orderer.clone(),
                        block_bytes,
                        config,
                        failed_attempts: attempt,
                    });
                }
                Err(e) => {
                    warn!(
                        network_id,
                        channel = %channel,
                        orderer = %orderer.url,
                        error = %e,
                        "failed_to_get_channel_config"
                    );
                    last_error = e;
                }
            }
        }

        Err(ResolverError::FailedToGetChannelConfig {
            channel,
            attempts: candidates.len(),
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MockConfigBlockSource;
    use chrono::Utc;
    use fcp_01_block_codec::test_utils::{ChannelFixture, FixtureOptions};
    use shared_types::adapters::InMemoryRecordStore;
    use shared_types::{
        NetworkNode, NetworkNodeStatus, NetworkStatus, NodeDeploymentConfig, NodeType, Platform,
        RegisteredNode,
    };
    use std::time::Duration;

    fn network(genesis: Option<String>) -> Network {
        Network {
            id: 1,
            name: "mychannel".into(),
            platform: Platform::Fabric,
            status: NetworkStatus::Running,
            genesis_block_b64: genesis,
            current_config_block_b64: None,
            config: serde_json::Value::Null,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn add_orderer(
        store: &InMemoryRecordStore,
        id: i64,
        endpoint: &str,
        status: NetworkNodeStatus,
    ) {
        store.insert_node(RegisteredNode {
            id,
            name: format!("orderer{id}"),
            node_type: NodeType::Orderer,
            organization_id: None,
            deployment: Some(NodeDeploymentConfig {
                external_endpoint: endpoint.into(),
                tls_ca_cert: "REGISTRY-CA".into(),
                msp_id: "OrdererMSP".into(),
            }),
        });
        store.insert_network_node(NetworkNode {
            network_id: 1,
            node_id: id,
            role: NodeRole::Orderer,
            status,
        });
    }

    fn resolver(
        store: Arc<InMemoryRecordStore>,
        source: Arc<MockConfigBlockSource>,
    ) -> OrdererResolver {
        OrdererResolver::new(store, source, ResolverConfig::for_testing())
    }

    #[tokio::test]
    async fn test_registry_wins_over_config_block() {
        let fixture = ChannelFixture::new(FixtureOptions::default());
        let store = Arc::new(InMemoryRecordStore::new());
        store.insert_network(network(Some(fixture.config_block_b64())));
        add_orderer(&store, 10, "orderer.local:7050", NetworkNodeStatus::Joined);

        let r = resolver(store, Arc::new(MockConfigBlockSource::new()));
        let found = r.get_orderers_for_network(1).await.unwrap();
        assert_eq!(found, vec![OrdererInfo::new("orderer.local:7050", "REGISTRY-CA")]);
    }

    #[tokio::test]
    async fn test_falls_back_to_genesis_consenters() {
        let fixture = ChannelFixture::new(FixtureOptions::default());
        let store = Arc::new(InMemoryRecordStore::new());
        store.insert_network(network(Some(fixture.config_block_b64())));
        // a pending orderer does not count
        add_orderer(&store, 10, "orderer.local:7050", NetworkNodeStatus::Pending);

        let r = resolver(store, Arc::new(MockConfigBlockSource::new()));
        let found = r.resolve_orderer(1).await.unwrap();
        assert_eq!(found.url, "orderer0.example.com:7050");
        assert_eq!(found.tls_cert_pem, fixture.consenters[0].tls_cert_pem);
    }

    #[tokio::test]
    async fn test_no_orderer_found() {
        let store = Arc::new(InMemoryRecordStore::new());
        store.insert_network(network(None));
        let r = resolver(store, Arc::new(MockConfigBlockSource::new()));
        let err = r.get_orderers_for_network(1).await.unwrap_err();
        assert!(matches!(err, ResolverError::NoOrdererFound { network_id: 1 }));
    }

    #[tokio::test]
    async fn test_falls_back_to_advertised_endpoints_without_consenters() {
        let fixture = ChannelFixture::new(FixtureOptions {
            consenters: 0,
            ..Default::default()
        })
        .with_orderer_endpoints(&["orderer0.example.com:7050"]);
        let store = Arc::new(InMemoryRecordStore::new());
        store.insert_network(network(Some(fixture.config_block_b64())));

        let r = resolver(store, Arc::new(MockConfigBlockSource::new()));
        let found = r.get_orderers_for_network(1).await.unwrap();
        assert_eq!(
            found,
            vec![OrdererInfo::new(
                "orderer0.example.com:7050",
                fixture.orderer_org.ca.cert_pem.clone()
            )]
        );
    }

    #[tokio::test]
    async fn test_fetch_tries_every_orderer_in_order() {
        let fixture = ChannelFixture::new(FixtureOptions::default());
        let store = Arc::new(InMemoryRecordStore::new());
        store.insert_network(network(Some(fixture.config_block_b64())));

        let source = Arc::new(
            MockConfigBlockSource::new()
                .with_failure(
                    "orderer0.example.com:7050",
                    TransportError::Connect {
                        endpoint: "orderer0.example.com:7050".into(),
                        message: "refused".into(),
                    },
                )
                .with_block("orderer1.example.com:7050", b"garbage".to_vec())
                .with_block("orderer2.example.com:7050", fixture.config_block_bytes()),
        );
        let r = resolver(store, source.clone());
        let snapshot = r.fetch_current_channel_config(1).await.unwrap();
        assert_eq!(snapshot.orderer.url, "orderer2.example.com:7050");
        assert_eq!(snapshot.failed_attempts, 2);
        assert_eq!(snapshot.config, fixture.config);
        assert_eq!(source.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_fails_when_every_orderer_fails() {
        let fixture = ChannelFixture::new(FixtureOptions::default());
        let store = Arc::new(InMemoryRecordStore::new());
        store.insert_network(network(Some(fixture.config_block_b64())));

        let r = resolver(store, Arc::new(MockConfigBlockSource::new()));
        let err = r.fetch_current_channel_config(1).await.unwrap_err();
        match err {
            ResolverError::FailedToGetChannelConfig { attempts, channel, .. } => {
                assert_eq!(attempts, 3);
                assert_eq!(channel, "mychannel");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_orderer_times_out_and_is_skipped() {
        let fixture = ChannelFixture::new(FixtureOptions::default());
        let store = Arc::new(InMemoryRecordStore::new());
        store.insert_network(network(Some(fixture.config_block_b64())));

        let source = Arc::new(
            MockConfigBlockSource::new()
                .with_block("orderer0.example.com:7050", fixture.config_block_bytes())
                .with_delay("orderer0.example.com:7050", Duration::from_secs(60))
                .with_block("orderer1.example.com:7050", fixture.config_block_bytes()),
        );
        let r = resolver(store, source);
        let snapshot = r.fetch_current_channel_config(1).await.unwrap();
        assert_eq!(snapshot.orderer.url, "orderer1.example.com:7050");
    }
}
