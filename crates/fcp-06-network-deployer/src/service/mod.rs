//! Deployer services.
//!
//! A network's platform is looked up once, when its deployer is resolved;
//! Fabric-only operations then go through [`NetworkDeployer::fabric`]
//! instead of re-checking the platform on every call.

pub mod fabric;
pub mod pipeline;

pub use fabric::FabricDeployer;
pub use pipeline::{ConfigPipeline, PipelineConfig};

use shared_types::{NetworkId, Platform, RecordStore};
use std::sync::Arc;

use crate::domain::DeployerError;

/// Besu networks are managed elsewhere; only their identity is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BesuDeployer {
    pub network_id: NetworkId,
}

/// The deployer for one network, closed over the supported platforms.
#[derive(Clone)]
pub enum NetworkDeployer {
    Fabric(Arc<FabricDeployer>),
    Besu(BesuDeployer),
}

impl NetworkDeployer {
    pub fn platform(&self) -> Platform {
        match self {
            Self::Fabric(_) => Platform::Fabric,
            Self::Besu(_) => Platform::Besu,
        }
    }

    /// Narrow to the Fabric deployer or fail with `unsupported_platform`.
    pub fn fabric(&self) -> Result<&FabricDeployer, DeployerError> {
        match self {
            Self::Fabric(deployer) => Ok(deployer),
            Self::Besu(besu) => Err(DeployerError::UnsupportedPlatform {
                network_id: besu.network_id,
                platform: Platform::Besu,
            }),
        }
    }
}

/// Resolves the deployer of a network from its stored platform.
pub struct DeployerRegistry {
    store: Arc<dyn RecordStore>,
    fabric: Arc<FabricDeployer>,
}

impl DeployerRegistry {
    pub fn new(store: Arc<dyn RecordStore>, fabric: Arc<FabricDeployer>) -> Self {
        Self { store, fabric }
    }

    pub async fn for_network(
        &self,
        network_id: NetworkId,
    ) -> Result<NetworkDeployer, DeployerError> {
        let network = self.store.get_network(network_id).await?;
        Ok(match network.platform {
            Platform::Fabric => NetworkDeployer::Fabric(self.fabric.clone()),
            Platform::Besu => NetworkDeployer::Besu(BesuDeployer { network_id }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DeployerConfig;
    use crate::ports::MockNodeManager;
    use chrono::Utc;
    use fcp_03_orderer_resolver::MockConfigBlockSource;
    use fcp_05_signature_submitter::MockOrdererBroadcaster;
    use shared_types::adapters::{InMemoryKeyStore, InMemoryRecordStore, TracingAuditSink};
    use shared_types::{ClassifiedError, Network, NetworkStatus};

    fn network(id: NetworkId, platform: Platform) -> Network {
        Network {
            id,
            name: format!("net{id}"),
            platform,
            status: NetworkStatus::Running,
            genesis_block_b64: None,
            current_config_block_b64: None,
            config: serde_json::Value::Null,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    fn registry(store: Arc<InMemoryRecordStore>) -> DeployerRegistry {
        let pipeline = ConfigPipeline::new(
            store.clone(),
            Arc::new(InMemoryKeyStore::new()),
            Arc::new(MockConfigBlockSource::new()),
            Arc::new(MockOrdererBroadcaster::new()),
            PipelineConfig::for_testing(),
        );
        let fabric = Arc::new(FabricDeployer::new(
            store.clone(),
            pipeline,
            Arc::new(MockNodeManager::new()),
            Arc::new(TracingAuditSink),
            DeployerConfig::for_testing(),
        ));
        DeployerRegistry::new(store, fabric)
    }

    #[tokio::test]
    async fn test_platform_resolved_from_network() {
        let store = Arc::new(InMemoryRecordStore::new());
        store.insert_network(network(1, Platform::Fabric));
        store.insert_network(network(2, Platform::Besu));
        let registry = registry(store);

        let fabric = registry.for_network(1).await.unwrap();
        assert_eq!(fabric.platform(), Platform::Fabric);
        assert!(fabric.fabric().is_ok());

        let besu = registry.for_network(2).await.unwrap();
        let err = besu.fabric().err().unwrap();
        assert_eq!(err.code(), "unsupported_platform");

        assert!(registry.for_network(3).await.is_err());
    }
}
