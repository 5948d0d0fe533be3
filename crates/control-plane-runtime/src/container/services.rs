//! # Service Container
//!
//! Builds every pipeline service once over one set of adapters.

use fcp_03_orderer_resolver::ConfigBlockSource;
use fcp_05_signature_submitter::OrdererBroadcaster;
use fcp_06_network_deployer::{ConfigPipeline, DeployerRegistry, FabricDeployer, NodeManager};
use fcp_07_block_query::{BlockQueryService, LedgerReader};
use shared_types::adapters::TracingAuditSink;
use shared_types::{AuditSink, KeyStore, RecordStore, StoreError};
use std::sync::Arc;
use tracing::info;

use super::config::ControlPlaneConfig;
use crate::adapters::{
    AdminSigner, GrpcBroadcaster, GrpcConfigBlockSource, GrpcLedgerReader, JsonStateStore,
    PemDirKeyStore, UnmanagedNodes,
};

/// Outbound ports the services are wired over.
pub struct Ports {
    pub store: Arc<dyn RecordStore>,
    pub keys: Arc<dyn KeyStore>,
    pub source: Arc<dyn ConfigBlockSource>,
    pub broadcaster: Arc<dyn OrdererBroadcaster>,
    pub ledger: Arc<dyn LedgerReader>,
    pub nodes: Arc<dyn NodeManager>,
    pub audit: Arc<dyn AuditSink>,
}

impl Ports {
    /// State file, key directory and gRPC clients from `config`.
    pub fn production(config: &ControlPlaneConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn RecordStore> =
            Arc::new(JsonStateStore::open(&config.storage.state_file)?);
        let keys: Arc<dyn KeyStore> = Arc::new(PemDirKeyStore::new(&config.storage.key_dir));
        let signer = Arc::new(AdminSigner::new(
            store.clone(),
            keys.clone(),
            config.grpc.signer_msp_id.clone(),
        ));
        let connect_timeout = config.grpc.connect_timeout();
        Ok(Self {
            source: Arc::new(GrpcConfigBlockSource::new(signer.clone(), connect_timeout)),
            broadcaster: Arc::new(GrpcBroadcaster::new(connect_timeout)),
            ledger: Arc::new(GrpcLedgerReader::new(signer, connect_timeout)),
            nodes: Arc::new(UnmanagedNodes),
            audit: Arc::new(TracingAuditSink),
            store,
            keys,
        })
    }
}

pub struct ServiceContainer {
    pub deployers: DeployerRegistry,
    pub query: BlockQueryService,
}

impl ServiceContainer {
    pub fn new(config: &ControlPlaneConfig, ports: Ports) -> Self {
        let pipeline = ConfigPipeline::new(
            ports.store.clone(),
            ports.keys,
            ports.source,
            ports.broadcaster,
            config.pipeline(),
        );
        let fabric = Arc::new(FabricDeployer::new(
            ports.store.clone(),
            pipeline,
            ports.nodes,
            ports.audit,
            config.deployer.clone(),
        ));
        let deployers = DeployerRegistry::new(ports.store.clone(), fabric);
        let query = BlockQueryService::new(ports.store, ports.ledger, config.query.clone());
        info!("Control plane services initialized");
        Self { deployers, query }
    }
}
