//! # Integration Harness
//!
//! One application channel (`mychannel`, network 1) wired through the real
//! [`ServiceContainer`] over in-memory and scripted ports:
//!
//! | Id | Record |
//! |----|--------|
//! | org 1, 2 | `Org1MSP`, `Org2MSP` with admin keys 10, 20 |
//! | node 100 | `peer0.org1.example.com:7051`, joined peer of org 1 |
//! | node 200 | `orderer0.example.com:7050`, joined orderer (optional) |
//!
//! The config block source serves the fixture's config block at every
//! consenter address, and the ledger holds a genesis block followed by
//! single-transaction data blocks.

use chrono::Utc;
use control_plane_runtime::{ControlPlaneConfig, Ports, ServiceContainer};
use fcp_01_block_codec::proto::common::Block;
use fcp_01_block_codec::test_utils::{
    config_block, data_block, endorser_transaction, ChannelFixture, FixtureOptions,
};
use fcp_03_orderer_resolver::{MockConfigBlockSource, ResolverConfig};
use fcp_04_config_proposer::ProposerConfig;
use fcp_05_signature_submitter::{MockOrdererBroadcaster, SubmitterConfig};
use fcp_06_network_deployer::{DeployerConfig, MockNodeManager, NetworkDeployer};
use fcp_07_block_query::domain::header_hash;
use fcp_07_block_query::{MockLedgerReader, QueryConfig};
use shared_types::adapters::{InMemoryKeyStore, InMemoryRecordStore, RecordingAuditSink};
use shared_types::{
    FabricOrganization, Network, NetworkId, NetworkNode, NetworkNodeStatus, NetworkStatus,
    NodeDeploymentConfig, NodeId, NodeRole, NodeType, Platform, RegisteredNode,
};
use std::sync::Arc;

pub const NETWORK: NetworkId = 1;
pub const CHANNEL: &str = "mychannel";
pub const PEER_NODE: NodeId = 100;
pub const ORDERER_NODE: NodeId = 200;
pub const ORDERER_URL: &str = "orderer0.example.com:7050";

/// What the harness seeds.
#[derive(Debug, Clone)]
pub struct HarnessOptions {
    pub fixture: FixtureOptions,
    /// Register node 200 as a joined orderer.
    pub registered_orderer: bool,
    /// Store the fixture block as the network's genesis block.
    pub genesis_block: bool,
    /// Ledger height served by the peer.
    pub ledger_height: u64,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            fixture: FixtureOptions::default(),
            registered_orderer: true,
            genesis_block: true,
            ledger_height: 4,
        }
    }
}

pub fn test_config() -> ControlPlaneConfig {
    ControlPlaneConfig {
        resolver: ResolverConfig::for_testing(),
        proposer: ProposerConfig::for_testing(),
        submitter: SubmitterConfig::for_testing(),
        deployer: DeployerConfig::for_testing(),
        query: QueryConfig::for_testing(),
        ..ControlPlaneConfig::default()
    }
}

/// Genesis config block followed by `height - 1` data blocks, each holding
/// transaction `tx-<n>`.
pub fn ledger(fixture: &ChannelFixture, height: u64) -> Vec<Block> {
    if height == 0 {
        return Vec::new();
    }
    let mut blocks = vec![config_block(CHANNEL, &fixture.config, 0)];
    for number in 1..height {
        let previous = blocks[number as usize - 1]
            .header
            .as_ref()
            .map(header_hash)
            .unwrap_or_default();
        let tx = endorser_transaction(CHANNEL, &format!("tx-{number}"), "Org1MSP", 100);
        blocks.push(data_block(number, previous, &[tx], 0));
    }
    blocks
}

pub struct Harness {
    pub fixture: ChannelFixture,
    pub store: Arc<InMemoryRecordStore>,
    pub source: Arc<MockConfigBlockSource>,
    pub broadcaster: Arc<MockOrdererBroadcaster>,
    pub ledger: Arc<MockLedgerReader>,
    pub nodes: Arc<MockNodeManager>,
    pub audit: Arc<RecordingAuditSink>,
    pub services: ServiceContainer,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_options(HarnessOptions::default())
    }

    pub fn with_options(options: HarnessOptions) -> Self {
        let fixture = ChannelFixture::new(options.fixture.clone());
        let store = Arc::new(InMemoryRecordStore::new());
        store.insert_network(Network {
            id: NETWORK,
            name: CHANNEL.into(),
            platform: Platform::Fabric,
            status: NetworkStatus::Running,
            genesis_block_b64: options.genesis_block.then(|| fixture.config_block_b64()),
            current_config_block_b64: None,
            config: serde_json::Value::Null,
            created_at: Utc::now(),
            updated_at: None,
        });

        let keys = Arc::new(InMemoryKeyStore::new());
        for (i, org) in fixture.orgs.iter().enumerate() {
            let id = i as i64 + 1;
            keys.insert(id * 10, &org.admin.key_pem, Some(&org.admin.cert_pem));
            store.insert_organization(FabricOrganization {
                id,
                msp_id: org.msp_id.clone(),
                sign_key_id: None,
                tls_root_key_id: None,
                admin_tls_key_id: None,
                admin_sign_key_id: Some(id * 10),
                client_sign_key_id: None,
            });
        }

        store.insert_node(RegisteredNode {
            id: PEER_NODE,
            name: "peer0-org1".into(),
            node_type: NodeType::Peer,
            organization_id: Some(1),
            deployment: Some(NodeDeploymentConfig {
                external_endpoint: "peer0.org1.example.com:7051".into(),
                tls_ca_cert: "CA".into(),
                msp_id: "Org1MSP".into(),
            }),
        });
        store.insert_network_node(NetworkNode {
            network_id: NETWORK,
            node_id: PEER_NODE,
            role: NodeRole::Peer,
            status: NetworkNodeStatus::Joined,
        });
        if options.registered_orderer {
            store.insert_node(RegisteredNode {
                id: ORDERER_NODE,
                name: "orderer0".into(),
                node_type: NodeType::Orderer,
                organization_id: None,
                deployment: Some(NodeDeploymentConfig {
                    external_endpoint: ORDERER_URL.into(),
                    tls_ca_cert: fixture
                        .consenters
                        .first()
                        .map(|c| c.tls_cert_pem.clone())
                        .unwrap_or_default(),
                    msp_id: "OrdererMSP".into(),
                }),
            });
            store.insert_network_node(NetworkNode {
                network_id: NETWORK,
                node_id: ORDERER_NODE,
                role: NodeRole::Orderer,
                status: NetworkNodeStatus::Joined,
            });
        }

        let source = Arc::new(MockConfigBlockSource::new());
        for consenter in &fixture.consenters {
            source.set_block(
                &format!("{}:{}", consenter.host, consenter.port),
                fixture.config_block_bytes(),
            );
        }
        let broadcaster = Arc::new(MockOrdererBroadcaster::new());
        let ledger = Arc::new(MockLedgerReader::new(ledger(&fixture, options.ledger_height)));
        let nodes = Arc::new(MockNodeManager::new());
        let audit = Arc::new(RecordingAuditSink::new());

        let services = ServiceContainer::new(
            &test_config(),
            Ports {
                store: store.clone(),
                keys,
                source: source.clone(),
                broadcaster: broadcaster.clone(),
                ledger: ledger.clone(),
                nodes: nodes.clone(),
                audit: audit.clone(),
            },
        );

        Self {
            fixture,
            store,
            source,
            broadcaster,
            ledger,
            nodes,
            audit,
            services,
        }
    }
}

impl Harness {
    /// Deployer of network 1; narrow with `.fabric()`.
    pub async fn deployer(&self) -> NetworkDeployer {
        self.services
            .deployers
            .for_network(NETWORK)
            .await
            .expect("network 1 is seeded")
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
