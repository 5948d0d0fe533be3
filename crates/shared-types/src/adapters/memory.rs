use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use zeroize::Zeroizing;

use crate::entities::{
    FabricOrganization, KeyId, Network, NetworkId, NetworkNode, NetworkNodeStatus, NodeId,
    NodeRole, OrganizationId, RegisteredNode,
};
use crate::errors::{KeyStoreError, StoreError};
use crate::ports::{KeyStore, RecordStore};

#[derive(Default)]
struct Tables {
    networks: HashMap<NetworkId, Network>,
    nodes: HashMap<NodeId, RegisteredNode>,
    // Keyed by (network, node) so listings come back in node-id order.
    network_nodes: BTreeMap<(NetworkId, NodeId), NetworkNode>,
    organizations: BTreeMap<OrganizationId, FabricOrganization>,
}

/// Every row of a record store, as plain lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordSnapshot {
    pub networks: Vec<Network>,
    pub nodes: Vec<RegisteredNode>,
    pub network_nodes: Vec<NetworkNode>,
    pub organizations: Vec<FabricOrganization>,
}

/// In-memory record store.
#[derive(Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<Tables>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: RecordSnapshot) -> Self {
        let store = Self::new();
        snapshot.networks.into_iter().for_each(|n| store.insert_network(n));
        snapshot.nodes.into_iter().for_each(|n| store.insert_node(n));
        snapshot
            .network_nodes
            .into_iter()
            .for_each(|row| store.insert_network_node(row));
        snapshot
            .organizations
            .into_iter()
            .for_each(|org| store.insert_organization(org));
        store
    }

    /// All rows, sorted by primary key.
    pub fn snapshot(&self) -> RecordSnapshot {
        let tables = self.tables.read();
        let mut networks: Vec<_> = tables.networks.values().cloned().collect();
        networks.sort_by_key(|n| n.id);
        let mut nodes: Vec<_> = tables.nodes.values().cloned().collect();
        nodes.sort_by_key(|n| n.id);
        RecordSnapshot {
            networks,
            nodes,
            network_nodes: tables.network_nodes.values().cloned().collect(),
            organizations: tables.organizations.values().cloned().collect(),
        }
    }

    pub fn insert_network(&self, network: Network) {
        self.tables.write().networks.insert(network.id, network);
    }

    pub fn insert_node(&self, node: RegisteredNode) {
        self.tables.write().nodes.insert(node.id, node);
    }

    pub fn insert_network_node(&self, row: NetworkNode) {
        self.tables
            .write()
            .network_nodes
            .insert((row.network_id, row.node_id), row);
    }

    pub fn insert_organization(&self, org: FabricOrganization) {
        self.tables.write().organizations.insert(org.id, org);
    }

    /// Snapshot of a network row (test helper).
    pub fn network(&self, id: NetworkId) -> Option<Network> {
        self.tables.read().networks.get(&id).cloned()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get_network(&self, id: NetworkId) -> Result<Network, StoreError> {
        self.tables
            .read()
            .networks
            .get(&id)
            .cloned()
            .ok_or(StoreError::NetworkNotFound(id))
    }

    async fn update_current_config_block(
        &self,
        id: NetworkId,
        block_b64: String,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let network = tables
            .networks
            .get_mut(&id)
            .ok_or(StoreError::NetworkNotFound(id))?;
        network.current_config_block_b64 = Some(block_b64);
        network.updated_at = Some(Utc::now());
        Ok(())
    }

    async fn get_node(&self, id: NodeId) -> Result<RegisteredNode, StoreError> {
        self.tables
            .read()
            .nodes
            .get(&id)
            .cloned()
            .ok_or(StoreError::NodeNotFound(id))
    }

    async fn list_network_nodes(
        &self,
        network_id: NetworkId,
    ) -> Result<Vec<NetworkNode>, StoreError> {
        Ok(self
            .tables
            .read()
            .network_nodes
            .range((network_id, NodeId::MIN)..=(network_id, NodeId::MAX))
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn get_network_node(
        &self,
        network_id: NetworkId,
        node_id: NodeId,
    ) -> Result<NetworkNode, StoreError> {
        self.tables
            .read()
            .network_nodes
            .get(&(network_id, node_id))
            .cloned()
            .ok_or(StoreError::NetworkNodeNotFound {
                network_id,
                node_id,
            })
    }

    async fn create_network_node(
        &self,
        network_id: NetworkId,
        node_id: NodeId,
        role: NodeRole,
    ) -> Result<NetworkNode, StoreError> {
        let mut tables = self.tables.write();
        if !tables.networks.contains_key(&network_id) {
            return Err(StoreError::NetworkNotFound(network_id));
        }
        if !tables.nodes.contains_key(&node_id) {
            return Err(StoreError::NodeNotFound(node_id));
        }
        if tables.network_nodes.contains_key(&(network_id, node_id)) {
            return Err(StoreError::NetworkNodeExists {
                network_id,
                node_id,
            });
        }
        let row = NetworkNode {
            network_id,
            node_id,
            role,
            status: NetworkNodeStatus::Pending,
        };
        tables
            .network_nodes
            .insert((network_id, node_id), row.clone());
        Ok(row)
    }

    async fn update_network_node_status(
        &self,
        network_id: NetworkId,
        node_id: NodeId,
        status: NetworkNodeStatus,
    ) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let row = tables
            .network_nodes
            .get_mut(&(network_id, node_id))
            .ok_or(StoreError::NetworkNodeNotFound {
                network_id,
                node_id,
            })?;
        row.status = status;
        Ok(())
    }

    async fn get_fabric_organization(
        &self,
        id: OrganizationId,
    ) -> Result<FabricOrganization, StoreError> {
        self.tables
            .read()
            .organizations
            .get(&id)
            .cloned()
            .ok_or(StoreError::OrganizationNotFound(id))
    }

    async fn list_fabric_organizations(&self) -> Result<Vec<FabricOrganization>, StoreError> {
        Ok(self.tables.read().organizations.values().cloned().collect())
    }
}

struct KeyEntry {
    private_pem: Zeroizing<String>,
    certificate_pem: Option<String>,
}

/// In-memory key store.
#[derive(Default)]
pub struct InMemoryKeyStore {
    keys: RwLock<HashMap<KeyId, KeyEntry>>,
}

impl InMemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key_id: KeyId, private_pem: &str, certificate_pem: Option<&str>) {
        self.keys.write().insert(
            key_id,
            KeyEntry {
                private_pem: Zeroizing::new(private_pem.to_string()),
                certificate_pem: certificate_pem.map(str::to_string),
            },
        );
    }
}

#[async_trait]
impl KeyStore for InMemoryKeyStore {
    async fn private_key_pem(&self, key_id: KeyId) -> Result<Zeroizing<String>, KeyStoreError> {
        self.keys
            .read()
            .get(&key_id)
            .map(|entry| entry.private_pem.clone())
            .ok_or(KeyStoreError::KeyNotFound(key_id))
    }

    async fn certificate_pem(&self, key_id: KeyId) -> Result<String, KeyStoreError> {
        let keys = self.keys.read();
        let entry = keys.get(&key_id).ok_or(KeyStoreError::KeyNotFound(key_id))?;
        entry
            .certificate_pem
            .clone()
            .ok_or(KeyStoreError::CertificateMissing(key_id))
    }
}
