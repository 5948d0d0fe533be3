//! JSON state-file record store.
//!
//! Rows are held in an `InMemoryRecordStore` and the whole snapshot is
//! rewritten after every mutation, atomically via a temp file.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::adapters::{InMemoryRecordStore, RecordSnapshot};
use shared_types::{
    FabricOrganization, Network, NetworkId, NetworkNode, NetworkNodeStatus, NodeId, NodeRole,
    OrganizationId, RecordStore, RegisteredNode, StoreError,
};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

fn io_error(path: &Path, e: impl std::fmt::Display) -> StoreError {
    StoreError::Database(format!("{}: {}", path.display(), e))
}

pub struct JsonStateStore {
    path: PathBuf,
    rows: InMemoryRecordStore,
    // Serializes snapshot writes.
    write_lock: Mutex<()>,
}

impl JsonStateStore {
    /// Open `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let snapshot = if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| io_error(&path, e))?;
            serde_json::from_str::<RecordSnapshot>(&content).map_err(|e| io_error(&path, e))?
        } else {
            RecordSnapshot::default()
        };
        debug!(
            path = %path.display(),
            networks = snapshot.networks.len(),
            nodes = snapshot.nodes.len(),
            "Opened state file"
        );
        Ok(Self {
            path,
            rows: InMemoryRecordStore::from_snapshot(snapshot),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let bytes = serde_json::to_vec_pretty(&self.rows.snapshot())
            .map_err(|e| io_error(&self.path, e))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&temp_path).map_err(|e| io_error(&temp_path, e))?;
        file.write_all(&bytes).map_err(|e| io_error(&temp_path, e))?;
        file.sync_all().map_err(|e| io_error(&temp_path, e))?;
        std::fs::rename(&temp_path, &self.path).map_err(|e| io_error(&self.path, e))
    }
}

#[async_trait]
impl RecordStore for JsonStateStore {
    async fn get_network(&self, id: NetworkId) -> Result<Network, StoreError> {
        self.rows.get_network(id).await
    }

    async fn update_current_config_block(
        &self,
        id: NetworkId,
        block_b64: String,
    ) -> Result<(), StoreError> {
        self.rows.update_current_config_block(id, block_b64).await?;
        self.persist()
    }

    async fn get_node(&self, id: NodeId) -> Result<RegisteredNode, StoreError> {
        self.rows.get_node(id).await
    }

    async fn list_network_nodes(
        &self,
        network_id: NetworkId,
    ) -> Result<Vec<NetworkNode>, StoreError> {
        self.rows.list_network_nodes(network_id).await
    }

    async fn get_network_node(
        &self,
        network_id: NetworkId,
        node_id: NodeId,
    ) -> Result<NetworkNode, StoreError> {
        self.rows.get_network_node(network_id, node_id).await
    }

    async fn create_network_node(
        &self,
        network_id: NetworkId,
        node_id: NodeId,
        role: NodeRole,
    ) -> Result<NetworkNode, StoreError> {
        let row = self.rows.create_network_node(network_id, node_id, role).await?;
        self.persist()?;
        Ok(row)
    }

    async fn update_network_node_status(
        &self,
        network_id: NetworkId,
        node_id: NodeId,
        status: NetworkNodeStatus,
    ) -> Result<(), StoreError> {
        self.rows
            .update_network_node_status(network_id, node_id, status)
            .await?;
        self.persist()
    }

    async fn get_fabric_organization(
        &self,
        id: OrganizationId,
    ) -> Result<FabricOrganization, StoreError> {
        self.rows.get_fabric_organization(id).await
    }

    async fn list_fabric_organizations(&self) -> Result<Vec<FabricOrganization>, StoreError> {
        self.rows.list_fabric_organizations().await
    }
}
