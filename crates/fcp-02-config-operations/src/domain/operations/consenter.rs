//! Raft consenter set operations. Consenters are matched by exact
//! `(host, port)`.

use fcp_01_block_codec::parse_certificate_pem;
use fcp_01_block_codec::proto::orderer::etcdraft::Consenter;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{require_port, require_text, ConfigOperation};
use crate::domain::configtx::ConfigTx;
use crate::domain::errors::ConfigOpError;

fn position(consenters: &[Consenter], host: &str, port: u32) -> Option<usize> {
    consenters
        .iter()
        .position(|c| c.host == host && c.port == port)
}

fn tls_bytes(client_pem: &str, server_pem: &str) -> Result<(Vec<u8>, Vec<u8>), ConfigOpError> {
    parse_certificate_pem(client_pem)?;
    parse_certificate_pem(server_pem)?;
    Ok((
        client_pem.as_bytes().to_vec(),
        server_pem.as_bytes().to_vec(),
    ))
}

/// `add_consenter`: append a consenter to the raft set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddConsenter {
    pub host: String,
    pub port: u32,
    pub client_tls_cert: String,
    pub server_tls_cert: String,
}

impl ConfigOperation for AddConsenter {
    fn name(&self) -> &'static str {
        "add_consenter"
    }

    fn validate(&self) -> Result<(), ConfigOpError> {
        require_text("host", &self.host)?;
        require_port("port", self.port)?;
        require_text("client_tls_cert", &self.client_tls_cert)?;
        require_text("server_tls_cert", &self.server_tls_cert)
    }

    fn modify(&self, tx: &mut ConfigTx) -> Result<(), ConfigOpError> {
        let (client_tls_cert, server_tls_cert) =
            tls_bytes(&self.client_tls_cert, &self.server_tls_cert)?;
        let mut metadata = tx.raft_metadata()?;
        if position(&metadata.consenters, &self.host, self.port).is_some() {
            return Err(ConfigOpError::ConsenterExists {
                host: self.host.clone(),
                port: self.port,
            });
        }
        metadata.consenters.push(Consenter {
            host: self.host.clone(),
            port: self.port,
            client_tls_cert,
            server_tls_cert,
        });
        tx.set_raft_metadata(&metadata)?;
        debug!(host = %self.host, port = self.port, "Added consenter");
        Ok(())
    }
}

/// `remove_consenter`: drop the consenter at `(host, port)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoveConsenter {
    pub host: String,
    pub port: u32,
}

impl ConfigOperation for RemoveConsenter {
    fn name(&self) -> &'static str {
        "remove_consenter"
    }

    fn validate(&self) -> Result<(), ConfigOpError> {
        require_text("host", &self.host)?;
        require_port("port", self.port)
    }

    fn modify(&self, tx: &mut ConfigTx) -> Result<(), ConfigOpError> {
        let mut metadata = tx.raft_metadata()?;
        let index = position(&metadata.consenters, &self.host, self.port).ok_or_else(|| {
            ConfigOpError::ConsenterNotFound {
                host: self.host.clone(),
                port: self.port,
            }
        })?;
        metadata.consenters.remove(index);
        tx.set_raft_metadata(&metadata)?;
        debug!(host = %self.host, port = self.port, "Removed consenter");
        Ok(())
    }
}

/// `update_consenter`: rewrite the address and certificates of the consenter
/// at `(host, port)` in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConsenter {
    pub host: String,
    pub port: u32,
    pub new_host: String,
    pub new_port: u32,
    pub client_tls_cert: String,
    pub server_tls_cert: String,
}

impl ConfigOperation for UpdateConsenter {
    fn name(&self) -> &'static str {
        "update_consenter"
    }

    fn validate(&self) -> Result<(), ConfigOpError> {
        require_text("host", &self.host)?;
        require_port("port", self.port)?;
        require_text("new_host", &self.new_host)?;
        require_port("new_port", self.new_port)?;
        require_text("client_tls_cert", &self.client_tls_cert)?;
        require_text("server_tls_cert", &self.server_tls_cert)
    }

    fn modify(&self, tx: &mut ConfigTx) -> Result<(), ConfigOpError> {
        let (client_tls_cert, server_tls_cert) =
            tls_bytes(&self.client_tls_cert, &self.server_tls_cert)?;
        let mut metadata = tx.raft_metadata()?;
        let index = position(&metadata.consenters, &self.host, self.port).ok_or_else(|| {
            ConfigOpError::ConsenterNotFound {
                host: self.host.clone(),
                port: self.port,
            }
        })?;
        let moved = self.host != self.new_host || self.port != self.new_port;
        if moved && position(&metadata.consenters, &self.new_host, self.new_port).is_some() {
            return Err(ConfigOpError::ConsenterExists {
                host: self.new_host.clone(),
                port: self.new_port,
            });
        }
        metadata.consenters[index] = Consenter {
            host: self.new_host.clone(),
            port: self.new_port,
            client_tls_cert,
            server_tls_cert,
        };
        tx.set_raft_metadata(&metadata)?;
        debug!(
            host = %self.host,
            port = self.port,
            new_host = %self.new_host,
            new_port = self.new_port,
            "Updated consenter"
        );
        Ok(())
    }
}
