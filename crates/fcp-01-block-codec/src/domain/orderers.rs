//! Orderer discovery from a configuration block.

use std::collections::HashMap;

use prost::Message;
use shared_types::OrdererInfo;
use tracing::debug;

use super::certs::certificate_bytes_to_pem;
use super::codec::config_from_block_bytes;
use super::config_values::{
    decode_value, orderer_endpoints, orderer_group, raft_metadata, ENDPOINTS_KEY, MSP_KEY,
};
use super::errors::CodecError;
use crate::proto::common::{Config, ConfigGroup, OrdererAddresses};
use crate::proto::msp::{FabricMspConfig, MspConfig};

/// `GetOrderersFromConfigBlock`: the orderers a config block advertises as
/// `host:port` plus TLS certificate PEM.
///
/// Fails with [`CodecError::NoConsenters`] when the block carries neither
/// raft consenters nor orderer endpoints.
pub fn get_orderers_from_config_block(block_bytes: &[u8]) -> Result<Vec<OrdererInfo>, CodecError> {
    let config = config_from_block_bytes(block_bytes)?;
    orderers_from_config(&config)
}

/// Raft consenters first; configs without any fall back to the advertised
/// orderer endpoints, trusted through their orderer org's TLS roots.
pub fn orderers_from_config(config: &Config) -> Result<Vec<OrdererInfo>, CodecError> {
    let metadata = raft_metadata(config)?;
    if metadata.consenters.is_empty() {
        return advertised_orderers(config);
    }

    let mut orderers = Vec::with_capacity(metadata.consenters.len());
    for consenter in &metadata.consenters {
        // Clients dial the consenter's server endpoint.
        let tls = if consenter.server_tls_cert.is_empty() {
            &consenter.client_tls_cert
        } else {
            &consenter.server_tls_cert
        };
        let url = format!("{}:{}", consenter.host, consenter.port);
        let pem = certificate_bytes_to_pem(tls)?;
        debug!(orderer = %url, "Found consenter in config block");
        orderers.push(OrdererInfo::new(url, pem));
    }
    Ok(orderers)
}

/// TLS root certificates of an org's MSP, concatenated as one PEM bundle.
fn tls_roots_pem(org: &ConfigGroup) -> Result<String, CodecError> {
    let msp: MspConfig = decode_value(org, MSP_KEY)?;
    let fabric = FabricMspConfig::decode(msp.config.as_slice()).map_err(|source| {
        CodecError::Decode {
            message: "fabric msp config",
            source,
        }
    })?;
    let mut bundle = String::new();
    for cert in &fabric.tls_root_certs {
        bundle.push_str(&certificate_bytes_to_pem(cert)?);
    }
    Ok(bundle)
}

fn advertised_orderers(config: &Config) -> Result<Vec<OrdererInfo>, CodecError> {
    let endpoints = orderer_endpoints(config)?;
    if endpoints.is_empty() {
        return Err(CodecError::NoConsenters);
    }

    // Channel-level addresses belong to no org and trust every orderer org.
    let mut org_roots: HashMap<String, String> = HashMap::new();
    let mut all_roots = String::new();
    for org in orderer_group(config)?.groups.values() {
        if !org.values.contains_key(MSP_KEY) {
            continue;
        }
        let roots = tls_roots_pem(org)?;
        if org.values.contains_key(ENDPOINTS_KEY) {
            let addrs: OrdererAddresses = decode_value(org, ENDPOINTS_KEY)?;
            for addr in addrs.addresses {
                org_roots.entry(addr).or_insert_with(|| roots.clone());
            }
        }
        all_roots.push_str(&roots);
    }

    let mut orderers = Vec::with_capacity(endpoints.len());
    for url in endpoints {
        let pem = org_roots.get(&url).unwrap_or(&all_roots);
        if pem.is_empty() {
            return Err(CodecError::InvalidCertificate(format!(
                "no TLS root certificate for orderer {url}"
            )));
        }
        debug!(orderer = %url, "Found advertised orderer endpoint in config block");
        orderers.push(OrdererInfo::new(url, pem.clone()));
    }
    Ok(orderers)
}
