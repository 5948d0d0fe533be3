//! Pure selection rules over registry rows and config-block orderers.

use shared_types::{NetworkNode, NodeRole, OrdererInfo, RegisteredNode};

/// An orderer usable from the node registry: joined, role orderer, with
/// deployment data and a non-empty endpoint.
pub fn registry_orderer(row: &NetworkNode, node: &RegisteredNode) -> Option<OrdererInfo> {
    if row.role != NodeRole::Orderer || !row.is_joined() {
        return None;
    }
    let deployment = node.deployment.as_ref()?;
    if deployment.external_endpoint.trim().is_empty() {
        return None;
    }
    Some(OrdererInfo::new(
        deployment.external_endpoint.trim(),
        deployment.tls_ca_cert.clone(),
    ))
}

/// Concatenate `primary` and `secondary`, dropping repeated URLs.
pub fn merge_candidates(
    primary: Vec<OrdererInfo>,
    secondary: Vec<OrdererInfo>,
) -> Vec<OrdererInfo> {
    let mut out: Vec<OrdererInfo> = Vec::with_capacity(primary.len() + secondary.len());
    for info in primary.into_iter().chain(secondary) {
        if !out.iter().any(|o| o.url == info.url) {
            out.push(info);
        }
    }
    out
}
