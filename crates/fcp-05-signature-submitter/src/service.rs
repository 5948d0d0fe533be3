//! Signature Collector & Submitter Service
//!
//! ```text
//! unsigned envelope
//!   └── for org in managed orgs (sorted by MSP ID):
//!         load admin identity ──→ append ConfigSignature
//!   └── sign outer envelope (first signer)
//!   └── resolve orderer ──→ Broadcast ──→ status
//! ```
//!
//! Signing is all-or-nothing: one failing organization aborts the update
//! before anything reaches the orderer.

use fcp_01_block_codec::proto::common::Envelope;
use fcp_03_orderer_resolver::OrdererResolver;
use serde::{Deserialize, Serialize};
use shared_types::{FabricOrganization, KeyStore, NetworkId, RecordStore, TransportError};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{
    add_config_signature, sign_envelope, IdentityError, SigningIdentity, SubmitterConfig,
    SubmitterError,
};
use crate::ports::OrdererBroadcaster;

/// Build the admin signing identity of `org`. The private key is fetched
/// from the key store for this call only.
pub async fn load_admin_identity(
    keys: &dyn KeyStore,
    org: &FabricOrganization,
) -> Result<SigningIdentity, IdentityError> {
    let key_id = org
        .admin_sign_key_id
        .ok_or_else(|| IdentityError::MissingAdminSignKey {
            msp_id: org.msp_id.clone(),
        })?;
    let cert_pem = keys.certificate_pem(key_id).await?;
    let key_pem = keys.private_key_pem(key_id).await?;
    SigningIdentity::from_pem(&org.msp_id, &cert_pem, &key_pem)
}

/// A fully signed CONFIG_UPDATE envelope, ready to broadcast.
#[derive(Debug, Clone)]
pub struct SignedConfigUpdate {
    pub envelope: Envelope,
    /// MSP IDs whose signatures were attached, in signing order.
    pub signers: Vec<String>,
}

/// Result of a broadcast the orderer accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    /// Raw broadcast status (`SUCCESS`), used as the transaction reference.
    pub status: String,
    pub orderer: String,
    pub signers: Vec<String>,
}

pub struct ConfigUpdateSubmitter {
    store: Arc<dyn RecordStore>,
    keys: Arc<dyn KeyStore>,
    resolver: Arc<OrdererResolver>,
    broadcaster: Arc<dyn OrdererBroadcaster>,
    config: SubmitterConfig,
}

impl ConfigUpdateSubmitter {
    pub fn new(
        store: Arc<dyn RecordStore>,
        keys: Arc<dyn KeyStore>,
        resolver: Arc<OrdererResolver>,
        broadcaster: Arc<dyn OrdererBroadcaster>,
        config: SubmitterConfig,
    ) -> Self {
        Self {
            store,
            keys,
            resolver,
            broadcaster,
            config,
        }
    }

    /// Attach one config signature per managed organization, then sign the
    /// outer envelope with the first signer.
    pub async fn collect_signatures(
        &self,
        envelope: &[u8],
    ) -> Result<SignedConfigUpdate, SubmitterError> {
        let mut orgs = self.store.list_fabric_organizations().await?;
        orgs.sort_by(|a, b| a.msp_id.cmp(&b.msp_id));

        let mut pending = envelope.to_vec();
        let mut first: Option<SigningIdentity> = None;
        let mut signers = Vec::with_capacity(orgs.len());
        for org in &orgs {
            let identity = load_admin_identity(self.keys.as_ref(), org)
                .await
                .map_err(|source| {
                    warn!(msp_id = %org.msp_id, error = %source, "Signing aborted");
                    SubmitterError::FailedToSignConfigUpdate {
                        msp_id: org.msp_id.clone(),
                        source,
                    }
                })?;
            pending = add_config_signature(&pending, &identity)?;
            debug!(msp_id = %org.msp_id, "Attached config signature");
            signers.push(org.msp_id.clone());
            if first.is_none() {
                first = Some(identity);
            }
        }

        let first = first.ok_or(SubmitterError::NoSigners)?;
        let envelope = sign_envelope(&pending, &first)?;
        Ok(SignedConfigUpdate { envelope, signers })
    }

    /// Broadcast an already signed envelope to the network's orderer.
    pub async fn broadcast(
        &self,
        network_id: NetworkId,
        signed: SignedConfigUpdate,
    ) -> Result<SubmissionResult, SubmitterError> {
        let orderer = self.resolver.resolve_orderer(network_id).await?;
        let timeout = self.config.broadcast_timeout();
        let status =
            tokio::time::timeout(timeout, self.broadcaster.broadcast(&orderer, signed.envelope))
                .await
                .map_err(|_| TransportError::timeout(&orderer.url, timeout))??;

        if !status.is_success() {
            warn!(
                network_id,
                orderer = %orderer.url,
                status = %status.status_name(),
                info = %status.info,
                "Broadcast rejected"
            );
            return Err(SubmitterError::Rejected {
                orderer: orderer.url,
                status: status.status_name(),
                info: status.info,
            });
        }

        info!(
            network_id,
            orderer = %orderer.url,
            signers = signed.signers.len(),
            "Config update accepted by orderer"
        );
        Ok(SubmissionResult {
            status: status.status_name(),
            orderer: orderer.url,
            signers: signed.signers,
        })
    }

    /// `SubmitConfigUpdate`: sign for every managed organization and
    /// broadcast. Acceptance is not commitment.
    pub async fn submit(
        &self,
        network_id: NetworkId,
        envelope: &[u8],
    ) -> Result<SubmissionResult, SubmitterError> {
        let signed = self.collect_signatures(envelope).await?;
        self.broadcast(network_id, signed).await
    }
}
