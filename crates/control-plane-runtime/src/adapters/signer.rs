//! Admin identities used to sign Deliver requests.

use fcp_05_signature_submitter::{load_admin_identity, SigningIdentity};
use shared_types::{KeyStore, RecordStore, TransportError};
use std::sync::Arc;

/// Picks the managed organization whose admin signs a seek request.
pub struct AdminSigner {
    store: Arc<dyn RecordStore>,
    keys: Arc<dyn KeyStore>,
    default_msp_id: Option<String>,
}

impl AdminSigner {
    pub fn new(
        store: Arc<dyn RecordStore>,
        keys: Arc<dyn KeyStore>,
        default_msp_id: Option<String>,
    ) -> Self {
        Self {
            store,
            keys,
            default_msp_id,
        }
    }

    /// Admin of `msp_id`, else of the configured default organization, else
    /// of the first managed organization by MSP ID.
    pub async fn identity(
        &self,
        endpoint: &str,
        msp_id: Option<&str>,
    ) -> Result<SigningIdentity, TransportError> {
        let failed = |message: String| TransportError::Protocol {
            endpoint: endpoint.to_string(),
            message,
        };
        let mut orgs = self
            .store
            .list_fabric_organizations()
            .await
            .map_err(|e| failed(e.to_string()))?;
        orgs.sort_by(|a, b| a.msp_id.cmp(&b.msp_id));

        let wanted = msp_id.or(self.default_msp_id.as_deref());
        let org = match wanted {
            Some(wanted) => orgs.iter().find(|o| o.msp_id == wanted),
            None => orgs.first(),
        }
        .ok_or_else(|| {
            failed(format!(
                "no managed organization to sign with ({})",
                wanted.unwrap_or("none configured")
            ))
        })?;

        load_admin_identity(self.keys.as_ref(), org)
            .await
            .map_err(|e| failed(format!("signing identity for {}: {}", org.msp_id, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcp_01_block_codec::test_utils::generate_identity;
    use shared_types::adapters::{InMemoryKeyStore, InMemoryRecordStore};
    use shared_types::FabricOrganization;

    fn signer(default_msp_id: Option<&str>) -> AdminSigner {
        let store = Arc::new(InMemoryRecordStore::new());
        let keys = Arc::new(InMemoryKeyStore::new());
        for (id, msp_id) in [(1, "Org2MSP"), (2, "Org1MSP")] {
            let generated = generate_identity(msp_id);
            keys.insert(id * 10, &generated.key_pem, Some(&generated.cert_pem));
            store.insert_organization(FabricOrganization {
                id,
                msp_id: msp_id.into(),
                sign_key_id: None,
                tls_root_key_id: None,
                admin_tls_key_id: None,
                admin_sign_key_id: Some(id * 10),
                client_sign_key_id: None,
            });
        }
        AdminSigner::new(store, keys, default_msp_id.map(str::to_string))
    }

    #[tokio::test]
    async fn test_identity_selection() {
        let first = signer(None).identity("orderer:7050", None).await.unwrap();
        assert_eq!(first.msp_id(), "Org1MSP");

        let configured = signer(Some("Org2MSP"));
        assert_eq!(
            configured.identity("o", None).await.unwrap().msp_id(),
            "Org2MSP"
        );
        assert_eq!(
            configured.identity("o", Some("Org1MSP")).await.unwrap().msp_id(),
            "Org1MSP"
        );
    }

    #[tokio::test]
    async fn test_unknown_msp_is_protocol_error() {
        let err = signer(None).identity("peer0:7051", Some("Org9MSP")).await;
        assert!(matches!(err, Err(TransportError::Protocol { .. })));
    }
}
