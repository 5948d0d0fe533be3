//! Organization-level operations on the application group.

use fcp_01_block_codec::config_values::{ANCHOR_PEERS_KEY, MSP_KEY};
use fcp_01_block_codec::parse_crl_pem;
use fcp_01_block_codec::proto::common::ConfigGroup;
use fcp_01_block_codec::proto::msp::FabricMspConfig;
use fcp_01_block_codec::proto::peer::{AnchorPeer, AnchorPeers};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{require_certs, require_port, require_text, ConfigOperation};
use crate::domain::configtx::{set_value, ConfigTx};
use crate::domain::errors::ConfigOpError;
use crate::domain::msp::{
    application_org_group, build_fabric_msp, decode_fabric_msp, msp_value, MspMaterial,
};

fn replace_msp_value(group: &mut ConfigGroup, msp: &FabricMspConfig) {
    let fresh = msp_value(msp);
    match group.values.get_mut(MSP_KEY) {
        Some(existing) => existing.value = fresh.value,
        None => {
            group.values.insert(MSP_KEY.to_string(), fresh);
        }
    }
}

/// `add_org`: register an organization in the application group.
///
/// An org that already exists is replaced by the default layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddOrg {
    pub msp_id: String,
    pub tls_root_certs: Vec<String>,
    pub root_certs: Vec<String>,
}

impl AddOrg {
    fn material(&self) -> MspMaterial {
        MspMaterial {
            msp_id: self.msp_id.clone(),
            root_certs: self.root_certs.clone(),
            tls_root_certs: self.tls_root_certs.clone(),
            revocation_list: Vec::new(),
        }
    }
}

impl ConfigOperation for AddOrg {
    fn name(&self) -> &'static str {
        "add_org"
    }

    fn validate(&self) -> Result<(), ConfigOpError> {
        require_text("msp_id", &self.msp_id)?;
        require_certs("tls_root_certs", &self.tls_root_certs)?;
        require_certs("root_certs", &self.root_certs)
    }

    fn modify(&self, tx: &mut ConfigTx) -> Result<(), ConfigOpError> {
        let group = application_org_group(&self.material())?;
        let application = tx.application_mut()?;
        if application.groups.insert(self.msp_id.clone(), group).is_some() {
            debug!(msp_id = %self.msp_id, "Replaced existing organization with defaults");
        } else {
            debug!(msp_id = %self.msp_id, "Added organization");
        }
        Ok(())
    }
}

/// `remove_org`: drop an organization from the application group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoveOrg {
    pub msp_id: String,
}

impl ConfigOperation for RemoveOrg {
    fn name(&self) -> &'static str {
        "remove_org"
    }

    fn validate(&self) -> Result<(), ConfigOpError> {
        require_text("msp_id", &self.msp_id)
    }

    fn modify(&self, tx: &mut ConfigTx) -> Result<(), ConfigOpError> {
        tx.application_mut()?
            .groups
            .remove(&self.msp_id)
            .ok_or_else(|| ConfigOpError::OrganizationNotFound(self.msp_id.clone()))?;
        debug!(msp_id = %self.msp_id, "Removed organization");
        Ok(())
    }
}

/// `update_org_msp`: re-apply MSP material for an existing org.
///
/// Policies are left alone; the current revocation list is carried over.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateOrgMsp {
    pub msp_id: String,
    pub tls_root_certs: Vec<String>,
    pub root_certs: Vec<String>,
}

impl ConfigOperation for UpdateOrgMsp {
    fn name(&self) -> &'static str {
        "update_org_msp"
    }

    fn validate(&self) -> Result<(), ConfigOpError> {
        require_text("msp_id", &self.msp_id)?;
        require_certs("tls_root_certs", &self.tls_root_certs)?;
        require_certs("root_certs", &self.root_certs)
    }

    fn modify(&self, tx: &mut ConfigTx) -> Result<(), ConfigOpError> {
        let group = tx.application_org_mut(&self.msp_id)?;
        let current = decode_fabric_msp(group)?;
        let msp = build_fabric_msp(&MspMaterial {
            msp_id: self.msp_id.clone(),
            root_certs: self.root_certs.clone(),
            tls_root_certs: self.tls_root_certs.clone(),
            revocation_list: current.revocation_list,
        })?;
        replace_msp_value(group, &msp);
        debug!(msp_id = %self.msp_id, "Updated organization MSP");
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorPeerSpec {
    pub host: String,
    pub port: u32,
}

/// `set_anchor_peers`: replace an org's anchor peer list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetAnchorPeers {
    pub msp_id: String,
    pub anchor_peers: Vec<AnchorPeerSpec>,
}

impl ConfigOperation for SetAnchorPeers {
    fn name(&self) -> &'static str {
        "set_anchor_peers"
    }

    fn validate(&self) -> Result<(), ConfigOpError> {
        require_text("msp_id", &self.msp_id)?;
        if self.anchor_peers.is_empty() {
            return Err(ConfigOpError::validation(
                "anchor_peers",
                "must contain at least one peer",
            ));
        }
        for (i, peer) in self.anchor_peers.iter().enumerate() {
            require_text(&format!("anchor_peers[{i}].host"), &peer.host)?;
            require_port(&format!("anchor_peers[{i}].port"), peer.port)?;
        }
        Ok(())
    }

    fn modify(&self, tx: &mut ConfigTx) -> Result<(), ConfigOpError> {
        let anchors = AnchorPeers {
            anchor_peers: self
                .anchor_peers
                .iter()
                .map(|p| AnchorPeer {
                    host: p.host.clone(),
                    // validated to fit in u16
                    port: p.port as i32,
                })
                .collect(),
        };
        let group = tx.application_org_mut(&self.msp_id)?;
        set_value(group, ANCHOR_PEERS_KEY, &anchors);
        debug!(msp_id = %self.msp_id, count = anchors.anchor_peers.len(), "Set anchor peers");
        Ok(())
    }
}

/// Replace an organization's certificate revocation list.
///
/// Not client-selectable; used by the CRL update entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevocationListUpdate {
    pub msp_id: String,
    /// PEM encoded `X509 CRL` blocks.
    pub revocation_list: Vec<String>,
}

impl ConfigOperation for RevocationListUpdate {
    fn name(&self) -> &'static str {
        "update_revocation_list"
    }

    fn validate(&self) -> Result<(), ConfigOpError> {
        require_text("msp_id", &self.msp_id)?;
        for (i, crl) in self.revocation_list.iter().enumerate() {
            require_text(&format!("revocation_list[{i}]"), crl)?;
        }
        Ok(())
    }

    fn modify(&self, tx: &mut ConfigTx) -> Result<(), ConfigOpError> {
        for crl in &self.revocation_list {
            parse_crl_pem(crl)?;
        }
        let group = tx.org_mut(&self.msp_id)?;
        let mut msp = decode_fabric_msp(group)?;
        msp.revocation_list = self
            .revocation_list
            .iter()
            .map(|c| c.as_bytes().to_vec())
            .collect();
        replace_msp_value(group, &msp);
        debug!(msp_id = %self.msp_id, crls = self.revocation_list.len(), "Updated revocation list");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcp_01_block_codec::config_values::application_group;
    use fcp_01_block_codec::test_utils::{generate_identity, ChannelFixture, FixtureOptions};
    use prost::Message;

    fn tx() -> ConfigTx {
        ConfigTx::new(ChannelFixture::new(FixtureOptions::default()).config)
    }

    fn add_org(msp_id: &str) -> AddOrg {
        let ca = generate_identity("ca.org3.example.com");
        AddOrg {
            msp_id: msp_id.to_string(),
            tls_root_certs: vec![ca.cert_pem.clone()],
            root_certs: vec![ca.cert_pem],
        }
    }

    #[test]
    fn test_add_org_validation_names_field() {
        let mut op = add_org("Org3MSP");
        op.msp_id.clear();
        assert_eq!(op.validate().unwrap_err().to_string(), "msp_id: is required");

        let mut op = add_org("Org3MSP");
        op.tls_root_certs.clear();
        assert!(op.validate().unwrap_err().to_string().starts_with("tls_root_certs"));

        let mut op = add_org("Org3MSP");
        op.root_certs = vec!["  ".into()];
        assert!(op.validate().unwrap_err().to_string().starts_with("root_certs[0]"));
    }

    #[test]
    fn test_add_then_remove() {
        let mut tx = tx();
        add_org("Org3MSP").modify(&mut tx).unwrap();
        assert!(tx.application_org("Org3MSP").is_some());

        RemoveOrg {
            msp_id: "Org3MSP".into(),
        }
        .modify(&mut tx)
        .unwrap();
        assert!(tx.application_org("Org3MSP").is_none());
    }

    #[test]
    fn test_remove_missing_org() {
        let mut tx = tx();
        let before = tx.clone();
        let err = RemoveOrg {
            msp_id: "Org9MSP".into(),
        }
        .modify(&mut tx)
        .unwrap_err();
        assert!(matches!(err, ConfigOpError::OrganizationNotFound(_)));
        assert_eq!(tx, before);
    }

    #[test]
    fn test_add_org_with_bad_pem_leaves_tx_untouched() {
        let mut tx = tx();
        let before = tx.clone();
        let mut op = add_org("Org3MSP");
        op.root_certs =
            vec!["-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n".into()];
        assert!(op.validate().is_ok());
        assert!(op.modify(&mut tx).is_err());
        assert_eq!(tx, before);
    }

    #[test]
    fn test_set_anchor_peers() {
        let mut tx = tx();
        let op = SetAnchorPeers {
            msp_id: "Org1MSP".into(),
            anchor_peers: vec![AnchorPeerSpec {
                host: "peer0.org1.example.com".into(),
                port: 7051,
            }],
        };
        op.validate().unwrap();
        op.modify(&mut tx).unwrap();

        let org1 = &application_group(tx.updated()).unwrap().groups["Org1MSP"];
        let anchors = AnchorPeers::decode(org1.values[ANCHOR_PEERS_KEY].value.as_slice()).unwrap();
        assert_eq!(anchors.anchor_peers.len(), 1);
        assert_eq!(anchors.anchor_peers[0].port, 7051);
    }

    #[test]
    fn test_set_anchor_peers_validation() {
        let op = SetAnchorPeers {
            msp_id: "Org1MSP".into(),
            anchor_peers: vec![],
        };
        assert!(op.validate().unwrap_err().to_string().starts_with("anchor_peers"));

        let op = SetAnchorPeers {
            msp_id: "Org1MSP".into(),
            anchor_peers: vec![AnchorPeerSpec {
                host: "peer0".into(),
                port: 0,
            }],
        };
        assert!(op
            .validate()
            .unwrap_err()
            .to_string()
            .starts_with("anchor_peers[0].port"));
    }

    #[test]
    fn test_update_org_msp_keeps_policies() {
        let mut tx = tx();
        let policies_before = tx.application_org("Org2MSP").unwrap().policies.clone();
        let ca = generate_identity("ca2.org2.example.com");
        UpdateOrgMsp {
            msp_id: "Org2MSP".into(),
            tls_root_certs: vec![ca.cert_pem.clone()],
            root_certs: vec![ca.cert_pem.clone()],
        }
        .modify(&mut tx)
        .unwrap();

        let org2 = tx.application_org("Org2MSP").unwrap();
        assert_eq!(org2.policies, policies_before);
        let msp = decode_fabric_msp(org2).unwrap();
        assert_eq!(msp.root_certs, vec![ca.cert_pem.into_bytes()]);
    }

    #[test]
    fn test_revocation_list_rejects_non_crl() {
        let mut tx = tx();
        let cert = generate_identity("ca.org1.example.com").cert_pem;
        let op = RevocationListUpdate {
            msp_id: "Org1MSP".into(),
            revocation_list: vec![cert],
        };
        assert!(op.validate().is_ok());
        assert!(op.modify(&mut tx).is_err());
    }

    #[test]
    fn test_empty_revocation_list_clears() {
        let mut tx = tx();
        let op = RevocationListUpdate {
            msp_id: "OrdererMSP".into(),
            revocation_list: vec![],
        };
        op.modify(&mut tx).unwrap();
        // The fixture carries no CRLs, so nothing changed.
        assert!(tx.compute_update("mychannel").is_err());
    }
}
