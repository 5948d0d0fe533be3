//! Organization MSP material and default org group layout.

use fcp_01_block_codec::config_values::{
    ADMINS_POLICY, ENDORSEMENT_POLICY, MSP_KEY, READERS_POLICY, WRITERS_POLICY,
};
use fcp_01_block_codec::parse_certificate_pem;
use fcp_01_block_codec::proto::common::{ConfigGroup, ConfigValue};
use fcp_01_block_codec::proto::msp::{
    FabricCryptoConfig, FabricMspConfig, FabricNodeOUs, FabricOuIdentifier, MspConfig,
    FABRIC_MSP_TYPE,
};
use prost::Message;

use super::errors::ConfigOpError;
use super::policy::signature_config_policy;

pub const CLIENT_OU: &str = "client";
pub const PEER_OU: &str = "peer";
pub const ADMIN_OU: &str = "admin";
pub const ORDERER_OU: &str = "orderer";

/// Certificates that make up an organization's MSP, all PEM.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MspMaterial {
    pub msp_id: String,
    pub root_certs: Vec<String>,
    pub tls_root_certs: Vec<String>,
    pub revocation_list: Vec<Vec<u8>>,
}

fn ou(certificate: &[u8], identifier: &str) -> Option<FabricOuIdentifier> {
    Some(FabricOuIdentifier {
        certificate: certificate.to_vec(),
        organizational_unit_identifier: identifier.to_string(),
    })
}

/// Build the `FabricMSPConfig` for `material`.
///
/// Every certificate is parsed as X.509 first; node OUs are keyed off the
/// first root certificate.
pub fn build_fabric_msp(material: &MspMaterial) -> Result<FabricMspConfig, ConfigOpError> {
    let first_root = material
        .root_certs
        .first()
        .ok_or_else(|| {
            ConfigOpError::validation("root_certs", "must contain at least one certificate")
        })?;

    for pem in material.root_certs.iter().chain(&material.tls_root_certs) {
        parse_certificate_pem(pem)?;
    }

    let signing_cert = first_root.as_bytes();
    Ok(FabricMspConfig {
        name: material.msp_id.clone(),
        root_certs: material.root_certs.iter().map(|c| c.as_bytes().to_vec()).collect(),
        tls_root_certs: material
            .tls_root_certs
            .iter()
            .map(|c| c.as_bytes().to_vec())
            .collect(),
        revocation_list: material.revocation_list.clone(),
        crypto_config: Some(FabricCryptoConfig {
            signature_hash_family: "SHA2".to_string(),
            identity_identifier_hash_function: "SHA256".to_string(),
        }),
        fabric_node_ous: Some(FabricNodeOUs {
            enable: true,
            client_ou_identifier: ou(signing_cert, CLIENT_OU),
            peer_ou_identifier: ou(signing_cert, PEER_OU),
            admin_ou_identifier: ou(signing_cert, ADMIN_OU),
            orderer_ou_identifier: ou(signing_cert, ORDERER_OU),
        }),
        ..Default::default()
    })
}

/// The `MSP` config value wrapping `msp`.
pub fn msp_value(msp: &FabricMspConfig) -> ConfigValue {
    ConfigValue {
        version: 0,
        value: MspConfig {
            r#type: FABRIC_MSP_TYPE,
            config: msp.encode_to_vec(),
        }
        .encode_to_vec(),
        mod_policy: ADMINS_POLICY.to_string(),
    }
}

/// Decode the `FabricMSPConfig` stored in an org group.
pub fn decode_fabric_msp(group: &ConfigGroup) -> Result<FabricMspConfig, ConfigOpError> {
    let msp: MspConfig = fcp_01_block_codec::config_values::decode_value(group, MSP_KEY)?;
    FabricMspConfig::decode(msp.config.as_slice()).map_err(|source| {
        ConfigOpError::Codec(fcp_01_block_codec::CodecError::Decode {
            message: "fabric msp config",
            source,
        })
    })
}

/// A fresh application org group with default MSP and policies:
/// `Admins = OR('<MSP>.admin')`, everything else `OR('<MSP>.member')`.
pub fn application_org_group(material: &MspMaterial) -> Result<ConfigGroup, ConfigOpError> {
    let msp = build_fabric_msp(material)?;
    let admin = format!("OR('{}.admin')", material.msp_id);
    let member = format!("OR('{}.member')", material.msp_id);

    let mut group = ConfigGroup {
        version: 0,
        mod_policy: ADMINS_POLICY.to_string(),
        ..Default::default()
    };
    group.values.insert(MSP_KEY.to_string(), msp_value(&msp));
    group.policies.insert(
        ADMINS_POLICY.to_string(),
        signature_config_policy(&admin, ADMINS_POLICY)?,
    );
    for name in [READERS_POLICY, WRITERS_POLICY, ENDORSEMENT_POLICY] {
        group
            .policies
            .insert(name.to_string(), signature_config_policy(&member, ADMINS_POLICY)?);
    }
    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fcp_01_block_codec::test_utils::generate_identity;

    fn material(msp_id: &str) -> MspMaterial {
        let ca = generate_identity("ca.org3.example.com");
        MspMaterial {
            msp_id: msp_id.to_string(),
            root_certs: vec![ca.cert_pem.clone()],
            tls_root_certs: vec![ca.cert_pem],
            revocation_list: vec![],
        }
    }

    #[test]
    fn test_node_ous_keyed_off_first_root() {
        let m = material("Org3MSP");
        let msp = build_fabric_msp(&m).unwrap();
        let ous = msp.fabric_node_ous.unwrap();
        assert!(ous.enable);
        let admin = ous.admin_ou_identifier.unwrap();
        assert_eq!(admin.organizational_unit_identifier, "admin");
        assert_eq!(admin.certificate, m.root_certs[0].as_bytes());
        assert_eq!(msp.crypto_config.unwrap().signature_hash_family, "SHA2");
    }

    #[test]
    fn test_org_group_has_standard_policies() {
        let group = application_org_group(&material("Org3MSP")).unwrap();
        let mut names: Vec<_> = group.policies.keys().cloned().collect();
        names.sort();
        assert_eq!(names, ["Admins", "Endorsement", "Readers", "Writers"]);
        assert_eq!(group.mod_policy, "Admins");
        assert_eq!(decode_fabric_msp(&group).unwrap().name, "Org3MSP");
    }

    #[test]
    fn test_unparseable_root_cert_rejected() {
        let mut m = material("Org3MSP");
        m.root_certs =
            vec!["-----BEGIN CERTIFICATE-----\nAAAA\n-----END CERTIFICATE-----\n".into()];
        assert!(matches!(
            build_fabric_msp(&m),
            Err(ConfigOpError::Codec(fcp_01_block_codec::CodecError::InvalidCertificate(_)))
        ));
    }
}
