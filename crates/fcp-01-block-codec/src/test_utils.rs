//! Fixture builders: realistic channel config blocks and ledger blocks backed
//! by freshly generated X.509 material.

use prost::Message;

use crate::domain::config_values::*;
use crate::proto::common::{
    signature_policy, Block, BlockData, BlockHeader, BlockMetadata, ChannelHeader, Config,
    ConfigEnvelope, ConfigGroup, ConfigPolicy, ConfigValue, Envelope, Header, HeaderType,
    ImplicitMetaPolicy, LastConfig, Metadata, OrdererAddresses, OrdererBlockMetadata, Payload,
    Policy, PolicyType, SignatureHeader, SignaturePolicy, SignaturePolicyEnvelope,
};
use crate::proto::common::implicit_meta_policy::Rule;
use crate::proto::msp::{
    msp_principal, msp_role, FabricCryptoConfig, FabricMspConfig, MspConfig, MspPrincipal, MspRole,
    SerializedIdentity, FABRIC_MSP_TYPE,
};
use crate::proto::orderer::{
    etcdraft, BatchSize, BatchTimeout, ConsensusType, ETCDRAFT_CONSENSUS_TYPE,
};

/// A certificate and its PKCS#8 private key, both PEM.
#[derive(Debug, Clone)]
pub struct GeneratedIdentity {
    pub cert_pem: String,
    pub key_pem: String,
}

/// Generate a self-signed P-256 certificate for `common_name`.
pub fn generate_identity(common_name: &str) -> GeneratedIdentity {
    let certified = rcgen::generate_simple_self_signed(vec![common_name.to_string()])
        .expect("rcgen self-signed certificate");
    GeneratedIdentity {
        cert_pem: certified.cert.pem(),
        key_pem: certified.key_pair.serialize_pem(),
    }
}

#[derive(Debug, Clone)]
pub struct FixtureOrg {
    pub msp_id: String,
    pub ca: GeneratedIdentity,
    pub admin: GeneratedIdentity,
}

#[derive(Debug, Clone)]
pub struct FixtureConsenter {
    pub host: String,
    pub port: u32,
    pub tls_cert_pem: String,
}

#[derive(Debug, Clone)]
pub struct FixtureOptions {
    pub channel: String,
    pub app_orgs: Vec<String>,
    pub consenters: usize,
    pub sequence: u64,
    pub block_number: u64,
}

impl Default for FixtureOptions {
    fn default() -> Self {
        Self {
            channel: "mychannel".to_string(),
            app_orgs: vec!["Org1MSP".to_string(), "Org2MSP".to_string()],
            consenters: 3,
            sequence: 1,
            block_number: 0,
        }
    }
}

/// A two-org application channel with a raft ordering service.
#[derive(Debug, Clone)]
pub struct ChannelFixture {
    pub options: FixtureOptions,
    pub orgs: Vec<FixtureOrg>,
    pub orderer_org: FixtureOrg,
    pub consenters: Vec<FixtureConsenter>,
    pub config: Config,
}

impl ChannelFixture {
    pub fn new(options: FixtureOptions) -> Self {
        let orgs: Vec<FixtureOrg> = options.app_orgs.iter().map(|m| fixture_org(m)).collect();
        let orderer_org = fixture_org("OrdererMSP");
        let consenters: Vec<FixtureConsenter> = (0..options.consenters)
            .map(|i| {
                let host = format!("orderer{i}.example.com");
                FixtureConsenter {
                    tls_cert_pem: generate_identity(&host).cert_pem,
                    host,
                    port: 7050,
                }
            })
            .collect();

        let config = Config {
            sequence: options.sequence,
            channel_group: Some(channel_group(&orgs, &orderer_org, &consenters)),
        };

        Self {
            options,
            orgs,
            orderer_org,
            consenters,
            config,
        }
    }

    /// Replace the orderer org's `Endpoints` value.
    pub fn with_orderer_endpoints(mut self, endpoints: &[&str]) -> Self {
        let addresses = endpoints.iter().map(|e| e.to_string()).collect();
        let msp_id = self.orderer_org.msp_id.clone();
        if let Some(org) = self
            .config
            .channel_group
            .as_mut()
            .and_then(|c| c.groups.get_mut(ORDERER_GROUP))
            .and_then(|o| o.groups.get_mut(&msp_id))
        {
            org.values
                .insert(ENDPOINTS_KEY.into(), value(&OrdererAddresses { addresses }));
        }
        self
    }

    pub fn org(&self, msp_id: &str) -> Option<&FixtureOrg> {
        self.orgs.iter().find(|o| o.msp_id == msp_id)
    }

    pub fn config_block(&self) -> Block {
        config_block(&self.options.channel, &self.config, self.options.block_number)
    }

    pub fn config_block_bytes(&self) -> Vec<u8> {
        self.config_block().encode_to_vec()
    }

    pub fn config_block_b64(&self) -> String {
        crate::domain::codec::block_bytes_to_b64(&self.config_block_bytes())
    }
}

fn fixture_org(msp_id: &str) -> FixtureOrg {
    let lower = msp_id.trim_end_matches("MSP").to_lowercase();
    FixtureOrg {
        msp_id: msp_id.to_string(),
        ca: generate_identity(&format!("ca.{lower}.example.com")),
        admin: generate_identity(&format!("admin.{lower}.example.com")),
    }
}

fn value<M: Message>(m: &M) -> ConfigValue {
    ConfigValue {
        version: 0,
        value: m.encode_to_vec(),
        mod_policy: ADMINS_POLICY.to_string(),
    }
}

fn signed_by_role(msp_id: &str, role: msp_role::MspRoleType) -> ConfigPolicy {
    let principal = MspPrincipal {
        principal_classification: msp_principal::Classification::Role as i32,
        principal: MspRole {
            msp_identifier: msp_id.to_string(),
            role: role as i32,
        }
        .encode_to_vec(),
    };
    let envelope = SignaturePolicyEnvelope {
        version: 0,
        rule: Some(SignaturePolicy {
            r#type: Some(signature_policy::Type::NOutOf(signature_policy::NOutOf {
                n: 1,
                rules: vec![SignaturePolicy {
                    r#type: Some(signature_policy::Type::SignedBy(0)),
                }],
            })),
        }),
        identities: vec![principal],
    };
    ConfigPolicy {
        version: 0,
        policy: Some(Policy {
            r#type: PolicyType::Signature as i32,
            value: envelope.encode_to_vec(),
        }),
        mod_policy: ADMINS_POLICY.to_string(),
    }
}

fn implicit_meta(sub_policy: &str, rule: Rule) -> ConfigPolicy {
    ConfigPolicy {
        version: 0,
        policy: Some(Policy {
            r#type: PolicyType::ImplicitMeta as i32,
            value: ImplicitMetaPolicy {
                sub_policy: sub_policy.to_string(),
                rule: rule as i32,
            }
            .encode_to_vec(),
        }),
        mod_policy: ADMINS_POLICY.to_string(),
    }
}

fn meta_policies(group: &mut ConfigGroup) {
    group.policies.insert(ADMINS_POLICY.into(), implicit_meta(ADMINS_POLICY, Rule::Majority));
    group.policies.insert(READERS_POLICY.into(), implicit_meta(READERS_POLICY, Rule::Any));
    group.policies.insert(WRITERS_POLICY.into(), implicit_meta(WRITERS_POLICY, Rule::Any));
}

fn org_group(org: &FixtureOrg) -> ConfigGroup {
    let msp = FabricMspConfig {
        name: org.msp_id.clone(),
        root_certs: vec![org.ca.cert_pem.clone().into_bytes()],
        tls_root_certs: vec![org.ca.cert_pem.clone().into_bytes()],
        admins: vec![org.admin.cert_pem.clone().into_bytes()],
        crypto_config: Some(FabricCryptoConfig {
            signature_hash_family: "SHA2".to_string(),
            identity_identifier_hash_function: "SHA256".to_string(),
        }),
        ..Default::default()
    };
    let mut group = ConfigGroup {
        mod_policy: ADMINS_POLICY.to_string(),
        ..Default::default()
    };
    group.values.insert(
        MSP_KEY.into(),
        value(&MspConfig {
            r#type: FABRIC_MSP_TYPE,
            config: msp.encode_to_vec(),
        }),
    );
    group.policies.insert(
        ADMINS_POLICY.into(),
        signed_by_role(&org.msp_id, msp_role::MspRoleType::Admin),
    );
    for name in [READERS_POLICY, WRITERS_POLICY] {
        group.policies.insert(
            name.into(),
            signed_by_role(&org.msp_id, msp_role::MspRoleType::Member),
        );
    }
    group
}

fn channel_group(
    orgs: &[FixtureOrg],
    orderer_org: &FixtureOrg,
    consenters: &[FixtureConsenter],
) -> ConfigGroup {
    let mut application = ConfigGroup {
        mod_policy: ADMINS_POLICY.to_string(),
        ..Default::default()
    };
    meta_policies(&mut application);
    for org in orgs {
        let mut group = org_group(org);
        group.policies.insert(
            ENDORSEMENT_POLICY.into(),
            signed_by_role(&org.msp_id, msp_role::MspRoleType::Member),
        );
        application.groups.insert(org.msp_id.clone(), group);
    }

    let raft = etcdraft::ConfigMetadata {
        consenters: consenters
            .iter()
            .map(|c| etcdraft::Consenter {
                host: c.host.clone(),
                port: c.port,
                client_tls_cert: c.tls_cert_pem.clone().into_bytes(),
                server_tls_cert: c.tls_cert_pem.clone().into_bytes(),
            })
            .collect(),
        options: Some(etcdraft::Options {
            tick_interval: "500ms".to_string(),
            election_tick: 10,
            heartbeat_tick: 1,
            max_inflight_blocks: 5,
            snapshot_interval_size: 16 * 1024 * 1024,
        }),
    };
    let endpoints: Vec<String> = consenters
        .iter()
        .map(|c| format!("{}:{}", c.host, c.port))
        .collect();

    let mut orderer_org_group = org_group(orderer_org);
    orderer_org_group.values.insert(
        ENDPOINTS_KEY.into(),
        value(&OrdererAddresses {
            addresses: endpoints,
        }),
    );

    let mut orderer = ConfigGroup {
        mod_policy: ADMINS_POLICY.to_string(),
        ..Default::default()
    };
    meta_policies(&mut orderer);
    orderer.values.insert(
        CONSENSUS_TYPE_KEY.into(),
        value(&ConsensusType {
            r#type: ETCDRAFT_CONSENSUS_TYPE.to_string(),
            metadata: raft.encode_to_vec(),
            state: 0,
        }),
    );
    orderer.values.insert(
        BATCH_SIZE_KEY.into(),
        value(&BatchSize {
            max_message_count: 10,
            absolute_max_bytes: 99 * 1024 * 1024,
            preferred_max_bytes: 512 * 1024,
        }),
    );
    orderer.values.insert(
        BATCH_TIMEOUT_KEY.into(),
        value(&BatchTimeout {
            timeout: "2s".to_string(),
        }),
    );
    orderer
        .groups
        .insert(orderer_org.msp_id.clone(), orderer_org_group);

    let mut channel = ConfigGroup {
        mod_policy: ADMINS_POLICY.to_string(),
        ..Default::default()
    };
    meta_policies(&mut channel);
    channel.groups.insert(APPLICATION_GROUP.into(), application);
    channel.groups.insert(ORDERER_GROUP.into(), orderer);
    channel
}

fn envelope(
    channel: &str,
    header_type: HeaderType,
    tx_id: &str,
    creator: Vec<u8>,
    data: Vec<u8>,
    seconds: i64,
) -> Envelope {
    let channel_header = ChannelHeader {
        r#type: header_type as i32,
        channel_id: channel.to_string(),
        tx_id: tx_id.to_string(),
        timestamp: Some(prost_types::Timestamp { seconds, nanos: 0 }),
        ..Default::default()
    };
    let signature_header = SignatureHeader {
        creator,
        nonce: vec![7; 24],
    };
    let payload = Payload {
        header: Some(Header {
            channel_header: channel_header.encode_to_vec(),
            signature_header: signature_header.encode_to_vec(),
        }),
        data,
    };
    Envelope {
        payload: payload.encode_to_vec(),
        signature: vec![],
    }
}

fn last_config_metadata(index: u64) -> BlockMetadata {
    let orderer_md = OrdererBlockMetadata {
        last_config: Some(LastConfig { index }),
        consenter_metadata: vec![],
    };
    BlockMetadata {
        metadata: vec![
            Metadata {
                value: orderer_md.encode_to_vec(),
                signatures: vec![],
            }
            .encode_to_vec(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
            Vec::new(),
        ],
    }
}

/// Wrap `config` in a CONFIG block numbered `number`.
pub fn config_block(channel: &str, config: &Config, number: u64) -> Block {
    let config_envelope = ConfigEnvelope {
        config: Some(config.clone()),
        last_update: None,
    };
    let env = envelope(
        channel,
        HeaderType::Config,
        "",
        Vec::new(),
        config_envelope.encode_to_vec(),
        1_700_000_000 + number as i64,
    );
    Block {
        header: Some(BlockHeader {
            number,
            previous_hash: vec![],
            data_hash: vec![],
        }),
        data: Some(BlockData {
            data: vec![env.encode_to_vec()],
        }),
        metadata: Some(last_config_metadata(number)),
    }
}

/// An endorser transaction envelope created by `msp_id`.
pub fn endorser_transaction(channel: &str, tx_id: &str, msp_id: &str, seconds: i64) -> Envelope {
    let creator = SerializedIdentity {
        mspid: msp_id.to_string(),
        id_bytes: b"-----BEGIN CERTIFICATE-----\n-----END CERTIFICATE-----\n".to_vec(),
    };
    envelope(
        channel,
        HeaderType::EndorserTransaction,
        tx_id,
        creator.encode_to_vec(),
        vec![],
        seconds,
    )
}

/// A data block holding `envelopes`, pointing at `last_config` for its config.
pub fn data_block(
    number: u64,
    previous_hash: Vec<u8>,
    envelopes: &[Envelope],
    last_config: u64,
) -> Block {
    Block {
        header: Some(BlockHeader {
            number,
            previous_hash,
            data_hash: vec![number as u8; 32],
        }),
        data: Some(BlockData {
            data: envelopes.iter().map(|e| e.encode_to_vec()).collect(),
        }),
        metadata: Some(last_config_metadata(last_config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::codec::{config_from_block_bytes, last_config_index};

    #[test]
    fn test_fixture_block_decodes() {
        let fixture = ChannelFixture::new(FixtureOptions::default());
        let config = config_from_block_bytes(&fixture.config_block_bytes()).unwrap();
        assert_eq!(config, fixture.config);

        let app = application_group(&config).unwrap();
        assert!(app.groups.contains_key("Org1MSP"));
        assert!(app.groups.contains_key("Org2MSP"));
        assert_eq!(raft_metadata(&config).unwrap().consenters.len(), 3);
    }

    #[test]
    fn test_data_block_points_at_config() {
        let tx = endorser_transaction("mychannel", "tx1", "Org1MSP", 10);
        let block = data_block(5, vec![1; 32], &[tx], 2);
        assert_eq!(last_config_index(&block).unwrap(), 2);
    }
}
