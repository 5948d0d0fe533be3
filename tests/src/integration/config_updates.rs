//! Channel config updates through the facade: what the broadcast update
//! writes and what a failed operation leaves behind.

use crate::harness::{Harness, HarnessOptions, NETWORK, ORDERER_URL};
use fcp_01_block_codec::test_utils::{generate_identity, FixtureOptions};
use fcp_01_block_codec::Message;
use fcp_02_config_operations::{changed_paths, signature_config_policy, AnchorPeerSpec};
use fcp_02_config_operations::ConfigUpdateOperation;
use fcp_04_config_proposer::open_config_update_envelope;
use fcp_06_network_deployer::{DeployerError, RefreshStatus};
use serde_json::json;
use shared_types::{AuditOutcome, ClassifiedError, RecordStore};

const APP_ORGS: &str = "Channel/groups/Application/groups/";

/// Organizations the update adds or rewrites at the group level.
fn touched_orgs(paths: &[String]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|p| p.strip_prefix(APP_ORGS))
        .filter(|rest| !rest.contains('/'))
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_add_org_writes_one_new_group_with_default_policies() {
    let h = Harness::new();
    let ca = generate_identity("ca.org3.example.com").cert_pem;
    let tls_ca = generate_identity("tlsca.org3.example.com").cert_pem;
    let op = ConfigUpdateOperation::new(
        "add_org",
        json!({ "msp_id": "Org3MSP", "root_certs": [ca], "tls_root_certs": [tls_ca] }),
    );

    let outcome = h
        .deployer()
        .await
        .fabric()
        .unwrap()
        .update_channel_config(NETWORK, vec![op], Some("admin".into()))
        .await
        .unwrap();

    assert_eq!(outcome.submission.signers, ["Org1MSP", "Org2MSP"]);
    assert_eq!(outcome.proposal.base_sequence, 1);
    let update = open_config_update_envelope(&outcome.proposal.envelope)
        .unwrap()
        .config_update;
    assert_eq!(update.channel_id, "mychannel");
    assert_eq!(touched_orgs(&changed_paths(&update)), ["Org3MSP"]);

    let org3 = &update.write_set.as_ref().unwrap().groups["Application"].groups["Org3MSP"];
    assert_eq!(org3.mod_policy, "Admins");
    for (name, expression) in [
        ("Admins", "OR('Org3MSP.admin')"),
        ("Readers", "OR('Org3MSP.member')"),
        ("Writers", "OR('Org3MSP.member')"),
        ("Endorsement", "OR('Org3MSP.member')"),
    ] {
        let expected = signature_config_policy(expression, "Admins").unwrap();
        assert_eq!(org3.policies[name].policy, expected.policy, "{name}");
        assert_eq!(org3.policies[name].mod_policy, "Admins", "{name}");
    }

    let sent = h.broadcaster.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, ORDERER_URL);
}

#[tokio::test]
async fn test_update_channel_config_leaves_cached_block_alone() {
    let h = Harness::new();
    let op = ConfigUpdateOperation::new("update_batch_timeout", json!({ "timeout": "3s" }));
    h.deployer()
        .await
        .fabric()
        .unwrap()
        .update_channel_config(NETWORK, vec![op], None)
        .await
        .unwrap();

    let network = h.store.get_network(NETWORK).await.unwrap();
    assert!(network.current_config_block_b64.is_none());
    assert_eq!(h.audit.actions(), ["update_channel_config"]);
}

#[tokio::test]
async fn test_anchor_peers_touch_only_the_org_group() {
    let h = Harness::new();
    let outcome = h
        .deployer()
        .await
        .fabric()
        .unwrap()
        .set_anchor_peers(
            NETWORK,
            1,
            vec![AnchorPeerSpec {
                host: "peer0.org1.example.com".into(),
                port: 7051,
            }],
        )
        .await
        .unwrap();

    // the mock orderer never commits, so the cache cannot catch up
    assert_eq!(outcome.refresh, RefreshStatus::Pending);
    assert_eq!(outcome.transaction_id, "SUCCESS");

    let sent = h.broadcaster.sent();
    assert_eq!(sent.len(), 1);
    let update = open_config_update_envelope(&sent[0].1.encode_to_vec())
        .unwrap()
        .config_update;
    let paths = changed_paths(&update);
    let org1 = format!("{APP_ORGS}Org1MSP");
    assert!(!paths.is_empty());
    assert!(paths.iter().all(|p| p.starts_with(&org1)), "{paths:?}");
    assert!(paths.contains(&format!("{org1}/values/AnchorPeers")));
}

#[tokio::test]
async fn test_anchor_peers_need_an_org_peer() {
    let h = Harness::new();
    let err = h
        .deployer()
        .await
        .fabric()
        .unwrap()
        .set_anchor_peers(
            NETWORK,
            2,
            vec![AnchorPeerSpec {
                host: "peer0.org2.example.com".into(),
                port: 9051,
            }],
        )
        .await
        .unwrap_err();

    assert!(matches!(err, DeployerError::NoPeerFound { organization_id: 2 }));
    assert!(h.broadcaster.sent().is_empty());
}

#[tokio::test]
async fn test_unknown_consenter_aborts_without_side_effects() {
    let h = Harness::with_options(HarnessOptions {
        fixture: FixtureOptions {
            consenters: 2,
            ..FixtureOptions::default()
        },
        ..HarnessOptions::default()
    });
    let before = h.store.snapshot();
    let op = ConfigUpdateOperation::new(
        "remove_consenter",
        json!({ "host": "orderer2.example.com", "port": 7050 }),
    );

    let err = h
        .deployer()
        .await
        .fabric()
        .unwrap()
        .update_channel_config(NETWORK, vec![op], None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("consenter not found"), "{err}");
    assert!(err.to_string().starts_with("failed_to_apply_operation_0"));
    assert_eq!(err.to_payload().code, err.code());
    assert!(h.broadcaster.sent().is_empty());
    assert_eq!(h.store.snapshot(), before);
    assert!(matches!(
        h.audit.events()[0].outcome,
        AuditOutcome::Failure { .. }
    ));
}
