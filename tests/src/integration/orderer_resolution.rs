//! Orderer discovery and the cached config block.

use crate::harness::{Harness, HarnessOptions, NETWORK, ORDERER_URL};
use fcp_01_block_codec::{decode_block_b64, extract_config_from_block};
use fcp_03_orderer_resolver::ResolverError;
use fcp_06_network_deployer::DeployerError;
use shared_types::{ClassifiedError, RecordStore};

#[tokio::test]
async fn test_registered_orderer_wins() {
    let h = Harness::new();
    let deployer = h.deployer().await;
    let orderers = deployer.fabric().unwrap().get_orderers(NETWORK).await.unwrap();
    let urls: Vec<_> = orderers.iter().map(|o| o.url.as_str()).collect();
    assert_eq!(urls, [ORDERER_URL]);
    assert_eq!(orderers[0].tls_cert_pem, h.fixture.consenters[0].tls_cert_pem);
}

#[tokio::test]
async fn test_genesis_consenters_when_registry_is_empty() {
    let h = Harness::with_options(HarnessOptions {
        registered_orderer: false,
        ..HarnessOptions::default()
    });
    let deployer = h.deployer().await;
    let orderers = deployer.fabric().unwrap().get_orderers(NETWORK).await.unwrap();
    let urls: Vec<_> = orderers.iter().map(|o| o.url.clone()).collect();
    assert_eq!(
        urls,
        [
            "orderer0.example.com:7050",
            "orderer1.example.com:7050",
            "orderer2.example.com:7050",
        ]
    );
}

#[tokio::test]
async fn test_no_registry_and_no_block_is_no_orderer_found() {
    let h = Harness::with_options(HarnessOptions {
        registered_orderer: false,
        genesis_block: false,
        ..HarnessOptions::default()
    });
    let deployer = h.deployer().await;
    let fabric = deployer.fabric().unwrap();
    let err = fabric.get_orderers(NETWORK).await.unwrap_err();
    assert!(matches!(
        err,
        DeployerError::Resolver(ResolverError::NoOrdererFound { network_id: NETWORK })
    ));
    assert_eq!(err.to_payload().code, "no_orderer_found");

    // nothing to fetch from either
    let err = fabric.reload_network_block(NETWORK).await.unwrap_err();
    assert_eq!(err.code(), "no_orderer_found");
    assert!(h.source.calls().is_empty());
}

#[tokio::test]
async fn test_reload_is_idempotent() {
    let h = Harness::new();
    let deployer = h.deployer().await;
    let deployer = deployer.fabric().unwrap();

    let first = deployer.reload_network_block(NETWORK).await.unwrap();
    let cached_first = h
        .store
        .get_network(NETWORK)
        .await
        .unwrap()
        .current_config_block_b64
        .unwrap();
    let second = deployer.reload_network_block(NETWORK).await.unwrap();
    let cached_second = h
        .store
        .get_network(NETWORK)
        .await
        .unwrap()
        .current_config_block_b64
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.orderer, ORDERER_URL);
    assert_eq!(first.sequence, 1);
    let first_block = decode_block_b64(&cached_first).unwrap();
    assert_eq!(first_block, decode_block_b64(&cached_second).unwrap());
    assert_eq!(first_block, h.fixture.config_block());
    assert_eq!(
        extract_config_from_block(&first_block).unwrap(),
        h.fixture.config
    );
    assert_eq!(h.audit.actions(), ["reload_network_block", "reload_network_block"]);
}

#[tokio::test]
async fn test_reload_through_genesis_consenters() {
    let h = Harness::with_options(HarnessOptions {
        registered_orderer: false,
        ..HarnessOptions::default()
    });
    let deployer = h.deployer().await;
    let reloaded = deployer
        .fabric()
        .unwrap()
        .reload_network_block(NETWORK)
        .await
        .unwrap();
    assert_eq!(reloaded.orderer, "orderer0.example.com:7050");
    assert_eq!(h.source.calls(), ["orderer0.example.com:7050"]);
}
