//! Ledger queries against the joined peer.

use crate::harness::{Harness, HarnessOptions, NETWORK, PEER_NODE};
use fcp_07_block_query::QueryError;
use shared_types::ClassifiedError;

fn harness(height: u64) -> Harness {
    Harness::with_options(HarnessOptions {
        ledger_height: height,
        ..HarnessOptions::default()
    })
}

#[tokio::test]
async fn test_reverse_page_of_31_blocks() {
    let h = harness(31);
    let page = h.services.query.get_blocks(NETWORK, 10, 0, true).await.unwrap();

    assert_eq!(page.height, 31);
    let numbers: Vec<u64> = page.blocks.iter().map(|b| b.number).collect();
    assert_eq!(numbers, (21..=30).rev().collect::<Vec<_>>());
    assert_eq!(h.ledger.reads(), numbers);
}

#[tokio::test]
async fn test_reverse_pages_walk_down_to_genesis() {
    let h = harness(31);
    let mut seen = Vec::new();
    for offset in (0..40).step_by(10) {
        let page = h
            .services
            .query
            .get_blocks(NETWORK, 10, offset, true)
            .await
            .unwrap();
        seen.extend(page.blocks.iter().map(|b| b.number));
    }
    assert_eq!(seen, (0..=30).rev().collect::<Vec<_>>());
}

#[tokio::test]
async fn test_transaction_lookup_and_block_detail() {
    let h = harness(6);
    let found = h
        .services
        .query
        .get_transaction(NETWORK, "tx-3")
        .await
        .unwrap();
    assert_eq!(found.block_number, 3);
    assert_eq!(found.index, 0);
    assert_eq!(found.transaction.creator_msp_id.as_deref(), Some("Org1MSP"));

    let txs = h
        .services
        .query
        .get_block_transactions(NETWORK, 3)
        .await
        .unwrap();
    assert_eq!(txs.len(), 1);
    assert_eq!(txs[0].tx_id, "tx-3");

    let err = h.services.query.get_block(NETWORK, 6).await.unwrap_err();
    assert!(matches!(err, QueryError::BlockNotFound { number: 6, height: 6 }));
}

#[tokio::test]
async fn test_chain_info_links_newest_block() {
    let h = harness(5);
    let info = h.services.query.get_chain_info(NETWORK).await.unwrap();
    let newest = h.services.query.get_block(NETWORK, 4).await.unwrap();
    assert_eq!(info.height, 5);
    assert_eq!(info.previous_block_hash, newest.previous_hash);
}

#[tokio::test]
async fn test_unjoined_peer_cannot_serve_queries() {
    let h = harness(5);
    let deployer = h.deployer().await;
    deployer
        .fabric()
        .unwrap()
        .unjoin_node(NETWORK, PEER_NODE)
        .await
        .unwrap();

    let err = h.services.query.get_chain_info(NETWORK).await.unwrap_err();
    assert!(matches!(err, QueryError::NoPeerFound { network_id: NETWORK }));
    assert_eq!(err.code(), "no_peer_found");
}
