//! `fcp` subcommands parsed from argv and run against the harness.

use crate::harness::{Harness, HarnessOptions, ORDERER_URL};
use clap::Parser;
use control_plane_runtime::{execute, Cli, Command, CommandError};
use serde_json::json;
use shared_types::ClassifiedError;
use std::io::Write;

async fn run(h: &Harness, argv: &[&str]) -> Result<serde_json::Value, CommandError> {
    let cli = Cli::try_parse_from(std::iter::once("fcp").chain(argv.iter().copied()))
        .expect("argv parses");
    execute(cli.command, &h.services).await
}

#[tokio::test]
async fn test_update_config_reads_operations_file() {
    let h = Harness::new();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let operations = json!([
        { "type": "update_batch_timeout", "payload": { "timeout": "5s" } },
        { "type": "update_batch_size", "payload": {
            "absolute_max_bytes": 10485760,
            "max_message_count": 100,
            "preferred_max_bytes": 2097152
        } }
    ]);
    write!(file, "{operations}").unwrap();
    let path = file.path().to_str().unwrap();

    let out = run(&h, &["update-config", "1", "--operations", path, "--created-by", "ops"])
        .await
        .unwrap();

    assert_eq!(out["proposal"]["created_by"], "ops");
    assert_eq!(out["proposal"]["operations"][1]["type"], "update_batch_size");
    assert_eq!(out["submission"]["status"], "SUCCESS");
    assert_eq!(out["submission"]["orderer"], ORDERER_URL);
    assert_eq!(h.broadcaster.sent().len(), 1);
}

#[tokio::test]
async fn test_missing_operations_file_is_invalid_input() {
    let h = Harness::new();
    let err = run(&h, &["update-config", "1", "--operations", "/nonexistent/ops.json"])
        .await
        .unwrap_err();
    assert_eq!(err.code(), "invalid_input");
    assert!(h.broadcaster.sent().is_empty());
}

#[tokio::test]
async fn test_anchor_peers_reports_pending_refresh() {
    let h = Harness::new();
    let out = run(
        &h,
        &["anchor-peers", "1", "--org", "1", "--peer", "peer0.org1.example.com:7051"],
    )
    .await
    .unwrap();
    assert_eq!(out, json!({ "transactionId": "SUCCESS", "refresh": { "status": "pending" } }));
}

#[tokio::test]
async fn test_reload_then_orderers() {
    let h = Harness::new();
    let reloaded = run(&h, &["reload-block", "1"]).await.unwrap();
    assert_eq!(reloaded["sequence"], 1);

    let orderers = run(&h, &["orderers", "1"]).await.unwrap();
    assert_eq!(orderers[0]["url"], ORDERER_URL);
}

#[tokio::test]
async fn test_block_queries() {
    let h = Harness::with_options(HarnessOptions {
        ledger_height: 12,
        ..HarnessOptions::default()
    });

    let page = run(&h, &["blocks", "1", "--limit", "3", "--reverse"]).await.unwrap();
    let numbers: Vec<_> = page["blocks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["number"].as_u64().unwrap())
        .collect();
    assert_eq!(numbers, [11, 10, 9]);

    let txs = run(&h, &["block", "1", "4", "--transactions"]).await.unwrap();
    assert_eq!(txs[0]["tx_id"], "tx-4");

    let found = run(&h, &["transaction", "1", "tx-7"]).await.unwrap();
    assert_eq!(found["block_number"], 7);

    let info = run(&h, &["chain-info", "1"]).await.unwrap();
    assert_eq!(info["height"], 12);
}

#[tokio::test]
async fn test_unknown_network() {
    let h = Harness::new();
    let err = run(&h, &["reload-block", "9"]).await.unwrap_err();
    assert_eq!(err.code(), "network_not_found");
    assert!(matches!(err, CommandError::Deployer(_)));

    let err = run(&h, &["chain-info", "9"]).await.unwrap_err();
    assert_eq!(err.to_payload().code, "network_not_found");
}

#[test]
fn test_block_flags_parse() {
    let cli = Cli::try_parse_from(["fcp", "block", "1", "4", "--transactions"]).unwrap();
    assert_eq!(
        cli.command,
        Command::Block {
            network_id: 1,
            number: 4,
            transactions: true,
        }
    );
}
