//! Contract tests for EvmLedger against a mock JSON-RPC node.
//!
//! ## Methods Tested
//!
//! | Method | Test |
//! |--------|------|
//! | `eth_sendTransaction` | `submit_*` |
//! | `eth_getTransactionReceipt` | `submit_*`, `lookup_*` |
//! | `eth_getBlockByHash` | `submit_*` |

use std::time::Duration;

use notary_core::{sha256_fingerprint, Classify, ErrorKind, TransactionId};
use notary_ledger::abi::{self, HashStoredEvent, HASH_STORED_SIGNATURE};
use notary_ledger::{EvmLedger, EvmLedgerConfig, Ledger, LedgerError, SigningIdentity};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CONTRACT: &str = "0xc2fba0a73d9843f109e235e985648207792ce18f";
const FROM: &str = "0xc3561a59f3e69c54dafc1ed26e9d32f6de293d42";
const TX: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";
const BLOCK_HASH: &str = "0x8e38b4dbf6b11fcc3b9dee84fb7986e29ca0a02cecd8977c161ff7333329681e";

fn ledger(mock_server: &MockServer) -> EvmLedger {
    let config = EvmLedgerConfig::new(mock_server.uri().parse().unwrap(), CONTRACT, FROM)
        .with_confirmation(Duration::from_millis(300), Duration::from_millis(20));
    EvmLedger::new(config).unwrap()
}

fn signer() -> SigningIdentity {
    SigningIdentity::new(FROM).unwrap()
}

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "jsonrpc": "2.0", "id": 1, "result": result }))
}

async fn mount_rpc(server: &MockServer, rpc_method: &str, result: serde_json::Value) {
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(rpc_result(result))
        .mount(server)
        .await;
}

fn mined_receipt(status: &str, logs: serde_json::Value) -> serde_json::Value {
    json!({
        "transactionHash": TX,
        "blockHash": BLOCK_HASH,
        "blockNumber": "0x6a1b2c",
        "status": status,
        "logs": logs,
    })
}

fn hash_stored_log(hash: &str, timestamp: u64, index: u64) -> serde_json::Value {
    json!({
        "address": CONTRACT.to_uppercase().replacen("0X", "0x", 1),
        "topics": [abi::event_topic(HASH_STORED_SIGNATURE)],
        "data": abi::encode_hash_stored(&HashStoredEvent { hash: hash.into(), timestamp, index }),
    })
}

// ── submit ───────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_waits_for_receipt_and_reads_block_timestamp() {
    let server = MockServer::start().await;
    mount_rpc(&server, "eth_sendTransaction", json!(TX)).await;
    mount_rpc(&server, "eth_getTransactionReceipt", mined_receipt("0x1", json!([]))).await;
    mount_rpc(&server, "eth_getBlockByHash", json!({ "number": "0x6a1b2c", "timestamp": "0x66e1e000" })).await;

    let fp = sha256_fingerprint(b"hello");
    let receipt = ledger(&server).submit_fingerprint(&fp, &signer()).await.unwrap();

    assert_eq!(receipt.transaction_id.as_str(), TX);
    assert_eq!(receipt.block_number, 0x6a1b2c);
    assert_eq!(receipt.timestamp, 0x66e1e000);
}

#[tokio::test]
async fn submit_sends_store_hash_calldata_from_signer() {
    let server = MockServer::start().await;
    mount_rpc(&server, "eth_sendTransaction", json!(TX)).await;
    mount_rpc(&server, "eth_getTransactionReceipt", mined_receipt("0x1", json!([]))).await;
    mount_rpc(&server, "eth_getBlockByHash", json!({ "timestamp": "0x1" })).await;

    let fp = sha256_fingerprint(b"hello");
    ledger(&server).submit_fingerprint(&fp, &signer()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let send: serde_json::Value = requests
        .iter()
        .map(|r| serde_json::from_slice::<serde_json::Value>(&r.body).unwrap())
        .find(|body| body["method"] == "eth_sendTransaction")
        .expect("eth_sendTransaction was called");
    let tx = &send["params"][0];
    assert_eq!(tx["from"], FROM);
    assert_eq!(tx["to"], CONTRACT);
    assert_eq!(tx["data"], abi::encode_store_hash(&fp.to_hex()));
}

#[tokio::test]
async fn submit_reports_reverted_transaction() {
    let server = MockServer::start().await;
    mount_rpc(&server, "eth_sendTransaction", json!(TX)).await;
    mount_rpc(&server, "eth_getTransactionReceipt", mined_receipt("0x0", json!([]))).await;

    let err = ledger(&server).submit_hash("abc", &signer()).await.unwrap_err();
    assert!(matches!(err, LedgerError::TransactionFailed(_)));
    assert_eq!(err.kind(), ErrorKind::Upstream);
}

#[tokio::test]
async fn submit_times_out_when_receipt_never_appears() {
    let server = MockServer::start().await;
    mount_rpc(&server, "eth_sendTransaction", json!(TX)).await;
    mount_rpc(&server, "eth_getTransactionReceipt", serde_json::Value::Null).await;

    let err = ledger(&server).submit_hash("abc", &signer()).await.unwrap_err();
    assert!(matches!(err, LedgerError::ConfirmationTimeout { .. }));
    assert!(err.kind().is_retryable());
}

#[tokio::test]
async fn submit_surfaces_rpc_error_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_sendTransaction" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32000, "message": "insufficient funds for gas" }
        })))
        .mount(&server)
        .await;

    match ledger(&server).submit_hash("abc", &signer()).await {
        Err(LedgerError::Rpc { code, message, .. }) => {
            assert_eq!(code, -32000);
            assert!(message.contains("insufficient funds"));
        }
        other => panic!("expected Rpc error, got {other:?}"),
    }
}

#[tokio::test]
async fn submit_rejects_empty_hash_without_calling_node() {
    let server = MockServer::start().await;
    let err = ledger(&server).submit_hash("", &signer()).await.unwrap_err();
    assert!(matches!(err, LedgerError::EmptyHash));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── lookup ───────────────────────────────────────────────────────────

#[tokio::test]
async fn lookup_decodes_hash_stored_event() {
    let server = MockServer::start().await;
    let fp = sha256_fingerprint(b"hello").to_hex();
    let unrelated = json!({
        "address": CONTRACT,
        "topics": [abi::event_topic("Other(uint256)")],
        "data": "0x",
    });
    mount_rpc(
        &server,
        "eth_getTransactionReceipt",
        mined_receipt("0x1", json!([unrelated, hash_stored_log(&fp, 1_726_000_000, 17)])),
    )
    .await;

    let tx = TransactionId::new(TX).unwrap();
    let record = ledger(&server).lookup_by_transaction(&tx).await.unwrap();
    assert_eq!(record.fingerprint, fp);
    assert_eq!(record.timestamp, 1_726_000_000);
    assert_eq!(record.sequence_index, 17);
    assert_eq!(record.transaction_id, tx);
}

#[tokio::test]
async fn lookup_of_unknown_transaction_is_not_found() {
    let server = MockServer::start().await;
    mount_rpc(&server, "eth_getTransactionReceipt", serde_json::Value::Null).await;

    let err = ledger(&server)
        .lookup_by_transaction(&TransactionId::new(TX).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::TransactionNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn lookup_without_event_is_event_not_found() {
    let server = MockServer::start().await;
    mount_rpc(&server, "eth_getTransactionReceipt", mined_receipt("0x1", json!([]))).await;

    let err = ledger(&server)
        .lookup_by_transaction(&TransactionId::new(TX).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::EventNotFound(_)));
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[tokio::test]
async fn lookup_ignores_events_from_other_contracts() {
    let server = MockServer::start().await;
    let mut foreign = hash_stored_log("forged", 1, 0);
    foreign["address"] = json!("0x000000000000000000000000000000000000dead");
    mount_rpc(&server, "eth_getTransactionReceipt", mined_receipt("0x1", json!([foreign]))).await;

    let err = ledger(&server)
        .lookup_by_transaction(&TransactionId::new(TX).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::EventNotFound(_)));
}

#[tokio::test]
async fn http_failure_is_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = ledger(&server)
        .lookup_by_transaction(&TransactionId::new(TX).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::HttpStatus { status: 503, .. }));
    assert_eq!(err.kind(), ErrorKind::Upstream);
}
