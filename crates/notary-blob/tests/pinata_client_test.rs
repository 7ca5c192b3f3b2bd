//! Contract tests for PinataClient against a mock pinning service.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST   | `/pinning/pinFileToIPFS` | `put_*` |
//! | GET    | `/ipfs/{cid}` | `get_*` |

use notary_blob::{BlobStore, BlobStoreError, PinataClient, PinataConfig};
use notary_core::{BlobAddress, Classify, ErrorKind};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CID: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";

fn test_client(mock_server: &MockServer) -> PinataClient {
    PinataClient::new(PinataConfig::local_mock(&mock_server.uri()).unwrap()).unwrap()
}

// ── POST /pinning/pinFileToIPFS ──────────────────────────────────────

#[tokio::test]
async fn put_sends_credentials_and_returns_cid() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .and(header("pinata_api_key", "test-key"))
        .and(header("pinata_secret_api_key", "test-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "IpfsHash": CID,
            "PinSize": 45,
            "Timestamp": "2026-01-15T12:00:00.000Z"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let address = client.put(b"sealed-bytes").await.unwrap();
    assert_eq!(address.as_str(), CID);
}

#[tokio::test]
async fn put_sends_multipart_file_field() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "IpfsHash": CID })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    client.put(b"payload-marker").await.unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("payload-marker"));
}

#[tokio::test]
async fn put_surfaces_api_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid credentials"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let err = client.put(b"x").await.unwrap_err();
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1, "4xx is not retried");
    match &err {
        BlobStoreError::ApiError { status, body, .. } => {
            assert_eq!(*status, 401);
            assert!(body.contains("invalid credentials"));
        }
        other => panic!("expected ApiError, got {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::Upstream);
}

#[tokio::test]
async fn put_retries_after_service_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "IpfsHash": CID })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let address = client.put(b"sealed-bytes").await.unwrap();
    assert_eq!(address.as_str(), CID);
}

#[tokio::test]
async fn put_gives_up_after_configured_retries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(3)
        .mount(&mock_server)
        .await;

    let mut config = PinataConfig::local_mock(&mock_server.uri()).unwrap();
    config.max_retries = 2;
    let client = PinataClient::new(config).unwrap();
    let err = client.put(b"x").await.unwrap_err();
    assert!(matches!(err, BlobStoreError::ApiError { status: 502, .. }));
    assert!(err.kind().is_retryable());
}

#[tokio::test]
async fn put_rejects_malformed_cid() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pinning/pinFileToIPFS"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "IpfsHash": "../../etc" })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    assert!(matches!(
        client.put(b"x").await,
        Err(BlobStoreError::InvalidAddress(_))
    ));
}

// ── GET /ipfs/{cid} ──────────────────────────────────────────────────

#[tokio::test]
async fn get_fetches_through_gateway() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/ipfs/{CID}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3, 0, 255]))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let bytes = client.get(&BlobAddress::new(CID).unwrap()).await.unwrap();
    assert_eq!(bytes, vec![1u8, 2, 3, 0, 255]);
}

#[tokio::test]
async fn get_retries_throttled_gateway() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/ipfs/{CID}")))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/ipfs/{CID}")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"sealed".to_vec()))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    let bytes = client.get(&BlobAddress::new(CID).unwrap()).await.unwrap();
    assert_eq!(bytes, b"sealed");
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn get_missing_blob_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/ipfs/{CID}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server);
    assert!(matches!(
        client.get(&BlobAddress::new(CID).unwrap()).await,
        Err(BlobStoreError::NotFound(_))
    ));
}

#[test]
fn gateway_link_joins_gateway_and_cid() {
    let config = PinataConfig::local_mock("http://127.0.0.1:9200").unwrap();
    let client = PinataClient::new(config).unwrap();
    assert_eq!(
        client.gateway_link(&BlobAddress::new(CID).unwrap()),
        format!("http://127.0.0.1:9200/ipfs/{CID}")
    );
}
