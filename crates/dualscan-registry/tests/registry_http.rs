//! Client behaviour against a canned HTTP registry on a local port.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dualscan_core::{Chain, FailureKind, FetchFailure, PerChain, Window};
use dualscan_registry::{RegistryClient, RegistryConfig, RegistryError};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Canned response for one request path (query string included).
#[derive(Clone)]
struct Canned {
    status: u16,
    body: String,
    delay: Duration,
}

impl Canned {
    fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    fn status(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }
}

struct TestServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

async fn serve(routes: HashMap<String, Canned>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = requests.clone();
    let routes = Arc::new(routes);

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let routes = routes.clone();
            let seen = seen.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let mut read = 0;
                loop {
                    let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    read += n;
                    if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let head = String::from_utf8_lossy(&buf[..read]).to_string();
                let target = head
                    .lines()
                    .next()
                    .and_then(|line| line.split_whitespace().nth(1))
                    .unwrap_or("/")
                    .to_string();
                seen.lock().unwrap().push(target.clone());

                let canned = routes
                    .get(&target)
                    .cloned()
                    .unwrap_or_else(|| Canned::status(404, r#"{"error": "not found"}"#));
                tokio::time::sleep(canned.delay).await;
                let response = format!(
                    "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    canned.status,
                    canned.body.len(),
                    canned.body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    TestServer {
        base_url: format!("http://{}/api/v1", addr),
        requests,
    }
}

fn client(server: &TestServer, timeout: Duration) -> RegistryClient {
    let config = RegistryConfig::new(
        &server.base_url,
        timeout,
        PerChain::new("ethereum".to_string(), "bitcoin".to_string()),
    )
    .unwrap();
    RegistryClient::new(config).unwrap()
}

fn routes(entries: &[(&str, Canned)]) -> HashMap<String, Canned> {
    entries
        .iter()
        .map(|(path, canned)| (path.to_string(), canned.clone()))
        .collect()
}

#[tokio::test]
async fn test_get_stats() {
    let server = serve(routes(&[(
        "/api/v1/bitcoin/stats",
        Canned::ok(r#"{"total_blocks": 830000, "total_transactions": 950000000}"#),
    )]))
    .await;

    let stats = client(&server, Duration::from_secs(5))
        .get_stats(Chain::Secondary)
        .await
        .unwrap();
    assert_eq!(stats.total_blocks, 830_000);
    assert_eq!(stats.total_transactions, 950_000_000);
}

#[tokio::test]
async fn test_get_blocks_sends_window() {
    let server = serve(routes(&[(
        "/api/v1/ethereum/blocks?limit=15&offset=30",
        Canned::ok(
            r#"[{"height": 3, "hash": "0x3", "timestamp": "2024-01-01T00:00:30Z"},
                {"height": 2, "hash": "0x2", "timestamp": "2024-01-01T00:00:20Z"}]"#,
        ),
    )]))
    .await;

    let blocks = client(&server, Duration::from_secs(5))
        .get_blocks(Chain::Primary, Window { limit: 15, offset: 30 })
        .await
        .unwrap();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].hash, "0x3");
    assert_eq!(blocks[0].chain, Chain::Primary);
    assert_eq!(
        server.requests.lock().unwrap().as_slice(),
        ["/api/v1/ethereum/blocks?limit=15&offset=30".to_string()]
    );
}

#[tokio::test]
async fn test_null_list_is_empty() {
    let server = serve(routes(&[(
        "/api/v1/bitcoin/txs?limit=8&offset=0",
        Canned::ok("null"),
    )]))
    .await;

    let txs = client(&server, Duration::from_secs(5))
        .get_transactions(Chain::Secondary, Window { limit: 8, offset: 0 })
        .await
        .unwrap();
    assert!(txs.is_empty());
}

#[tokio::test]
async fn test_search_encodes_query() {
    let server = serve(routes(&[(
        "/api/v1/ethereum/search?q=abc+123",
        Canned::ok(
            r#"{"blocks": null, "transactions": [{"hash": "abc123", "value": "5", "timestamp": 1700000000}]}"#,
        ),
    )]))
    .await;

    let page = client(&server, Duration::from_secs(5))
        .search(Chain::Primary, "abc 123")
        .await
        .unwrap();
    assert!(page.blocks.is_empty());
    assert_eq!(page.transactions[0].hash, "abc123");
}

#[tokio::test]
async fn test_not_found() {
    let server = serve(HashMap::new()).await;
    let err = client(&server, Duration::from_secs(5))
        .get_transaction_detail(Chain::Primary, "0xdead")
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(_)));
    assert_eq!(FetchFailure::from(err).kind, FailureKind::NotFound);
}

#[tokio::test]
async fn test_server_error_carries_message() {
    let server = serve(routes(&[(
        "/api/v1/bitcoin/block/hash/00ab",
        Canned::status(500, r#"{"error": "database unavailable"}"#),
    )]))
    .await;

    let err = client(&server, Duration::from_secs(5))
        .get_block_detail(Chain::Secondary, "00ab")
        .await
        .unwrap_err();
    match err {
        RegistryError::Server { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body() {
    let server = serve(routes(&[(
        "/api/v1/ethereum/stats",
        Canned::ok(r#"{"blocks": "many"}"#),
    )]))
    .await;

    let err = client(&server, Duration::from_secs(5))
        .get_stats(Chain::Primary)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_timeout_is_transport_failure() {
    let server = serve(routes(&[(
        "/api/v1/ethereum/stats",
        Canned {
            delay: Duration::from_secs(2),
            ..Canned::ok(r#"{"total_blocks": 1, "total_transactions": 1}"#)
        },
    )]))
    .await;

    let err = client(&server, Duration::from_millis(200))
        .get_stats(Chain::Primary)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::Timeout(200)));
    assert_eq!(err.kind(), FailureKind::Transport);
}

#[tokio::test]
async fn test_block_detail_with_transactions() {
    let server = serve(routes(&[(
        "/api/v1/bitcoin/block/hash/00ff",
        Canned::ok(
            r#"{"height": 9, "hash": "00ff", "timestamp": "2024-01-01T00:00:00Z",
                "transactions": [
                    {"hash": "t1", "value": "100", "from_address": "a", "to_address": "b",
                     "status": "success", "timestamp": "2024-01-01T00:00:00Z"}
                ]}"#,
        ),
    )]))
    .await;

    let detail = client(&server, Duration::from_secs(5))
        .get_block_detail(Chain::Secondary, "00ff")
        .await
        .unwrap();
    assert_eq!(detail.summary.height, 9);
    assert_eq!(detail.summary.tx_count, Some(1));
    assert_eq!(detail.transactions[0].summary.to.as_deref(), Some("b"));
    assert_eq!(
        detail.transactions[0].fields.get("status"),
        Some(&serde_json::json!("success"))
    );
}
