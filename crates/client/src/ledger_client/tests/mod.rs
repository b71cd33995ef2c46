// Path: crates/client/src/ledger_client/tests/mod.rs

use super::*;
use axum::{http::StatusCode, routing::post, Json, Router};
use ecopoints_types::app::validate;
use ecopoints_types::U256;
use serde_json::{json, Value};

const SENDER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

fn reply(id: Value, result: Value) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "jsonrpc": "2.0", "id": id, "result": result })),
    )
}

fn fail(id: Value, code: i64, message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({ "jsonrpc": "2.0", "id": id, "error": { "code": code, "message": message } })),
    )
}

async fn stub_node(Json(req): Json<Value>) -> (StatusCode, Json<Value>) {
    let id = req["id"].clone();
    let params = &req["params"];
    match req["method"].as_str().unwrap_or_default() {
        "eth_chainId" => reply(id, json!("0x539")),
        "eth_getTransactionCount"
            if params[0] == SENDER.to_lowercase() && params[1] == "pending" => {
            reply(id, json!("0x7"))
        }
        "eth_sendRawTransaction" => fail(id, -32000, "nonce too low"),
        "eth_getTransactionReceipt" => reply(id, Value::Null),
        "eth_call" if params[0]["data"].as_str().unwrap_or_default().starts_with("0xee204abb") => {
            reply(id, json!(format!("0x{}32", "00".repeat(31))))
        }
        _ => fail(id, -32601, "method not found"),
    }
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn client(url: &str) -> HttpLedgerClient {
    HttpLedgerClient::new(url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_round_trips_against_stub_node() {
    let url = spawn(Router::new().route("/", post(stub_node))).await;
    let node = client(&url);
    let sender = validate(SENDER).unwrap();

    assert_eq!(node.chain_id().await.unwrap(), 1337);
    assert_eq!(
        node.transaction_count(sender, BlockTag::Pending).await.unwrap(),
        7
    );
    assert_eq!(node.transaction_receipt(&B256::ZERO).await.unwrap(), None);

    let mut data = vec![0xee, 0x20, 0x4a, 0xbb];
    data.extend_from_slice(&[0u8; 32]);
    let out = node
        .call(
            &CallRequest {
                from: None,
                to: sender,
                data: data.into(),
            },
            BlockTag::Latest,
        )
        .await
        .unwrap();
    assert_eq!(U256::from_be_slice(&out), U256::from(50));
}

#[tokio::test]
async fn test_rpc_error_is_classified() {
    let url = spawn(Router::new().route("/", post(stub_node))).await;
    let err = client(&url)
        .send_raw_transaction(&[0xf8, 0x6c])
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Rpc { code: -32000, .. }));
    assert!(!err.is_transient());
    assert!(err.rejection().is_some());
}

#[tokio::test]
async fn test_http_failure_is_transient() {
    let router = Router::new().route(
        "/",
        post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "overloaded") }),
    );
    let url = spawn(router).await;
    let err = client(&url).chain_id().await.unwrap_err();
    assert_eq!(
        err,
        NodeError::Http {
            status: 503,
            body: "overloaded".into()
        }
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_unreachable_node_is_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let err = client(&format!("http://{}", addr))
        .chain_id()
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Transport(_)));
    assert!(err.is_transient());
}
