// Path: crates/gateway/src/tests/mod.rs

use super::*;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request as HttpRequest};
use ecopoints_test_utils::fixtures::{
    account, test_config, test_key_provider, TEST_CHAIN_ID, TEST_CONTRACT, TEST_USER,
};
use ecopoints_test_utils::{Faults, MockLedgerNode, StaticOracle};
use ecopoints_types::error::OracleError;
use serde_json::{json, Value};
use tower::ServiceExt;

fn mock_node() -> Arc<MockLedgerNode> {
    Arc::new(MockLedgerNode::new(
        TEST_CHAIN_ID,
        account(TEST_CONTRACT).unwrap(),
    ))
}

async fn app_with(node: &Arc<MockLedgerNode>, oracle: Option<StaticOracle>) -> Router {
    app_sharing(node, oracle.map(Arc::new)).await
}

async fn app_sharing(node: &Arc<MockLedgerNode>, oracle: Option<Arc<StaticOracle>>) -> Router {
    let config = test_config().unwrap();
    let mut ledger = RewardLedger::from_parts(&config, node.clone(), test_key_provider().unwrap())
        .await
        .unwrap();
    if let Some(oracle) = oracle {
        ledger = ledger.with_oracle(oracle);
    }
    router(GatewayState::new(Arc::new(ledger)), &config.gateway)
}

async fn app(node: &Arc<MockLedgerNode>) -> Router {
    app_with(node, None).await
}

async fn send(app: Router, request: HttpRequest<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn post_json(uri: &str, body: Value) -> HttpRequest<Body> {
    HttpRequest::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_req(uri: &str) -> HttpRequest<Body> {
    HttpRequest::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn award_then_read_points() {
    let node = mock_node();
    let app = app(&node).await;

    let (status, body) = send(
        app.clone(),
        post_json("/v1/awards", json!({ "address": TEST_USER, "amount": 50 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "confirmed");
    assert_eq!(body["hash"].as_str().unwrap().len(), 66);
    assert!(body["block_number"].is_u64());

    let uri = format!("/v1/points/{}", TEST_USER.to_lowercase());
    let (status, body) = send(app, get_req(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["address"], TEST_USER);
    assert_eq!(body["points"], "50");
}

#[tokio::test]
async fn gas_overrides_reach_the_transaction() {
    let node = mock_node();
    let (status, _) = send(
        app(&node).await,
        post_json(
            "/v1/awards",
            json!({
                "address": TEST_USER,
                "amount": 1,
                "gas_limit": 90000,
                "gas_price_wei": "1000000000"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let accepted = node.accepted_transactions();
    assert_eq!(accepted[0].gas_limit, 90_000);
    assert_eq!(accepted[0].gas_price, 1_000_000_000);
}

#[tokio::test]
async fn invalid_inputs_are_bad_requests() {
    let node = mock_node();
    let app = app(&node).await;

    let (status, body) = send(
        app.clone(),
        post_json("/v1/awards", json!({ "address": "0x1234", "amount": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "REWARD_VALIDATION");
    assert!(body["error"].get("hash").is_none());

    let (status, body) = send(
        app.clone(),
        post_json(
            "/v1/awards",
            json!({ "address": TEST_USER, "amount": 5, "gas_price_wei": "lots" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) = send(app, get_req("/v1/points/not-an-address")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(node.sends(), 0);
}

#[tokio::test]
async fn zero_gas_overrides_are_bad_requests() {
    let node = mock_node();
    let app = app(&node).await;

    for overrides in [json!({ "gas_price_wei": "0" }), json!({ "gas_limit": 0 })] {
        let mut body = json!({ "address": TEST_USER, "amount": 5 });
        for (key, value) in overrides.as_object().unwrap() {
            body[key] = value.clone();
        }
        let (status, body) = send(app.clone(), post_json("/v1/awards", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("must be positive"));
    }
    assert_eq!(node.sends(), 0);
}

#[tokio::test]
async fn unrepresentable_timeout_is_accepted() {
    let node = mock_node();
    let (status, body) = send(
        app(&node).await,
        post_json(
            "/v1/awards",
            json!({ "address": TEST_USER, "amount": 3, "timeout_secs": u64::MAX }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "confirmed");
}

#[tokio::test]
async fn revert_is_a_conflict_carrying_the_hash() {
    let node = mock_node();
    let app = app(&node).await;
    node.set_faults(Faults {
        revert: true,
        ..Faults::default()
    });

    let (status, body) = send(
        app,
        post_json("/v1/awards", json!({ "address": TEST_USER, "amount": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "REWARD_REVERTED");
    assert_eq!(body["error"]["hash"].as_str().unwrap().len(), 66);
}

#[tokio::test]
async fn unobserved_inclusion_times_out_with_hash() {
    let node = mock_node();
    let app = app(&node).await;
    node.set_faults(Faults {
        never_include: true,
        ..Faults::default()
    });

    let (status, body) = send(
        app,
        post_json(
            "/v1/awards",
            json!({ "address": TEST_USER, "amount": 5, "timeout_secs": 1 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"]["code"], "REWARD_TIMED_OUT");
    assert!(body["error"]["hash"].is_string());
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("check balance"));
    assert_eq!(node.sends(), 1);
}

#[tokio::test]
async fn unreachable_node_is_unavailable() {
    let node = mock_node();
    let app = app(&node).await;
    node.set_faults(Faults {
        unreachable: true,
        ..Faults::default()
    });

    let (status, body) = send(
        app,
        post_json("/v1/awards", json!({ "address": TEST_USER, "amount": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "REWARD_NODE_ERROR");
}

fn proof_body(proof: &[u8]) -> Value {
    json!({
        "address": TEST_USER,
        "amount": 20,
        "proof_base64": BASE64.encode(proof),
        "content_type": "image/png"
    })
}

#[tokio::test]
async fn verified_award_maps_oracle_outcomes() {
    let node = mock_node();

    let (status, body) = send(
        app_with(&node, Some(StaticOracle::accepting())).await,
        post_json("/v1/awards/verified", proof_body(b"bike-commute")),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["status"], "confirmed");

    let (status, body) = send(
        app_with(&node, Some(StaticOracle::rejecting("not a bicycle"))).await,
        post_json("/v1/awards/verified", proof_body(b"car-commute")),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "REWARD_ORACLE_REJECTED");

    let failing = StaticOracle::failing(OracleError::Unavailable("down".into()));
    let (status, body) = send(
        app_with(&node, Some(failing)).await,
        post_json("/v1/awards/verified", proof_body(b"walk")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "REWARD_ORACLE_ERROR");

    assert_eq!(node.accepted_transactions().len(), 1);
}

#[tokio::test]
async fn verified_award_forwards_proof_metadata() {
    let node = mock_node();
    let oracle = Arc::new(StaticOracle::accepting());
    let app = app_sharing(&node, Some(oracle.clone())).await;

    let mut body = proof_body(b"tram-pass");
    body["file_name"] = json!("tram-pass.png");
    let (status, body) = send(app, post_json("/v1/awards/verified", body)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let proof = oracle.last_proof().unwrap();
    assert_eq!(proof.bytes, b"tram-pass");
    assert_eq!(proof.content_type.as_deref(), Some("image/png"));
    assert_eq!(proof.file_name.as_deref(), Some("tram-pass.png"));
}

#[tokio::test]
async fn verified_award_rejects_bad_proof_encoding() {
    let node = mock_node();
    let oracle = StaticOracle::accepting();
    let app = app_with(&node, Some(oracle)).await;

    let mut body = proof_body(b"x");
    body["proof_base64"] = json!("***");
    let (status, body) = send(app.clone(), post_json("/v1/awards/verified", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let mut body = proof_body(b"");
    body["proof_base64"] = json!("");
    let (status, body) = send(app, post_json("/v1/awards/verified", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "REWARD_VALIDATION");
    assert_eq!(node.sends(), 0);
}

#[tokio::test]
async fn oversized_body_is_refused() {
    let node = mock_node();
    let app = app(&node).await;
    let limit = test_config().unwrap().gateway.max_body_bytes;
    let payload = "a".repeat(limit + 1);

    let request = HttpRequest::post("/v1/awards/verified")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, payload.len())
        .body(Body::from(payload))
        .unwrap();
    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(node.sends(), 0);
}

#[tokio::test]
async fn healthz_answers() {
    let node = mock_node();
    let response = app(&node).await.oneshot(get_req("/healthz")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[test]
fn status_mapping_covers_every_kind() {
    use ecopoints_types::error::ValidationError;
    assert_eq!(
        status_for(&RewardError::Validation(ValidationError::EmptyProof)),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        status_for(&RewardError::TimedOut { hash: None }),
        StatusCode::GATEWAY_TIMEOUT
    );
    assert_eq!(
        status_for(&RewardError::Oracle(OracleError::NotConfigured)),
        StatusCode::BAD_GATEWAY
    );

    let mut settled = TransactionResult::pending(B256::repeat_byte(1));
    settled.confirm(1).unwrap();
    let refused = settled.fail().unwrap_err();
    assert_eq!(
        status_for(&RewardError::State(refused)),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
