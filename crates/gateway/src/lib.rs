// Path: crates/gateway/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # EcoPoints HTTP Gateway
//!
//! A JSON front end for the [`RewardLedger`]: award points, award against a
//! verified proof, and read balances.

use anyhow::Result;
use axum::{
    error_handling::HandleErrorLayer,
    extract::{MatchedPath, Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ecopoints_engine::{AwardOptions, RewardLedger};
use ecopoints_telemetry::rpc_metrics;
use ecopoints_types::app::{GasOverrides, ProofArtifact, TransactionResult, TxStatus};
use ecopoints_types::config::GatewayConfig;
use ecopoints_types::error::{ErrorCode, RewardError};
use ecopoints_types::B256;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant as StdInstant};
use tokio::sync::watch;
use tower::{limit::ConcurrencyLimitLayer, load_shed::LoadShedLayer, BoxError, ServiceBuilder};
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

// --- Error Handling ---

/// Errors returned by gateway handlers, rendered as
/// `{"error": {"code", "message", "hash"?}}`.
#[derive(Debug)]
pub enum ApiError {
    /// The request was well-formed JSON but a field could not be interpreted.
    BadRequest(String),
    /// The ledger refused or failed the operation.
    Reward(RewardError),
}

impl From<RewardError> for ApiError {
    fn from(e: RewardError) -> Self {
        Self::Reward(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    hash: Option<String>,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// The HTTP status for a ledger error.
pub fn status_for(error: &RewardError) -> StatusCode {
    match error {
        RewardError::Validation(_) => StatusCode::BAD_REQUEST,
        RewardError::OracleRejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        RewardError::Oracle(_) => StatusCode::BAD_GATEWAY,
        RewardError::Node(_) => StatusCode::SERVICE_UNAVAILABLE,
        RewardError::Reverted(_) => StatusCode::CONFLICT,
        RewardError::TimedOut { .. } => StatusCode::GATEWAY_TIMEOUT,
        RewardError::Signing(_) | RewardError::State(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn hex_hash(hash: B256) -> String {
    format!("0x{}", hex::encode(hash))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "BAD_REQUEST",
                    message,
                    hash: None,
                },
            ),
            ApiError::Reward(e) => (
                status_for(&e),
                ErrorBody {
                    code: e.code(),
                    message: e.to_string(),
                    hash: e.transaction_hash().map(hex_hash),
                },
            ),
        };
        (status, Json(ErrorEnvelope { error: body })).into_response()
    }
}

async fn map_middleware_error(err: BoxError) -> impl IntoResponse {
    let (status, code) = if err.is::<tower::load_shed::error::Overloaded>() {
        (StatusCode::SERVICE_UNAVAILABLE, "OVERLOADED")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL")
    };
    (
        status,
        Json(serde_json::json!({
            "error": { "code": code, "message": err.to_string() }
        })),
    )
}

async fn track_metrics(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| req.uri().path().to_owned());
    let started = StdInstant::now();
    let response = next.run(req).await;
    rpc_metrics().inc_requests_total(&route, response.status().as_u16());
    rpc_metrics().observe_request_duration(&route, started.elapsed().as_secs_f64());
    response
}

// --- Request/Response Types ---

#[derive(Deserialize)]
struct AwardRequest {
    address: String,
    amount: u64,
    #[serde(default)]
    gas_limit: Option<u64>,
    /// Decimal wei.
    #[serde(default)]
    gas_price_wei: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

#[derive(Deserialize)]
struct VerifiedAwardRequest {
    address: String,
    amount: u64,
    proof_base64: String,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    file_name: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

#[derive(Serialize)]
struct AwardResponse {
    hash: String,
    status: TxStatus,
    block_number: Option<u64>,
}

impl From<&TransactionResult> for AwardResponse {
    fn from(result: &TransactionResult) -> Self {
        Self {
            hash: hex_hash(result.hash()),
            status: result.status(),
            block_number: result.block_number(),
        }
    }
}

#[derive(Serialize)]
struct PointsResponse {
    address: String,
    points: String,
}

fn award_options(timeout_secs: Option<u64>, gas: GasOverrides) -> Result<AwardOptions, ApiError> {
    let mut options = match timeout_secs {
        Some(0) => return Err(ApiError::BadRequest("timeout_secs must be positive".into())),
        Some(secs) => AwardOptions::with_timeout(Duration::from_secs(secs)),
        None => AwardOptions::default(),
    };
    options.gas = gas;
    Ok(options)
}

fn gas_overrides(
    gas_limit: Option<u64>,
    gas_price_wei: Option<&str>,
) -> Result<GasOverrides, ApiError> {
    if gas_limit == Some(0) {
        return Err(ApiError::BadRequest("gas_limit must be positive".into()));
    }
    let gas_price = gas_price_wei
        .map(|raw| raw.trim().parse::<u128>())
        .transpose()
        .map_err(|_| ApiError::BadRequest("gas_price_wei must be a decimal integer".into()))?;
    if gas_price == Some(0) {
        return Err(ApiError::BadRequest("gas_price_wei must be positive".into()));
    }
    Ok(GasOverrides {
        gas_limit,
        gas_price,
    })
}

// --- Handlers ---

/// Shared handler state.
#[derive(Clone)]
pub struct GatewayState {
    ledger: Arc<RewardLedger>,
}

impl GatewayState {
    /// Wraps a ready ledger.
    pub fn new(ledger: Arc<RewardLedger>) -> Self {
        Self { ledger }
    }
}

async fn award_handler(
    State(state): State<GatewayState>,
    Json(payload): Json<AwardRequest>,
) -> Result<Json<AwardResponse>, ApiError> {
    let gas = gas_overrides(payload.gas_limit, payload.gas_price_wei.as_deref())?;
    let options = award_options(payload.timeout_secs, gas)?;
    let result = state
        .ledger
        .award_points_with(&payload.address, payload.amount, options)
        .await?;
    tracing::info!(
        target: "gateway",
        hash = %hex_hash(result.hash()),
        amount = payload.amount,
        "Award confirmed"
    );
    Ok(Json(AwardResponse::from(&result)))
}

async fn verified_award_handler(
    State(state): State<GatewayState>,
    Json(payload): Json<VerifiedAwardRequest>,
) -> Result<Json<AwardResponse>, ApiError> {
    let bytes = BASE64
        .decode(payload.proof_base64.trim())
        .map_err(|e| ApiError::BadRequest(format!("proof_base64: {}", e)))?;
    tracing::debug!(target: "gateway", proof_len = bytes.len(), "Verified award request");
    let mut proof = ProofArtifact::new(bytes);
    if let Some(content_type) = payload.content_type {
        proof = proof.with_content_type(content_type);
    }
    if let Some(file_name) = payload.file_name {
        proof = proof.with_file_name(file_name);
    }
    let options = award_options(payload.timeout_secs, GasOverrides::default())?;
    let result = state
        .ledger
        .award_for_proof(&proof, &payload.address, payload.amount, options)
        .await?;
    tracing::info!(
        target: "gateway",
        hash = %hex_hash(result.hash()),
        amount = payload.amount,
        "Verified award confirmed"
    );
    Ok(Json(AwardResponse::from(&result)))
}

async fn points_handler(
    State(state): State<GatewayState>,
    Path(address): Path<String>,
) -> Result<Json<PointsResponse>, ApiError> {
    let balance = state.ledger.get_points(&address).await?;
    Ok(Json(PointsResponse {
        address: balance.account.to_string(),
        points: balance.points.to_string(),
    }))
}

async fn health_handler() -> &'static str {
    "OK"
}

// --- Server ---

/// Builds the gateway router with its middleware stack.
pub fn router(state: GatewayState, config: &GatewayConfig) -> Router {
    Router::new()
        .route("/v1/awards", post(award_handler))
        .route("/v1/awards/verified", post(verified_award_handler))
        .route("/v1/points/:address", get(points_handler))
        .route("/healthz", get(health_handler))
        .route_layer(middleware::from_fn(track_metrics))
        .with_state(state)
        // `HandleErrorLayer` must wrap the fallible layers to make the service infallible.
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(map_middleware_error))
                .layer(LoadShedLayer::new())
                .layer(ConcurrencyLimitLayer::new(config.concurrency_limit)),
        )
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
}

/// Serves the gateway until `shutdown_rx` changes.
pub async fn run_server(
    config: GatewayConfig,
    ledger: Arc<RewardLedger>,
    mut shutdown_rx: watch::Receiver<bool>,
) -> Result<()> {
    let app = router(GatewayState::new(ledger), &config);
    let addr: SocketAddr = config.listen_address.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(target: "gateway", "EcoPoints gateway listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_rx.changed().await.ok();
            tracing::info!(target: "gateway", "shutting down gracefully");
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests;
