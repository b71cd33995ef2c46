// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::OnceCell;
use prometheus::{
    exponential_buckets, register_histogram, register_histogram_vec, register_int_counter,
    register_int_counter_vec, register_int_gauge, Histogram, HistogramVec, IntCounter,
    IntCounterVec, IntGauge,
};

// --- Metric Statics ---
// The collectors are initialized exactly once by `install`.

static AWARDS_SUBMITTED_TOTAL: OnceCell<IntCounter> = OnceCell::new();
static AWARD_OUTCOMES_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static NODE_RETRIES_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static NODE_CALL_DURATION_SECONDS: OnceCell<HistogramVec> = OnceCell::new();
static CONFIRMATION_LATENCY_SECONDS: OnceCell<Histogram> = OnceCell::new();
static NEXT_NONCE: OnceCell<IntGauge> = OnceCell::new();
static ORACLE_VERDICTS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static GATEWAY_REQUESTS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();
static GATEWAY_REQUEST_DURATION_SECONDS: OnceCell<HistogramVec> = OnceCell::new();
static ERRORS_TOTAL: OnceCell<IntCounterVec> = OnceCell::new();

/// The Prometheus-backed sink.
#[derive(Debug, Clone, Copy)]
pub struct PrometheusSink;

/// Fetches a collector, skipping the observation if `install()` has not run.
macro_rules! get_metric {
    ($metric:ident) => {
        match $metric.get() {
            Some(m) => m,
            None => return,
        }
    };
}

impl LedgerMetricsSink for PrometheusSink {
    fn inc_awards_submitted(&self) {
        get_metric!(AWARDS_SUBMITTED_TOTAL).inc();
    }
    fn inc_award_outcome(&self, status: &str) {
        get_metric!(AWARD_OUTCOMES_TOTAL)
            .with_label_values(&[status])
            .inc();
    }
    fn inc_node_retry(&self, method: &'static str) {
        get_metric!(NODE_RETRIES_TOTAL)
            .with_label_values(&[method])
            .inc();
    }
    fn observe_node_call_duration(&self, method: &'static str, duration_secs: f64) {
        get_metric!(NODE_CALL_DURATION_SECONDS)
            .with_label_values(&[method])
            .observe(duration_secs);
    }
    fn observe_confirmation_latency(&self, duration_secs: f64) {
        get_metric!(CONFIRMATION_LATENCY_SECONDS).observe(duration_secs);
    }
    fn set_next_nonce(&self, nonce: u64) {
        get_metric!(NEXT_NONCE).set(i64::try_from(nonce).unwrap_or(i64::MAX));
    }
    fn inc_oracle_verdict(&self, verdict: &'static str) {
        get_metric!(ORACLE_VERDICTS_TOTAL)
            .with_label_values(&[verdict])
            .inc();
    }
}

impl RpcMetricsSink for PrometheusSink {
    fn observe_request_duration(&self, route: &str, duration_secs: f64) {
        get_metric!(GATEWAY_REQUEST_DURATION_SECONDS)
            .with_label_values(&[route])
            .observe(duration_secs);
    }
    fn inc_requests_total(&self, route: &str, status_code: u16) {
        get_metric!(GATEWAY_REQUESTS_TOTAL)
            .with_label_values(&[route, &status_code.to_string()])
            .inc();
    }
}

impl ErrorMetricsSink for PrometheusSink {
    fn inc_error(&self, kind: &'static str, variant: &'static str) {
        get_metric!(ERRORS_TOTAL)
            .with_label_values(&[kind, variant])
            .inc();
    }
}

fn already_installed(name: &str) -> prometheus::Error {
    prometheus::Error::Msg(format!("{} already initialized", name))
}

/// Registers all collectors with the default registry, installs the sink as
/// the global backend, and returns it. Call once at application startup.
pub fn install() -> Result<&'static PrometheusSink, prometheus::Error> {
    AWARDS_SUBMITTED_TOTAL
        .set(register_int_counter!(
            "ecopoints_awards_submitted_total",
            "Total award transactions accepted by the ledger node."
        )?)
        .map_err(|_| already_installed("awards_submitted_total"))?;
    AWARD_OUTCOMES_TOTAL
        .set(register_int_counter_vec!(
            "ecopoints_award_outcomes_total",
            "Resolved awards by final status.",
            &["status"]
        )?)
        .map_err(|_| already_installed("award_outcomes_total"))?;
    NODE_RETRIES_TOTAL
        .set(register_int_counter_vec!(
            "ecopoints_node_retries_total",
            "Node calls retried after a transient failure, by RPC method.",
            &["method"]
        )?)
        .map_err(|_| already_installed("node_retries_total"))?;
    NODE_CALL_DURATION_SECONDS
        .set(register_histogram_vec!(
            "ecopoints_node_call_duration_seconds",
            "Latency of individual ledger node JSON-RPC calls.",
            &["method"],
            exponential_buckets(0.001, 2.0, 15)?
        )?)
        .map_err(|_| already_installed("node_call_duration_seconds"))?;
    CONFIRMATION_LATENCY_SECONDS
        .set(register_histogram!(
            "ecopoints_confirmation_latency_seconds",
            "Time from submission to an observed receipt.",
            exponential_buckets(0.05, 2.0, 14)?
        )?)
        .map_err(|_| already_installed("confirmation_latency_seconds"))?;
    NEXT_NONCE
        .set(register_int_gauge!(
            "ecopoints_next_nonce",
            "Next locally reserved nonce of the sending account."
        )?)
        .map_err(|_| already_installed("next_nonce"))?;
    ORACLE_VERDICTS_TOTAL
        .set(register_int_counter_vec!(
            "ecopoints_oracle_verdicts_total",
            "Verification oracle verdicts.",
            &["verdict"]
        )?)
        .map_err(|_| already_installed("oracle_verdicts_total"))?;
    GATEWAY_REQUESTS_TOTAL
        .set(register_int_counter_vec!(
            "ecopoints_gateway_requests_total",
            "Total HTTP gateway requests.",
            &["route", "status"]
        )?)
        .map_err(|_| already_installed("gateway_requests_total"))?;
    GATEWAY_REQUEST_DURATION_SECONDS
        .set(register_histogram_vec!(
            "ecopoints_gateway_request_duration_seconds",
            "Latency of HTTP gateway requests.",
            &["route"],
            exponential_buckets(0.001, 2.0, 15)?
        )?)
        .map_err(|_| already_installed("gateway_request_duration_seconds"))?;
    ERRORS_TOTAL
        .set(register_int_counter_vec!(
            "ecopoints_errors_total",
            "Total number of errors, categorized by type and variant.",
            &["kind", "variant"]
        )?)
        .map_err(|_| already_installed("errors_total"))?;

    static SINK: PrometheusSink = PrometheusSink;
    install_global(&SINK);
    Ok(&SINK)
}
