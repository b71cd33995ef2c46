// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling core logic from the backend.

use once_cell::sync::OnceCell;

// --- Static Sink Access ---

/// A no-op sink for use in tests or when telemetry is disabled.
#[derive(Debug, Clone, Copy)]
pub struct NopSink;

static LEDGER_SINK: OnceCell<&'static dyn LedgerMetricsSink> = OnceCell::new();
static RPC_SINK: OnceCell<&'static dyn RpcMetricsSink> = OnceCell::new();
static ERROR_SINK: OnceCell<&'static dyn ErrorMetricsSink> = OnceCell::new();
static NOP_SINK: NopSink = NopSink;

/// Installs `sink` as the global backend for every sink accessor.
///
/// Returns `false` if a sink was already installed; the first one stays.
pub fn install_global<S: MetricsSink + 'static>(sink: &'static S) -> bool {
    let ledger = LEDGER_SINK.set(sink).is_ok();
    let rpc = RPC_SINK.set(sink).is_ok();
    let error = ERROR_SINK.set(sink).is_ok();
    ledger && rpc && error
}

/// Returns a static reference to the configured ledger metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn ledger_metrics() -> &'static dyn LedgerMetricsSink {
    LEDGER_SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured HTTP gateway metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn rpc_metrics() -> &'static dyn RpcMetricsSink {
    RPC_SINK.get().copied().unwrap_or(&NOP_SINK)
}

/// Returns a static reference to the configured error metrics sink.
/// If no sink has been initialized, it returns a no-op sink.
pub fn error_metrics() -> &'static dyn ErrorMetricsSink {
    ERROR_SINK.get().copied().unwrap_or(&NOP_SINK)
}

// --- Trait Definitions ---

/// A sink for metrics about award transactions and the ledger node.
pub trait LedgerMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments the counter of transactions accepted by the node.
    fn inc_awards_submitted(&self);
    /// Increments the counter of resolved awards, labeled by final status
    /// (`confirmed`, `reverted`, `failed`, `timed_out`).
    fn inc_award_outcome(&self, status: &str);
    /// Increments the counter of retried node calls, labeled by RPC method.
    fn inc_node_retry(&self, method: &'static str);
    /// Observes the latency of a single node call, labeled by RPC method.
    fn observe_node_call_duration(&self, method: &'static str, duration_secs: f64);
    /// Observes the time from submission to an observed receipt.
    fn observe_confirmation_latency(&self, duration_secs: f64);
    /// Sets the gauge for the next locally reserved nonce of the sending account.
    fn set_next_nonce(&self, nonce: u64);
    /// Increments the counter of oracle verdicts (`accepted`, `rejected`).
    fn inc_oracle_verdict(&self, verdict: &'static str);
}
impl LedgerMetricsSink for NopSink {
    fn inc_awards_submitted(&self) {}
    fn inc_award_outcome(&self, _status: &str) {}
    fn inc_node_retry(&self, _method: &'static str) {}
    fn observe_node_call_duration(&self, _method: &'static str, _duration_secs: f64) {}
    fn observe_confirmation_latency(&self, _duration_secs: f64) {}
    fn set_next_nonce(&self, _nonce: u64) {}
    fn inc_oracle_verdict(&self, _verdict: &'static str) {}
}

/// A sink for metrics related to the public HTTP gateway.
pub trait RpcMetricsSink: Send + Sync + std::fmt::Debug {
    /// Observes the latency of a gateway request, labeled by route.
    fn observe_request_duration(&self, route: &str, duration_secs: f64);
    /// Increments a counter for total gateway requests, labeled by route and status code.
    fn inc_requests_total(&self, route: &str, status_code: u16);
}
impl RpcMetricsSink for NopSink {
    fn observe_request_duration(&self, _route: &str, _duration_secs: f64) {}
    fn inc_requests_total(&self, _route: &str, _status_code: u16) {}
}

/// A sink for recording structured error metrics.
pub trait ErrorMetricsSink: Send + Sync + std::fmt::Debug {
    /// Increments a counter for a specific error, categorized by its kind and variant.
    fn inc_error(&self, kind: &'static str, variant: &'static str);
}
impl ErrorMetricsSink for NopSink {
    fn inc_error(&self, _kind: &'static str, _variant: &'static str) {}
}

/// A unified sink that implements all domain-specific traits, providing a single
/// point of implementation for metrics backends like Prometheus.
pub trait MetricsSink: LedgerMetricsSink + RpcMetricsSink + ErrorMetricsSink {}

// Blanket implementation to allow any type that implements all sub-traits
// to be used as a `MetricsSink`.
impl<T> MetricsSink for T where T: LedgerMetricsSink + RpcMetricsSink + ErrorMetricsSink {}
