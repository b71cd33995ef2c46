// Path: crates/telemetry/src/init.rs
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// The filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Initializes the global `tracing` subscriber for structured JSON logging to
/// stderr, bridging `log` records into it.
pub fn init_tracing() -> Result<(), anyhow::Error> {
    init_tracing_with(DEFAULT_FILTER)
}

/// Like [`init_tracing`], with a caller-chosen fallback filter
/// (e.g. `"ecopoints=debug,info"` for `--verbose`).
pub fn init_tracing_with(default_filter: &str) -> Result<(), anyhow::Error> {
    let fmt_layer = fmt::layer()
        .json()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_current_span(false)
        .with_timer(fmt::time::UtcTime::rfc_3339());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let subscriber = Registry::default().with(filter).with(fmt_layer);
    tracing_log::LogTracer::init()?;
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
