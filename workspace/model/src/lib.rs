pub mod entities;

// Re-export tracing for use in this crate
pub use tracing;

/// Initializes the global tracing subscriber.
///
/// The filter is taken from `RUST_LOG` and falls back to `default_filter`
/// when the variable is unset or invalid.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A subscriber may already be installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .try_init();
}
