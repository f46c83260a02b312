use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing for the host process.
///
/// Honors `RUST_LOG`; defaults to debug output for this crate. Call once at
/// startup from the embedding service; safe to skip in tests.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reshadx_scoring=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
