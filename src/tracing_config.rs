use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing with file and console logging
///
/// 1. Console (stdout): `RUST_LOG` if set, INFO and above otherwise
/// 2. File: DEBUG and above, rolled daily under `./logs`
///
/// The returned WorkerGuard keeps the non-blocking file writer alive; hold
/// it for the whole of `main` or buffered lines are lost on shutdown.
pub fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    // hijab_catalog.log.2025-11-01, hijab_catalog.log.2025-11-02, ...
    let file_appender = rolling::daily("./logs", "hijab_catalog.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_filter(EnvFilter::new("debug"));

    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_filter(console_filter);

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::info!("Tracing initialized (console=RUST_LOG or INFO+, file=DEBUG+)");

    guard
}
