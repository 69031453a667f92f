use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "crypto_watchlist=info,warn";

/// Installs the fmt subscriber on stderr. `RUST_LOG` overrides the default
/// filter. Safe to call more than once; later calls are ignored.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
