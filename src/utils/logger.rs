use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, fmt};

static TRACING_INIT: OnceCell<()> = OnceCell::new();

/// Install the global subscriber, logging at `default_level` unless
/// `RUST_LOG` says otherwise. Later calls are no-ops.
pub fn init_tracing(default_level: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        // stderr keeps stdout free for command output
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();

        // Another subscriber may already be installed by the embedding application
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
