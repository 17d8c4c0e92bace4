//! Logging initialization

use tracing_subscriber::EnvFilter;

/// Initialize tracing with standard configuration
///
/// `RUST_LOG` wins when set; otherwise everything at info and above.
pub fn init_tracing() {
    init_tracing_with_level("info");
}

/// Initialize tracing, falling back to `level` when `RUST_LOG` is unset
pub fn init_tracing_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .try_init();
}
