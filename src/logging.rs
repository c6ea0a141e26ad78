use tracing::Subscriber;
use tracing_subscriber::{fmt, EnvFilter};

/// Build a formatted subscriber. `RUST_LOG` wins over `default_level` when set.
///
/// The caller decides its lifetime, e.g. with `tracing::subscriber::with_default`.
pub fn subscriber(default_level: &str) -> impl Subscriber + Send + Sync {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish()
}
