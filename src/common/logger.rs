use tracing_subscriber::EnvFilter;

use crate::configs::LoggingConfig;

/// Install the global tracing subscriber. `RUST_LOG` wins over the config
/// level. Safe to call more than once; later calls are no-ops.
pub fn init(logging: Option<&LoggingConfig>) {
    let level = logging
        .and_then(|l| l.level.clone())
        .unwrap_or_else(|| "info".to_string());
    let fallback = match logging.and_then(|l| l.filters.clone()) {
        Some(filters) => format!("{level},{filters}"),
        None => level,
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .try_init();
}
