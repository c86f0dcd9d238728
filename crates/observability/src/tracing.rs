//! Process-wide subscriber.
//!
//! Filtering comes from `RUST_LOG` and falls back to `info`.

use tracing_subscriber::EnvFilter;

use crate::LogFormat;

/// Install the global subscriber.
///
/// Safe to call more than once; only the first call has an effect.
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime);

    let _ = match format {
        LogFormat::Json => builder.json().with_target(false).try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
}
