use tracing_subscriber::EnvFilter;

use crate::UvAdvisoryError;
use crate::config::LoggingConfig;

/// Install the global tracing subscriber on stderr. `RUST_LOG` wins over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> crate::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = match config.format.as_str() {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };

    installed.map_err(|e| {
        UvAdvisoryError::general(format!("Failed to install tracing subscriber: {e}"))
    })
}
