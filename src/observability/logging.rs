//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per binary
//! - Pick the filter from `RUST_LOG`, falling back to config
//! - Choose between human-readable and JSON output

use tracing_subscriber::EnvFilter;

use crate::config::ObservabilityConfig;

/// Install the global tracing subscriber.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<(), String> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_level)
            .map_err(|err| format!("invalid log filter `{}`: {err}", config.log_level))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    let result = if config.log_format.trim().eq_ignore_ascii_case("json") {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|err| format!("failed to install tracing subscriber: {err}"))
}
