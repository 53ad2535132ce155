//! Tracing subscriber installation.

use crate::config::TelemetryConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}'")]
    Filter {
        value: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("failed to install tracing subscriber: {0}")]
    Install(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Install the process-wide subscriber. `RUST_LOG` takes precedence over the
/// configured level; an unparseable filter in either place is an error.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = resolve_filter(std::env::var("RUST_LOG").ok(), &config.log_level)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Install)
}

fn resolve_filter(
    env_override: Option<String>,
    configured: &str,
) -> Result<EnvFilter, TelemetryError> {
    let value = env_override.unwrap_or_else(|| configured.to_string());
    EnvFilter::try_new(&value).map_err(|source| TelemetryError::Filter { value, source })
}
