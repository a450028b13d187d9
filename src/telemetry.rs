//! Structured logging setup
//!
//! Logs go to stdout through `tracing-subscriber`, as JSON lines by default
//! or as plain text for local runs. `RUST_LOG` overrides the default filter.

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogFormat;

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str =
    "info,clusterlifecycle_state_metrics=debug,kube=info,tower=warn,hyper=warn";

/// Errors that can occur during logging initialization
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Failed to initialize tracing subscriber
    #[error("failed to initialize tracing subscriber: {0}")]
    SubscriberInit(String),
}

/// Build the filter from `RUST_LOG`, falling back to [`DEFAULT_FILTER`]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber
///
/// Fails if a global subscriber is already set.
pub fn init_logging(format: LogFormat) -> Result<(), TelemetryError> {
    let registry = tracing_subscriber::registry().with(env_filter());

    let result = match format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .try_init(),
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
    };

    result.map_err(|e| TelemetryError::SubscriberInit(e.to_string()))
}
