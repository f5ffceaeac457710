//! Tracing subscriber setup for binaries, benches, and tests.
//!
//! `RUST_LOG` selects the filter (default `atomspace_kernel=info`).
//! `LOG_FORMAT=pretty` selects human-readable output; anything else is JSON.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
    EnvFilter,
};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "atomspace_kernel=info";

/// Install the global subscriber. Panics if one is already installed.
pub fn init_tracing() {
    if let Err(e) = try_init_tracing() {
        panic!("Failed to install tracing subscriber: {}", e);
    }
}

/// Install the global subscriber, failing if one is already installed.
pub fn try_init_tracing() -> Result<(), TryInitError> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    }
}
