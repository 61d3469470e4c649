//! Tracing setup for the binary.
//!
//! Filter comes from `HANGLE_LOG`, then `RUST_LOG`, then
//! [`DEFAULT_LOG_FILTER`]. Output goes to stderr so stdout stays free for
//! the banner and summary.

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::consts::DEFAULT_LOG_FILTER;

pub const LOG_ENV: &str = "HANGLE_LOG";

pub fn filter() -> EnvFilter {
    resolve(
        std::env::var(LOG_ENV).ok().as_deref(),
        std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref(),
    )
}

/// The first of `own` and `rust_log` that parses, else the default directive.
fn resolve(own: Option<&str>, rust_log: Option<&str>) -> EnvFilter {
    [own, rust_log]
        .into_iter()
        .flatten()
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Install the global subscriber. Fails if one is already set.
pub fn init() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_timer(fmt::time::uptime()),
        )
        .with(filter())
        .try_init()
        .map_err(|e| anyhow!("failed to initialize logging: {e}"))
}
