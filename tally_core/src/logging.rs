//! Tracing setup for applications embedding the engine.

use crate::{Error, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber at the default `info` level.
///
/// `RUST_LOG` takes precedence over the default when set.
pub fn init() -> Result<()> {
    init_with_filter("info")
}

/// Install the global tracing subscriber with an explicit filter
/// directive, e.g. `tally_core=debug`.
///
/// Fails if a subscriber is already installed; callers that don't care who
/// won the race (test harnesses, embedding applications with their own
/// setup) can discard the result.
pub fn init_with_filter(directives: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(env_filter) => env_filter,
        Err(_) => EnvFilter::new(directives),
    };

    fmt()
        .with_env_filter(filter)
        .compact()
        .try_init()
        .map_err(|e| Error::Config(format!("failed to install tracing subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_existing_subscriber() {
        // no other unit test installs a subscriber, so the first call wins
        // and the second must refuse rather than silently replace it
        init_with_filter("tally_core=debug").unwrap();
        let err = init().unwrap_err();
        assert!(err.to_string().contains("tracing subscriber"));
    }
}
