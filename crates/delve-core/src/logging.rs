//! Tracing setup for hosts and tests
//!
//! Library code only emits events under the `delve::gen`, `delve::vault`
//! and `delve::beam` targets. Installing a subscriber is left to the host;
//! [`init_logging`] is a convenience for tests and simple embedders.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

pub const GEN_TARGET: &str = "delve::gen";
pub const VAULT_TARGET: &str = "delve::vault";
pub const BEAM_TARGET: &str = "delve::beam";

/// Environment variable that overrides the filter passed to [`init_logging`]
pub const LOG_ENV: &str = "DELVE_LOG";

static LOGGING_INIT: Once = Once::new();

/// Install a compact fmt subscriber (idempotent; first call wins)
pub fn init_logging(filter: &str) {
    let fallback = filter.to_string();
    LOGGING_INIT.call_once(move || {
        let filter =
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(&fallback));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .compact();

        // Another subscriber may already be installed by the host
        let _ = subscriber.try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_logging("warn");
        init_logging("debug");
        tracing::debug!(target: GEN_TARGET, "still fine");
    }
}
