//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "TOKENLENS_LOG";

static INIT: Once = Once::new();

/// Installs a stderr subscriber.
///
/// The filter comes from `TOKENLENS_LOG` (for example
/// `TOKENLENS_LOG=tokenlens_css=trace,tokenlens_core::cluster=debug`). When it
/// is unset or invalid, the default is `tokenlens=warn`, or `tokenlens=debug`
/// with `verbose`.
///
/// Only the first call has an effect.
pub fn init_tracing(verbose: bool) {
    INIT.call_once(|| {
        let fallback = if verbose {
            "tokenlens=debug"
        } else {
            "tokenlens=warn"
        };
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(filter)
            .init();
    });
}
