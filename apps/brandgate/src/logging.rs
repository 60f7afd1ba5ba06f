//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging to stderr.
///
/// Reads `BRANDGATE_LOG` for per-module levels, e.g.
/// `BRANDGATE_LOG=brandgate::gates=debug,brandgate::context=info`.
/// Falls back to `brandgate=warn`, or `brandgate=debug` when `debug` is set.
/// Safe to call more than once.
pub fn init_tracing(debug: bool) {
    INIT.call_once(|| {
        let default = if debug { "brandgate=debug" } else { "brandgate=warn" };
        let filter =
            EnvFilter::try_from_env("BRANDGATE_LOG").unwrap_or_else(|_| EnvFilter::new(default));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(debug)
                    .with_ansi(std::env::var_os("NO_COLOR").is_none()),
            )
            .with(filter)
            .init();
    });
}
