//! Structured logging to stderr.
//!
//! `RUST_LOG` takes precedence; otherwise warnings are shown, or debug
//! output for csquid itself when `verbose` is set.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "warn,csquid=debug"
    } else {
        "warn"
    }
}

/// Install the global subscriber. Calling it twice is harmless.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false);

    // try_init fails only if a subscriber is already set
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();
}
