//! Tracing subscriber setup for the `harvest` binary.

use tracing_subscriber::EnvFilter;

/// Default filter directive for a given number of `-v` flags.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Install a stderr subscriber.
///
/// `RUST_LOG` takes precedence over the verbosity level. Stdout is left to
/// the JSON result.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
