use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber, writing to stderr.
///
/// `RUST_LOG` overrides the level; otherwise `warn`, or `debug` when
/// `verbose` is set. Calling it twice is a no-op.
pub fn init_logger(verbose: bool) {
    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let installed = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .with_line_number(false)
                .with_file(false),
        )
        .with(filter)
        .try_init();
    if installed.is_err() {
        // A subscriber is already in place; keep it.
        tracing::debug!("global tracing subscriber already installed");
    }
}
