use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global tracing subscriber. `RUST_LOG` wins over the
/// configured level; `--verbose` forces debug. Output goes to stderr so it
/// stays out of the chat scrollback.
pub fn init_logging(level: &str, verbose: bool) {
    let default_level = if verbose { "debug" } else { level };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();
}
