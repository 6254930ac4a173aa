use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::config::LogSettings;

/// Install the global subscriber. `RUST_LOG` wins over `log.filter`.
///
/// Logs go to stderr; stdout belongs to the console.
pub fn init(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.filter))
        .unwrap_or_else(|_| EnvFilter::new("encore=info"));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();

    if let Err(e) = result {
        eprintln!("encore: logging already initialised: {e}");
    }
}
