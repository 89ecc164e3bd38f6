//! Tracing subscriber setup

use tracing_subscriber::EnvFilter;

use cuenode_core::{CueError, CueResult};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `filter`. Fails if a subscriber is
/// already installed.
pub fn init_logging(filter: &str, json: bool) -> CueResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .map_err(|e| CueError::Config(format!("log filter: {e}")))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| CueError::Config(format!("logging: {e}")))
}
