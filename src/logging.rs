//! Logging setup for the command-line binary.

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Human-readable progress lines on stdout; DEBUG when verbose, INFO otherwise
pub fn init_logging(verbose: bool) -> Result<(), String> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(verbose)
        .without_time()
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to initialize logging: {}", e))
}
