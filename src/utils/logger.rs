use chrono::Local;
use eyre::Result;
use fern::Dispatch;
use log::LevelFilter;

/// Reads the log level from `RUST_LOG`, `fallback` if unset or invalid.
#[must_use]
pub fn level_from_env(fallback: LevelFilter) -> LevelFilter {
    std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse().ok())
        .unwrap_or(fallback)
}

/// Sets up the application logger with console output.
///
/// # Returns
/// * `Result<()>` - Success or failure of logger setup
///
/// # Errors
/// * If a global logger was already installed
pub fn setup_logger(level: LevelFilter) -> Result<()> {
    Dispatch::new()
        .level(level)
        // Configure logging to console
        .chain(std::io::stdout())
        // Format log messages with time and log level
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                message
            ));
        })
        .apply()?;
    Ok(())
}
