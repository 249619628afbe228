//! Runtime configuration read from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use eyre::{eyre, Result};

use crate::arb::search::SearchConfig;

/// Default directory holding the exchange snapshots
pub const DEFAULT_SNAPSHOT_DIR: &str = "snapshots";

/// Settings of a scanning run.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Search parameters shared by every exchange
    pub search: SearchConfig,
    /// Directory the snapshot source reads from
    pub snapshot_dir: PathBuf,
    /// Number of opportunities reported per exchange
    pub top: usize,
    /// Print the total execution time after the per-exchange timings
    pub benchmark: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            snapshot_dir: PathBuf::from(DEFAULT_SNAPSHOT_DIR),
            top: 1,
            benchmark: true,
        }
    }
}

impl Config {
    /// Loads `.env` if there is one, then reads the `TRIARB_*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        // A missing .env file is fine
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from `lookup`, falling back to the defaults for
    /// every unset key.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is present but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(hops) = parse(&lookup, "TRIARB_MAX_HOPS")? {
            config.search.max_hops = hops;
        }
        if let Some(min) = parse(&lookup, "TRIARB_MIN_MULTIPLIER")? {
            config.search.min_multiplier = min;
        }
        if let Some(visits) = parse::<u64>(&lookup, "TRIARB_MAX_VISITS")? {
            config.search.max_visits = (visits > 0).then_some(visits);
        }
        if let Some(ms) = parse::<u64>(&lookup, "TRIARB_DEADLINE_MS")? {
            config.search.deadline = (ms > 0).then(|| Duration::from_millis(ms));
        }
        if let Some(dir) = lookup("TRIARB_SNAPSHOT_DIR") {
            config.snapshot_dir = PathBuf::from(dir);
        }
        if let Some(top) = parse(&lookup, "TRIARB_TOP")? {
            config.top = top;
        }
        if let Some(benchmark) = lookup("IS_BENCHMARKING") {
            config.benchmark = parse_flag(&benchmark)
                .ok_or_else(|| eyre!("IS_BENCHMARKING must be true or false, got '{benchmark}'"))?;
        }

        Ok(config)
    }
}

/// Parses `key` if it is set.
fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| eyre!("Invalid value '{raw}' for {key}: {e}"))
        })
        .transpose()
}

/// Reads a boolean the way shell users write them.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
