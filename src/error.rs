//! Error types of the detection core.
//!
//! Only infrastructure problems are errors. Bad ticker records are dropped
//! while the graph is built, "no opportunity" is a normal result, and a search
//! that runs out of budget returns a partial result.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a ticker source to deliver a snapshot.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The source does not know this exchange.
    #[error("exchange '{0}' not found")]
    UnknownExchange(String),

    /// The snapshot could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The snapshot was read but is not a list of tickers.
    #[error("malformed snapshot for {exchange}: {source}")]
    Malformed {
        /// Exchange whose snapshot failed to parse
        exchange: String,
        /// Underlying error
        source: serde_json::Error,
    },
}

/// Failure of one exchange scan.
///
/// A scan that ran and found nothing is not an error.
#[derive(Error, Debug)]
pub enum DetectError {
    /// No usable snapshot could be obtained.
    #[error("fetching tickers for {exchange} failed: {source}")]
    Fetch {
        /// Exchange being scanned
        exchange: String,
        /// What the source reported
        #[source]
        source: FetchError,
    },

    /// The search configuration was rejected.
    #[error("invalid search configuration: {0}")]
    InvalidConfig(String),

    /// The blocking search task panicked or was cancelled.
    #[error("search task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl DetectError {
    /// Whether the scan failed before any detection could run.
    #[must_use]
    pub const fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, DetectError>;
