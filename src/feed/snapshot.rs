use std::path::{Path, PathBuf};

use serde_json::Value;

use super::TickerSource;
use crate::arb::ticker::{self, RawTicker, TickerRecord};
use crate::error::FetchError;

/// Reads snapshots from `<dir>/<exchange_id>.json`.
///
/// Each file holds a JSON array of tickers:
///
/// ```json
/// [{"symbol": "BTC/USDT", "bid": 50000.0, "ask": 50010.0, "last": 50005.0, "timestamp": 1700000000000}]
/// ```
///
/// Entries that do not have the expected shape are skipped; only a file that
/// is missing, unreadable, or not an array fails the fetch.
#[derive(Debug, Clone)]
pub struct SnapshotDir {
    /// Directory holding one file per exchange
    dir: PathBuf,
}

impl SnapshotDir {
    /// Creates a source rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the snapshots are read from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the snapshot file for `exchange`.
    #[must_use]
    pub fn path_for(&self, exchange: &str) -> PathBuf {
        self.dir.join(format!("{exchange}.json"))
    }

    /// Parses the content of a snapshot file.
    fn parse(exchange: &str, content: &str) -> Result<Vec<TickerRecord>, FetchError> {
        let entries: Vec<Value> =
            serde_json::from_str(content).map_err(|source| FetchError::Malformed {
                exchange: exchange.to_string(),
                source,
            })?;
        let total = entries.len();

        let raw: Vec<RawTicker> = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value(entry) {
                Ok(raw) => Some(raw),
                Err(e) => {
                    log::debug!("{exchange}: skipping malformed ticker: {e}");
                    None
                }
            })
            .collect();
        let records = ticker::from_raw(raw);

        log::debug!("{exchange}: loaded {} of {total} tickers", records.len());
        Ok(records)
    }
}

impl TickerSource for SnapshotDir {
    async fn fetch_tickers(&self, exchange: &str) -> Result<Vec<TickerRecord>, FetchError> {
        let path = self.path_for(exchange);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(FetchError::UnknownExchange(exchange.to_string()));
            }
            Err(source) => return Err(FetchError::Io { path, source }),
        };
        Self::parse(exchange, &content)
    }
}
