use std::collections::HashMap;

use super::TickerSource;
use crate::arb::ticker::TickerRecord;
use crate::error::FetchError;

/// Serves fixed snapshots from memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    /// Snapshot per exchange id
    snapshots: HashMap<String, Vec<TickerRecord>>,
}

impl StaticSource {
    /// Creates an empty source; every fetch fails with `UnknownExchange`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the snapshot returned for `exchange`.
    #[must_use]
    pub fn with(mut self, exchange: impl Into<String>, tickers: Vec<TickerRecord>) -> Self {
        self.snapshots.insert(exchange.into(), tickers);
        self
    }
}

impl TickerSource for StaticSource {
    async fn fetch_tickers(&self, exchange: &str) -> Result<Vec<TickerRecord>, FetchError> {
        self.snapshots
            .get(exchange)
            .cloned()
            .ok_or_else(|| FetchError::UnknownExchange(exchange.to_string()))
    }
}
