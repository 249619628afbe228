//! Ticker records as they enter the detection core.
//!
//! Exchanges hand us loosely-shaped ticker objects. They are converted into a
//! fixed [`TickerRecord`] at the boundary and anything that does not fit is
//! rejected there, before it can reach the graph.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::currency::Pair;

/// Point-in-time best bid/ask for one market.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerRecord {
    /// The market this ticker belongs to
    pub symbol: Pair,
    /// Best price someone is willing to buy the base at
    pub bid: f64,
    /// Best price someone is willing to sell the base at
    pub ask: f64,
    /// Last traded price, informational only
    pub last_price: f64,
    /// When the exchange produced this ticker
    pub timestamp: DateTime<Utc>,
}

impl TickerRecord {
    /// Creates a ticker record.
    pub fn new(
        symbol: Pair,
        bid: f64,
        ask: f64,
        last_price: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol,
            bid,
            ask,
            last_price,
            timestamp,
        }
    }

    /// Whether the record describes a book a trade could actually hit.
    ///
    /// Both sides must be finite and positive, the book must not be crossed
    /// (`bid > ask`) and the pair must trade two different currencies.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.symbol.base != self.symbol.quote
            && self.bid.is_finite()
            && self.ask.is_finite()
            && self.bid > 0.0
            && self.ask > 0.0
            && self.bid <= self.ask
    }
}

/// A ticker as serialized by a snapshot file.
///
/// Every numeric field is optional since exchanges routinely omit them for
/// illiquid markets.
#[derive(Debug, Clone, Deserialize)]
pub struct RawTicker {
    /// Unified `BASE/QUOTE` symbol
    pub symbol: String,
    /// Best bid
    #[serde(default)]
    pub bid: Option<f64>,
    /// Best ask
    #[serde(default)]
    pub ask: Option<f64>,
    /// Last traded price
    #[serde(default)]
    pub last: Option<f64>,
    /// Epoch milliseconds
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl TryFrom<RawTicker> for TickerRecord {
    type Error = String;

    fn try_from(raw: RawTicker) -> Result<Self, Self::Error> {
        let symbol =
            Pair::parse(&raw.symbol).ok_or_else(|| format!("bad symbol {:?}", raw.symbol))?;
        let bid = raw.bid.ok_or_else(|| format!("{symbol}: missing bid"))?;
        let ask = raw.ask.ok_or_else(|| format!("{symbol}: missing ask"))?;
        // A missing timestamp sorts before every real one, so any timestamped
        // duplicate supersedes it.
        let timestamp = raw
            .timestamp
            .and_then(DateTime::from_timestamp_millis)
            .unwrap_or(DateTime::UNIX_EPOCH);

        Ok(Self {
            symbol,
            bid,
            ask,
            last_price: raw.last.unwrap_or(f64::NAN),
            timestamp,
        })
    }
}

/// Converts raw tickers into records, dropping the ones that cannot be
/// represented.
pub fn from_raw(raw: impl IntoIterator<Item = RawTicker>) -> Vec<TickerRecord> {
    raw.into_iter()
        .filter_map(|raw| match TickerRecord::try_from(raw) {
            Ok(record) => Some(record),
            Err(reason) => {
                log::debug!("Dropping ticker: {reason}");
                None
            }
        })
        .collect()
}
