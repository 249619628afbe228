//! # Ticker feeds
//!
//! The detection core never talks to an exchange. It asks a [`TickerSource`]
//! for a complete snapshot and works on that. Sources decide how tickers are
//! obtained (network, files, memory); retries and rate limiting are their
//! business.

use std::future::Future;

use crate::arb::ticker::TickerRecord;
use crate::error::FetchError;

/// In-memory snapshots
mod memory;
/// One JSON file per exchange
mod snapshot;

pub use memory::StaticSource;
pub use snapshot::SnapshotDir;

/// Something that can produce a point-in-time ticker snapshot for an exchange.
///
/// The returned collection must be complete: it is consumed as-is and never
/// observed while still being filled.
pub trait TickerSource: Send + Sync {
    /// Fetches every ticker of `exchange`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] when no snapshot can be produced.
    fn fetch_tickers(
        &self,
        exchange: &str,
    ) -> impl Future<Output = Result<Vec<TickerRecord>, FetchError>> + Send;
}
