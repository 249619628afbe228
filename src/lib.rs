/*!
 * # Triarb - Multi-hop Currency Arbitrage Detection
 *
 * Triarb looks for conversion cycles inside a single exchange whose
 * compounded rate returns more of the starting currency than it spent.
 *
 * ## Core Features
 *
 * - **Graph Building**: Turns ticker snapshots into a graph of directed conversions
 * - **Cycle Search**: Bounded, parallel enumeration of profitable simple cycles
 * - **Ranking**: Deterministic choice of the best opportunity
 * - **Reporting**: Hop-by-hop projection of the winning cycle
 *
 * ## Module Structure
 *
 * - `arb`: Core arbitrage detection logic
 * - `config`: Configuration management for the system
 * - `error`: Error types of the detection core
 * - `feed`: Ticker snapshot sources
 * - `utils`: Utility functions and helpers
 */

/// Arbitrage detection logic
pub mod arb;
/// Configuration management for the system
pub mod config;
/// Error types
pub mod error;
/// Ticker snapshot sources
pub mod feed;
/// Utility functions and helpers
pub mod utils;

pub use arb::detector::{Detection, Detector, ExchangeScan};
pub use arb::projection::{Hop, Report};
pub use arb::search::SearchConfig;
pub use error::{DetectError, FetchError};
