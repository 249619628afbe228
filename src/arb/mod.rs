//! # Arbitrage Module
//!
//! This module contains the arbitrage detection logic. It turns a ticker
//! snapshot into a directed graph of currency conversions, searches that
//! graph for profitable cycles and ranks what it finds.

/// Currency and trading pair identifiers
pub mod currency;
/// Core cycle representation and validation
pub mod cycle;
/// End-to-end detection per exchange
pub mod detector;
/// Directed conversions derived from tickers
pub mod edge;
/// Currency graph construction
pub mod graph;
/// Profitable cycles and their multipliers
pub mod opportunity;
/// Hop-by-hop presentation of a cycle
pub mod projection;
/// Deterministic ordering of opportunities
pub mod rank;
/// Bounded cycle enumeration
pub mod search;
/// Test helpers and utilities
#[cfg(test)]
mod test_helpers;
/// Ticker records and their validation
pub mod ticker;
