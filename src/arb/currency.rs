use std::fmt::{self, Debug};
use std::sync::Arc;

use derive_more::Display;

/// A currency code such as `BTC` or `USDT`.
///
/// Codes are trimmed and upper-cased on construction so `btc` and ` BTC`
/// name the same graph node. The inner string is shared, which keeps cloning
/// an edge or a cycle cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub struct Currency(Arc<str>);

impl Currency {
    /// Returns the currency code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the code is empty after normalization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Currency {
    fn from(code: &str) -> Self {
        Self(Arc::from(code.trim().to_uppercase()))
    }
}

impl From<String> for Currency {
    fn from(code: String) -> Self {
        Self::from(code.as_str())
    }
}

impl Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tradable market between a base and a quote currency.
///
/// One pair yields two directed conversions: buying the base with the quote
/// (at the ask) and selling the base for the quote (at the bid).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
#[display("{base}/{quote}")]
pub struct Pair {
    /// The currency being bought or sold
    pub base: Currency,
    /// The currency prices are denominated in
    pub quote: Currency,
}

impl Pair {
    /// Creates a pair from a base and a quote currency.
    pub fn new(base: impl Into<Currency>, quote: impl Into<Currency>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }

    /// Parses a unified `BASE/QUOTE` symbol.
    ///
    /// Returns `None` when the separator is missing, either side is empty or
    /// both sides name the same currency.
    #[must_use]
    pub fn parse(symbol: &str) -> Option<Self> {
        let (base, quote) = symbol.split_once('/')?;
        let pair = Self::new(base, quote);
        if pair.base.is_empty() || pair.quote.is_empty() || pair.base == pair.quote {
            return None;
        }
        Some(pair)
    }
}

impl Debug for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}
