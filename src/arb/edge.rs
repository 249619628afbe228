/// An edge is one of the two directed conversions a market offers: buying its base or selling it.
/// It carries the multiplicative rate used by the cycle search and the book price it came from.
use std::fmt::{self, Debug, Display};

use super::currency::{Currency, Pair};
use super::ticker::TickerRecord;

/// Which side of the book a conversion hits.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Side {
    /// Spend the quote currency to acquire the base, paying the ask
    Buy,
    /// Give up the base currency for the quote, receiving the bid
    Sell,
}

impl Side {
    /// A reversed hop sells the base currency of its market.
    #[must_use]
    pub const fn is_reversed(self) -> bool {
        matches!(self, Self::Sell)
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

impl Debug for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "q>b"),
            Self::Sell => write!(f, "b>q"),
        }
    }
}

/// A directed conversion from one currency into another.
#[derive(Clone, PartialEq)]
pub struct Edge {
    /// Currency spent
    from: Currency,
    /// Currency received
    to: Currency,
    /// Units of `to` received per unit of `from`
    rate: f64,
    /// The book price this edge was derived from (ask for buys, bid for sells)
    price: f64,
    /// The market the conversion trades on
    pair: Pair,
    /// Which side of the book it hits
    side: Side,
}

impl Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Edge(BTC/USDT q>b, USDT -> BTC @ 0.00002)
        write!(
            f,
            "Edge({:?} {:?}, {:?} -> {:?} @ {})",
            self.pair, self.side, self.from, self.to, self.rate
        )
    }
}

impl Edge {
    /// The buy conversion of a ticker: quote -> base at `1 / ask`.
    ///
    /// Returns `None` when the resulting rate is not a finite positive number.
    #[must_use]
    pub fn buy(ticker: &TickerRecord) -> Option<Self> {
        Self::checked(
            ticker.symbol.quote.clone(),
            ticker.symbol.base.clone(),
            1.0 / ticker.ask,
            ticker.ask,
            ticker.symbol.clone(),
            Side::Buy,
        )
    }

    /// The sell conversion of a ticker: base -> quote at `bid`.
    ///
    /// Returns `None` when the resulting rate is not a finite positive number.
    #[must_use]
    pub fn sell(ticker: &TickerRecord) -> Option<Self> {
        Self::checked(
            ticker.symbol.base.clone(),
            ticker.symbol.quote.clone(),
            ticker.bid,
            ticker.bid,
            ticker.symbol.clone(),
            Side::Sell,
        )
    }

    /// Builds an edge only if its rate can take part in a running product.
    fn checked(
        from: Currency,
        to: Currency,
        rate: f64,
        price: f64,
        pair: Pair,
        side: Side,
    ) -> Option<Self> {
        if !rate.is_finite() || rate <= 0.0 || from == to {
            return None;
        }
        Some(Self {
            from,
            to,
            rate,
            price,
            pair,
            side,
        })
    }

    /// Currency spent.
    #[must_use]
    pub const fn from(&self) -> &Currency {
        &self.from
    }

    /// Currency received.
    #[must_use]
    pub const fn to(&self) -> &Currency {
        &self.to
    }

    /// Multiplier applied when converting one unit of `from` into `to`.
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    /// The ask for a buy edge, the bid for a sell edge.
    #[must_use]
    pub const fn price(&self) -> f64 {
        self.price
    }

    /// The market this edge trades on.
    #[must_use]
    pub const fn pair(&self) -> &Pair {
        &self.pair
    }

    /// Book side of the conversion.
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Whether this edge sells the base currency of its market.
    #[must_use]
    pub const fn reversed(&self) -> bool {
        self.side.is_reversed()
    }
}
