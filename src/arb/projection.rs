//! Projection of the winning opportunity into per-hop trade records.

use std::fmt::{self, Display};

use super::currency::Pair;
use super::opportunity::Opportunity;

/// Decimal places used when a profit percentage is displayed.
pub const PROFIT_DECIMALS: i32 = 5;

/// One trade of a reported cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    /// Market to trade on
    pub symbol: Pair,
    /// `true` sells the base at the bid, `false` buys it at the ask
    pub reversed: bool,
    /// The ask for a buy hop, the bid for a sell hop
    pub price: f64,
}

impl Hop {
    /// Order side as an exchange would name it.
    #[must_use]
    pub const fn order_side(&self) -> &'static str {
        if self.reversed {
            "sell"
        } else {
            "buy"
        }
    }
}

impl Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // buy BTC with USDT at 50010.00000 / sell ETH for USDT at 3000.00000
        write!(
            f,
            "{} {} {} {} at {:.5}",
            self.order_side(),
            self.symbol.base,
            if self.reversed { "for" } else { "with" },
            self.symbol.quote,
            self.price
        )
    }
}

/// Hops of an opportunity, in execution order.
#[must_use]
pub fn hops(opportunity: &Opportunity) -> Vec<Hop> {
    opportunity
        .path()
        .edges()
        .iter()
        .map(|edge| Hop {
            symbol: edge.pair().clone(),
            reversed: edge.reversed(),
            price: edge.price(),
        })
        .collect()
}

/// The externally reported shape: hop sequence (if any) and best multiplier.
///
/// No opportunity projects to `(None, 1.0)`.
#[must_use]
pub fn project(best: Option<&Opportunity>) -> (Option<Vec<Hop>>, f64) {
    best.map_or((None, 1.0), |opportunity| {
        (Some(hops(opportunity)), opportunity.multiplier())
    })
}

/// `(multiplier - 1) * 100`, rounded for display.
#[must_use]
pub fn profit_percentage(multiplier: f64) -> f64 {
    let scale = 10_f64.powi(PROFIT_DECIMALS);
    ((multiplier - 1.0) * 100.0 * scale).round() / scale
}

/// Printable report of a detection result.
#[derive(Debug, Clone)]
pub struct Report<'a> {
    /// Exchange display name
    pub exchange: &'a str,
    /// Hops of the best cycle, if any
    pub hops: Option<Vec<Hop>>,
    /// Best multiplier, 1.0 when nothing was found
    pub multiplier: f64,
}

impl Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(hops) = &self.hops else {
            return write!(f, "No opportunity detected for {}", self.exchange);
        };
        writeln!(f, "-------------------------------------------")?;
        writeln!(
            f,
            "New {}% {} opportunity:",
            profit_percentage(self.multiplier),
            self.exchange
        )?;
        for (i, hop) in hops.iter().enumerate() {
            writeln!(f, "{}. {hop}", i + 1)?;
        }
        write!(f, "-------------------------------------------")
    }
}
