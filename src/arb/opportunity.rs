use std::fmt::{self, Debug};

use itertools::Itertools;

use super::cycle::Cycle;

/// A profitable cycle together with its compounded multiplier.
///
/// The multiplier is the product accumulated while the search walked the
/// cycle. It is never rounded; rounding only happens when a report is
/// rendered.
#[derive(Clone, PartialEq)]
pub struct Opportunity {
    /// The cycle to trade
    path: Cycle,
    /// Product of the edge rates along `path`
    multiplier: f64,
}

impl Debug for Opportunity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Opportunity({} @ {})",
            self.path
                .currencies()
                .chain(std::iter::once(self.path.start()))
                .join(" -> "),
            self.multiplier
        )
    }
}

impl Opportunity {
    /// Pairs a cycle with its multiplier.
    #[must_use]
    pub const fn new(path: Cycle, multiplier: f64) -> Self {
        Self { path, multiplier }
    }

    /// The cycle to trade.
    #[must_use]
    pub const fn path(&self) -> &Cycle {
        &self.path
    }

    /// Compounded rate of the cycle.
    #[must_use]
    pub const fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Number of hops.
    #[must_use]
    pub fn hops(&self) -> usize {
        self.path.len()
    }
}
