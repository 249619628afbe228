/// Cycle is a Vec<Edge> that forms a closed walk (first `from` and last `to` are the same currency)
/// It is primarily used to compute its multiplier and to present it hop by hop.
use std::{
    collections::HashSet,
    fmt::Debug,
    hash::{Hash, Hasher},
};

use eyre::{bail, Result};

use super::currency::Currency;
use super::edge::Edge;

/// Fewest hops a cycle may have. Two hops on distinct markets would still only
/// trade one currency against another, so they are not considered.
pub const MIN_HOPS: usize = 3;

/// A simple cycle of conversions that starts and ends at the same currency
#[derive(Clone, PartialEq)]
pub struct Cycle {
    /// Sequence of edges forming the cycle
    edges: Vec<Edge>,
}

impl Debug for Cycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cycle({})",
            self.edges
                .iter()
                .map(|e| format!("{e:?}"))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl Eq for Cycle {}

impl Hash for Cycle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for edge in &self.edges {
            edge.pair().hash(state);
            edge.side().hash(state);
        }
    }
}

impl Cycle {
    /// Creates a cycle after checking it is closed, connected and simple.
    ///
    /// # Errors
    ///
    /// Returns an error if there are fewer than [`MIN_HOPS`] edges, if two
    /// consecutive edges do not connect, or if a currency is visited twice.
    pub fn new(edges: Vec<Edge>) -> Result<Self> {
        let cycle = Self { edges };
        cycle.validate_edges()?;
        Ok(cycle)
    }

    /// Checks the structural invariants of the cycle.
    fn validate_edges(&self) -> Result<()> {
        if self.edges.len() < MIN_HOPS {
            bail!("Cycle must have at least {MIN_HOPS} edges");
        }

        let mut seen = HashSet::with_capacity(self.edges.len());
        for i in 0..self.edges.len() {
            let next = (i + 1) % self.edges.len();
            if self.edges[i].to() != self.edges[next].from() {
                bail!(
                    "Edge {} to ({}) does not match edge {} from ({})",
                    i,
                    self.edges[i].to(),
                    next,
                    self.edges[next].from()
                );
            }
            if !seen.insert(self.edges[i].from()) {
                bail!("Cycle visits {} more than once", self.edges[i].from());
            }
        }
        Ok(())
    }

    /// The edges in traversal order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of hops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Always false for a validated cycle.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// The currency the cycle starts and ends at.
    #[must_use]
    pub fn start(&self) -> &Currency {
        self.edges[0].from()
    }

    /// Currencies in visiting order, without repeating the start at the end.
    pub fn currencies(&self) -> impl Iterator<Item = &Currency> {
        self.edges.iter().map(Edge::from)
    }

    /// Product of the edge rates, multiplied in traversal order.
    #[must_use]
    pub fn multiplier(&self) -> f64 {
        self.edges.iter().fold(1.0, |acc, edge| acc * edge.rate())
    }
}
