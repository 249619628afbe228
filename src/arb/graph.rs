//! # Currency Graph
//!
//! Turns a ticker snapshot into a directed graph whose nodes are currencies
//! and whose edges are executable conversions. Each usable market contributes
//! a buy edge (quote -> base) and a sell edge (base -> quote).
//!
//! The graph is immutable once built. Nodes are stored in lexicographic order
//! and addressed by index, which is what the cycle search walks.

use std::collections::HashMap;

use super::currency::{Currency, Pair};
use super::edge::Edge;
use super::ticker::TickerRecord;

/// An outgoing edge as seen from the search: target node index plus the edge
/// it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    /// Index of the target node
    pub to: usize,
    /// Index into [`CurrencyGraph::edges`]
    pub edge: usize,
    /// Conversion rate, duplicated from the edge for locality
    pub rate: f64,
}

/// What happened to the records of a snapshot while the graph was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Records that made it into the graph
    pub accepted: usize,
    /// Records dropped for invalid or crossed prices
    pub rejected: usize,
    /// Records replaced by a more recent ticker for the same pair
    pub superseded: usize,
    /// Directed edges emitted
    pub edges: usize,
}

/// Directed multigraph of currency conversions.
#[derive(Debug, Clone, Default)]
pub struct CurrencyGraph {
    /// Currencies, sorted
    nodes: Vec<Currency>,
    /// Reverse lookup of `nodes`
    index: HashMap<Currency, usize>,
    /// All edges
    edges: Vec<Edge>,
    /// Outgoing links per node, sorted by (target, pair, side)
    adjacency: Vec<Vec<Link>>,
    /// Ingestion counters
    stats: BuildStats,
}

impl CurrencyGraph {
    /// Builds a graph from a ticker snapshot.
    ///
    /// Duplicate pairs keep the most recent ticker (the later one in input
    /// order when timestamps are equal). The surviving record of a pair is
    /// then checked, and the pair is dropped and counted if it is unusable,
    /// never reported as an error. An empty snapshot gives an empty graph.
    pub fn build(tickers: impl IntoIterator<Item = TickerRecord>) -> Self {
        let mut stats = BuildStats::default();
        let mut latest: HashMap<Pair, TickerRecord> = HashMap::new();

        for ticker in tickers {
            match latest.get(&ticker.symbol) {
                Some(existing) if existing.timestamp > ticker.timestamp => {
                    stats.superseded += 1;
                }
                Some(_) => {
                    stats.superseded += 1;
                    latest.insert(ticker.symbol.clone(), ticker);
                }
                None => {
                    latest.insert(ticker.symbol.clone(), ticker);
                }
            }
        }

        // Only the newest record of a pair is judged; an unusable one drops
        // the pair rather than letting an older quote stand in for it
        latest.retain(|_, ticker| {
            let usable = ticker.is_usable();
            if !usable {
                log::debug!(
                    "Rejecting {} (bid={}, ask={})",
                    ticker.symbol,
                    ticker.bid,
                    ticker.ask
                );
                stats.rejected += 1;
            }
            usable
        });
        stats.accepted = latest.len();

        let mut edges: Vec<Edge> = latest
            .values()
            .flat_map(|ticker| [Edge::buy(ticker), Edge::sell(ticker)])
            .flatten()
            .collect();
        // Hash iteration order must not leak into traversal order
        edges.sort_by(|a, b| {
            a.from()
                .cmp(b.from())
                .then_with(|| a.to().cmp(b.to()))
                .then_with(|| a.pair().cmp(b.pair()))
                .then_with(|| a.side().cmp(&b.side()))
        });
        stats.edges = edges.len();

        let mut nodes: Vec<Currency> = edges
            .iter()
            .flat_map(|edge| [edge.from().clone(), edge.to().clone()])
            .collect();
        nodes.sort();
        nodes.dedup();

        let index: HashMap<Currency, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, currency)| (currency.clone(), i))
            .collect();

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (i, edge) in edges.iter().enumerate() {
            let from = index[edge.from()];
            adjacency[from].push(Link {
                to: index[edge.to()],
                edge: i,
                rate: edge.rate(),
            });
        }

        log::debug!(
            "Built currency graph: {} nodes, {} edges ({} accepted, {} rejected, {} superseded)",
            nodes.len(),
            stats.edges,
            stats.accepted,
            stats.rejected,
            stats.superseded
        );

        Self {
            nodes,
            index,
            edges,
            adjacency,
            stats,
        }
    }

    /// Number of currencies.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no nodes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Currencies in lexicographic order.
    #[must_use]
    pub fn currencies(&self) -> &[Currency] {
        &self.nodes
    }

    /// Node index of a currency.
    #[must_use]
    pub fn node(&self, currency: &Currency) -> Option<usize> {
        self.index.get(currency).copied()
    }

    /// All edges, sorted by (from, to, pair, side).
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Edge by index.
    #[must_use]
    pub fn edge(&self, index: usize) -> &Edge {
        &self.edges[index]
    }

    /// Outgoing links of a node.
    #[must_use]
    pub fn links(&self, node: usize) -> &[Link] {
        &self.adjacency[node]
    }

    /// Outgoing edges of a currency, empty if the currency is unknown.
    pub fn outgoing<'a>(&'a self, currency: &Currency) -> impl Iterator<Item = &'a Edge> + 'a {
        self.node(currency)
            .map(|node| self.adjacency[node].as_slice())
            .unwrap_or_default()
            .iter()
            .map(|link| &self.edges[link.edge])
    }

    /// Ingestion counters of the snapshot this graph was built from.
    #[must_use]
    pub const fn stats(&self) -> BuildStats {
        self.stats
    }
}
