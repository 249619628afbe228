//! # Cycle Search
//!
//! Depth-first enumeration of simple cycles whose compounded rate beats a
//! threshold. Rates compose multiplicatively, so the search carries a running
//! product instead of a path weight.
//!
//! Every simple cycle is produced exactly once, rooted at its smallest
//! currency: a walk started at node `s` may only pass through nodes that sort
//! after `s`. A partial path is abandoned once no walk of the remaining
//! length back to `s` could lift it over the threshold.
//!
//! Enumeration is exponential in the worst case, so every search runs under a
//! shared [`Budget`] of edge visits and wall-clock time and returns what it
//! found when the budget runs out.

use std::ops::ControlFlow;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use super::cycle::{Cycle, MIN_HOPS};
use super::graph::CurrencyGraph;
use super::opportunity::Opportunity;
use super::rank;

/// Default bound on cycle length.
pub const DEFAULT_MAX_HOPS: usize = 7;
/// Default break-even threshold.
pub const DEFAULT_MIN_MULTIPLIER: f64 = 1.0;
/// Guard against floating point noise around the threshold.
pub const DEFAULT_EPSILON: f64 = 1e-9;
/// Default cap on edge visits per search.
pub const DEFAULT_MAX_VISITS: u64 = 5_000_000;
/// Default wall-clock budget per search.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(5);

/// Relative slack on the pruning bound. The bound multiplies rates in a
/// different order than the walk, so it can undershoot by a few ulps.
const PRUNE_SLACK: f64 = 1e-9;

/// The deadline is only read every this many visits (must be a power of two).
const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Tuning knobs of the cycle search. [`SearchConfig::default`] is usable as is.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Longest cycle considered, in hops
    pub max_hops: usize,
    /// Cycles must compound above this multiplier (plus `epsilon`)
    pub min_multiplier: f64,
    /// Noise guard added to `min_multiplier`
    pub epsilon: f64,
    /// Stop after this many edge visits
    pub max_visits: Option<u64>,
    /// Stop after this much wall-clock time
    pub deadline: Option<Duration>,
    /// Shard start nodes across the rayon pool
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_hops: DEFAULT_MAX_HOPS,
            min_multiplier: DEFAULT_MIN_MULTIPLIER,
            epsilon: DEFAULT_EPSILON,
            max_visits: Some(DEFAULT_MAX_VISITS),
            deadline: Some(DEFAULT_DEADLINE),
            parallel: true,
        }
    }
}

impl SearchConfig {
    /// Checks the configuration can produce meaningful results.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_hops < MIN_HOPS {
            return Err(format!(
                "max_hops must be at least {MIN_HOPS}, got {}",
                self.max_hops
            ));
        }
        if !self.min_multiplier.is_finite() || self.min_multiplier < 1.0 {
            return Err(format!(
                "min_multiplier must be a finite value >= 1.0, got {}",
                self.min_multiplier
            ));
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(format!(
                "epsilon must be a finite non-negative value, got {}",
                self.epsilon
            ));
        }
        Ok(())
    }

    /// A cycle is reported only if its multiplier is strictly above this.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.min_multiplier + self.epsilon
    }
}

/// Why a search stopped before exploring everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    /// `max_visits` was reached
    VisitBudget,
    /// `deadline` passed
    Deadline,
}

/// Counters describing one search run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Edges examined
    pub visits: u64,
    /// Profitable cycles found
    pub found: usize,
    /// Set when the budget ran out
    pub truncated: Option<Truncation>,
    /// Time spent searching
    pub elapsed: Duration,
}

/// Result of a search: profitable cycles sorted best first.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Profitable opportunities in ranking order
    pub opportunities: Vec<Opportunity>,
    /// Run counters
    pub stats: SearchStats,
}

/// Visit and time budget shared by every worker of one search.
#[derive(Debug)]
struct Budget {
    /// Edges visited so far
    visits: AtomicU64,
    /// Visit cap
    limit: Option<u64>,
    /// Absolute deadline
    deadline: Option<Instant>,
    /// 0 while running, otherwise the encoded [`Truncation`]
    stopped: AtomicU8,
}

impl Budget {
    /// Starts the clock.
    fn new(config: &SearchConfig) -> Self {
        Self {
            visits: AtomicU64::new(0),
            limit: config.max_visits,
            // A deadline too far out to represent is no deadline at all
            deadline: config.deadline.and_then(|d| Instant::now().checked_add(d)),
            stopped: AtomicU8::new(0),
        }
    }

    /// Accounts for one edge visit. Returns false once the budget is spent.
    fn tick(&self) -> bool {
        if self.stopped.load(Ordering::Relaxed) != 0 {
            return false;
        }
        let visits = self.visits.fetch_add(1, Ordering::Relaxed) + 1;
        if self.limit.is_some_and(|limit| visits > limit) {
            self.stop(Truncation::VisitBudget);
            return false;
        }
        // Also checked on the very first visit so an expired deadline stops at once
        if visits & (DEADLINE_CHECK_INTERVAL - 1) == 1
            && self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
        {
            self.stop(Truncation::Deadline);
            return false;
        }
        true
    }

    /// Records the first reason the search stopped.
    fn stop(&self, reason: Truncation) {
        let code = match reason {
            Truncation::VisitBudget => 1,
            Truncation::Deadline => 2,
        };
        let _ = self
            .stopped
            .compare_exchange(0, code, Ordering::Relaxed, Ordering::Relaxed);
    }

    /// The reason the search stopped, if it did.
    fn truncation(&self) -> Option<Truncation> {
        match self.stopped.load(Ordering::Relaxed) {
            1 => Some(Truncation::VisitBudget),
            2 => Some(Truncation::Deadline),
            _ => None,
        }
    }

    /// Edge visits actually performed.
    fn visits(&self) -> u64 {
        let visits = self.visits.load(Ordering::Relaxed);
        self.limit.map_or(visits, |limit| visits.min(limit))
    }
}

/// Cycle search over one immutable graph.
#[derive(Debug)]
pub struct CycleSearch<'g> {
    /// Graph being searched
    graph: &'g CurrencyGraph,
    /// Search parameters
    config: &'g SearchConfig,
    /// Opportunities retained, all of them when `None`
    keep: Option<usize>,
}

impl<'g> CycleSearch<'g> {
    /// Prepares a search. The configuration is assumed valid.
    #[must_use]
    pub const fn new(graph: &'g CurrencyGraph, config: &'g SearchConfig) -> Self {
        Self {
            graph,
            config,
            keep: None,
        }
    }

    /// Retains only the `k` best opportunities (at least one). Every
    /// profitable cycle is still counted in [`SearchStats::found`].
    #[must_use]
    pub fn keep_best(mut self, k: usize) -> Self {
        self.keep = Some(k.max(1));
        self
    }

    /// Enumerates every simple cycle above the threshold, within budget.
    ///
    /// An empty graph, or one without cycles, yields an empty outcome.
    #[must_use]
    pub fn run(&self) -> SearchOutcome {
        let started = Instant::now();
        let budget = Budget::new(self.config);
        let starts = 0..self.graph.node_count();

        let walks: Vec<Walk> = if self.config.parallel {
            starts
                .into_par_iter()
                .map(|start| self.walk_from(start, &budget))
                .collect()
        } else {
            starts.map(|start| self.walk_from(start, &budget)).collect()
        };

        let found = walks.iter().map(|walk| walk.found).sum();
        let candidates = walks.into_iter().flat_map(|walk| walk.kept);
        let opportunities = match self.keep {
            Some(k) => rank::top_k(candidates, k),
            None => rank::sorted(candidates),
        };
        let stats = SearchStats {
            visits: budget.visits(),
            found,
            truncated: budget.truncation(),
            elapsed: started.elapsed(),
        };

        if let Some(reason) = stats.truncated {
            log::warn!(
                "Cycle search truncated ({reason:?}) after {} visits, {} cycles found so far",
                stats.visits,
                stats.found
            );
        } else {
            log::debug!(
                "Cycle search finished: {} visits, {} cycles in {:?}",
                stats.visits,
                stats.found,
                stats.elapsed
            );
        }

        SearchOutcome {
            opportunities,
            stats,
        }
    }

    /// All profitable cycles rooted at `start`.
    fn walk_from(&self, start: usize, budget: &Budget) -> Walk {
        let mut walker = Walker {
            graph: self.graph,
            budget,
            start,
            max_hops: self.config.max_hops,
            threshold: self.config.threshold(),
            reach: return_bounds(self.graph, start, self.config.max_hops),
            on_path: vec![false; self.graph.node_count()],
            path: Vec::with_capacity(self.config.max_hops),
            kept: Kept::new(self.keep),
        };
        walker.on_path[start] = true;
        let _ = walker.extend(start, 1.0);
        Walk {
            found: walker.kept.found,
            kept: walker.kept.into_vec(),
        }
    }
}

/// Result of the walks rooted at one start node.
struct Walk {
    /// Profitable cycles seen
    found: usize,
    /// The ones retained
    kept: Vec<Opportunity>,
}

/// Upper bounds on returning to `start`.
///
/// `bounds[k][v]` is the largest product of any walk of at most `k` hops from
/// `v` back to `start` that only passes through nodes sorting after `start`.
/// Walks may repeat nodes, so this bounds every simple continuation from
/// above.
fn return_bounds(graph: &CurrencyGraph, start: usize, max_hops: usize) -> Vec<Vec<f64>> {
    let n = graph.node_count();
    // exact[v]: best walk of exactly k hops from v to start
    let mut exact = vec![0.0_f64; n];
    exact[start] = 1.0;
    let mut within = vec![0.0_f64; n];
    let mut bounds = Vec::with_capacity(max_hops + 1);
    bounds.push(within.clone());

    for _ in 0..max_hops {
        // next[start] stays 0: a walk only touches start at its end
        let mut next = vec![0.0_f64; n];
        for (v, best) in next.iter_mut().enumerate().skip(start + 1) {
            for link in graph.links(v) {
                if link.to >= start {
                    *best = best.max(link.rate * exact[link.to]);
                }
            }
        }
        for (bound, value) in within.iter_mut().zip(&next) {
            *bound = bound.max(*value);
        }
        bounds.push(within.clone());
        exact = next;
    }
    bounds
}

/// Best opportunities seen by one walker.
struct Kept {
    /// How many to retain, all when `None`
    limit: Option<usize>,
    /// Retained opportunities, unordered between compactions
    items: Vec<Opportunity>,
    /// Multiplier of the worst retained opportunity after the last compaction
    floor: f64,
    /// Profitable cycles seen, retained or not
    found: usize,
}

impl Kept {
    fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            items: Vec::new(),
            floor: f64::NEG_INFINITY,
            found: 0,
        }
    }

    /// Whether a cycle with this multiplier could still make the cut. Ties
    /// with the floor are kept for the full comparison.
    fn admits(&self, multiplier: f64) -> bool {
        multiplier >= self.floor
    }

    fn push(&mut self, opportunity: Opportunity) {
        self.items.push(opportunity);
        if let Some(k) = self.limit {
            if self.items.len() >= k.saturating_mul(2) {
                self.compact(k);
            }
        }
    }

    /// Keeps the `k` best items.
    fn compact(&mut self, k: usize) {
        self.items.sort_by(rank::compare);
        self.items.truncate(k);
        if self.items.len() == k {
            if let Some(worst) = self.items.last() {
                self.floor = worst.multiplier();
            }
        }
    }

    fn into_vec(mut self) -> Vec<Opportunity> {
        if let Some(k) = self.limit {
            self.compact(k);
        }
        self.items
    }
}

/// DFS state for walks rooted at one start node.
struct Walker<'a> {
    /// Graph being searched
    graph: &'a CurrencyGraph,
    /// Shared budget
    budget: &'a Budget,
    /// Root node; only nodes sorting after it may be visited
    start: usize,
    /// Hop bound
    max_hops: usize,
    /// Strict lower bound on reported multipliers
    threshold: f64,
    /// `reach[k][v]`: best product of at most `k` hops from `v` back to start
    reach: Vec<Vec<f64>>,
    /// Nodes currently on the partial path
    on_path: Vec<bool>,
    /// Edge indices of the partial path
    path: Vec<usize>,
    /// Cycles found so far
    kept: Kept,
}

impl Walker<'_> {
    /// Tries every outgoing edge of `node`, `running` being the product so far.
    fn extend(&mut self, node: usize, running: f64) -> ControlFlow<()> {
        for link in self.graph.links(node) {
            if !self.budget.tick() {
                return ControlFlow::Break(());
            }

            let next = running * link.rate;
            if !next.is_finite() || next <= 0.0 {
                continue;
            }
            let hops = self.path.len() + 1;

            if link.to == self.start {
                if hops >= MIN_HOPS && next > self.threshold {
                    self.close(link.edge, next);
                }
                continue;
            }

            // One more hop is needed to close, so `hops` must stay below the bound
            if link.to < self.start || self.on_path[link.to] || hops >= self.max_hops {
                continue;
            }
            if !self.can_recover(next, link.to, self.max_hops - hops) {
                continue;
            }

            self.on_path[link.to] = true;
            self.path.push(link.edge);
            let flow = self.extend(link.to, next);
            self.path.pop();
            self.on_path[link.to] = false;
            flow?;
        }
        ControlFlow::Continue(())
    }

    /// Whether some walk of at most `remaining` hops from `node` back to the
    /// start could still lift `running` over the threshold.
    fn can_recover(&self, running: f64, node: usize, remaining: usize) -> bool {
        let bound = running * self.reach[remaining][node];
        bound * (1.0 + PRUNE_SLACK) > self.threshold
    }

    /// Records the current path closed by `last`.
    fn close(&mut self, last: usize, multiplier: f64) {
        self.kept.found += 1;
        if !self.kept.admits(multiplier) {
            return;
        }
        let edges = self
            .path
            .iter()
            .chain(std::iter::once(&last))
            .map(|&i| self.graph.edge(i).clone())
            .collect();
        match Cycle::new(edges) {
            Ok(cycle) => self.kept.push(Opportunity::new(cycle, multiplier)),
            Err(e) => log::error!("Discarding malformed cycle: {e}"),
        }
    }
}
