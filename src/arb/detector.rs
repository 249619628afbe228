//! # Detector
//!
//! Runs one scan end to end: snapshot -> graph -> search -> ranking. Each
//! exchange is scanned independently; the failure of one scan is returned to
//! the caller and never affects another.

use std::time::{Duration, Instant};

use super::graph::{BuildStats, CurrencyGraph};
use super::opportunity::Opportunity;
use super::projection::{self, Hop};
use super::search::{CycleSearch, SearchConfig, SearchStats};
use super::ticker::TickerRecord;
use crate::error::{DetectError, Result};
use crate::feed::TickerSource;

/// Outcome of a scan that ran to completion (possibly on a truncated search).
#[derive(Debug, Clone, Default)]
pub struct Detection {
    /// What happened to the snapshot's records
    pub graph: BuildStats,
    /// Search counters
    pub search: SearchStats,
    /// Best opportunities, best first
    pub top: Vec<Opportunity>,
}

impl Detection {
    /// The winning opportunity, if any cycle was profitable.
    #[must_use]
    pub fn best(&self) -> Option<&Opportunity> {
        self.top.first()
    }

    /// Multiplier of the best opportunity, 1.0 when there is none.
    #[must_use]
    pub fn best_multiplier(&self) -> f64 {
        self.best().map_or(1.0, Opportunity::multiplier)
    }

    /// The hop sequence of the best cycle and its multiplier, `(None, 1.0)`
    /// when nothing was found.
    #[must_use]
    pub fn report(&self) -> (Option<Vec<Hop>>, f64) {
        projection::project(self.best())
    }

    /// Whether the search stopped on its budget before exploring everything.
    #[must_use]
    pub const fn is_partial(&self) -> bool {
        self.search.truncated.is_some()
    }
}

/// Scan of one exchange as run by [`Detector::scan_exchanges`].
#[derive(Debug)]
pub struct ExchangeScan {
    /// Display name
    pub name: String,
    /// Identifier passed to the ticker source
    pub id: String,
    /// Detection result or the reason the scan failed
    pub result: Result<Detection>,
    /// Wall-clock time of the whole scan, fetch included
    pub elapsed: Duration,
}

/// Arbitrage detector for single-exchange cycles.
#[derive(Debug, Clone)]
pub struct Detector {
    /// Search parameters, validated
    config: SearchConfig,
    /// How many opportunities a detection keeps
    top: usize,
}

impl Default for Detector {
    fn default() -> Self {
        Self {
            config: SearchConfig::default(),
            top: 1,
        }
    }
}

impl Detector {
    /// Creates a detector keeping only the best opportunity.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::InvalidConfig`] if the configuration is rejected
    /// by [`SearchConfig::validate`].
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate().map_err(DetectError::InvalidConfig)?;
        Ok(Self { config, top: 1 })
    }

    /// Keeps the `k` best opportunities instead of one (at least one is kept).
    #[must_use]
    pub fn with_top(mut self, k: usize) -> Self {
        self.top = k.max(1);
        self
    }

    /// The search parameters in use.
    #[must_use]
    pub const fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Detects opportunities in a snapshot.
    ///
    /// CPU bound; call it from a blocking context or use
    /// [`Detector::run_detection`].
    #[must_use]
    pub fn detect(&self, tickers: Vec<TickerRecord>) -> Detection {
        let graph = CurrencyGraph::build(tickers);
        let outcome = CycleSearch::new(&graph, &self.config)
            .keep_best(self.top)
            .run();

        Detection {
            graph: graph.stats(),
            search: outcome.stats,
            top: outcome.opportunities,
        }
    }

    /// Fetches a snapshot for `exchange` and runs detection on it.
    ///
    /// # Errors
    ///
    /// Returns [`DetectError::Fetch`] when the source cannot deliver a
    /// snapshot, which callers can tell apart from a scan that found nothing.
    /// Returns [`DetectError::Worker`] if the search task dies.
    pub async fn run_detection<S: TickerSource>(
        &self,
        source: &S,
        exchange: &str,
    ) -> Result<Detection> {
        let tickers = source
            .fetch_tickers(exchange)
            .await
            .map_err(|source| DetectError::Fetch {
                exchange: exchange.to_string(),
                source,
            })?;
        log::debug!("{exchange}: fetched {} tickers", tickers.len());

        let detector = self.clone();
        let detection = tokio::task::spawn_blocking(move || detector.detect(tickers))
            .await?;

        log::info!(
            "{exchange}: {} tickers accepted, {} cycles over threshold, best multiplier {}",
            detection.graph.accepted,
            detection.search.found,
            detection.best_multiplier()
        );
        Ok(detection)
    }

    /// Scans exchanges one after the other. A failing exchange is recorded in
    /// its [`ExchangeScan`] and the next one is scanned regardless.
    pub async fn scan_exchanges<'a, S: TickerSource>(
        &self,
        source: &S,
        exchanges: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Vec<ExchangeScan> {
        let mut scans = Vec::new();
        for (name, id) in exchanges {
            log::info!("Starting detection for {name} ({id})");
            let started = Instant::now();
            let result = self.run_detection(source, id).await;
            if let Err(e) = &result {
                log::error!("Detection failed for {name}: {e}");
            }
            scans.push(ExchangeScan {
                name: name.to_string(),
                id: id.to_string(),
                result,
                elapsed: started.elapsed(),
            });
        }
        scans
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::arb::currency::{Currency, Pair};
    use crate::arb::cycle::Cycle;
    use crate::arb::test_helpers::*;
    use crate::feed::StaticSource;

    fn detector() -> Detector {
        Detector::new(SearchConfig {
            max_visits: None,
            deadline: None,
            ..SearchConfig::default()
        })
        .unwrap()
    }

    fn route(opportunity: &Opportunity) -> Vec<&str> {
        opportunity
            .path()
            .currencies()
            .map(Currency::as_str)
            .collect()
    }

    /// Finds the edge of `graph` going `from` -> `to`.
    fn edge(graph: &CurrencyGraph, from: &str, to: &str) -> crate::arb::edge::Edge {
        graph
            .outgoing(&Currency::from(from))
            .find(|e| e.to() == &Currency::from(to))
            .unwrap()
            .clone()
    }

    const SCENARIO_A: [(&str, &str, f64, f64); 3] = [
        ("BTC", "USDT", 50_000.0, 50_010.0),
        ("ETH", "USDT", 3_000.0, 3_005.0),
        ("ETH", "BTC", 0.0601, 0.0602),
    ];

    #[test]
    fn test_scenario_a_multipliers() {
        let graph = graph(&SCENARIO_A);

        // USDT -> BTC -> ETH -> USDT: buy BTC at the ask, buy ETH at the ask, sell ETH at the bid
        let forward = Cycle::new(vec![
            edge(&graph, "USDT", "BTC"),
            edge(&graph, "BTC", "ETH"),
            edge(&graph, "ETH", "USDT"),
        ])
        .unwrap();
        let expected = 3_000.0 / (50_010.0 * 0.0602);
        assert!((forward.multiplier() - expected).abs() < 1e-9);

        // USDT -> ETH -> BTC -> USDT: buy ETH at the ask, sell ETH at the bid, sell BTC at the bid
        let backward = Cycle::new(vec![
            edge(&graph, "USDT", "ETH"),
            edge(&graph, "ETH", "BTC"),
            edge(&graph, "BTC", "USDT"),
        ])
        .unwrap();
        let expected = 0.0601 * 50_000.0 / 3_005.0;
        assert!((backward.multiplier() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_scenario_a_has_no_opportunity() {
        let detector = Detector::new(SearchConfig {
            max_hops: 3,
            ..SearchConfig::default()
        })
        .unwrap();
        let detection = detector.detect(tickers(&SCENARIO_A));
        // The best direction only breaks even (0.0601 * 50000 == 3005)
        assert!(detection.best().is_none());
        assert_eq!(detection.report(), (None, 1.0));
        assert_eq!(detection.graph.accepted, 3);
    }

    #[test]
    fn test_scenario_a_with_a_cheaper_ask() {
        let mut snapshot = SCENARIO_A.to_vec();
        snapshot[1] = ("ETH", "USDT", 2_999.0, 2_999.5);
        let detection = detector().detect(tickers(&snapshot));

        let best = detection.best().unwrap();
        assert_eq!(route(best), ["BTC", "USDT", "ETH"]);
        let expected = 50_000.0 / 2_999.5 * 0.0601;
        assert!((best.multiplier() - expected).abs() < 1e-9);

        let (hops, multiplier) = detection.report();
        let hops = hops.unwrap();
        assert_eq!(hops.len(), 3);
        assert_eq!(hops[0].symbol, Pair::new("BTC", "USDT"));
        assert!(hops[0].reversed);
        assert!((hops[0].price - 50_000.0).abs() < f64::EPSILON);
        assert!(!hops[1].reversed);
        assert!((hops[1].price - 2_999.5).abs() < f64::EPSILON);
        assert!(hops[2].reversed);
        assert!((multiplier - expected).abs() < 1e-9);
    }

    #[test]
    fn test_scenario_b_crossed_book_is_ignored() {
        // ETH/USDT bid above its ask would make USDT -> ETH -> USDT style loops look free
        let snapshot = tickers(&[
            ("BTC", "USDT", 50_000.0, 50_010.0),
            ("ETH", "USDT", 3_200.0, 3_005.0),
            ("ETH", "BTC", 0.0601, 0.0602),
            ("SOL", "USDT", 150.0, 150.1),
            ("SOL", "BTC", 0.0031, 0.00311),
        ]);
        let graph = CurrencyGraph::build(snapshot.clone());
        assert_eq!(graph.stats().rejected, 1);
        assert!(graph
            .edges()
            .iter()
            .all(|e| e.pair() != &Pair::new("ETH", "USDT")));

        let detection = detector().with_top(usize::MAX).detect(snapshot);
        assert!(!detection.top.is_empty());
        for opportunity in &detection.top {
            assert!(opportunity
                .path()
                .edges()
                .iter()
                .all(|e| e.pair() != &Pair::new("ETH", "USDT")));
        }
    }

    #[test]
    fn test_scenario_c_disjoint_components() {
        let snapshot = tickers(&[
            // Component 1, profitable
            ("BTC", "USDT", 50_000.0, 50_010.0),
            ("ETH", "USDT", 3_000.0, 3_005.0),
            ("ETH", "BTC", 0.0620, 0.0621),
            // Component 2, profitable
            ("XAU", "EUR", 2_000.0, 2_001.0),
            ("XAG", "EUR", 25.0, 25.01),
            ("XAU", "XAG", 82.0, 82.1),
        ]);
        let detection = detector().with_top(usize::MAX).detect(snapshot);
        assert_eq!(detection.top.len(), 2);

        let first: HashSet<&str> = ["BTC", "ETH", "USDT"].into();
        let second: HashSet<&str> = ["XAU", "XAG", "EUR"].into();
        for opportunity in &detection.top {
            let nodes: HashSet<&str> = route(opportunity).into_iter().collect();
            assert!(nodes.is_subset(&first) || nodes.is_subset(&second));
        }
    }

    #[test]
    fn test_scenario_d_lexicographic_tie_break() {
        // A -> B -> C -> D -> A and A -> B -> E -> D -> A both compound to exactly 2
        let snapshot = tickers(&[
            ("A", "B", 2.0, 2.0),
            ("B", "C", 1.0, 1.0),
            ("C", "D", 1.0, 1.0),
            ("D", "A", 1.0, 1.0),
            ("B", "E", 1.0, 1.0),
            ("E", "D", 1.0, 1.0),
        ]);
        let detection = detector().with_top(usize::MAX).detect(snapshot);

        let ties: Vec<_> = detection
            .top
            .iter()
            .filter(|o| (o.multiplier() - 2.0).abs() < f64::EPSILON)
            .collect();
        assert_eq!(ties.len(), 2);
        assert!(ties.iter().all(|o| o.hops() == 4));

        let best = detection.best().unwrap();
        assert_eq!(route(best), ["A", "B", "C", "D"]);
        assert_eq!(route(&detection.top[1]), ["A", "B", "E", "D"]);
    }

    #[test]
    fn test_shorter_cycle_wins_tie() {
        // A -> B -> C -> A compounds to 2 in three hops, A -> B -> D -> E -> A in four
        let snapshot = tickers(&[
            ("A", "B", 2.0, 2.0),
            ("B", "C", 1.0, 1.0),
            ("C", "A", 1.0, 1.0),
            ("B", "D", 1.0, 1.0),
            ("D", "E", 1.0, 1.0),
            ("E", "A", 1.0, 1.0),
        ]);
        let best = detector().detect(snapshot).best().cloned().unwrap();
        assert_eq!(route(&best), ["A", "B", "C"]);
    }

    #[test]
    fn test_idempotent() {
        let detector = detector().with_top(5);
        let first = detector.detect(dense_tickers());
        for _ in 0..3 {
            let again = detector.detect(dense_tickers());
            assert_eq!(again.top, first.top);
        }
        let mut reversed = dense_tickers();
        reversed.reverse();
        assert_eq!(detector.detect(reversed).top, first.top);
    }

    #[test]
    fn test_top_matches_full_ranking() {
        let all = detector().with_top(usize::MAX).detect(dense_tickers());
        for k in [1, 2, 5] {
            let detection = detector().with_top(k).detect(dense_tickers());
            assert_eq!(detection.search.found, all.search.found);
            assert_eq!(detection.top, all.top[..k]);
        }
    }

    #[test]
    fn test_unbounded_deadline() {
        let detector = Detector::new(SearchConfig {
            max_visits: None,
            deadline: Some(Duration::MAX),
            ..SearchConfig::default()
        })
        .unwrap();
        let detection = detector.detect(dense_tickers());
        assert!(!detection.is_partial());
        assert_eq!(detection.top, self::detector().detect(dense_tickers()).top);
    }

    #[test]
    fn test_graceful_emptiness() {
        let detector = detector();
        assert_eq!(detector.detect(Vec::new()).report(), (None, 1.0));
        assert_eq!(
            detector
                .detect(tickers(&[("BTC", "USDT", 50_000.0, 50_010.0)]))
                .report(),
            (None, 1.0)
        );
    }

    #[test]
    fn test_invalid_config() {
        let err = Detector::new(SearchConfig {
            max_hops: 1,
            ..SearchConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, DetectError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_distinct_from_empty_result() {
        let source = StaticSource::new().with("empty", Vec::new());
        let detector = detector();

        let empty = detector.run_detection(&source, "empty").await.unwrap();
        assert!(empty.best().is_none());

        let err = detector
            .run_detection(&source, "missing")
            .await
            .unwrap_err();
        assert!(err.is_fetch());
    }

    #[tokio::test]
    async fn test_failures_are_isolated_per_exchange() {
        let source = StaticSource::new()
            .with("good", dense_tickers())
            .with("flat", tickers(&SCENARIO_A));
        let scans = detector()
            .scan_exchanges(
                &source,
                [("Good", "good"), ("Broken", "broken"), ("Flat", "flat")],
            )
            .await;

        assert_eq!(scans.len(), 3);
        assert!(scans[0].result.as_ref().unwrap().best().is_some());
        assert!(scans[1].result.as_ref().unwrap_err().is_fetch());
        assert!(scans[2].result.as_ref().unwrap().best().is_none());
        assert_eq!(scans[1].name, "Broken");
    }
}
