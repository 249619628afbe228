use chrono::DateTime;

use super::currency::Pair;
use super::edge::Edge;
use super::cycle::Cycle;
use super::graph::CurrencyGraph;
use super::opportunity::Opportunity;
use super::ticker::TickerRecord;

#[allow(dead_code)]
pub fn ticker(base: &str, quote: &str, bid: f64, ask: f64) -> TickerRecord {
    ticker_at(base, quote, bid, ask, 0)
}

#[allow(dead_code)]
pub fn ticker_at(base: &str, quote: &str, bid: f64, ask: f64, millis: i64) -> TickerRecord {
    TickerRecord::new(
        Pair::new(base, quote),
        bid,
        ask,
        (bid + ask) / 2.0,
        DateTime::from_timestamp_millis(millis).unwrap_or_default(),
    )
}

#[allow(dead_code)]
pub fn tickers(args: &[(&str, &str, f64, f64)]) -> Vec<TickerRecord> {
    args.iter()
        .map(|(base, quote, bid, ask)| ticker(base, quote, *bid, *ask))
        .collect()
}

#[allow(dead_code)]
pub fn graph(args: &[(&str, &str, f64, f64)]) -> CurrencyGraph {
    CurrencyGraph::build(tickers(args))
}

/// quote -> base, buying at `ask`
#[allow(dead_code)]
#[allow(clippy::unwrap_used)]
pub fn buy(base: &str, quote: &str, ask: f64) -> Edge {
    Edge::buy(&ticker(base, quote, ask, ask)).unwrap()
}

/// base -> quote, selling at `bid`
#[allow(dead_code)]
#[allow(clippy::unwrap_used)]
pub fn sell(base: &str, quote: &str, bid: f64) -> Edge {
    Edge::sell(&ticker(base, quote, bid, bid)).unwrap()
}

/// Every pair among six currencies, with prices skewed enough to leave
/// profitable cycles of every length from 3 to 6.
#[allow(dead_code)]
pub fn dense_tickers() -> Vec<TickerRecord> {
    const NAMES: [&str; 6] = ["A", "B", "C", "D", "E", "F"];
    const VALUES: [f64; 6] = [1.0, 2.0, 3.0, 5.0, 7.0, 11.0];
    const HALF_SPREAD: f64 = 0.0005;

    let mut out = Vec::new();
    for i in 0..NAMES.len() {
        for j in i + 1..NAMES.len() {
            #[allow(clippy::cast_precision_loss)]
            let noise = (((i * 7 + j * 13) % 11) as f64 - 5.0) * 0.003;
            let mid = VALUES[j] / VALUES[i] * (1.0 + noise);
            out.push(ticker(
                NAMES[j],
                NAMES[i],
                mid * (1.0 - HALF_SPREAD),
                mid * (1.0 + HALF_SPREAD),
            ));
        }
    }
    out
}

#[allow(dead_code)]
pub fn dense_graph() -> CurrencyGraph {
    CurrencyGraph::build(dense_tickers())
}

/// Pairs a cycle with the multiplier its edges compound to.
#[allow(dead_code)]
pub fn opportunity_of(cycle: Cycle) -> Opportunity {
    let multiplier = cycle.multiplier();
    Opportunity::new(cycle, multiplier)
}
