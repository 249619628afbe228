//! Ordering of opportunities.
//!
//! Best first: higher multiplier, then fewer hops, then the lexicographically
//! smallest currency sequence. The last key makes the order total for any two
//! distinct cycles, so results never depend on discovery order.

use std::cmp::Ordering;

use super::opportunity::Opportunity;

/// Compares two opportunities; `Ordering::Less` means `a` ranks ahead of `b`.
#[must_use]
pub fn compare(a: &Opportunity, b: &Opportunity) -> Ordering {
    b.multiplier()
        .total_cmp(&a.multiplier())
        .then_with(|| a.hops().cmp(&b.hops()))
        .then_with(|| a.path().currencies().cmp(b.path().currencies()))
        .then_with(|| {
            // Same route through different markets
            a.path()
                .edges()
                .iter()
                .map(|e| (e.pair(), e.side()))
                .cmp(b.path().edges().iter().map(|e| (e.pair(), e.side())))
        })
}

/// The single best opportunity, `None` for an empty input.
pub fn best(opportunities: impl IntoIterator<Item = Opportunity>) -> Option<Opportunity> {
    opportunities.into_iter().min_by(compare)
}

/// The `k` best opportunities, best first.
pub fn top_k(opportunities: impl IntoIterator<Item = Opportunity>, k: usize) -> Vec<Opportunity> {
    let mut ranked = sorted(opportunities);
    ranked.truncate(k);
    ranked
}

/// All opportunities, best first.
pub fn sorted(opportunities: impl IntoIterator<Item = Opportunity>) -> Vec<Opportunity> {
    let mut ranked: Vec<_> = opportunities.into_iter().collect();
    ranked.sort_by(compare);
    ranked
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::arb::currency::Currency;
    use crate::arb::cycle::Cycle;
    use crate::arb::test_helpers::*;

    /// A cycle through `route` where every hop sells at `rate`.
    fn route(route: &[&str], rate: f64) -> Opportunity {
        let edges = route
            .iter()
            .zip(route.iter().cycle().skip(1))
            .map(|(from, to)| sell(from, to, rate))
            .collect();
        opportunity_of(Cycle::new(edges).unwrap())
    }

    fn names(opportunity: &Opportunity) -> Vec<&str> {
        opportunity
            .path()
            .currencies()
            .map(Currency::as_str)
            .collect()
    }

    #[test]
    fn test_empty() {
        assert!(best(Vec::new()).is_none());
        assert!(top_k(Vec::new(), 3).is_empty());
    }

    #[test]
    fn test_higher_multiplier_wins() {
        let winner = best(vec![
            route(&["A", "B", "C"], 1.01),
            route(&["A", "B", "D"], 1.02),
            route(&["A", "C", "D"], 1.001),
        ])
        .unwrap();
        assert_eq!(names(&winner), ["A", "B", "D"]);
    }

    #[test]
    fn test_fewer_hops_break_ties() {
        let long = route(&["A", "B", "C", "D"], 2.0); // 16
        let short = route(&["B", "C", "D"], 2.0); // 8
        let short_equal = Opportunity::new(short.path().clone(), 16.0);
        let winner = best(vec![long, short_equal]).unwrap();
        assert_eq!(winner.hops(), 3);
    }

    #[test]
    fn test_lexicographic_route_breaks_ties() {
        let winner = best(vec![
            route(&["A", "C", "B"], 1.01),
            route(&["A", "B", "C"], 1.01),
        ])
        .unwrap();
        assert_eq!(names(&winner), ["A", "B", "C"]);
    }

    #[test]
    fn test_best_is_order_independent() {
        let opportunities = vec![
            route(&["A", "B", "C"], 1.01),
            route(&["A", "C", "B"], 1.01),
            route(&["B", "C", "D"], 1.005),
        ];
        let forward = best(opportunities.clone()).unwrap();
        let backward = best(opportunities.into_iter().rev()).unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_top_k() {
        let ranked = top_k(
            vec![
                route(&["A", "B", "C"], 1.001),
                route(&["A", "B", "D"], 1.003),
                route(&["A", "C", "D"], 1.002),
            ],
            2,
        );
        let second: Vec<_> = ranked.iter().map(|o| names(o)[1]).collect();
        assert_eq!(second, ["B", "C"]);
    }
}
