//! Splitter selection strategies for BSP compilation.
//!
//! The choice of splitting plane affects tree balance and the number of
//! polygon splits during construction. The compiler measures how every
//! candidate plane would partition the current polygon set and asks a
//! [`SplitterMetric`] to turn those counts into a cost; the cheapest
//! non-degenerate candidate wins.

/// How a candidate plane would partition the current polygon set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SplitCounts {
    /// Polygons that would end up entirely in front (including coplanar
    /// polygons facing the same way as the plane).
    pub front: usize,
    /// Polygons that would end up entirely behind (including coplanar
    /// polygons facing away from the plane).
    pub back: usize,
    /// Polygons the plane would split in two.
    pub straddling: usize,
}

/// Default balance/fragmentation tradeoff.
pub const DEFAULT_SPLITTER_WEIGHT: f64 = 4.0;

/// Strategy for scoring candidate splitting planes. Lower is better.
pub trait SplitterMetric {
    /// Returns the cost of splitting with a plane that partitions the
    /// polygon set as described by `counts`.
    fn cost(&self, counts: &SplitCounts) -> f64;
}

/// Balances tree depth against geometry duplication:
/// `|front - back| + weight * straddling`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalancedSplitter {
    pub weight: f64,
}

impl BalancedSplitter {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl Default for BalancedSplitter {
    fn default() -> Self {
        Self::new(DEFAULT_SPLITTER_WEIGHT)
    }
}

impl SplitterMetric for BalancedSplitter {
    fn cost(&self, counts: &SplitCounts) -> f64 {
        let balance = counts.front.abs_diff(counts.back) as f64;
        balance + self.weight * counts.straddling as f64
    }
}

/// Gives every candidate the same cost, so the first candidate wins.
///
/// This is the simplest and fastest selector, but may produce unbalanced
/// trees depending on input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstCandidate;

impl SplitterMetric for FirstCandidate {
    fn cost(&self, _counts: &SplitCounts) -> f64 {
        0.0
    }
}

/// Orders candidate indices by ascending cost. The sort is stable, so
/// candidates with equal cost keep their original order.
pub fn rank_by_cost(costs: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..costs.len()).collect();
    order.sort_by(|&a, &b| costs[a].total_cmp(&costs[b]));
    order
}
