//! Wedge filter over trend line results: a well-fit pair of lines that
//! converge (rising support under flat or falling resistance).

use super::bullish::{BullishMetrics, BullishScorer};
use super::{
    asc_nulls_last, desc_nulls_last, text_nulls_last, ScoredCandidate, Scorer, SymbolAnalysis,
};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WedgeParams {
    pub min_resistance_r2: f64,
    pub min_support_r2: f64,
    /// Minimum swing highs and minimum swing lows in the window.
    pub pivot_count: usize,
    pub require_positive_support: bool,
    pub require_flat_or_dropping_resistance: bool,
}

impl Default for WedgeParams {
    fn default() -> Self {
        Self {
            min_resistance_r2: 0.2,
            min_support_r2: 0.2,
            pivot_count: 3,
            require_positive_support: true,
            require_flat_or_dropping_resistance: true,
        }
    }
}

impl WedgeParams {
    pub fn admits(&self, m: &BullishMetrics) -> bool {
        let fit_ok = m.resistance_r2().is_some_and(|r2| r2 >= self.min_resistance_r2)
            || m.support_r2().is_some_and(|r2| r2 >= self.min_support_r2);
        let pivots_ok = m.high_pivots >= self.pivot_count && m.low_pivots >= self.pivot_count;
        let support_ok =
            !self.require_positive_support || m.support_slope().is_some_and(|s| s >= 0.0);
        let resistance_ok = !self.require_flat_or_dropping_resistance
            || m.resistance_slope().is_some_and(|s| s <= 0.0);

        fit_ok && pivots_ok && support_ok && resistance_ok
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WedgeScorer {
    pub params: WedgeParams,
}

impl WedgeScorer {
    pub fn new(params: WedgeParams) -> Self {
        Self { params }
    }
}

impl Scorer for WedgeScorer {
    type Metrics = BullishMetrics;

    fn name(&self) -> &'static str {
        "wedge"
    }

    fn evaluate(&self, analysis: &SymbolAnalysis) -> Option<(BullishMetrics, f64)> {
        BullishScorer
            .evaluate(analysis)
            .filter(|(m, _)| self.params.admits(m))
    }

    /// Sector, industry, best fit, relative volume, flattest resistance,
    /// steepest support.
    fn order(
        &self,
        a: &ScoredCandidate<BullishMetrics>,
        b: &ScoredCandidate<BullishMetrics>,
    ) -> Ordering {
        text_nulls_last(&a.profile.sector, &b.profile.sector)
            .then_with(|| text_nulls_last(&a.profile.industry, &b.profile.industry))
            .then_with(|| desc_nulls_last(a.metrics.max_r2(), b.metrics.max_r2()))
            .then_with(|| desc_nulls_last(a.metrics.volume_ratio, b.metrics.volume_ratio))
            .then_with(|| {
                asc_nulls_last(a.metrics.resistance_slope(), b.metrics.resistance_slope())
            })
            .then_with(|| desc_nulls_last(a.metrics.support_slope(), b.metrics.support_slope()))
            .then_with(|| a.symbol().cmp(b.symbol()))
    }
}
