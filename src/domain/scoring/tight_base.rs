//! Tight consolidation near the 20-day high.

use super::{Scorer, ScoredCandidate, SymbolAnalysis};
use std::cmp::Ordering;

/// Admission thresholds. Ratios are fractions of the close (0.03 = 3%).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TightBaseParams {
    pub max_range_pct: f64,
    pub max_pct_from_high: f64,
    pub max_avg_move_pct: f64,
    pub min_volume_ratio: f64,
    pub max_volume_ratio: f64,
}

impl Default for TightBaseParams {
    fn default() -> Self {
        Self {
            max_range_pct: 0.03,
            max_pct_from_high: 0.03,
            max_avg_move_pct: 0.02,
            min_volume_ratio: 0.5,
            max_volume_ratio: 2.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TightBaseMetrics {
    pub close: f64,
    pub sma_20: f64,
    pub high_20: f64,
    pub range_pct_5: f64,
    pub pct_from_high_20: f64,
    pub avg_move_pct: f64,
    pub volume_ratio_20: f64,
}

/// The score of an admitted symbol is its 5-day range percentage; lower is
/// tighter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TightBaseScorer {
    pub params: TightBaseParams,
}

impl TightBaseScorer {
    pub fn new(params: TightBaseParams) -> Self {
        Self { params }
    }
}

impl Scorer for TightBaseScorer {
    type Metrics = TightBaseMetrics;

    fn name(&self) -> &'static str {
        "tight-base"
    }

    fn evaluate(&self, analysis: &SymbolAnalysis) -> Option<(TightBaseMetrics, f64)> {
        let snap = &analysis.snapshot;
        let p = &self.params;

        let sma_20 = snap.sma_20?;
        let high_20 = snap.high_20?;
        let range_pct_5 = snap.range_pct_5()?;
        let pct_from_high_20 = snap.pct_from_high_20()?;
        let avg_move_pct = snap.avg_move_pct()?;
        let volume_ratio_20 = snap.volume_ratio_20()?;

        let admitted = snap.close > sma_20
            && range_pct_5 < p.max_range_pct
            && pct_from_high_20 > -p.max_pct_from_high
            && avg_move_pct < p.max_avg_move_pct
            && (p.min_volume_ratio..=p.max_volume_ratio).contains(&volume_ratio_20);
        if !admitted {
            return None;
        }

        Some((
            TightBaseMetrics {
                close: snap.close,
                sma_20,
                high_20,
                range_pct_5,
                pct_from_high_20,
                avg_move_pct,
                volume_ratio_20,
            },
            range_pct_5,
        ))
    }

    /// Tightest range first, then calmest daily moves.
    fn order(
        &self,
        a: &ScoredCandidate<TightBaseMetrics>,
        b: &ScoredCandidate<TightBaseMetrics>,
    ) -> Ordering {
        a.metrics
            .range_pct_5
            .total_cmp(&b.metrics.range_pct_5)
            .then_with(|| a.metrics.avg_move_pct.total_cmp(&b.metrics.avg_move_pct))
            .then_with(|| a.symbol().cmp(b.symbol()))
    }
}
