//! Trend line score: support strengthening relative to resistance.

use super::{Scorer, SymbolAnalysis};
use crate::domain::indicator::round_to;
use crate::domain::pivot::PivotKind;
use crate::domain::trendline::{Trendline, TrendlinePair};

pub const SCORE_DECIMALS: i32 = 6;

/// support weight - resistance weight, where weight = slope * r² * points
/// and a missing line weighs 0.
pub fn bullish_score(lines: &TrendlinePair) -> f64 {
    let weight = |line: &Option<Trendline>| line.as_ref().map_or(0.0, Trendline::weight);
    round_to(weight(&lines.support) - weight(&lines.resistance), SCORE_DECIMALS)
}

#[derive(Debug, Clone, PartialEq)]
pub struct BullishMetrics {
    pub close: f64,
    pub sma_50: f64,
    pub volume_ratio: Option<f64>,
    pub support: Option<Trendline>,
    pub resistance: Option<Trendline>,
    pub high_pivots: usize,
    pub low_pivots: usize,
}

impl BullishMetrics {
    pub fn support_slope(&self) -> Option<f64> {
        self.support.as_ref().map(|l| l.slope)
    }

    pub fn resistance_slope(&self) -> Option<f64> {
        self.resistance.as_ref().map(|l| l.slope)
    }

    pub fn support_r2(&self) -> Option<f64> {
        self.support.as_ref().and_then(|l| l.r_squared)
    }

    pub fn resistance_r2(&self) -> Option<f64> {
        self.resistance.as_ref().and_then(|l| l.r_squared)
    }

    /// The better of the two fits.
    pub fn max_r2(&self) -> Option<f64> {
        match (self.support_r2(), self.resistance_r2()) {
            (Some(s), Some(r)) => Some(s.max(r)),
            (s, r) => s.or(r),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BullishScorer;

impl Scorer for BullishScorer {
    type Metrics = BullishMetrics;

    fn name(&self) -> &'static str {
        "trendline"
    }

    fn evaluate(&self, analysis: &SymbolAnalysis) -> Option<(BullishMetrics, f64)> {
        let snap = &analysis.snapshot;
        let sma_50 = snap.sma_50?;
        if snap.close <= sma_50 || !analysis.trendlines.any() {
            return None;
        }

        let score = bullish_score(&analysis.trendlines);
        Some((
            BullishMetrics {
                close: snap.close,
                sma_50,
                volume_ratio: snap.volume_ratio,
                support: analysis.trendlines.support.clone(),
                resistance: analysis.trendlines.resistance.clone(),
                high_pivots: analysis.pivot_count(PivotKind::High),
                low_pivots: analysis.pivot_count(PivotKind::Low),
            },
            score,
        ))
    }
}
