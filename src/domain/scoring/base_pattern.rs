//! Base-pattern scoring, the second pass over tight-base candidates.
//!
//! Looks at the last `base_days` bars and rewards a narrow range, repeated
//! tests of the top, drying volume, a flat ceiling and rising lows.

use super::{ScoredCandidate, Scorer, SymbolAnalysis};
use crate::domain::indicator::rolling::rolling;
use crate::domain::indicator::stddev::{mean, sample_stddev};
use crate::domain::indicator::{guarded_ratio, round_to, Statistic};
use crate::domain::trendline::fit_line;
use std::cmp::Ordering;

pub const DEFAULT_BASE_DAYS: usize = 60;
const RANGE_WINDOW: usize = 10;
const TOUCH_FRACTION: f64 = 0.985;
const FLAT_TOP_TOLERANCE: f64 = 0.01;
const MAX_SCORE: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasePatternParams {
    pub base_days: usize,
}

impl Default for BasePatternParams {
    fn default() -> Self {
        Self {
            base_days: DEFAULT_BASE_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasePatternMetrics {
    pub touch_count: usize,
    pub tightness: f64,
    pub volume_contraction: bool,
    pub flat_top: bool,
    pub support_slope: f64,
    pub stddev_close: f64,
    pub base_days: usize,
}

/// Mean of the last `RANGE_WINDOW` rolling `RANGE_WINDOW`-bar close ranges,
/// over the last close.
fn tightness(closes: &[f64]) -> Option<f64> {
    let highs = rolling(closes, RANGE_WINDOW, Statistic::Max);
    let lows = rolling(closes, RANGE_WINDOW, Statistic::Min);
    let ranges: Vec<f64> = highs
        .iter()
        .zip(&lows)
        .skip(RANGE_WINDOW - 1)
        .filter_map(|(h, l)| Some((*h)? - (*l)?))
        .collect();
    let recent = &ranges[ranges.len().saturating_sub(RANGE_WINDOW)..];
    guarded_ratio(mean(recent)?, closes.last().copied())
}

/// Whether the centered 3-bar rolling max barely wanders from its mean.
fn has_flat_top(closes: &[f64]) -> bool {
    let peaks: Vec<f64> = closes
        .windows(3)
        .map(|w| w[0].max(w[1]).max(w[2]))
        .collect();
    let Some(level) = mean(&peaks) else {
        return false;
    };
    let deviations: Vec<f64> = peaks.iter().map(|p| (p - level).abs()).collect();
    mean(&deviations)
        .and_then(|d| guarded_ratio(d, Some(level)))
        .is_some_and(|r| r < FLAT_TOP_TOLERANCE)
}

/// Composite 0..=100 score, rounded to 2 places.
pub fn composite_score(
    tightness: f64,
    touch_count: usize,
    volume_contraction: bool,
    flat_top: bool,
    support_slope: f64,
) -> f64 {
    let bonus = |b: bool| if b { 10.0 } else { 0.0 };
    let raw = (30.0 - tightness * 1000.0).max(0.0)
        + touch_count as f64 * 10.0
        + bonus(volume_contraction)
        + bonus(flat_top)
        + (support_slope * 100.0).max(0.0);
    round_to(raw.min(MAX_SCORE), 2)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BasePatternScorer {
    pub params: BasePatternParams,
}

impl BasePatternScorer {
    pub fn new(params: BasePatternParams) -> Self {
        Self { params }
    }
}

impl Scorer for BasePatternScorer {
    type Metrics = BasePatternMetrics;

    fn name(&self) -> &'static str {
        "base-pattern"
    }

    fn evaluate(&self, analysis: &SymbolAnalysis) -> Option<(BasePatternMetrics, f64)> {
        let base_days = self.params.base_days;
        let bars = analysis.series.trailing(base_days);
        if base_days == 0 || bars.len() < base_days {
            return None;
        }

        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume as f64).collect();

        let tightness = tightness(&closes)?;
        let stddev_close = guarded_ratio(sample_stddev(&closes)?, mean(&closes))?;

        let resistance = closes.iter().copied().fold(f64::MIN, f64::max);
        let touch_count = closes
            .iter()
            .filter(|&&c| c >= resistance * TOUCH_FRACTION)
            .count();

        let half = volumes.len() / 2;
        let volume_contraction = match (mean(&volumes[..half]), mean(&volumes[half..])) {
            (Some(early), Some(late)) => late < early,
            _ => false,
        };
        let flat_top = has_flat_top(&closes);

        let lows: Vec<(f64, f64)> = bars
            .iter()
            .enumerate()
            .map(|(i, b)| (i as f64, b.low))
            .collect();
        let support_slope = fit_line(&lows)?.slope;

        let score = composite_score(
            tightness,
            touch_count,
            volume_contraction,
            flat_top,
            support_slope,
        );
        Some((
            BasePatternMetrics {
                touch_count,
                tightness: round_to(tightness, 4),
                volume_contraction,
                flat_top,
                support_slope: round_to(support_slope, 4),
                stddev_close: round_to(stddev_close, 4),
                base_days,
            },
            score,
        ))
    }

    /// Sector, best score, most touches, industry. Missing sector or
    /// industry sorts as an empty name.
    fn order(
        &self,
        a: &ScoredCandidate<BasePatternMetrics>,
        b: &ScoredCandidate<BasePatternMetrics>,
    ) -> Ordering {
        let text = |s: &Option<String>| s.clone().unwrap_or_default();
        text(&a.profile.sector)
            .cmp(&text(&b.profile.sector))
            .then_with(|| b.score.total_cmp(&a.score))
            .then_with(|| b.metrics.touch_count.cmp(&a.metrics.touch_count))
            .then_with(|| text(&a.profile.industry).cmp(&text(&b.profile.industry)))
            .then_with(|| a.symbol().cmp(b.symbol()))
    }
}
