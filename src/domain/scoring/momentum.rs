//! Short-term momentum streak over the last three closes.

use super::{Scorer, SymbolAnalysis};

type StreakRule = fn(f64, f64, f64) -> bool;

/// (score, rule over (c(t-2), c(t-1), c(t))), first match wins.
const STREAK_RULES: [(u8, StreakRule); 3] = [
    (3, |c2, c1, c0| c2 < c1 && c1 < c0),
    (2, |c2, c1, c0| c1 < c0 && c2 >= c1),
    (1, |c2, c1, c0| c0 > c1 && c1 >= c2),
];

/// Streak score of the last three closes; `None` with fewer than three.
pub fn streak_score(closes: &[f64]) -> Option<u8> {
    let [c2, c1, c0] = closes.get(closes.len().checked_sub(3)?..)? else {
        return None;
    };
    let score = STREAK_RULES
        .iter()
        .find(|(_, rule)| rule(*c2, *c1, *c0))
        .map_or(0, |(score, _)| *score);
    Some(score)
}

#[derive(Debug, Clone, PartialEq)]
pub struct MomentumMetrics {
    pub close: f64,
    pub prev_close: f64,
    pub prev2_close: f64,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MomentumScorer;

impl Scorer for MomentumScorer {
    type Metrics = MomentumMetrics;

    fn name(&self) -> &'static str {
        "momentum"
    }

    fn evaluate(&self, analysis: &SymbolAnalysis) -> Option<(MomentumMetrics, f64)> {
        let bars = analysis.series.trailing(3);
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let score = streak_score(&closes)?;
        if score == 0 {
            return None;
        }
        Some((
            MomentumMetrics {
                close: closes[2],
                prev_close: closes[1],
                prev2_close: closes[0],
            },
            score as f64,
        ))
    }
}
