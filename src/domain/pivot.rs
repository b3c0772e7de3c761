//! Swing pivot detection.
//!
//! Each bar is scored against the closes that precede it. A HIGH of
//! strength k means the last k day-over-day steps into the bar were all
//! rising; a LOW is the same with falling steps. Strength is decided by a
//! ranked rule table evaluated top-down, shared by both kinds: only the step
//! relation differs.

use crate::domain::bar::PriceSeries;
use chrono::NaiveDate;

pub const MAX_STRENGTH: u8 = 4;
pub const SWING_STRENGTH: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PivotKind {
    High,
    Low,
}

impl PivotKind {
    /// Whether the step from `prev` to `next` counts toward this kind's run.
    fn step_holds(self, prev: f64, next: f64) -> bool {
        match self {
            PivotKind::High => prev < next,
            PivotKind::Low => prev > next,
        }
    }
}

/// (strength, contiguous qualifying steps required), most specific first.
const STRENGTH_RULES: [(u8, usize); 4] = [(4, 4), (3, 3), (2, 2), (1, 1)];

/// Strength of `kind` at `closes[index]`, 0 when no rule matches.
pub fn strength(closes: &[f64], index: usize, kind: PivotKind) -> u8 {
    let run_holds = |steps: usize| {
        steps <= index
            && (0..steps).all(|k| kind.step_holds(closes[index - k - 1], closes[index - k]))
    };

    STRENGTH_RULES
        .iter()
        .find(|(_, steps)| run_holds(*steps))
        .map(|(s, _)| *s)
        .unwrap_or(0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pivot {
    pub symbol: String,
    pub date: NaiveDate,
    pub price: f64,
    pub kind: PivotKind,
    pub strength: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedBar {
    pub date: NaiveDate,
    pub close: f64,
    pub high_strength: u8,
    pub low_strength: u8,
    /// `Some` for swing pivots, `None` for unclassified points.
    pub swing: Option<PivotKind>,
}

impl ClassifiedBar {
    pub fn strength(&self) -> u8 {
        match self.swing {
            Some(PivotKind::High) => self.high_strength,
            Some(PivotKind::Low) => self.low_strength,
            None => 0,
        }
    }
}

/// Classifies every bar in the series. HIGH is checked before LOW.
pub fn classify(series: &PriceSeries) -> Vec<ClassifiedBar> {
    let closes = series.closes();
    series
        .bars()
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            let high_strength = strength(&closes, i, PivotKind::High);
            let low_strength = strength(&closes, i, PivotKind::Low);
            let swing = if high_strength >= SWING_STRENGTH {
                Some(PivotKind::High)
            } else if low_strength >= SWING_STRENGTH {
                Some(PivotKind::Low)
            } else {
                None
            };
            ClassifiedBar {
                date: bar.date,
                close: bar.close,
                high_strength,
                low_strength,
                swing,
            }
        })
        .collect()
}

/// Swing pivots (strength >= 2) of the series, in date order.
pub fn swing_points(series: &PriceSeries) -> Vec<Pivot> {
    classify(series)
        .into_iter()
        .filter_map(|c| {
            let kind = c.swing?;
            Some(Pivot {
                symbol: series.symbol.clone(),
                date: c.date,
                price: c.close,
                kind,
                strength: c.strength(),
            })
        })
        .collect()
}
