//! Least-squares trend lines through same-kind swing pivots.
//!
//! Price is regressed on the pivot's day ordinal (days since 0001-01-01),
//! so slopes are in price units per calendar day.

use crate::domain::pivot::{Pivot, PivotKind};
use chrono::{Datelike, NaiveDate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendlineKind {
    Resistance,
    Support,
}

impl TrendlineKind {
    pub fn pivot_kind(self) -> PivotKind {
        match self {
            TrendlineKind::Resistance => PivotKind::High,
            TrendlineKind::Support => PivotKind::Low,
        }
    }
}

/// Closed-form ordinary least squares result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
    /// `None` when every x is identical.
    pub r_squared: Option<f64>,
    pub n: usize,
}

/// Fits y = slope * x + intercept from running sums.
///
/// Sums are taken relative to the first point so that large x values (day
/// ordinals) do not cancel out. With zero x-variance the slope is reported
/// as 0, the intercept as mean(y) and R² as `None`. With zero y-variance (a
/// flat line through every point) R² is 1.0.
pub fn fit_line(points: &[(f64, f64)]) -> Option<LineFit> {
    if points.len() < 2 {
        return None;
    }

    let (x0, y0) = points[0];
    let n = points.len() as f64;
    let (mut sx, mut sy, mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0, 0.0, 0.0);
    for &(x, y) in points {
        let (dx, dy) = (x - x0, y - y0);
        sx += dx;
        sy += dy;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let var_x = n * sxx - sx * sx;
    let var_y = n * syy - sy * sy;
    let cov = n * sxy - sx * sy;

    if var_x.abs() <= f64::EPSILON * (n * sxx).max(1.0) {
        return Some(LineFit {
            slope: 0.0,
            intercept: y0 + sy / n,
            r_squared: None,
            n: points.len(),
        });
    }

    let slope = cov / var_x;
    let intercept = y0 + (sy - slope * sx) / n - slope * x0;
    let r_squared = if var_y.abs() <= f64::EPSILON * (n * syy).max(1.0) {
        1.0
    } else {
        ((cov * cov) / (var_x * var_y)).clamp(0.0, 1.0)
    };

    Some(LineFit {
        slope,
        intercept,
        r_squared: Some(r_squared),
        n: points.len(),
    })
}

pub fn day_ordinal(date: NaiveDate) -> i64 {
    date.num_days_from_ce() as i64
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trendline {
    pub symbol: String,
    pub kind: TrendlineKind,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: Option<f64>,
    pub point_count: usize,
    pub avg_strength: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Trendline {
    /// slope * r² * point_count, with a missing R² counting as 0.
    pub fn weight(&self) -> f64 {
        self.slope * self.r_squared.unwrap_or(0.0) * self.point_count as f64
    }
}

/// Fits one line through the pivots of `kind`'s pivot kind; absent with
/// fewer than two such pivots.
pub fn fit(symbol: &str, kind: TrendlineKind, pivots: &[Pivot]) -> Option<Trendline> {
    let selected: Vec<&Pivot> = pivots
        .iter()
        .filter(|p| p.kind == kind.pivot_kind())
        .collect();

    let points: Vec<(f64, f64)> = selected
        .iter()
        .map(|p| (day_ordinal(p.date) as f64, p.price))
        .collect();
    let line = fit_line(&points)?;

    let avg_strength =
        selected.iter().map(|p| p.strength as f64).sum::<f64>() / selected.len() as f64;
    let start_date = selected.iter().map(|p| p.date).min()?;
    let end_date = selected.iter().map(|p| p.date).max()?;

    Some(Trendline {
        symbol: symbol.to_string(),
        kind,
        slope: line.slope,
        intercept: line.intercept,
        r_squared: line.r_squared,
        point_count: line.n,
        avg_strength,
        start_date,
        end_date,
    })
}

/// Support and resistance lines for one symbol.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrendlinePair {
    pub support: Option<Trendline>,
    pub resistance: Option<Trendline>,
}

impl TrendlinePair {
    pub fn fit(symbol: &str, pivots: &[Pivot]) -> Self {
        Self {
            support: fit(symbol, TrendlineKind::Support, pivots),
            resistance: fit(symbol, TrendlineKind::Resistance, pivots),
        }
    }

    pub fn any(&self) -> bool {
        self.support.is_some() || self.resistance.is_some()
    }
}
