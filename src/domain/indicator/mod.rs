//! Rolling indicator calculator.
//!
//! - `IndicatorType`: indicator identity + window length
//! - `IndicatorSeries`: one optional value per bar of a price series
//! - `IndicatorSnapshot`: the values the scorers read at the reference date

pub mod rolling;
pub mod snapshot;
pub mod stddev;

use crate::domain::bar::PriceSeries;
use chrono::NaiveDate;
use std::fmt;

pub use snapshot::IndicatorSnapshot;

pub const SHORT_WINDOW: usize = 5;
pub const BASE_WINDOW: usize = 20;
pub const TREND_WINDOW: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Mean,
    Min,
    Max,
    MeanAbsMove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    MinClose(usize),
    MaxClose(usize),
    AvgMove(usize),
    AvgVolume(usize),
}

impl IndicatorType {
    pub fn window(&self) -> usize {
        match *self {
            IndicatorType::Sma(n)
            | IndicatorType::MinClose(n)
            | IndicatorType::MaxClose(n)
            | IndicatorType::AvgMove(n)
            | IndicatorType::AvgVolume(n) => n,
        }
    }

    pub fn statistic(&self) -> Statistic {
        match self {
            IndicatorType::Sma(_) | IndicatorType::AvgVolume(_) => Statistic::Mean,
            IndicatorType::MinClose(_) => Statistic::Min,
            IndicatorType::MaxClose(_) => Statistic::Max,
            IndicatorType::AvgMove(_) => Statistic::MeanAbsMove,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(n) => write!(f, "SMA({})", n),
            IndicatorType::MinClose(n) => write!(f, "MIN({})", n),
            IndicatorType::MaxClose(n) => write!(f, "MAX({})", n),
            IndicatorType::AvgMove(n) => write!(f, "AVG_MOVE({})", n),
            IndicatorType::AvgVolume(n) => write!(f, "AVG_VOLUME({})", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub fn latest(&self) -> Option<f64> {
        self.values.last().and_then(|p| p.value)
    }
}

pub fn calculate(series: &PriceSeries, indicator_type: IndicatorType) -> IndicatorSeries {
    let inputs = match indicator_type {
        IndicatorType::AvgVolume(_) => series.volumes(),
        _ => series.closes(),
    };
    let rolled = rolling::rolling(&inputs, indicator_type.window(), indicator_type.statistic());

    IndicatorSeries {
        indicator_type,
        values: series
            .bars()
            .iter()
            .zip(rolled)
            .map(|(bar, value)| IndicatorPoint {
                date: bar.date,
                value,
            })
            .collect(),
    }
}

/// numerator / denominator, or `None` when the denominator is missing or zero.
pub fn guarded_ratio(numerator: f64, denominator: Option<f64>) -> Option<f64> {
    match denominator {
        Some(d) if d != 0.0 => {
            let r = numerator / d;
            r.is_finite().then_some(r)
        }
        _ => None,
    }
}

/// Rounds half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
