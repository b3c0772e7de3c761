//! Indicator values at the last bar of a series.

use super::{calculate, guarded_ratio, IndicatorType, BASE_WINDOW, SHORT_WINDOW, TREND_WINDOW};
use crate::domain::bar::PriceSeries;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
    pub sma_20: Option<f64>,
    pub sma_50: Option<f64>,
    pub high_20: Option<f64>,
    pub max_5: Option<f64>,
    pub min_5: Option<f64>,
    pub avg_move_5: Option<f64>,
    pub avg_volume_20: Option<f64>,
    pub avg_volume_50: Option<f64>,
    /// Last volume over the 50-bar average volume.
    pub volume_ratio: Option<f64>,
}

impl IndicatorSnapshot {
    /// `None` for an empty series.
    pub fn compute(series: &PriceSeries) -> Option<Self> {
        let last = series.latest()?;
        let at = |t: IndicatorType| calculate(series, t).latest();

        let avg_volume_50 = at(IndicatorType::AvgVolume(TREND_WINDOW));
        let volume = last.volume as f64;

        Some(Self {
            date: last.date,
            close: last.close,
            volume,
            sma_20: at(IndicatorType::Sma(BASE_WINDOW)),
            sma_50: at(IndicatorType::Sma(TREND_WINDOW)),
            high_20: at(IndicatorType::MaxClose(BASE_WINDOW)),
            max_5: at(IndicatorType::MaxClose(SHORT_WINDOW)),
            min_5: at(IndicatorType::MinClose(SHORT_WINDOW)),
            avg_move_5: at(IndicatorType::AvgMove(SHORT_WINDOW)),
            avg_volume_20: at(IndicatorType::AvgVolume(BASE_WINDOW)),
            avg_volume_50,
            volume_ratio: guarded_ratio(volume, avg_volume_50),
        })
    }

    /// (max_5 - min_5) / close
    pub fn range_pct_5(&self) -> Option<f64> {
        match (self.max_5, self.min_5) {
            (Some(hi), Some(lo)) => guarded_ratio(hi - lo, Some(self.close)),
            _ => None,
        }
    }

    /// (close - high_20) / high_20; positive when the close exceeds the high.
    pub fn pct_from_high_20(&self) -> Option<f64> {
        let high = self.high_20?;
        guarded_ratio(self.close - high, Some(high))
    }

    /// mean(|daily move|) over 5 bars / close
    pub fn avg_move_pct(&self) -> Option<f64> {
        guarded_ratio(self.avg_move_5?, Some(self.close))
    }

    /// volume / avg_volume_20
    pub fn volume_ratio_20(&self) -> Option<f64> {
        guarded_ratio(self.volume, self.avg_volume_20)
    }
}
