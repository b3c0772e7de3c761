//! Daily price bar and per-symbol price series.

use chrono::NaiveDate;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Date-ascending bars for one symbol, at most one per date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Builds a series, sorting by date and keeping the last bar seen for a
    /// duplicated date.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self {
            symbol: symbol.into(),
            bars: deduped,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume as f64).collect()
    }

    /// The series cut off after `date`, so "latest" means the reference date.
    pub fn ending_at(&self, date: NaiveDate) -> PriceSeries {
        let end = self.bars.partition_point(|b| b.date <= date);
        PriceSeries {
            symbol: self.symbol.clone(),
            bars: self.bars[..end].to_vec(),
        }
    }

    /// The last `n` bars (or all of them when fewer exist).
    pub fn trailing(&self, n: usize) -> &[Bar] {
        let start = self.bars.len().saturating_sub(n);
        &self.bars[start..]
    }
}

/// Groups a flat bar dump into per-symbol series keyed by symbol.
pub fn group_by_symbol(bars: Vec<Bar>) -> BTreeMap<String, PriceSeries> {
    let mut grouped: BTreeMap<String, Vec<Bar>> = BTreeMap::new();
    for bar in bars {
        grouped.entry(bar.symbol.clone()).or_default().push(bar);
    }
    grouped
        .into_iter()
        .map(|(symbol, bars)| {
            let series = PriceSeries::new(symbol.clone(), bars);
            (symbol, series)
        })
        .collect()
}
