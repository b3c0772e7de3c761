//! Per-symbol indicator, pivot and trend line pass.

use crate::domain::bar::PriceSeries;
use crate::domain::indicator::IndicatorSnapshot;
use crate::domain::pivot::{swing_points, Pivot, PivotKind};
use crate::domain::trendline::TrendlinePair;
use crate::domain::universe::Universe;
use chrono::{Duration, NaiveDate};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

pub const DEFAULT_TRENDLINE_DAYS: i64 = 70;

/// Everything the scorers need for one symbol, anchored at the reference
/// date.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolAnalysis {
    /// Bars up to and including the reference date.
    pub series: PriceSeries,
    pub snapshot: IndicatorSnapshot,
    /// Swing points inside the trend line window.
    pub pivots: Vec<Pivot>,
    pub trendlines: TrendlinePair,
}

impl SymbolAnalysis {
    /// `None` when the symbol has no bar on or before `reference_date`.
    pub fn build(
        series: &PriceSeries,
        reference_date: NaiveDate,
        trendline_days: i64,
    ) -> Option<Self> {
        let series = series.ending_at(reference_date);
        let snapshot = IndicatorSnapshot::compute(&series)?;

        // Pivots are classified over the whole series so the first bars of
        // the window still see their preceding closes.
        let cutoff = reference_date - Duration::days(trendline_days);
        let pivots: Vec<Pivot> = swing_points(&series)
            .into_iter()
            .filter(|p| p.date >= cutoff)
            .collect();
        let trendlines = TrendlinePair::fit(&series.symbol, &pivots);

        Some(Self {
            series,
            snapshot,
            pivots,
            trendlines,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.series.symbol
    }

    pub fn pivot_count(&self, kind: PivotKind) -> usize {
        self.pivots.iter().filter(|p| p.kind == kind).count()
    }
}

/// Analyzes every universe symbol present in `series`, in symbol order.
pub fn analyze_universe(
    universe: &Universe,
    series: &BTreeMap<String, PriceSeries>,
    trendline_days: i64,
) -> Vec<SymbolAnalysis> {
    let Some(reference_date) = universe.reference_date else {
        return Vec::new();
    };

    let symbols: Vec<&String> = universe.symbols.iter().collect();
    let analyses: Vec<SymbolAnalysis> = symbols
        .par_iter()
        .filter_map(|symbol| {
            let s = series.get(symbol.as_str())?;
            SymbolAnalysis::build(s, reference_date, trendline_days)
        })
        .collect();

    debug!(
        universe = symbols.len(),
        analyzed = analyses.len(),
        skipped = symbols.len() - analyses.len(),
        "per-symbol analysis complete"
    );
    analyses
}
