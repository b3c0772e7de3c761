//! Conversion of result collections into report tables.
//!
//! Scored candidates get the reference columns first, then the scorer's
//! metric columns, then the score. Missing values are written as empty
//! cells. Reconciliation detail and summary rows are merged here and
//! nowhere else.

use crate::domain::fifo::MatchedLot;
use crate::domain::reconcile::ReconciliationReport;
use crate::domain::reference::SymbolProfile;
use crate::domain::scoring::{
    BasePatternMetrics, BullishMetrics, MomentumMetrics, ScoredCandidate, TightBaseMetrics,
};
use crate::domain::trendline::Trendline;
use crate::domain::universe::Universe;
use crate::ports::report_port::Table;
use chrono::NaiveDate;

const PROFILE_HEADERS: [&str; 9] = [
    "symbol",
    "company_name",
    "sector",
    "industry",
    "country",
    "exchange",
    "market_cap",
    "quote_type",
    "delisted_date",
];

fn cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn profile_cells(p: &SymbolProfile) -> Vec<String> {
    vec![
        p.symbol.clone(),
        text(&p.company_name),
        text(&p.sector),
        text(&p.industry),
        text(&p.country),
        text(&p.exchange),
        cell(p.market_cap),
        text(&p.quote_type),
        cell(p.delisted_date),
    ]
}

/// Column layout of one scorer's metrics.
pub trait MetricColumns {
    fn headers() -> Vec<&'static str>;
    fn cells(&self) -> Vec<String>;
}

impl MetricColumns for MomentumMetrics {
    fn headers() -> Vec<&'static str> {
        vec!["close", "prev_close", "prev2_close"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.close.to_string(),
            self.prev_close.to_string(),
            self.prev2_close.to_string(),
        ]
    }
}

impl MetricColumns for TightBaseMetrics {
    fn headers() -> Vec<&'static str> {
        vec![
            "close",
            "sma_20",
            "high_20",
            "range_pct_5",
            "pct_from_high_20",
            "avg_move_pct",
            "volume_ratio_20",
        ]
    }

    fn cells(&self) -> Vec<String> {
        [
            self.close,
            self.sma_20,
            self.high_20,
            self.range_pct_5,
            self.pct_from_high_20,
            self.avg_move_pct,
            self.volume_ratio_20,
        ]
        .iter()
        .map(f64::to_string)
        .collect()
    }
}

fn line_cells(line: Option<&Trendline>) -> [String; 5] {
    [
        cell(line.map(|l| l.slope)),
        cell(line.map(|l| l.intercept)),
        cell(line.and_then(|l| l.r_squared)),
        cell(line.map(|l| l.point_count)),
        cell(line.map(|l| l.avg_strength)),
    ]
}

impl MetricColumns for BullishMetrics {
    fn headers() -> Vec<&'static str> {
        vec![
            "close",
            "sma_50",
            "volume_ratio",
            "support_slope",
            "support_intercept",
            "support_r2",
            "support_points",
            "support_avg_strength",
            "resistance_slope",
            "resistance_intercept",
            "resistance_r2",
            "resistance_points",
            "resistance_avg_strength",
            "high_pivots",
            "low_pivots",
        ]
    }

    fn cells(&self) -> Vec<String> {
        let mut row = vec![
            self.close.to_string(),
            self.sma_50.to_string(),
            cell(self.volume_ratio),
        ];
        row.extend(line_cells(self.support.as_ref()));
        row.extend(line_cells(self.resistance.as_ref()));
        row.push(self.high_pivots.to_string());
        row.push(self.low_pivots.to_string());
        row
    }
}

impl MetricColumns for BasePatternMetrics {
    fn headers() -> Vec<&'static str> {
        vec![
            "base_days",
            "touch_count",
            "tightness",
            "stddev_close",
            "volume_contraction",
            "flat_top",
            "support_slope",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.base_days.to_string(),
            self.touch_count.to_string(),
            self.tightness.to_string(),
            self.stddev_close.to_string(),
            self.volume_contraction.to_string(),
            self.flat_top.to_string(),
            self.support_slope.to_string(),
        ]
    }
}

/// One row per candidate, in the order given.
pub fn candidates_table<M: MetricColumns>(name: &str, candidates: &[ScoredCandidate<M>]) -> Table {
    let mut headers: Vec<&str> = PROFILE_HEADERS.to_vec();
    headers.extend(M::headers());
    headers.push("score");

    let mut table = Table::new(name, &headers);
    for c in candidates {
        let mut row = profile_cells(&c.profile);
        row.extend(c.metrics.cells());
        row.push(c.score.to_string());
        table.push(row);
    }
    table
}

const RECONCILE_HEADERS: [&str; 12] = [
    "symbol",
    "account",
    "total_bought",
    "total_sold",
    "shares_remaining",
    "total_cost",
    "total_proceeds",
    "net_gain",
    "pct_gain",
    "first_buy_date",
    "last_sell_date",
    "holding_days",
];

/// Detail rows followed by the gains, losses and net summary rows. The
/// summary label goes in the symbol column.
pub fn reconciliation_table(report: &ReconciliationReport) -> Table {
    let mut table = Table::new("reconcile", &RECONCILE_HEADERS);
    for t in &report.details {
        table.push(vec![
            t.symbol.clone(),
            t.account.clone(),
            t.total_bought.to_string(),
            t.total_sold.to_string(),
            t.shares_remaining.to_string(),
            t.total_cost.to_string(),
            t.total_proceeds.to_string(),
            t.net_gain.to_string(),
            cell(t.pct_gain),
            t.first_buy_date.to_string(),
            t.last_sell_date.to_string(),
            t.holding_days.to_string(),
        ]);
    }
    for s in &report.summary {
        let mut row = vec![String::new(); RECONCILE_HEADERS.len()];
        row[0] = s.kind.label().to_string();
        row[5] = s.total_cost.to_string();
        row[7] = s.net_gain.to_string();
        row[8] = cell(s.pct_gain);
        table.push(row);
    }
    table
}

pub fn lots_table(lots: &[MatchedLot]) -> Table {
    let mut table = Table::new(
        "fifo",
        &[
            "symbol",
            "account",
            "buy_date",
            "sell_date",
            "quantity",
            "buy_price",
            "sell_price",
            "cost_basis",
            "proceeds",
            "gain",
            "holding_days",
        ],
    );
    for lot in lots {
        table.push(vec![
            lot.symbol.clone(),
            lot.account.clone(),
            lot.buy_date.to_string(),
            lot.sell_date.to_string(),
            lot.quantity.to_string(),
            lot.buy_price.to_string(),
            lot.sell_price.to_string(),
            lot.cost_basis.to_string(),
            lot.proceeds.to_string(),
            lot.gain.to_string(),
            lot.holding_days().to_string(),
        ]);
    }
    table
}

/// Stored data range per universe symbol: `(first, last, bar count)`.
pub type DataRange = Option<(NaiveDate, NaiveDate, usize)>;

pub fn info_table(universe: &Universe, ranges: &[(String, DataRange)]) -> Table {
    let mut table = Table::new(
        "info",
        &[
            "reference_date",
            "universe_size",
            "symbol",
            "first_date",
            "last_date",
            "bars",
        ],
    );
    let reference = cell(universe.reference_date);
    let size = universe.count().to_string();
    for (symbol, range) in ranges {
        table.push(vec![
            reference.clone(),
            size.clone(),
            symbol.clone(),
            cell(range.map(|r| r.0)),
            cell(range.map(|r| r.1)),
            cell(range.map(|r| r.2)),
        ]);
    }
    table
}
