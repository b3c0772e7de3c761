//! Trade reconciliation: closed round trips and realized P&L.
//!
//! Executions are grouped by (symbol, account). A group is closed when its
//! bought and sold quantities agree within a tolerance and both legs carry
//! value. Detail rows and the three summary rows are separate types; they
//! are only merged when written out.

use crate::domain::execution::{Action, Execution};
use crate::domain::indicator::round_to;
use chrono::NaiveDate;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Quantity mismatch still treated as a closed position.
pub const DEFAULT_CLOSE_TOLERANCE: f64 = 1.999;

/// value / cost * 100, rounded to 2 places; `None` for zero cost.
fn pct_of(value: f64, cost: f64) -> Option<f64> {
    if cost == 0.0 {
        None
    } else {
        Some(round_to(value / cost * 100.0, 2))
    }
}

/// Running totals for one (symbol, account) group.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionGroup {
    pub symbol: String,
    pub account: String,
    pub total_bought: f64,
    pub total_sold: f64,
    pub total_cost: f64,
    pub total_proceeds: f64,
    pub first_buy_date: Option<NaiveDate>,
    pub last_sell_date: Option<NaiveDate>,
}

impl ExecutionGroup {
    fn new(symbol: &str, account: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            account: account.to_string(),
            total_bought: 0.0,
            total_sold: 0.0,
            total_cost: 0.0,
            total_proceeds: 0.0,
            first_buy_date: None,
            last_sell_date: None,
        }
    }

    fn add(&mut self, execution: &Execution) {
        match execution.action {
            Action::Buy => {
                self.total_bought += execution.quantity;
                self.total_cost += execution.value();
                self.first_buy_date = Some(match self.first_buy_date {
                    Some(d) => d.min(execution.trade_date),
                    None => execution.trade_date,
                });
            }
            Action::Sell => {
                self.total_sold += execution.quantity;
                self.total_proceeds += execution.value();
                self.last_sell_date = Some(match self.last_sell_date {
                    Some(d) => d.max(execution.trade_date),
                    None => execution.trade_date,
                });
            }
        }
    }

    pub fn shares_remaining(&self) -> f64 {
        self.total_bought - self.total_sold
    }

    pub fn is_closed(&self, tolerance: f64) -> bool {
        let remaining = self.shares_remaining();
        remaining.abs() < tolerance
            && self.total_cost > 0.0
            && self.total_proceeds > 0.0
            && remaining >= 0.0
    }

    /// The closed-trade row, or `None` while the position is still open.
    pub fn close(&self, tolerance: f64) -> Option<ClosedTrade> {
        if !self.is_closed(tolerance) {
            return None;
        }
        let first_buy_date = self.first_buy_date?;
        let last_sell_date = self.last_sell_date?;
        let raw_gain = self.total_proceeds - self.total_cost;

        Some(ClosedTrade {
            symbol: self.symbol.clone(),
            account: self.account.clone(),
            total_bought: self.total_bought,
            total_sold: self.total_sold,
            shares_remaining: self.shares_remaining(),
            total_cost: self.total_cost,
            total_proceeds: self.total_proceeds,
            net_gain: round_to(raw_gain, 2),
            pct_gain: pct_of(raw_gain, self.total_cost),
            first_buy_date,
            last_sell_date,
            holding_days: (last_sell_date - first_buy_date).num_days(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub symbol: String,
    pub account: String,
    pub total_bought: f64,
    pub total_sold: f64,
    pub shares_remaining: f64,
    pub total_cost: f64,
    pub total_proceeds: f64,
    pub net_gain: f64,
    pub pct_gain: Option<f64>,
    pub first_buy_date: NaiveDate,
    pub last_sell_date: NaiveDate,
    pub holding_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    GainsTotal,
    LossesTotal,
    NetTotal,
}

impl SummaryKind {
    pub fn label(&self) -> &'static str {
        match self {
            SummaryKind::GainsTotal => "gains total",
            SummaryKind::LossesTotal => "losses total",
            SummaryKind::NetTotal => "net total",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub kind: SummaryKind,
    pub total_cost: f64,
    pub net_gain: f64,
    pub pct_gain: Option<f64>,
}

impl SummaryRow {
    fn over<'a>(kind: SummaryKind, trades: impl Iterator<Item = &'a ClosedTrade>) -> Self {
        let (cost, gain) = trades.fold((0.0, 0.0), |(c, g), t| (c + t.total_cost, g + t.net_gain));
        Self {
            kind,
            total_cost: round_to(cost, 2),
            net_gain: round_to(gain, 2),
            pct_gain: pct_of(gain, cost),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconciliationReport {
    pub details: Vec<ClosedTrade>,
    /// Always gains, losses, net, in that order.
    pub summary: [SummaryRow; 3],
}

pub fn group_executions(executions: &[Execution]) -> Vec<ExecutionGroup> {
    let mut groups: BTreeMap<(&str, &str), ExecutionGroup> = BTreeMap::new();
    for e in executions {
        groups
            .entry((e.symbol.as_str(), e.account.as_str()))
            .or_insert_with(|| ExecutionGroup::new(&e.symbol, &e.account))
            .add(e);
    }
    groups.into_values().collect()
}

/// Account ascending, last sell date descending, symbol ascending.
fn detail_order(a: &ClosedTrade, b: &ClosedTrade) -> Ordering {
    a.account
        .cmp(&b.account)
        .then_with(|| b.last_sell_date.cmp(&a.last_sell_date))
        .then_with(|| a.symbol.cmp(&b.symbol))
}

pub fn reconcile(executions: &[Execution], tolerance: f64) -> ReconciliationReport {
    let groups = group_executions(executions);

    let mut details: Vec<ClosedTrade> = groups
        .par_iter()
        .filter_map(|g| g.close(tolerance))
        .collect();
    details.sort_by(detail_order);

    let summary = [
        SummaryRow::over(
            SummaryKind::GainsTotal,
            details.iter().filter(|t| t.net_gain > 0.0),
        ),
        SummaryRow::over(
            SummaryKind::LossesTotal,
            details.iter().filter(|t| t.net_gain < 0.0),
        ),
        SummaryRow::over(SummaryKind::NetTotal, details.iter()),
    ];

    ReconciliationReport { details, summary }
}
