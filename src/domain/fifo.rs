//! First-in first-out lot matching.
//!
//! Buys open lots; each sell consumes the oldest open lots of the same
//! (symbol, account). Every partial consumption yields one [`MatchedLot`].

use crate::domain::execution::{Action, Execution};
use crate::domain::indicator::round_to;
use chrono::NaiveDate;
use rayon::prelude::*;
use std::collections::{BTreeMap, VecDeque};

/// Remaining lot quantities below this are treated as fully consumed.
const LOT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
struct OpenLot {
    date: NaiveDate,
    quantity: f64,
    price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchedLot {
    pub symbol: String,
    pub account: String,
    pub buy_date: NaiveDate,
    pub sell_date: NaiveDate,
    pub quantity: f64,
    pub buy_price: f64,
    pub sell_price: f64,
    pub cost_basis: f64,
    pub proceeds: f64,
    pub gain: f64,
}

impl MatchedLot {
    pub fn holding_days(&self) -> i64 {
        (self.sell_date - self.buy_date).num_days()
    }
}

/// Matches one group's executions, which must already be in trade order.
fn match_group(executions: &[&Execution]) -> Vec<MatchedLot> {
    let mut lots: VecDeque<OpenLot> = VecDeque::new();
    let mut matched = Vec::new();

    for e in executions {
        match e.action {
            Action::Buy => lots.push_back(OpenLot {
                date: e.trade_date,
                quantity: e.quantity,
                price: e.price,
            }),
            Action::Sell => {
                let mut remaining = e.quantity;
                while remaining > LOT_EPSILON {
                    let Some(lot) = lots.front_mut() else { break };
                    let qty = remaining.min(lot.quantity);

                    matched.push(MatchedLot {
                        symbol: e.symbol.clone(),
                        account: e.account.clone(),
                        buy_date: lot.date,
                        sell_date: e.trade_date,
                        quantity: qty,
                        buy_price: lot.price,
                        sell_price: e.price,
                        cost_basis: round_to(qty * lot.price, 2),
                        proceeds: round_to(qty * e.price, 2),
                        gain: round_to(qty * (e.price - lot.price), 2),
                    });

                    remaining -= qty;
                    lot.quantity -= qty;
                    if lot.quantity <= LOT_EPSILON {
                        lots.pop_front();
                    }
                }
            }
        }
    }

    matched
}

/// Output is ordered by symbol, account, then trade sequence.
pub fn match_lots(executions: &[Execution]) -> Vec<MatchedLot> {
    let mut groups: BTreeMap<(&str, &str), Vec<&Execution>> = BTreeMap::new();
    for e in executions {
        groups
            .entry((e.symbol.as_str(), e.account.as_str()))
            .or_default()
            .push(e);
    }

    let groups: Vec<Vec<&Execution>> = groups
        .into_values()
        .map(|mut group| {
            // stable: same-day executions keep ledger order
            group.sort_by_key(|e| e.trade_date);
            group
        })
        .collect();

    groups
        .par_iter()
        .map(|group| match_group(group))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}
