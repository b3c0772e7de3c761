//! Ledger executions.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Buy,
    Sell,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "buy"),
            Action::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown trade action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Action::Buy),
            "sell" => Ok(Action::Sell),
            _ => Err(UnknownAction(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub symbol: String,
    pub account: String,
    pub action: Action,
    pub quantity: f64,
    pub price: f64,
    pub trade_date: NaiveDate,
}

impl Execution {
    pub fn value(&self) -> f64 {
        self.quantity * self.price
    }
}

/// An execution plus the brokerage bookkeeping that arrives with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedExecution {
    pub execution: Execution,
    pub account_name: Option<String>,
    pub settlement_date: Option<NaiveDate>,
    pub amount: Option<f64>,
    pub commission: f64,
    pub fees: f64,
    pub source: String,
}
