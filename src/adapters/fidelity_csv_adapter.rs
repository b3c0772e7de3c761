//! Fidelity account-activity CSV export.
//!
//! Exports carry preamble and disclaimer lines around the activity table.
//! Only rows with an `MM/DD/YYYY` run date and a BOUGHT/SOLD action are
//! executions; everything else (dividends, transfers, notes) is skipped.

use crate::domain::error::ScoutError;
use crate::domain::execution::{Action, Execution, ImportedExecution};
use crate::domain::indicator::round_to;
use crate::ports::ledger_port::LedgerPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info};

const SOURCE: &str = "Fidelity";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ActivityRow {
    #[serde(rename = "Run Date")]
    run_date: Option<String>,
    #[serde(rename = "Account")]
    account: Option<String>,
    #[serde(rename = "Account Number")]
    account_number: Option<String>,
    #[serde(rename = "Action")]
    action: Option<String>,
    #[serde(rename = "Symbol")]
    symbol: Option<String>,
    #[serde(rename = "Quantity")]
    quantity: Option<String>,
    #[serde(rename = "Price", alias = "Price ($)")]
    price: Option<String>,
    #[serde(rename = "Amount", alias = "Amount ($)")]
    amount: Option<String>,
    #[serde(rename = "Commission", alias = "Commission ($)")]
    commission: Option<String>,
    #[serde(rename = "Fees", alias = "Fees ($)")]
    fees: Option<String>,
    #[serde(rename = "Settlement Date")]
    settlement_date: Option<String>,
}

/// Strict `MM/DD/YYYY`.
fn parse_run_date(text: &str) -> Option<NaiveDate> {
    let shape_ok = text.len() == 10
        && text.char_indices().all(|(i, c)| match i {
            2 | 5 => c == '/',
            _ => c.is_ascii_digit(),
        });
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(text, "%m/%d/%Y").ok()
}

fn parse_action(text: &str) -> Option<Action> {
    let upper = text.to_uppercase();
    if upper.contains("BOUGHT") {
        Some(Action::Buy)
    } else if upper.contains("SOLD") {
        Some(Action::Sell)
    } else {
        None
    }
}

/// Parses a money/number cell, ignoring `$`, `,` and `+`.
fn parse_number(text: Option<&str>) -> Option<f64> {
    let cleaned: String = text?
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '+'))
        .collect();
    cleaned.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|s| !s.is_empty())
}

impl ActivityRow {
    fn into_execution(self) -> Option<ImportedExecution> {
        let trade_date = parse_run_date(non_empty(self.run_date.as_deref())?)?;
        let action = parse_action(non_empty(self.action.as_deref())?)?;
        let symbol = non_empty(self.symbol.as_deref())?.to_uppercase();
        let account = non_empty(self.account_number.as_deref())?
            .split('.')
            .next()?
            .trim()
            .to_string();
        let quantity = round_to(parse_number(self.quantity.as_deref())?.abs(), 4);
        let price = round_to(parse_number(self.price.as_deref())?, 4);

        Some(ImportedExecution {
            execution: Execution {
                symbol,
                account,
                action,
                quantity,
                price,
                trade_date,
            },
            account_name: non_empty(self.account.as_deref()).map(String::from),
            settlement_date: non_empty(self.settlement_date.as_deref())
                .and_then(|d| NaiveDate::parse_from_str(d, "%m/%d/%Y").ok()),
            amount: parse_number(self.amount.as_deref()),
            commission: parse_number(self.commission.as_deref()).unwrap_or(0.0),
            fees: parse_number(self.fees.as_deref()).unwrap_or(0.0),
            source: SOURCE.to_string(),
        })
    }
}

pub struct FidelityCsvAdapter {
    path: PathBuf,
}

impl FidelityCsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn import_error(&self, reason: impl std::fmt::Display) -> ScoutError {
        ScoutError::Import {
            file: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// Every buy/sell execution in the export, in file order.
    pub fn read(&self) -> Result<Vec<ImportedExecution>, ScoutError> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| self.import_error(e))?;

        let headers = rdr.headers().map_err(|e| self.import_error(e))?.clone();
        if !headers.iter().any(|h| h == "Run Date") {
            return Err(self.import_error("missing \"Run Date\" column"));
        }

        let mut total = 0;
        let mut executions = Vec::new();
        for result in rdr.deserialize::<ActivityRow>() {
            total += 1;
            match result {
                Ok(row) => executions.extend(row.into_execution()),
                Err(e) => debug!(error = %e, "skipping unreadable export row"),
            }
        }

        info!(
            file = %self.path.display(),
            rows = total,
            executions = executions.len(),
            "read brokerage export"
        );
        Ok(executions)
    }
}

impl LedgerPort for FidelityCsvAdapter {
    fn fetch_executions(&self) -> Result<Vec<Execution>, ScoutError> {
        Ok(self.read()?.into_iter().map(|i| i.execution).collect())
    }
}
