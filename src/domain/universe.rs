//! Universe selection.
//!
//! Picks the most recent trading date with broad symbol coverage (the
//! reference date) and restricts downstream work to the symbols that
//! reported on it. The result is an explicit value handed to every
//! per-symbol computation.

use crate::domain::error::ScoutError;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info, warn};

pub const MIN_SYMBOLS_PER_DATE: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    /// `None` when no date met the coverage threshold.
    pub reference_date: Option<NaiveDate>,
    pub symbols: BTreeSet<String>,
}

impl Universe {
    pub fn empty() -> Self {
        Self {
            reference_date: None,
            symbols: BTreeSet::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    /// Keeps only symbols accepted by `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.symbols.retain(|s| keep(s));
    }
}

/// The latest date whose distinct-symbol count reaches `min_symbols`.
pub fn select_reference_date(
    coverage: &BTreeMap<NaiveDate, usize>,
    min_symbols: usize,
) -> Option<NaiveDate> {
    coverage
        .iter()
        .rev()
        .find(|&(_, &count)| count >= min_symbols)
        .map(|(&date, _)| date)
}

/// Resolves the reference date and its symbols from a data store.
pub fn resolve_universe(
    data_port: &dyn DataPort,
    min_symbols: usize,
) -> Result<Universe, ScoutError> {
    let coverage = data_port.date_coverage()?;
    debug!(dates = coverage.len(), "loaded date coverage");

    let Some(reference_date) = select_reference_date(&coverage, min_symbols) else {
        warn!(
            min_symbols,
            "no date has enough symbols reporting; universe is empty"
        );
        return Ok(Universe::empty());
    };

    let symbols: BTreeSet<String> = data_port.symbols_on(reference_date)?.into_iter().collect();
    info!(%reference_date, symbols = symbols.len(), "resolved universe");

    Ok(Universe {
        reference_date: Some(reference_date),
        symbols,
    })
}

/// Preferred shares, units, warrants and rights are not common stock.
pub fn is_common_stock(symbol: &str) -> bool {
    !(symbol.contains("-P")
        || symbol.ends_with("-UN")
        || symbol.ends_with("-WS")
        || symbol.ends_with("-RT"))
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in symbol list")]
    EmptyToken,

    #[error("duplicate symbol: {0}")]
    DuplicateSymbol(String),
}

/// Parses a comma-separated symbol list, upper-casing each entry.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let symbol = trimmed.to_uppercase();
        if !seen.insert(symbol.clone()) {
            return Err(UniverseError::DuplicateSymbol(symbol));
        }
        symbols.push(symbol);
    }

    Ok(symbols)
}
