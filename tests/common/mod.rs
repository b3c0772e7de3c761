#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap};
pub use trailscout::domain::bar::Bar;
use trailscout::domain::error::ScoutError;
use trailscout::domain::execution::{Action, Execution};
use trailscout::domain::reference::SymbolProfile;
use trailscout::ports::data_port::DataPort;
use trailscout::ports::ledger_port::LedgerPort;
use trailscout::ports::report_port::{ReportPort, Table};

pub struct MockDataPort {
    pub bars: Vec<Bar>,
    pub profiles: HashMap<String, SymbolProfile>,
    pub fail_coverage: bool,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            bars: Vec::new(),
            profiles: HashMap::new(),
            fail_coverage: false,
        }
    }

    pub fn with_bars(mut self, bars: Vec<Bar>) -> Self {
        self.bars.extend(bars);
        self
    }

    pub fn with_profile(mut self, profile: SymbolProfile) -> Self {
        self.profiles.insert(profile.symbol.clone(), profile);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_coverage = true;
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, ScoutError> {
        Ok(self
            .bars
            .iter()
            .filter(|b| b.symbol == symbol && b.date >= start_date && b.date <= end_date)
            .cloned()
            .collect())
    }

    fn fetch_all_bars(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, ScoutError> {
        Ok(self
            .bars
            .iter()
            .filter(|b| b.date >= start_date && b.date <= end_date)
            .cloned()
            .collect())
    }

    fn date_coverage(&self) -> Result<BTreeMap<NaiveDate, usize>, ScoutError> {
        if self.fail_coverage {
            return Err(ScoutError::DatabaseQuery {
                reason: "connection reset".into(),
            });
        }
        let mut by_date: BTreeMap<NaiveDate, BTreeSet<&str>> = BTreeMap::new();
        for b in &self.bars {
            by_date.entry(b.date).or_default().insert(&b.symbol);
        }
        Ok(by_date.into_iter().map(|(d, s)| (d, s.len())).collect())
    }

    fn symbols_on(&self, date: NaiveDate) -> Result<Vec<String>, ScoutError> {
        let symbols: BTreeSet<String> = self
            .bars
            .iter()
            .filter(|b| b.date == date)
            .map(|b| b.symbol.clone())
            .collect();
        Ok(symbols.into_iter().collect())
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScoutError> {
        let symbols: BTreeSet<String> = self.bars.iter().map(|b| b.symbol.clone()).collect();
        Ok(symbols.into_iter().collect())
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ScoutError> {
        let dates: Vec<NaiveDate> = self
            .bars
            .iter()
            .filter(|b| b.symbol == symbol)
            .map(|b| b.date)
            .collect();
        Ok(match (dates.iter().min(), dates.iter().max()) {
            (Some(&min), Some(&max)) => Some((min, max, dates.len())),
            _ => None,
        })
    }

    fn fetch_profiles(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, SymbolProfile>, ScoutError> {
        Ok(symbols
            .iter()
            .filter_map(|s| self.profiles.get(s).map(|p| (s.clone(), p.clone())))
            .collect())
    }
}

pub struct MockLedger {
    pub executions: Vec<Execution>,
}

impl LedgerPort for MockLedger {
    fn fetch_executions(&self) -> Result<Vec<Execution>, ScoutError> {
        Ok(self.executions.clone())
    }
}

pub struct RecordingReport {
    pub tables: RefCell<Vec<Table>>,
}

impl RecordingReport {
    pub fn new() -> Self {
        Self {
            tables: RefCell::new(Vec::new()),
        }
    }
}

impl ReportPort for RecordingReport {
    fn write_table(&self, table: &Table) -> Result<(), ScoutError> {
        self.tables.borrow_mut().push(table.clone());
        Ok(())
    }
}

pub fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n)
}

pub fn make_bar(symbol: &str, date: NaiveDate, close: f64, volume: i64) -> Bar {
    Bar {
        symbol: symbol.to_string(),
        date,
        open: close,
        high: close,
        low: close,
        close,
        volume,
    }
}

/// Consecutive daily bars from `day(0)` with constant volume.
pub fn series_bars(symbol: &str, closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(symbol, day(i as i64), close, 1000))
        .collect()
}

/// Fourteen bars at 90, a step to 100, then a tight five-bar range.
pub fn tight_closes() -> Vec<f64> {
    let mut closes = vec![90.0; 14];
    closes.extend([100.0, 100.0, 100.5, 101.0, 100.5, 101.0]);
    closes
}

pub fn rising_closes(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}

pub fn falling_closes(n: usize) -> Vec<f64> {
    (0..n).map(|i| 120.0 - i as f64).collect()
}

pub fn execution(
    symbol: &str,
    account: &str,
    action: Action,
    quantity: f64,
    price: f64,
    trade_date: NaiveDate,
) -> Execution {
    Execution {
        symbol: symbol.to_string(),
        account: account.to_string(),
        action,
        quantity,
        price,
        trade_date,
    }
}
