//! Price store over a directory of `<SYMBOL>.csv` files.
//!
//! Each file has the header `date,open,high,low,close,volume` with ISO dates.

use crate::domain::bar::Bar;
use crate::domain::error::ScoutError;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct PriceRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }

    /// Every `.csv` file in the directory keyed by its upper-cased stem. An
    /// exact upper-case file name wins over a differently cased duplicate.
    fn price_files(&self) -> Result<BTreeMap<String, PathBuf>, ScoutError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| ScoutError::Database {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut files = BTreeMap::new();
        for entry in entries {
            let path = entry?.path();
            if !path.extension().is_some_and(|ext| ext == "csv") {
                continue;
            }
            let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
                continue;
            };
            let symbol = stem.to_uppercase();
            if stem == symbol || !files.contains_key(&symbol) {
                files.insert(symbol, path);
            }
        }
        Ok(files)
    }

    /// The file holding `symbol`, whatever the case of its name.
    fn locate(&self, symbol: &str) -> Result<PathBuf, ScoutError> {
        let exact = self.csv_path(symbol);
        if exact.is_file() {
            return Ok(exact);
        }
        if self.base_path.is_dir() {
            if let Some(path) = self.price_files()?.remove(&symbol.to_uppercase()) {
                return Ok(path);
            }
        }
        Err(ScoutError::NoData {
            symbol: symbol.to_string(),
        })
    }

    fn read_symbol(&self, symbol: &str) -> Result<Vec<Bar>, ScoutError> {
        let path = self.locate(symbol)?;
        self.read_file(symbol, &path)
    }

    /// All bars of one file, date ascending.
    fn read_file(&self, symbol: &str, path: &Path) -> Result<Vec<Bar>, ScoutError> {
        let mut rdr = csv::Reader::from_path(path).map_err(|e| ScoutError::Database {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut bars = Vec::new();
        for result in rdr.deserialize::<PriceRow>() {
            let row = result.map_err(|e| ScoutError::Database {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;
            bars.push(Bar {
                symbol: symbol.to_string(),
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, ScoutError> {
        let mut bars = self.read_symbol(symbol)?;
        bars.retain(|b| b.date >= start_date && b.date <= end_date);
        Ok(bars)
    }

    fn fetch_all_bars(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, ScoutError> {
        let mut bars = Vec::new();
        for (symbol, path) in self.price_files()? {
            let rows = self.read_file(&symbol, &path)?;
            bars.extend(
                rows.into_iter()
                    .filter(|b| b.date >= start_date && b.date <= end_date),
            );
        }
        Ok(bars)
    }

    fn date_coverage(&self) -> Result<BTreeMap<NaiveDate, usize>, ScoutError> {
        let mut by_date: BTreeMap<NaiveDate, BTreeSet<String>> = BTreeMap::new();
        for (symbol, path) in self.price_files()? {
            for bar in self.read_file(&symbol, &path)? {
                by_date.entry(bar.date).or_default().insert(bar.symbol);
            }
        }
        Ok(by_date.into_iter().map(|(d, s)| (d, s.len())).collect())
    }

    fn symbols_on(&self, date: NaiveDate) -> Result<Vec<String>, ScoutError> {
        let mut symbols = Vec::new();
        for (symbol, path) in self.price_files()? {
            if self.read_file(&symbol, &path)?.iter().any(|b| b.date == date) {
                symbols.push(symbol);
            }
        }
        Ok(symbols)
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScoutError> {
        Ok(self.price_files()?.into_keys().collect())
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ScoutError> {
        let bars = match self.read_symbol(symbol) {
            Ok(bars) => bars,
            Err(ScoutError::NoData { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date, bars.len())),
            _ => None,
        })
    }
}
