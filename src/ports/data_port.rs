//! Price store and reference data port.

use crate::domain::bar::Bar;
use crate::domain::error::ScoutError;
use crate::domain::reference::SymbolProfile;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

pub trait DataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, ScoutError>;

    /// Every symbol's bars between the two dates, in no particular order.
    fn fetch_all_bars(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, ScoutError>;

    /// Distinct symbols reporting per date.
    fn date_coverage(&self) -> Result<BTreeMap<NaiveDate, usize>, ScoutError>;

    fn symbols_on(&self, date: NaiveDate) -> Result<Vec<String>, ScoutError>;

    fn list_symbols(&self) -> Result<Vec<String>, ScoutError>;

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ScoutError>;

    /// Default implementation: the store carries no reference data.
    fn fetch_profiles(
        &self,
        _symbols: &[String],
    ) -> Result<HashMap<String, SymbolProfile>, ScoutError> {
        Ok(HashMap::new())
    }
}
