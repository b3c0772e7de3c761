//! SQLite price store, reference data and trade ledger.

use crate::domain::bar::Bar;
use crate::domain::error::ScoutError;
use crate::domain::execution::{Action, Execution, ImportedExecution};
use crate::domain::reference::SymbolProfile;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::ledger_port::LedgerPort;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

const DATE_FORMAT: &str = "%Y-%m-%d";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS fundamentals (
        company_id TEXT PRIMARY KEY,
        company_name TEXT,
        sector TEXT,
        industry TEXT,
        country TEXT
    );
    CREATE TABLE IF NOT EXISTS symbols (
        symbol TEXT PRIMARY KEY,
        company_id TEXT REFERENCES fundamentals(company_id),
        exchange TEXT,
        quote_type TEXT,
        market_cap INTEGER,
        delisted_date TEXT
    );
    CREATE TABLE IF NOT EXISTS eod_prices (
        symbol TEXT NOT NULL,
        date TEXT NOT NULL,
        open REAL NOT NULL,
        high REAL NOT NULL,
        low REAL NOT NULL,
        close REAL NOT NULL,
        volume INTEGER NOT NULL,
        PRIMARY KEY (symbol, date)
    );
    CREATE TABLE IF NOT EXISTS trades (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        account TEXT,
        account_number TEXT NOT NULL,
        symbol TEXT NOT NULL,
        action TEXT NOT NULL,
        trade_date TEXT NOT NULL,
        settlement_date TEXT,
        quantity REAL NOT NULL,
        price REAL NOT NULL,
        total_cost REAL,
        commission REAL NOT NULL DEFAULT 0,
        fees REAL NOT NULL DEFAULT 0,
        source TEXT,
        UNIQUE (symbol, action, trade_date, quantity, price, account_number)
    );
    CREATE INDEX IF NOT EXISTS idx_eod_prices_date ON eod_prices(date);
    CREATE INDEX IF NOT EXISTS idx_symbols_company_id ON symbols(company_id);";

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(text: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(
            text.len(),
            rusqlite::types::Type::Text,
            Box::new(e),
        )
    })
}

fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> Result<Vec<T>, ScoutError> {
    rows.collect::<rusqlite::Result<Vec<T>>>()
        .map_err(ScoutError::query)
}

fn bar_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Bar> {
    let date: String = row.get(1)?;
    Ok(Bar {
        symbol: row.get(0)?,
        date: parse_date(&date)?,
        open: row.get(2)?,
        high: row.get(3)?,
        low: row.get(4)?,
        close: row.get(5)?,
        volume: row.get(6)?,
    })
}

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

impl SqliteAdapter {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, ScoutError> {
        let db_path =
            config
                .get_string("sqlite", "path")
                .ok_or_else(|| ScoutError::ConfigMissing {
                    section: "sqlite".into(),
                    key: "path".into(),
                })?;

        let pool_size = config.get_int("sqlite", "pool_size", 4).max(1) as u32;

        let manager = SqliteConnectionManager::file(&db_path);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(ScoutError::database)?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    pub fn in_memory() -> Result<Self, ScoutError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(ScoutError::database)?;

        let adapter = Self { pool };
        adapter.initialize_schema()?;
        Ok(adapter)
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, ScoutError> {
        self.pool.get().map_err(ScoutError::database)
    }

    pub fn initialize_schema(&self) -> Result<(), ScoutError> {
        self.conn()?
            .execute_batch(SCHEMA)
            .map_err(ScoutError::query)
    }

    pub fn insert_bars(&self, bars: &[Bar]) -> Result<(), ScoutError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(ScoutError::query)?;

        for bar in bars {
            tx.execute(
                "INSERT OR REPLACE INTO eod_prices (symbol, date, open, high, low, close, volume)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    bar.symbol,
                    format_date(bar.date),
                    bar.open,
                    bar.high,
                    bar.low,
                    bar.close,
                    bar.volume
                ],
            )
            .map_err(ScoutError::query)?;
        }

        tx.commit().map_err(ScoutError::query)?;
        debug!(bars = bars.len(), "stored bars");
        Ok(())
    }

    /// Stores listing and company details. Each symbol is its own company.
    pub fn insert_profiles(&self, profiles: &[SymbolProfile]) -> Result<(), ScoutError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(ScoutError::query)?;

        for p in profiles {
            tx.execute(
                "INSERT OR REPLACE INTO fundamentals (company_id, company_name, sector, industry, country)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![p.symbol, p.company_name, p.sector, p.industry, p.country],
            )
            .map_err(ScoutError::query)?;
            tx.execute(
                "INSERT OR REPLACE INTO symbols
                    (symbol, company_id, exchange, quote_type, market_cap, delisted_date)
                 VALUES (?1, ?1, ?2, ?3, ?4, ?5)",
                params![
                    p.symbol,
                    p.exchange,
                    p.quote_type,
                    p.market_cap,
                    p.delisted_date.map(format_date)
                ],
            )
            .map_err(ScoutError::query)?;
        }

        tx.commit().map_err(ScoutError::query)
    }

    /// Returns (inserted, skipped); rows already in the ledger are skipped.
    pub fn insert_executions(
        &self,
        executions: &[ImportedExecution],
    ) -> Result<(usize, usize), ScoutError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(ScoutError::query)?;

        let mut inserted = 0;
        for imported in executions {
            let e = &imported.execution;
            let changed = tx
                .execute(
                    "INSERT OR IGNORE INTO trades
                        (account, account_number, symbol, action, trade_date, settlement_date,
                         quantity, price, total_cost, commission, fees, source)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    params![
                        imported.account_name,
                        e.account,
                        e.symbol,
                        e.action.to_string(),
                        format_date(e.trade_date),
                        imported.settlement_date.map(format_date),
                        e.quantity,
                        e.price,
                        imported.amount,
                        imported.commission,
                        imported.fees,
                        imported.source
                    ],
                )
                .map_err(ScoutError::query)?;
            inserted += changed;
        }

        tx.commit().map_err(ScoutError::query)?;
        Ok((inserted, executions.len() - inserted))
    }
}

impl DataPort for SqliteAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, ScoutError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT symbol, date, open, high, low, close, volume
                 FROM eod_prices
                 WHERE symbol = ?1 AND date >= ?2 AND date <= ?3
                 ORDER BY date ASC",
            )
            .map_err(ScoutError::query)?;

        let rows = stmt
            .query_map(
                params![symbol, format_date(start_date), format_date(end_date)],
                bar_from_row,
            )
            .map_err(ScoutError::query)?;
        collect_rows(rows)
    }

    fn fetch_all_bars(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<Bar>, ScoutError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT symbol, date, open, high, low, close, volume
                 FROM eod_prices
                 WHERE date >= ?1 AND date <= ?2",
            )
            .map_err(ScoutError::query)?;

        let rows = stmt
            .query_map(
                params![format_date(start_date), format_date(end_date)],
                bar_from_row,
            )
            .map_err(ScoutError::query)?;
        collect_rows(rows)
    }

    fn date_coverage(&self) -> Result<BTreeMap<NaiveDate, usize>, ScoutError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT date, COUNT(DISTINCT symbol) FROM eod_prices GROUP BY date")
            .map_err(ScoutError::query)?;

        let rows = stmt
            .query_map([], |row| {
                let date: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((parse_date(&date)?, count as usize))
            })
            .map_err(ScoutError::query)?;
        Ok(collect_rows(rows)?.into_iter().collect())
    }

    fn symbols_on(&self, date: NaiveDate) -> Result<Vec<String>, ScoutError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT symbol FROM eod_prices WHERE date = ?1 ORDER BY symbol")
            .map_err(ScoutError::query)?;

        let rows = stmt
            .query_map(params![format_date(date)], |row| row.get(0))
            .map_err(ScoutError::query)?;
        collect_rows(rows)
    }

    fn list_symbols(&self) -> Result<Vec<String>, ScoutError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare("SELECT DISTINCT symbol FROM eod_prices ORDER BY symbol")
            .map_err(ScoutError::query)?;

        let rows = stmt
            .query_map([], |row| row.get(0))
            .map_err(ScoutError::query)?;
        collect_rows(rows)
    }

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, ScoutError> {
        let conn = self.conn()?;

        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(date), MAX(date), COUNT(*) FROM eod_prices WHERE symbol = ?1",
                params![symbol],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(ScoutError::query)?;

        match result {
            (Some(min), Some(max), count) if count > 0 => Ok(Some((
                parse_date(&min).map_err(ScoutError::query)?,
                parse_date(&max).map_err(ScoutError::query)?,
                count as usize,
            ))),
            _ => Ok(None),
        }
    }

    fn fetch_profiles(
        &self,
        symbols: &[String],
    ) -> Result<HashMap<String, SymbolProfile>, ScoutError> {
        let wanted: HashSet<&str> = symbols.iter().map(String::as_str).collect();
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT s.symbol, f.company_name, f.sector, f.industry, f.country,
                        s.exchange, s.market_cap, s.quote_type, s.delisted_date
                 FROM symbols s
                 LEFT JOIN fundamentals f ON s.company_id = f.company_id",
            )
            .map_err(ScoutError::query)?;

        let rows = stmt
            .query_map([], |row| {
                let delisted: Option<String> = row.get(8)?;
                Ok(SymbolProfile {
                    symbol: row.get(0)?,
                    company_name: row.get(1)?,
                    sector: row.get(2)?,
                    industry: row.get(3)?,
                    country: row.get(4)?,
                    exchange: row.get(5)?,
                    market_cap: row.get(6)?,
                    quote_type: row.get(7)?,
                    delisted_date: delisted.as_deref().map(parse_date).transpose()?,
                })
            })
            .map_err(ScoutError::query)?;

        Ok(collect_rows(rows)?
            .into_iter()
            .filter(|p| wanted.contains(p.symbol.as_str()))
            .map(|p| (p.symbol.clone(), p))
            .collect())
    }
}

impl LedgerPort for SqliteAdapter {
    fn fetch_executions(&self) -> Result<Vec<Execution>, ScoutError> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT symbol, account_number, action, quantity, price, trade_date
                 FROM trades
                 ORDER BY symbol, account_number, trade_date, id",
            )
            .map_err(ScoutError::query)?;

        let rows = stmt
            .query_map([], |row| {
                let action: String = row.get(2)?;
                let trade_date: String = row.get(5)?;
                Ok(Execution {
                    symbol: row.get(0)?,
                    account: row.get(1)?,
                    action: action.parse::<Action>().map_err(|e| {
                        rusqlite::Error::FromSqlConversionFailure(
                            2,
                            rusqlite::types::Type::Text,
                            Box::new(e),
                        )
                    })?,
                    quantity: row.get(3)?,
                    price: row.get(4)?,
                    trade_date: parse_date(&trade_date)?,
                })
            })
            .map_err(ScoutError::query)?;
        collect_rows(rows)
    }
}
