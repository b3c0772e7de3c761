//! Execution ledger port.

use crate::domain::error::ScoutError;
use crate::domain::execution::Execution;

pub trait LedgerPort {
    fn fetch_executions(&self) -> Result<Vec<Execution>, ScoutError>;
}
