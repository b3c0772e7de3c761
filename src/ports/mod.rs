//! Port traits for the external collaborators of the analytics core.

pub mod config_port;
pub mod data_port;
pub mod ledger_port;
pub mod report_port;
