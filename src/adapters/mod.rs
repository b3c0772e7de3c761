//! Concrete implementations of the ports.

pub mod csv_adapter;
pub mod csv_report_adapter;
pub mod fidelity_csv_adapter;
pub mod file_config_adapter;
pub mod sqlite_adapter;
pub mod tables;
