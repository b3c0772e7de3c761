//! Pure analytics: indicators, pivots, trend lines, scorers and trade
//! reconciliation.

pub mod bar;
pub mod config_validation;
pub mod error;
pub mod execution;
pub mod fifo;
pub mod indicator;
pub mod pivot;
pub mod reconcile;
pub mod reference;
pub mod scoring;
pub mod trendline;
pub mod universe;
