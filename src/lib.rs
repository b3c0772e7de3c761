//! trailscout: end-of-day stock screening and trade reconciliation.
//!
//! Hexagonal architecture: analytics in [`domain`], port traits in [`ports`],
//! concrete storage, import and report implementations in [`adapters`], and
//! the command surface in [`cli`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
