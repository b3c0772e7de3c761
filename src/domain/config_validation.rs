//! Configuration loading and validation.
//!
//! Reads every tunable from the config port, falling back to defaults for
//! absent keys, and rejects out-of-range values before any work runs.

use crate::domain::error::ScoutError;
use crate::domain::reconcile::DEFAULT_CLOSE_TOLERANCE;
use crate::domain::scoring::analysis::DEFAULT_TRENDLINE_DAYS;
use crate::domain::scoring::{BasePatternParams, TightBaseParams, WedgeParams};
use crate::domain::universe::MIN_SYMBOLS_PER_DATE;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_HISTORY_DAYS: i64 = 365;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub min_symbols: usize,
    pub common_only: bool,
    pub history_days: i64,
    pub trendline_days: i64,
    pub tight_base: TightBaseParams,
    pub wedge: WedgeParams,
    pub base_pattern: BasePatternParams,
    pub close_tolerance: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_symbols: MIN_SYMBOLS_PER_DATE,
            common_only: false,
            history_days: DEFAULT_HISTORY_DAYS,
            trendline_days: DEFAULT_TRENDLINE_DAYS,
            tight_base: TightBaseParams::default(),
            wedge: WedgeParams::default(),
            base_pattern: BasePatternParams::default(),
            close_tolerance: DEFAULT_CLOSE_TOLERANCE,
        }
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> ScoutError {
    ScoutError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

/// Reads and validates all settings.
pub fn load_settings(config: &dyn ConfigPort) -> Result<Settings, ScoutError> {
    let d = Settings::default();
    let tb = d.tight_base;
    let wedge = d.wedge;

    let tight_base = TightBaseParams {
        max_range_pct: read_fraction(config, "tight_base", "max_range_pct", tb.max_range_pct)?,
        max_pct_from_high: read_fraction(
            config,
            "tight_base",
            "max_pct_from_high",
            tb.max_pct_from_high,
        )?,
        max_avg_move_pct: read_fraction(
            config,
            "tight_base",
            "max_avg_move_pct",
            tb.max_avg_move_pct,
        )?,
        min_volume_ratio: read_non_negative(
            config,
            "tight_base",
            "min_volume_ratio",
            tb.min_volume_ratio,
        )?,
        max_volume_ratio: read_non_negative(
            config,
            "tight_base",
            "max_volume_ratio",
            tb.max_volume_ratio,
        )?,
    };
    validate_volume_band(&tight_base)?;

    let wedge = WedgeParams {
        min_resistance_r2: read_fraction(
            config,
            "wedge",
            "min_resistance_r2",
            wedge.min_resistance_r2,
        )?,
        min_support_r2: read_fraction(config, "wedge", "min_support_r2", wedge.min_support_r2)?,
        pivot_count: read_non_negative_int(config, "wedge", "pivot_count", wedge.pivot_count)?,
        require_positive_support: config.get_bool(
            "wedge",
            "require_positive_support",
            wedge.require_positive_support,
        ),
        require_flat_or_dropping_resistance: config.get_bool(
            "wedge",
            "require_flat_or_dropping_resistance",
            wedge.require_flat_or_dropping_resistance,
        ),
    };

    let base_pattern = BasePatternParams {
        base_days: read_positive_int(
            config,
            "base_pattern",
            "base_days",
            d.base_pattern.base_days as i64,
        )? as usize,
    };
    validate_base_days(&base_pattern)?;

    Ok(Settings {
        min_symbols: read_positive_int(config, "universe", "min_symbols", d.min_symbols as i64)?
            as usize,
        common_only: config.get_bool("universe", "common_only", d.common_only),
        history_days: read_positive_int(config, "screen", "history_days", d.history_days)?,
        trendline_days: read_positive_int(config, "screen", "trendline_days", d.trendline_days)?,
        tight_base,
        wedge,
        base_pattern,
        close_tolerance: read_positive(config, "reconcile", "close_tolerance", d.close_tolerance)?,
    })
}

fn read_positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<i64, ScoutError> {
    let value = config.get_int(section, key, default);
    if value <= 0 {
        return Err(invalid(section, key, "must be a positive integer"));
    }
    Ok(value)
}

fn read_non_negative_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, ScoutError> {
    let value = config.get_int(section, key, default as i64);
    if value < 0 {
        return Err(invalid(section, key, "must be non-negative"));
    }
    Ok(value as usize)
}

fn read_positive(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, ScoutError> {
    let value = config.get_double(section, key, default);
    if !(value > 0.0) || !value.is_finite() {
        return Err(invalid(section, key, "must be positive"));
    }
    Ok(value)
}

fn read_non_negative(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, ScoutError> {
    let value = config.get_double(section, key, default);
    if !(value >= 0.0) || !value.is_finite() {
        return Err(invalid(section, key, "must be non-negative"));
    }
    Ok(value)
}

/// A ratio in [0, 1].
fn read_fraction(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, ScoutError> {
    let value = config.get_double(section, key, default);
    if !(0.0..=1.0).contains(&value) {
        return Err(invalid(section, key, "must be between 0 and 1"));
    }
    Ok(value)
}

fn validate_volume_band(params: &TightBaseParams) -> Result<(), ScoutError> {
    if params.min_volume_ratio > params.max_volume_ratio {
        return Err(invalid(
            "tight_base",
            "min_volume_ratio",
            "min_volume_ratio must not exceed max_volume_ratio",
        ));
    }
    Ok(())
}

fn validate_base_days(params: &BasePatternParams) -> Result<(), ScoutError> {
    // two bars are needed for a slope and a standard deviation
    if params.base_days < 2 {
        return Err(invalid("base_pattern", "base_days", "base_days must be at least 2"));
    }
    Ok(())
}
