//! Domain error types.

/// Top-level error type for trailscout.
#[derive(Debug, thiserror::Error)]
pub enum ScoutError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("failed to import {file}: {reason}")]
    Import { file: String, reason: String },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScoutError {
    pub(crate) fn database(e: impl std::fmt::Display) -> Self {
        ScoutError::Database {
            reason: e.to_string(),
        }
    }

    pub(crate) fn query(e: impl std::fmt::Display) -> Self {
        ScoutError::DatabaseQuery {
            reason: e.to_string(),
        }
    }

    pub fn exit_status(&self) -> u8 {
        match self {
            ScoutError::Io(_) => 1,
            ScoutError::ConfigParse { .. }
            | ScoutError::ConfigMissing { .. }
            | ScoutError::ConfigInvalid { .. } => 2,
            ScoutError::Database { .. } | ScoutError::DatabaseQuery { .. } => 3,
            ScoutError::Import { .. } => 4,
            ScoutError::NoData { .. } => 5,
        }
    }
}

impl From<&ScoutError> for std::process::ExitCode {
    fn from(err: &ScoutError) -> Self {
        std::process::ExitCode::from(err.exit_status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_config_invalid() {
        let err = ScoutError::ConfigInvalid {
            section: "tight_base".into(),
            key: "max_range_pct".into(),
            reason: "must be positive".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid config value [tight_base] max_range_pct: must be positive"
        );
    }

    #[test]
    fn exit_codes_by_family() {
        let cfg = ScoutError::ConfigMissing {
            section: "sqlite".into(),
            key: "path".into(),
        };
        assert_eq!(cfg.exit_status(), 2);
        let db = ScoutError::database("locked");
        assert_eq!(db.exit_status(), 3);
        let import = ScoutError::Import {
            file: "a.csv".into(),
            reason: "bad header".into(),
        };
        assert_eq!(import.exit_status(), 4);
    }
}
