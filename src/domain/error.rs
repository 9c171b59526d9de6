//! Domain error types.

/// Top-level error type for tradelog.
#[derive(Debug, thiserror::Error)]
pub enum TradelogError {
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

    #[error("CSV parse error: {reason}")]
    CsvParse { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&TradelogError> for std::process::ExitCode {
    fn from(err: &TradelogError) -> Self {
        let code: u8 = match err {
            TradelogError::Io(_) => 1,
            TradelogError::ConfigParse { .. }
            | TradelogError::ConfigMissing { .. }
            | TradelogError::ConfigInvalid { .. } => 2,
            TradelogError::Database { .. } | TradelogError::DatabaseQuery { .. } => 3,
            TradelogError::CsvParse { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
