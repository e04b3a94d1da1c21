//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for pricenorm.
#[derive(Debug, thiserror::Error)]
pub enum PricenormError {
    #[error("input series is empty")]
    EmptyInput,

    #[error("required field '{field}' is missing")]
    MissingField { field: String },

    #[error("dates must be strictly increasing: {date} at row {index} follows {previous}")]
    UnorderedDates {
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },

    #[error("no business days between {start} and {end}")]
    NoBusinessDays { start: NaiveDate, end: NaiveDate },

    #[error("log transform undefined for close {value} on {date}")]
    NumericDomain { date: NaiveDate, value: f64 },

    #[error("CSV error in {file} at line {line}: {reason}")]
    CsvParse {
        file: String,
        line: u64,
        reason: String,
    },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PricenormError> for std::process::ExitCode {
    fn from(err: &PricenormError) -> Self {
        let code: u8 = match err {
            PricenormError::Io(_) => 1,
            PricenormError::ConfigParse { .. }
            | PricenormError::ConfigMissing { .. }
            | PricenormError::ConfigInvalid { .. } => 2,
            PricenormError::EmptyInput
            | PricenormError::MissingField { .. }
            | PricenormError::UnorderedDates { .. }
            | PricenormError::NoBusinessDays { .. }
            | PricenormError::CsvParse { .. } => 3,
            PricenormError::NumericDomain { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}
