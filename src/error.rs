use thiserror::Error;

#[derive(Error, Debug)]
pub enum HarvestReportError {
    #[error("Required column '{0}' is missing from the timesheet export")]
    MissingColumn(String),

    #[error("Line {line}: column '{column}' is empty")]
    MissingValue { line: u64, column: String },

    #[error("Line {line}: hours value '{value}' is not a number")]
    InvalidHours { line: u64, value: String },

    #[error("Line {line}: hours value {value} is negative")]
    NegativeHours { line: u64, value: f64 },

    #[error("Line {line}: date '{value}' is not a recognised date (expected YYYY-MM-DD)")]
    InvalidDate { line: u64, value: String },

    #[error("Invalid report configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange { start: String, end: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HarvestReportError>;
