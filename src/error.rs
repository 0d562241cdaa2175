use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Invalid month {0}: must be between 1 and 12")]
    InvalidMonth(u32),

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    #[error("Category '{category}' has an invalid range: {details}")]
    InvalidCategoryRange { category: String, details: String },

    #[error("Category '{0}' is defined more than once in the catalog")]
    DuplicateCategory(String),

    #[error("Derived category '{derived}' references unknown category '{reference}'")]
    UnknownReference { derived: String, reference: String },

    #[error("Derived categories contain a dependency cycle: {0}")]
    DerivationCycle(String),

    #[error("Series for category '{0}' is missing")]
    MissingSeries(String),

    #[error("Series for category '{category}' has {found} records, expected {expected}")]
    SeriesLengthMismatch {
        category: String,
        expected: usize,
        found: usize,
    },

    #[error("Page '{0}' does not show generated data")]
    PageWithoutData(String),

    #[error("Unsupported spreadsheet format: {0}")]
    UnsupportedSpreadsheet(String),

    #[error("Spreadsheet error: {0}")]
    SpreadsheetError(String),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
