use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Spreadsheet read failed: {0}")]
    SpreadsheetRead(#[from] calamine::Error),

    #[error("Spreadsheet write failed: {0}")]
    SpreadsheetWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported table format: {0}")]
    UnsupportedFormat(String),

    #[error("Table '{0}' has no header row")]
    EmptyTable(String),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Cannot sample {requested} {class} rows, only {available} available")]
    InsufficientRows {
        class: String,
        requested: usize,
        available: usize,
    },

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

pub type Result<T> = std::result::Result<T, CleanerError>;
