use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by socksniffer.
#[derive(Error, Debug)]
pub enum SnifferError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A delimited file could not be parsed.
    #[error("Failed to parse CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Canonical columns absent after the column mapping was applied.
    ///
    /// The corpus loader recovers from this one: it is logged and the load
    /// is abandoned without touching the table.
    #[error("Missing columns: {}", .0.join(", "))]
    MissingColumn(Vec<String>),

    /// A timestamp string did not match any recognised format.
    #[error("Invalid timestamp format: {0}")]
    TimestampParse(String),

    /// A timezone identifier is not a recognised IANA name.
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A plot kind string is not one of `hist`, `scatter` or `week`.
    #[error("Invalid \"kind\" chosen: {0}. Must be one of \"hist\", \"scatter\", or \"week\".")]
    InvalidPlotKind(String),

    /// An hour column name is not one of `hour` or `hour_utc`.
    #[error("Invalid hour column: {0}. Must be one of \"hour\" or \"hour_utc\".")]
    InvalidHourField(String),

    /// A grouping column name is not one of `entity`, `source` or `weekday`.
    #[error("Invalid grouping column: {0}")]
    InvalidGroupBy(String),

    /// A custom column mapping could not be parsed from JSON.
    #[error("Failed to parse column mapping: {0}")]
    MappingParse(#[from] serde_json::Error),

    /// A row selector does not cover the table row for row.
    #[error("Row selector has {actual} entries but the table has {expected} rows")]
    MaskLength { expected: usize, actual: usize },

    /// An error originating from the terminal layer.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the socksniffer crates.
pub type Result<T> = std::result::Result<T, SnifferError>;
