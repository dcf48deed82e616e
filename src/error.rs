//! Error types for statement parsing and ledger queries.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur while parsing, querying or exporting a ledger.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Failed to open or read the input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV tokenizing or writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Relational store error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Row has the wrong number of fields or an undecodable cell
    #[error("Malformed row {row}: {message}")]
    MalformedRow { row: usize, message: String },

    /// Date cell does not match the format's pattern
    #[error("Invalid date in row {row}, field `{field}`: {value:?}")]
    InvalidDate {
        row: usize,
        field: &'static str,
        value: String,
    },

    /// Money cell is not a decimal literal once separators are normalized
    #[error("Invalid amount in row {row}, field `{field}`: {value:?}")]
    InvalidAmount {
        row: usize,
        field: &'static str,
        value: String,
    },

    /// Range query with start after stop
    #[error("Invalid range: start {start} is after stop {stop}")]
    InvalidRange { start: NaiveDate, stop: NaiveDate },

    /// Ledgers cannot be combined
    #[error("Invalid merge: {0}")]
    InvalidMerge(String),

    /// No decoder registered under this name
    #[error("Unknown statement format `{name}` (known formats: {known})")]
    UnknownFormat { name: String, known: String },

    /// No text encoding registered under this name
    #[error("Unknown text encoding `{0}`")]
    UnknownEncoding(String),

    /// Amount cannot be stored as whole minor units without rounding
    #[error("Amount {0} has sub-cent digits and cannot be stored exactly")]
    InexactAmount(rust_decimal::Decimal),

    /// Sum of amounts is too large for an exact decimal
    #[error("Sum of amounts overflows the decimal range")]
    AmountOverflow,

    /// Missing input file argument
    #[error("Missing input file argument. Usage: statement-ledger <statement.csv> [--format NAME] [--encoding NAME] [--csv]")]
    MissingArgument,

    /// Unrecognized or incomplete command-line option
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
