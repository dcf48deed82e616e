//! # Statement Ledger
//!
//! Parses localized bank statement exports into an in-memory ledger of
//! transaction records, and answers queries over it.
//!
//! ## Design Principles
//!
//! - **Exact money**: amounts are `rust_decimal` values, never floats
//! - **Format-specific decoding**: one [`RowDecoder`] per bank layout, chosen by name
//! - **Fail fast**: a single malformed row aborts the parse
//! - **Immutable records**: queries return new ledgers sharing the same records
//!
//! ## Example
//!
//! ```
//! use statement_ledger::parse_stream;
//! use std::io::Cursor;
//!
//! let csv = "\"31-12-2014\";\"31-12-2014\";\"Kiosk\";\"-38.500,00\";\"1.500,00\"\n";
//! let ledger = parse_stream(Cursor::new(csv)).unwrap();
//! assert_eq!(ledger.total().unwrap().to_string(), "-38500.00");
//! ```

pub mod decoder;
pub mod error;
pub mod export;
pub mod ledger;
pub mod locale;
pub mod money;
pub mod parser;
pub mod transaction;

pub use decoder::{decoder_for, RowDecoder, Sparebank1Decoder, SsbDecoder, DEFAULT_FORMAT};
pub use error::{LedgerError, Result};
pub use export::RecordSink;
#[cfg(feature = "sqlite")]
pub use export::{read_ledger, ExportTarget, SqliteSink};
pub use ledger::{Balance, Ledger};
pub use locale::{Locale, TextEncoding};
pub use money::Money;
pub use parser::{parse, parse_stream, StatementParser};
pub use transaction::TransactionRecord;
