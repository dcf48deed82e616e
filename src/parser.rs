//! Statement parsing pipeline.
//!
//! Reads a delimited statement, decodes every row with the selected
//! [`RowDecoder`] and collects the records into a [`Ledger`] in arrival
//! order. The first bad row aborts the parse.

use crate::decoder::{decoder_for, RowDecoder, DEFAULT_FORMAT};
use crate::error::Result;
use crate::ledger::Ledger;
use crate::locale::TextEncoding;
use csv::ReaderBuilder;
use log::{debug, warn};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Parses statements of one format into ledgers.
///
/// # Example
///
/// ```
/// use statement_ledger::StatementParser;
///
/// let data = "Dato\tForklaring\tUt\tInn\n31.12.2014\tKiosk\t12,50\t\n";
/// let ledger = StatementParser::for_format("ssb")
///     .unwrap()
///     .parse_reader(data.as_bytes())
///     .unwrap();
/// assert_eq!(ledger.len(), 1);
/// ```
pub struct StatementParser {
    decoder: Box<dyn RowDecoder>,
}

impl StatementParser {
    /// Creates a parser around an existing decoder.
    pub fn new(decoder: Box<dyn RowDecoder>) -> Self {
        StatementParser { decoder }
    }

    /// Looks up a format by case-insensitive name, using the default
    /// Latin-1 encoding.
    pub fn for_format(name: &str) -> Result<Self> {
        Self::with_options(name, TextEncoding::default())
    }

    /// Looks up a format by name with an explicit text encoding.
    pub fn with_options(name: &str, encoding: TextEncoding) -> Result<Self> {
        Ok(StatementParser::new(decoder_for(name, encoding)?))
    }

    pub fn decoder(&self) -> &dyn RowDecoder {
        self.decoder.as_ref()
    }

    /// Parses an already open stream.
    pub fn parse_reader<R: Read>(&self, reader: R) -> Result<Ledger> {
        let decoder = self.decoder();
        debug!(
            "Parsing {} statement ({})",
            decoder.name(),
            decoder.locale().encoding
        );

        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(decoder.delimiter())
            .quote(decoder.quote())
            .quoting(decoder.quoting())
            .from_reader(reader);

        let mut ledger = Ledger::new();
        for (index, result) in csv_reader.byte_records().enumerate() {
            let row = result?;

            if index < decoder.header_rows() {
                debug!("Row {}: skipping header", index);
                continue;
            }

            match decoder.decode(index, &row) {
                Ok(record) => {
                    debug!("Row {}: {}", index, record);
                    ledger.append(record);
                }
                Err(e) => {
                    warn!("Row {}: {}", index, e);
                    return Err(e);
                }
            }
        }

        debug!("Parsed {} transactions", ledger.len());
        Ok(ledger)
    }

    /// Opens and parses a statement file.
    pub fn parse_path<P: AsRef<Path>>(&self, path: P) -> Result<Ledger> {
        let path = path.as_ref();
        debug!("Opening {}", path.display());
        let file = File::open(path)?;
        self.parse_reader(BufReader::new(file))
    }
}

impl Default for StatementParser {
    fn default() -> Self {
        StatementParser::new(Box::new(crate::decoder::Sparebank1Decoder::default()))
    }
}

/// Parses a statement file in the default format and encoding.
pub fn parse<P: AsRef<Path>>(path: P) -> Result<Ledger> {
    StatementParser::for_format(DEFAULT_FORMAT)?.parse_path(path)
}

/// Parses an open stream in the default format and encoding.
pub fn parse_stream<R: Read>(reader: R) -> Result<Ledger> {
    StatementParser::default().parse_reader(reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use chrono::NaiveDate;
    use std::io::Cursor;

    const SAMPLE: &str = r#""31-12-2014";"31-12-2014";"Test 1";"-497,78";"5.520,09"
"30-12-2014";"31-12-2014";"Test 2";"-100,00";"6.017,87"
"30-12-2014";"31-12-2014";"Test 3";"-145,47";"6.117,87"
"30-12-2014";"30-12-2014";"Test 4";"-457,24";"6.263,34"
"29-12-2014";"29-12-2014";"Test 5";"-108,30";"6.720,58""#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_stream_default_format() {
        let ledger = parse_stream(Cursor::new(SAMPLE)).unwrap();

        assert_eq!(ledger.len(), 5);
        assert_eq!(ledger.earliest().unwrap().transfer_date(), date(2014, 12, 29));
        assert_eq!(ledger.latest().unwrap().transfer_date(), date(2014, 12, 31));
    }

    #[test]
    fn test_rows_keep_stream_positions() {
        let ledger = parse_stream(Cursor::new(SAMPLE)).unwrap();
        let indices: Vec<usize> = ledger.iter().map(|r| r.sequence_index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(ledger[1].description(), "Test 2");
    }

    #[test]
    fn test_crlf_line_endings() {
        let data = "\"31-12-2014\";\"31-12-2014\";\"A\";\"1,00\";\"1,00\"\r\n\
                    \"30-12-2014\";\"31-12-2014\";\"B\";\"2,00\";\"3,00\"\r\n";
        let ledger = parse_stream(Cursor::new(data)).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[1].description(), "B");
    }

    #[test]
    fn test_bad_row_aborts_parse() {
        let data = "\"31-12-2014\";\"31-12-2014\";\"A\";\"1,00\";\"1,00\"\n\
                    \"31-12-2014\";\"31-12-2014\";\"B\";\"oops\";\"1,00\"\n\
                    \"31-12-2014\";\"31-12-2014\";\"C\";\"1,00\";\"1,00\"\n";
        let err = parse_stream(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidAmount { row: 1, .. }));
    }

    #[test]
    fn test_short_row_is_malformed() {
        let data = "\"31-12-2014\";\"31-12-2014\";\"A\"\n";
        assert!(matches!(
            parse_stream(Cursor::new(data)),
            Err(LedgerError::MalformedRow { row: 0, .. })
        ));
    }

    #[test]
    fn test_ssb_skips_header_row() {
        let data = "Dato\tForklaring\tUt\tInn\n\
                    31.12.2014\tKiosk\t100,00\t\n\
                    01.01.2015\tLønn\t\t25000,00\n";
        let parser = StatementParser::with_options("SSB", TextEncoding::Utf8).unwrap();
        let ledger = parser.parse_reader(data.as_bytes()).unwrap();

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].sequence_index(), 1);
        assert_eq!(ledger[1].description(), "Lønn");
        assert_eq!(ledger.total().unwrap().to_string(), "24900.00");
    }

    #[test]
    fn test_ssb_keeps_quotes_in_message() {
        let data = "Dato\tForklaring\tUt\tInn\n\
                    31.12.2014\t\"Narvesen\" kiosk\t1,00\t\n";
        let parser = StatementParser::with_options("ssb", TextEncoding::Utf8).unwrap();
        let ledger = parser.parse_reader(data.as_bytes()).unwrap();

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].description(), "\"Narvesen\" kiosk");
        assert_eq!(ledger[0].amount().to_string(), "-1.00");
    }

    #[test]
    fn test_ssb_header_alone_is_empty() {
        let parser = StatementParser::for_format("ssb").unwrap();
        let ledger = parser.parse_reader("Dato\tForklaring\tUt\tInn\n".as_bytes()).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_unknown_format() {
        assert!(matches!(
            StatementParser::for_format("qif"),
            Err(LedgerError::UnknownFormat { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            parse("definitely/not/here.csv"),
            Err(LedgerError::Io(_))
        ));
    }
}
