//! Row decoders for the supported statement layouts.
//!
//! Each decoder turns one raw CSV row into a [`TransactionRecord`] and
//! describes how its stream is tokenized (delimiter, quoting, header rows).
//! Decoders are looked up by case-insensitive name with [`decoder_for`].

use crate::error::{LedgerError, Result};
use crate::locale::{Locale, TextEncoding};
use crate::money::Money;
use crate::transaction::TransactionRecord;
use chrono::NaiveDate;
use csv::ByteRecord;
use std::borrow::Cow;

/// Decodes rows of one statement format.
pub trait RowDecoder: Send + Sync {
    /// Canonical format name.
    fn name(&self) -> &'static str;

    /// Cell delimiter byte.
    fn delimiter(&self) -> u8;

    /// Quote byte.
    fn quote(&self) -> u8 {
        b'"'
    }

    /// Whether the quote byte delimits fields. When `false` quotes are
    /// ordinary cell text.
    fn quoting(&self) -> bool {
        true
    }

    /// Number of leading rows that are headers and never decoded.
    fn header_rows(&self) -> usize {
        0
    }

    /// Field conventions used by this format.
    fn locale(&self) -> &Locale;

    /// Decodes the row found at zero-based position `index` of the stream.
    fn decode(&self, index: usize, row: &ByteRecord) -> Result<TransactionRecord>;
}

/// Typed access to the cells of one row, attaching the row position and
/// field name to every failure.
struct Cells<'a> {
    index: usize,
    row: &'a ByteRecord,
    locale: &'a Locale,
}

impl<'a> Cells<'a> {
    fn new(index: usize, row: &'a ByteRecord, locale: &'a Locale, arity: usize) -> Result<Self> {
        if row.len() != arity {
            return Err(LedgerError::MalformedRow {
                row: index,
                message: format!("expected {} fields, found {}", arity, row.len()),
            });
        }
        Ok(Cells { index, row, locale })
    }

    fn text(&self, position: usize, field: &'static str) -> Result<Cow<'a, str>> {
        let bytes = self.row.get(position).unwrap_or_default();
        self.locale
            .text(bytes)
            .ok_or_else(|| LedgerError::MalformedRow {
                row: self.index,
                message: format!("field `{}` is not valid {}", field, self.locale.encoding),
            })
    }

    fn date(&self, position: usize, field: &'static str) -> Result<NaiveDate> {
        let value = self.text(position, field)?;
        self.locale
            .date(&value)
            .map_err(|_| LedgerError::InvalidDate {
                row: self.index,
                field,
                value: value.into_owned(),
            })
    }

    fn money(&self, position: usize, field: &'static str) -> Result<Money> {
        let value = self.text(position, field)?;
        self.locale
            .money(&value)
            .map_err(|_| LedgerError::InvalidAmount {
                row: self.index,
                field,
                value: value.into_owned(),
            })
    }
}

/// Semicolon-separated export with five quoted fields:
/// `transfer date; posted date; message; amount; running total`.
///
/// ```text
/// "31-12-2014";"31-12-2014";"Test 1";"-497,78";"5.520,09"
/// ```
#[derive(Debug, Clone)]
pub struct Sparebank1Decoder {
    locale: Locale,
}

impl Sparebank1Decoder {
    pub const NAME: &'static str = "sparebank1";
    const ARITY: usize = 5;

    pub fn new(encoding: TextEncoding) -> Self {
        Sparebank1Decoder {
            locale: Locale::DASHED.with_encoding(encoding),
        }
    }
}

impl Default for Sparebank1Decoder {
    fn default() -> Self {
        Self::new(TextEncoding::default())
    }
}

impl RowDecoder for Sparebank1Decoder {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn delimiter(&self) -> u8 {
        b';'
    }

    fn locale(&self) -> &Locale {
        &self.locale
    }

    fn decode(&self, index: usize, row: &ByteRecord) -> Result<TransactionRecord> {
        let cells = Cells::new(index, row, &self.locale, Self::ARITY)?;

        Ok(TransactionRecord::new(
            index,
            cells.date(0, "transfer_date")?,
            cells.date(1, "posted_date")?,
            cells.text(2, "message")?,
            cells.money(3, "amount")?,
            cells.money(4, "running_total")?,
        ))
    }
}

/// Tab-separated export with a header row and four fields:
/// `date, message, withdrawn, deposited`.
///
/// Exactly one of the money columns is filled per row. Withdrawals become
/// negative amounts. The format has no running total.
#[derive(Debug, Clone)]
pub struct SsbDecoder {
    locale: Locale,
}

impl SsbDecoder {
    pub const NAME: &'static str = "ssb";
    const ARITY: usize = 4;

    pub fn new(encoding: TextEncoding) -> Self {
        SsbDecoder {
            locale: Locale::DOTTED.with_encoding(encoding),
        }
    }
}

impl Default for SsbDecoder {
    fn default() -> Self {
        Self::new(TextEncoding::default())
    }
}

impl RowDecoder for SsbDecoder {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn delimiter(&self) -> u8 {
        b'\t'
    }

    fn quoting(&self) -> bool {
        false
    }

    fn header_rows(&self) -> usize {
        1
    }

    fn locale(&self) -> &Locale {
        &self.locale
    }

    fn decode(&self, index: usize, row: &ByteRecord) -> Result<TransactionRecord> {
        let cells = Cells::new(index, row, &self.locale, Self::ARITY)?;

        let date = cells.date(0, "date")?;
        let withdrawn = cells.text(2, "withdrawn")?;
        let deposited = cells.text(3, "deposited")?;

        let amount = match (withdrawn.trim().is_empty(), deposited.trim().is_empty()) {
            (false, true) => -cells.money(2, "withdrawn")?,
            (true, false) => cells.money(3, "deposited")?,
            (true, true) => {
                return Err(LedgerError::MalformedRow {
                    row: index,
                    message: "neither withdrawn nor deposited is set".to_string(),
                })
            }
            (false, false) => {
                return Err(LedgerError::MalformedRow {
                    row: index,
                    message: "both withdrawn and deposited are set".to_string(),
                })
            }
        };

        Ok(TransactionRecord::new(
            index,
            date,
            date,
            cells.text(1, "message")?,
            amount,
            Money::ZERO,
        ))
    }
}

type DecoderFactory = fn(TextEncoding) -> Box<dyn RowDecoder>;

fn sparebank1(encoding: TextEncoding) -> Box<dyn RowDecoder> {
    Box::new(Sparebank1Decoder::new(encoding))
}

fn ssb(encoding: TextEncoding) -> Box<dyn RowDecoder> {
    Box::new(SsbDecoder::new(encoding))
}

/// Registered formats, keyed by lowercase name. Aliases share a factory.
const FORMATS: &[(&str, DecoderFactory)] = &[
    (Sparebank1Decoder::NAME, sparebank1),
    ("a", sparebank1),
    ("default", sparebank1),
    (SsbDecoder::NAME, ssb),
    ("b", ssb),
];

/// Name of the format used when none is given.
pub const DEFAULT_FORMAT: &str = Sparebank1Decoder::NAME;

/// Looks up a decoder by case-insensitive format name.
pub fn decoder_for(name: &str, encoding: TextEncoding) -> Result<Box<dyn RowDecoder>> {
    let key = name.trim().to_lowercase();
    FORMATS
        .iter()
        .find(|(format, _)| *format == key)
        .map(|(_, factory)| factory(encoding))
        .ok_or_else(|| LedgerError::UnknownFormat {
            name: name.to_string(),
            known: format_names().collect::<Vec<_>>().join(", "),
        })
}

/// All registered format names, aliases included.
pub fn format_names() -> impl Iterator<Item = &'static str> {
    FORMATS.iter().map(|(name, _)| *name)
}
