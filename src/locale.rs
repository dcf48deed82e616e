//! Locale-specific field parsing: dates, money and text encodings.

use crate::error::{LedgerError, Result};
use crate::money::Money;
use chrono::NaiveDate;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Byte encoding of the statement file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// ISO-8859-1. Every byte maps to the code point of the same value.
    #[default]
    Latin1,
    Utf8,
}

impl TextEncoding {
    /// Looks up an encoding by case-insensitive name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" => Ok(TextEncoding::Latin1),
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            _ => Err(LedgerError::UnknownEncoding(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Latin1 => "iso-8859-1",
            TextEncoding::Utf8 => "utf-8",
        }
    }

    /// Decodes raw cell bytes. Returns `None` if the bytes are not valid in
    /// this encoding (only possible for UTF-8).
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            TextEncoding::Latin1 if bytes.is_ascii() => {
                std::str::from_utf8(bytes).ok().map(Cow::Borrowed)
            }
            TextEncoding::Latin1 => {
                Some(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()))
            }
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        TextEncoding::from_name(s)
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How one bank writes dates, amounts and text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    /// chrono pattern, day-month-year order
    pub date_format: &'static str,
    pub thousands_separator: Option<char>,
    pub decimal_separator: char,
    pub encoding: TextEncoding,
}

impl Locale {
    /// `31-12-2014`, `-38.500,00`
    pub const DASHED: Locale = Locale {
        date_format: "%d-%m-%Y",
        thousands_separator: Some('.'),
        decimal_separator: ',',
        encoding: TextEncoding::Latin1,
    };

    /// `31.12.2014`, `38500,00`
    pub const DOTTED: Locale = Locale {
        date_format: "%d.%m.%Y",
        thousands_separator: None,
        decimal_separator: ',',
        encoding: TextEncoding::Latin1,
    };

    pub fn with_encoding(self, encoding: TextEncoding) -> Self {
        Locale { encoding, ..self }
    }

    /// Parses a calendar date against `date_format`.
    pub fn date(&self, s: &str) -> std::result::Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(s.trim(), self.date_format)
    }

    /// Parses a localized money amount.
    ///
    /// Thousands separators are dropped, then the decimal separator becomes
    /// `.` and the result is read as an exact decimal.
    pub fn money(&self, s: &str) -> std::result::Result<Money, rust_decimal::Error> {
        let mut cleaned: String = match self.thousands_separator {
            Some(sep) => s.trim().chars().filter(|&c| c != sep).collect(),
            None => s.trim().to_string(),
        };
        if self.decimal_separator != '.' {
            cleaned = cleaned.replace(self.decimal_separator, ".");
        }
        Money::from_str(&cleaned)
    }

    /// Decodes a text cell from the source encoding.
    pub fn text<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        self.encoding.decode(bytes)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::DASHED
    }
}
