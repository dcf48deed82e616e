//! Transaction records decoded from statement rows.

use crate::money::Money;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// One line of a bank statement.
///
/// Records are immutable once built: ledger queries share them and merging
/// produces renumbered copies instead of editing them in place.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TransactionRecord {
    sequence_index: usize,
    transfer_date: NaiveDate,
    posted_date: NaiveDate,
    #[serde(rename = "message")]
    description: String,
    amount: Money,
    running_total: Money,
}

impl TransactionRecord {
    /// Creates a record. `running_total` is [`Money::ZERO`] when the source
    /// format does not report one.
    pub fn new(
        sequence_index: usize,
        transfer_date: NaiveDate,
        posted_date: NaiveDate,
        description: impl Into<String>,
        amount: Money,
        running_total: Money,
    ) -> Self {
        TransactionRecord {
            sequence_index,
            transfer_date,
            posted_date,
            description: description.into(),
            amount,
            running_total,
        }
    }

    /// Position of the row in the original input stream.
    pub fn sequence_index(&self) -> usize {
        self.sequence_index
    }

    /// Date the money moved.
    pub fn transfer_date(&self) -> NaiveDate {
        self.transfer_date
    }

    /// Date the bank recorded the transaction.
    pub fn posted_date(&self) -> NaiveDate {
        self.posted_date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Signed amount; negative means money left the account.
    pub fn amount(&self) -> Money {
        self.amount
    }

    /// Balance after this transaction as reported by the bank.
    pub fn running_total(&self) -> Money {
        self.running_total
    }

    /// Returns a copy of this record carrying a different sequence index.
    pub fn with_sequence_index(&self, sequence_index: usize) -> Self {
        TransactionRecord {
            sequence_index,
            ..self.clone()
        }
    }
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {:>9} {:>9} '{}'",
            self.transfer_date, self.posted_date, self.amount, self.running_total, self.description
        )
    }
}
