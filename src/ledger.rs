//! In-memory transaction ledger and its queries.
//!
//! A [`Ledger`] keeps records in insertion order. Queries never modify it;
//! `range` and `group_by` return new ledgers that share the same record
//! allocations.

use crate::error::{LedgerError, Result};
use crate::export::RecordSink;
use crate::money::Money;
use crate::transaction::TransactionRecord;
use chrono::NaiveDate;
use csv::WriterBuilder;
use log::debug;
use std::cmp::Ordering;
use std::fmt;
use std::io::Write;
use std::ops::Index;
use std::sync::Arc;

/// Money split by direction.
///
/// # Invariants
///
/// - `incoming + outgoing == total`
/// - `outgoing <= 0 <= incoming`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    /// Sum of non-negative amounts.
    pub incoming: Money,

    /// Sum of negative amounts.
    pub outgoing: Money,
}

impl Balance {
    /// `incoming + outgoing`. The sides have opposite signs so this never
    /// overflows.
    pub fn net(&self) -> Money {
        self.incoming + self.outgoing
    }
}

impl From<Balance> for (Money, Money) {
    fn from(balance: Balance) -> Self {
        (balance.incoming, balance.outgoing)
    }
}

/// Ordered collection of transaction records.
///
/// Equality and ordering compare records pairwise in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ledger {
    records: Vec<Arc<TransactionRecord>>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Ledger {
            records: Vec::new(),
        }
    }

    /// Creates a ledger holding `records` in the given order.
    pub fn from_records<I: IntoIterator<Item = TransactionRecord>>(records: I) -> Self {
        Ledger {
            records: records.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterates records in insertion order.
    pub fn iter(&self) -> Iter<'_> {
        Iter(self.records.iter())
    }

    pub fn get(&self, index: usize) -> Option<&TransactionRecord> {
        self.records.get(index).map(Arc::as_ref)
    }

    pub fn contains(&self, record: &TransactionRecord) -> bool {
        self.iter().any(|r| r == record)
    }

    /// Adds a record at the end.
    pub fn append(&mut self, record: TransactionRecord) {
        self.records.push(Arc::new(record));
    }

    /// Record with the smallest transfer date. Ties go to the first one
    /// inserted.
    pub fn earliest(&self) -> Option<&TransactionRecord> {
        self.extreme_by(|r| r.transfer_date(), Ordering::Less)
    }

    /// Record with the largest transfer date. Ties go to the first one
    /// inserted.
    pub fn latest(&self) -> Option<&TransactionRecord> {
        self.extreme_by(|r| r.transfer_date(), Ordering::Greater)
    }

    /// Record with the smallest sequence index.
    pub fn earliest_by_index(&self) -> Option<&TransactionRecord> {
        self.extreme_by(|r| r.sequence_index(), Ordering::Less)
    }

    /// Record with the largest sequence index.
    pub fn latest_by_index(&self) -> Option<&TransactionRecord> {
        self.extreme_by(|r| r.sequence_index(), Ordering::Greater)
    }

    /// Transfer date of [`Ledger::earliest`].
    pub fn start(&self) -> Option<NaiveDate> {
        self.earliest().map(|r| r.transfer_date())
    }

    /// Transfer date of [`Ledger::latest`].
    pub fn stop(&self) -> Option<NaiveDate> {
        self.latest().map(|r| r.transfer_date())
    }

    /// Exact sum of all amounts.
    ///
    /// Fails with [`LedgerError::AmountOverflow`] if the sum leaves the range of
    /// an exact decimal.
    pub fn total(&self) -> Result<Money> {
        self.iter()
            .try_fold(Money::ZERO, |acc, r| acc.checked_add(r.amount()))
            .ok_or(LedgerError::AmountOverflow)
    }

    /// Splits the amounts into money received and money spent.
    ///
    /// Fails like [`Ledger::total`] when either side overflows.
    pub fn balance(&self) -> Result<Balance> {
        let mut balance = Balance {
            incoming: Money::ZERO,
            outgoing: Money::ZERO,
        };
        for record in self.iter() {
            let side = if record.amount().is_negative() {
                &mut balance.outgoing
            } else {
                &mut balance.incoming
            };
            *side = side
                .checked_add(record.amount())
                .ok_or(LedgerError::AmountOverflow)?;
        }
        Ok(balance)
    }

    /// Records transferred on `date`.
    pub fn group_by(&self, date: NaiveDate) -> Ledger {
        self.group_by_field(&date, TransactionRecord::transfer_date)
    }

    /// Records whose selected field equals `key`, in original order.
    pub fn group_by_field<K, F>(&self, key: &K, field: F) -> Ledger
    where
        K: PartialEq,
        F: Fn(&TransactionRecord) -> K,
    {
        self.filtered(|r| field(r) == *key)
    }

    /// Records transferred within `[start, stop]`. A missing bound leaves
    /// that side open.
    pub fn range(&self, start: Option<NaiveDate>, stop: Option<NaiveDate>) -> Result<Ledger> {
        self.range_by(start, stop, TransactionRecord::transfer_date)
    }

    /// Records whose selected date lies within `[start, stop]`.
    ///
    /// Fails with [`LedgerError::InvalidRange`] when both bounds are given
    /// and `start > stop`.
    pub fn range_by<F>(
        &self,
        start: Option<NaiveDate>,
        stop: Option<NaiveDate>,
        field: F,
    ) -> Result<Ledger>
    where
        F: Fn(&TransactionRecord) -> NaiveDate,
    {
        if let (Some(start), Some(stop)) = (start, stop) {
            if start > stop {
                return Err(LedgerError::InvalidRange { start, stop });
            }
        }

        Ok(self.filtered(|r| {
            let date = field(r);
            start.map_or(true, |s| date >= s) && stop.map_or(true, |s| date <= s)
        }))
    }

    /// Returns this ledger followed by the records of `other`, renumbered.
    ///
    /// See [`Ledger::merge_in_place`].
    pub fn merge(&self, other: &Ledger) -> Result<Ledger> {
        let mut merged = self.clone();
        merged.merge_in_place(other)?;
        Ok(merged)
    }

    /// Appends the records of `other`.
    ///
    /// `other`'s records are ordered by their own sequence index and given
    /// new indices counting up from one past this ledger's largest index
    /// (from zero when this ledger is empty).
    pub fn merge_in_place(&mut self, other: &Ledger) -> Result<()> {
        let offset = match self.latest_by_index() {
            Some(last) => last
                .sequence_index()
                .checked_add(1)
                .ok_or_else(|| LedgerError::InvalidMerge("sequence index overflow".to_string()))?,
            None => 0,
        };

        let mut appended: Vec<&TransactionRecord> = other.iter().collect();
        appended.sort_by_key(|r| r.sequence_index());

        let renumbered = appended
            .into_iter()
            .enumerate()
            .map(|(position, r)| {
                offset
                    .checked_add(position)
                    .map(|index| Arc::new(r.with_sequence_index(index)))
                    .ok_or_else(|| LedgerError::InvalidMerge("sequence index overflow".to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Merging {} transactions at offset {}",
            renumbered.len(),
            offset
        );
        self.records.extend(renumbered);
        Ok(())
    }

    /// One-line description: count and date span.
    pub fn summary(&self) -> String {
        match (self.start(), self.stop()) {
            (Some(start), Some(stop)) => {
                format!("{} items from {} to {}", self.len(), start, stop)
            }
            _ => format!("{} items", self.len()),
        }
    }

    /// Writes the records as canonical CSV (ISO dates, `.` decimal point) in
    /// insertion order.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = WriterBuilder::new().has_headers(false).from_writer(writer);

        csv_writer.write_record([
            "sequence_index",
            "transfer_date",
            "posted_date",
            "message",
            "amount",
            "running_total",
        ])?;
        for record in self.iter() {
            csv_writer.serialize(record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Offers every record to `sink` in insertion order. Returns how many
    /// were written.
    pub fn export_to<S: RecordSink + ?Sized>(&self, sink: &mut S) -> Result<usize> {
        for record in self.iter() {
            sink.insert(record)?;
        }
        Ok(self.len())
    }

    fn filtered<P: Fn(&TransactionRecord) -> bool>(&self, predicate: P) -> Ledger {
        Ledger {
            records: self
                .records
                .iter()
                .filter(|r| predicate(r))
                .cloned()
                .collect(),
        }
    }

    /// Scans in insertion order, replacing the pick only when a key compares
    /// strictly `wanted`, so ties keep the first record.
    fn extreme_by<K, F>(&self, key: F, wanted: Ordering) -> Option<&TransactionRecord>
    where
        K: Ord,
        F: Fn(&TransactionRecord) -> K,
    {
        self.iter()
            .reduce(|best, r| if key(r).cmp(&key(best)) == wanted { r } else { best })
    }
}

impl fmt::Display for Ledger {
    /// Lists records by transfer date, not insertion order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} transactions", self.len())?;

        let mut by_date: Vec<&TransactionRecord> = self.iter().collect();
        by_date.sort_by_key(|r| r.transfer_date());
        for record in by_date {
            writeln!(f, "{}", record)?;
        }
        Ok(())
    }
}

impl Index<usize> for Ledger {
    type Output = TransactionRecord;

    fn index(&self, index: usize) -> &Self::Output {
        &self.records[index]
    }
}

impl FromIterator<TransactionRecord> for Ledger {
    fn from_iter<I: IntoIterator<Item = TransactionRecord>>(iter: I) -> Self {
        Ledger::from_records(iter)
    }
}

impl Extend<TransactionRecord> for Ledger {
    fn extend<I: IntoIterator<Item = TransactionRecord>>(&mut self, iter: I) {
        self.records.extend(iter.into_iter().map(Arc::new));
    }
}

impl<'a> IntoIterator for &'a Ledger {
    type Item = &'a TransactionRecord;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a ledger's records in insertion order.
#[derive(Debug, Clone)]
pub struct Iter<'a>(std::slice::Iter<'a, Arc<TransactionRecord>>);

impl<'a> Iterator for Iter<'a> {
    type Item = &'a TransactionRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(Arc::as_ref)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl DoubleEndedIterator for Iter<'_> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.0.next_back().map(Arc::as_ref)
    }
}

impl ExactSizeIterator for Iter<'_> {}
