//! Export of ledger records to external stores.
//!
//! [`RecordSink`] is the narrow interface a store implements. With the
//! `sqlite` feature, [`SqliteSink`] writes records to a SQLite table where
//! money is kept as integer minor units (cents), so values read back are
//! exactly the decimals that were written.

use crate::error::Result;
use crate::transaction::TransactionRecord;

/// Receives records one by one, in ledger order.
pub trait RecordSink {
    fn insert(&mut self, record: &TransactionRecord) -> Result<()>;
}

#[cfg(feature = "sqlite")]
pub use self::sqlite::{date_span, read_ledger, setup_schema, ExportTarget, SqliteSink};

#[cfg(feature = "sqlite")]
mod sqlite {
    use super::RecordSink;
    use crate::error::Result;
    use crate::ledger::Ledger;
    use crate::money::Money;
    use crate::transaction::TransactionRecord;
    use chrono::NaiveDate;
    use log::debug;
    use rusqlite::{params, Connection};
    use std::fmt;
    use std::path::PathBuf;

    /// Where the SQLite database lives.
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub enum ExportTarget {
        #[default]
        Memory,
        File(PathBuf),
    }

    impl ExportTarget {
        fn open(&self) -> Result<Connection> {
            let conn = match self {
                ExportTarget::Memory => Connection::open_in_memory()?,
                ExportTarget::File(path) => Connection::open(path)?,
            };
            Ok(conn)
        }
    }

    impl fmt::Display for ExportTarget {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                ExportTarget::Memory => f.write_str(":memory:"),
                ExportTarget::File(path) => write!(f, "{}", path.display()),
            }
        }
    }

    /// Creates the `transactions` table.
    ///
    /// Dates are ISO-8601 text, so `min`/`max` sort chronologically. Money
    /// columns hold whole cents.
    pub fn setup_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS transactions (
                sequence_index INTEGER PRIMARY KEY,
                transfer_date DATE NOT NULL,
                posted_date DATE NOT NULL,
                message TEXT NOT NULL,
                amount INTEGER NOT NULL,
                running_total INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_transfer_date ON transactions(transfer_date)",
            [],
        )?;

        Ok(())
    }

    /// Inserts records into an existing `transactions` table.
    pub struct SqliteSink<'c> {
        conn: &'c Connection,
    }

    impl<'c> SqliteSink<'c> {
        pub fn new(conn: &'c Connection) -> Self {
            SqliteSink { conn }
        }
    }

    impl RecordSink for SqliteSink<'_> {
        /// Fails with `InexactAmount` if a money field has sub-cent digits.
        fn insert(&mut self, record: &TransactionRecord) -> Result<()> {
            let mut stmt = self.conn.prepare_cached(
                "INSERT INTO transactions (
                    sequence_index, transfer_date, posted_date, message, amount, running_total
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            let index = i64::try_from(record.sequence_index())
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
            stmt.execute(params![
                index,
                record.transfer_date(),
                record.posted_date(),
                record.description(),
                record.amount().to_minor_units()?,
                record.running_total().to_minor_units()?,
            ])?;
            Ok(())
        }
    }

    impl Ledger {
        /// Writes the ledger to a new SQLite database and returns the open
        /// connection.
        ///
        /// All rows are inserted in one transaction; on error nothing is
        /// committed. Sequence indices must be unique.
        pub fn to_sqlite(&self, target: ExportTarget) -> Result<Connection> {
            let mut conn = target.open()?;
            setup_schema(&conn)?;

            let tx = conn.transaction()?;
            let written = self.export_to(&mut SqliteSink::new(&tx))?;
            tx.commit()?;

            debug!("Exported {} transactions to {}", written, target);
            Ok(conn)
        }
    }

    /// Loads the `transactions` table back into a ledger, ordered by
    /// sequence index.
    pub fn read_ledger(conn: &Connection) -> Result<Ledger> {
        let mut stmt = conn.prepare(
            "SELECT sequence_index, transfer_date, posted_date, message, amount, running_total
             FROM transactions
             ORDER BY sequence_index",
        )?;

        let records = stmt
            .query_map([], |row| {
                let index: i64 = row.get(0)?;
                let sequence_index = usize::try_from(index)
                    .map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, index))?;

                Ok(TransactionRecord::new(
                    sequence_index,
                    row.get(1)?,
                    row.get(2)?,
                    row.get::<_, String>(3)?,
                    Money::from_minor_units(row.get(4)?),
                    Money::from_minor_units(row.get(5)?),
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Ledger::from_records(records))
    }

    /// `min(transfer_date)` and `max(transfer_date)` of the table, `None`
    /// when it is empty.
    pub fn date_span(conn: &Connection) -> Result<Option<(NaiveDate, NaiveDate)>> {
        let span: (Option<NaiveDate>, Option<NaiveDate>) = conn.query_row(
            "SELECT min(transfer_date), max(transfer_date) FROM transactions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(match span {
            (Some(first), Some(last)) => Some((first, last)),
            _ => None,
        })
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::error::LedgerError;
        use std::str::FromStr;

        fn date(y: i32, m: u32, d: u32) -> NaiveDate {
            NaiveDate::from_ymd_opt(y, m, d).unwrap()
        }

        fn sample() -> Ledger {
            Ledger::from_records(vec![
                TransactionRecord::new(
                    0,
                    date(2014, 12, 31),
                    date(2014, 12, 31),
                    "Test 1",
                    Money::from_str("-497.78").unwrap(),
                    Money::from_str("5520.09").unwrap(),
                ),
                TransactionRecord::new(
                    1,
                    date(2014, 12, 29),
                    date(2014, 12, 30),
                    "Test 3 --æøåÆØÅ--",
                    Money::from_str("-38500.00").unwrap(),
                    Money::from_str("6017.87").unwrap(),
                ),
            ])
        }

        #[test]
        fn test_round_trip_is_lossless() {
            let ledger = sample();
            let conn = ledger.to_sqlite(ExportTarget::Memory).unwrap();

            let restored = read_ledger(&conn).unwrap();
            assert_eq!(restored, ledger);
            assert_eq!(restored[1].amount().to_string(), "-38500.00");
        }

        #[test]
        fn test_money_stored_as_cents() {
            let conn = sample().to_sqlite(ExportTarget::Memory).unwrap();
            let cents: i64 = conn
                .query_row(
                    "SELECT amount FROM transactions WHERE sequence_index = 1",
                    [],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(cents, -3_850_000);
        }

        #[test]
        fn test_date_span_matches_ledger() {
            let ledger = sample();
            let conn = ledger.to_sqlite(ExportTarget::Memory).unwrap();

            let (first, last) = date_span(&conn).unwrap().unwrap();
            assert_eq!(Some(first), ledger.start());
            assert_eq!(Some(last), ledger.stop());
        }

        #[test]
        fn test_empty_ledger_exports_empty_table() {
            let conn = Ledger::new().to_sqlite(ExportTarget::Memory).unwrap();
            assert!(date_span(&conn).unwrap().is_none());
            assert!(read_ledger(&conn).unwrap().is_empty());
        }

        #[test]
        fn test_sub_cent_amount_aborts_export() {
            let ledger = Ledger::from_records(vec![TransactionRecord::new(
                0,
                date(2015, 1, 1),
                date(2015, 1, 1),
                "fraction",
                Money::from_str("0.125").unwrap(),
                Money::ZERO,
            )]);

            assert!(matches!(
                ledger.to_sqlite(ExportTarget::Memory),
                Err(LedgerError::InexactAmount(_))
            ));
        }

        #[test]
        fn test_file_target() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("ledger.db");

            drop(sample().to_sqlite(ExportTarget::File(path.clone())).unwrap());

            let conn = Connection::open(&path).unwrap();
            assert_eq!(read_ledger(&conn).unwrap().len(), 2);
        }
    }
}
