//! Statement Ledger CLI
//!
//! Parses a bank statement export and prints its transactions.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- statement.csv
//! cargo run -- statement.txt --format ssb --encoding utf-8 --csv > ledger.csv
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Set to `debug` or `warn` to control logging verbosity

use statement_ledger::{LedgerError, Result, StatementParser, TextEncoding, DEFAULT_FORMAT};
use std::env;
use std::io::{self, Write};
use std::process;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Parsed command line.
struct Options {
    input: String,
    format: String,
    encoding: TextEncoding,
    csv: bool,
}

fn parse_args<I: Iterator<Item = String>>(mut args: I) -> Result<Options> {
    let mut input = None;
    let mut format = DEFAULT_FORMAT.to_string();
    let mut encoding = TextEncoding::default();
    let mut csv = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--format" | "-f" => {
                format = args.next().ok_or_else(|| {
                    LedgerError::InvalidArgument("--format needs a value".to_string())
                })?;
            }
            "--encoding" | "-e" => {
                let name = args.next().ok_or_else(|| {
                    LedgerError::InvalidArgument("--encoding needs a value".to_string())
                })?;
                encoding = TextEncoding::from_name(&name)?;
            }
            "--csv" => csv = true,
            flag if flag.starts_with('-') => {
                return Err(LedgerError::InvalidArgument(format!("unknown option `{}`", flag)));
            }
            _ if input.is_none() => input = Some(arg),
            _ => {
                return Err(LedgerError::InvalidArgument(format!("unexpected argument `{}`", arg)));
            }
        }
    }

    Ok(Options {
        input: input.ok_or(LedgerError::MissingArgument)?,
        format,
        encoding,
        csv,
    })
}

fn run() -> Result<()> {
    let options = parse_args(env::args().skip(1))?;

    let parser = StatementParser::with_options(&options.format, options.encoding)?;
    let ledger = parser.parse_path(&options.input)?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if options.csv {
        ledger.write_csv(&mut handle)?;
    } else {
        writeln!(handle, "{}", ledger.summary())?;
        write!(handle, "{}", ledger)?;

        let balance = ledger.balance()?;
        writeln!(
            handle,
            "in {} out {} total {}",
            balance.incoming,
            balance.outgoing,
            balance.net()
        )?;
    }
    handle.flush()?;

    Ok(())
}
