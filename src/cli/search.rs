use std::io::Write;

use colored::Colorize;

use crate::cli::{wprintln, write_json};
use crate::innodb::search::{search, SearchOutcome};
use crate::innodb::tablespace::Tablespace;
use crate::util::hex::format_hex16;
use crate::IbdError;

/// Options for the `innoisp search` subcommand.
pub struct SearchOptions {
    /// Path to the InnoDB tablespace file (.ibd).
    pub file: String,
    /// Primary key to look up.
    pub key: u64,
    /// Primary key size in bytes (1, 2, 4, or 8).
    pub pksize: usize,
    /// Output in JSON format.
    pub json: bool,
}

/// Look up a primary key in the clustered index and print the outcome.
///
/// A missing key is a normal result (exit code 0); only I/O, decode, and
/// structural-precondition failures propagate as errors.
pub fn execute(opts: &SearchOptions, writer: &mut dyn Write) -> Result<(), IbdError> {
    let mut ts = Tablespace::open(&opts.file)?;
    let report = search(&mut ts, opts.key, opts.pksize)?;

    if opts.json {
        return write_json(writer, &report);
    }

    match &report.outcome {
        SearchOutcome::Found {
            page_no,
            record_header_offset,
            record_data_offset,
        } => {
            wprintln!(
                writer,
                "key {} {} on page {}: record header {}, data origin {}",
                opts.key,
                "found".green(),
                page_no,
                format_hex16(*record_header_offset),
                format_hex16(*record_data_offset)
            )?;
        }
        SearchOutcome::NotFound => {
            wprintln!(writer, "key {} {}", opts.key, "not found".yellow())?;
        }
    }

    let stats = &report.stats;
    wprintln!(
        writer,
        "pages searched {} (index pages {}), probes {}, elapsed {} ms",
        stats.pages_searched,
        stats.index_pages_searched,
        stats.probes,
        stats.elapsed_ms
    )?;
    Ok(())
}
