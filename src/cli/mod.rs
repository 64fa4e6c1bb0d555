//! CLI subcommand implementations for the `innoisp` binary.
//!
//! Argument parsing uses clap derive macros with the top-level [`app::Cli`]
//! struct and [`app::Commands`] enum. Each subcommand module follows the
//! same pattern: an `Options` struct holding the parsed arguments and a
//! `pub fn execute(opts, writer) -> Result<(), IbdError>` entry point. The
//! `writer: &mut dyn Write` parameter allows output to be captured in tests
//! or redirected to a file via the global `--output` flag.
//!
//! # Subcommands
//!
//! | Command | Module | Purpose |
//! |---------|--------|---------|
//! | `innoisp overview` | [`overview`] | Per-page summary of the whole file |
//! | `innoisp dslots` | [`dslots`] | Directory slots and record runs of index pages |
//! | `innoisp space` | [`space`] | FSP header and extent descriptor tables |
//! | `innoisp inode` | [`inode`] | File segment inode tables |
//! | `innoisp search` | [`search`] | B+Tree primary-key lookup with statistics |
//!
//! Every subcommand supports `--json` for machine-readable output via
//! `serde_json`, and the global `--color <auto|always|never>` and
//! `--output <file>` flags. Exit code is 0 on success and when a searched
//! key is not found; decode and I/O failures exit non-zero.

pub mod app;
pub mod dslots;
pub mod inode;
pub mod overview;
pub mod search;
pub mod space;

/// Write a line to the given writer, converting io::Error to IbdError.
macro_rules! wprintln {
    ($w:expr) => {
        writeln!($w).map_err(|e| $crate::IbdError::Io(e.to_string()))
    };
    ($w:expr, $($arg:tt)*) => {
        writeln!($w, $($arg)*).map_err(|e| $crate::IbdError::Io(e.to_string()))
    };
}

/// Write (without newline) to the given writer, converting io::Error to IbdError.
macro_rules! wprint {
    ($w:expr, $($arg:tt)*) => {
        write!($w, $($arg)*).map_err(|e| $crate::IbdError::Io(e.to_string()))
    };
}

pub(crate) use wprint;
pub(crate) use wprintln;

use crate::IbdError;

/// Serialize a value as pretty JSON and write it out.
pub(crate) fn write_json<W: std::io::Write + ?Sized, T: serde::Serialize>(
    writer: &mut W,
    value: &T,
) -> Result<(), IbdError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| IbdError::Io(format!("cannot serialize to JSON: {}", e)))?;
    writeln!(writer, "{}", json).map_err(|e| IbdError::Io(e.to_string()))
}
