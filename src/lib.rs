//! Offline InnoDB tablespace inspector.
//!
//! The `innoisp` crate reads MySQL InnoDB single-table tablespace files
//! (`.ibd`) byte-for-byte and reconstructs the page-oriented structures
//! InnoDB maintains on disk: file-space headers, extent descriptors, file
//! segment inodes, and the B+Tree index pages with their directory slots and
//! compact record chains. No database server is involved; the file is opened
//! read-only and never modified.
//!
//! # CLI Reference
//!
//! The `innoisp` binary exposes five subcommands. All of them take
//! `-f/--file <path>` and support `--json` for machine-readable output,
//! plus the global `--color <auto|always|never>` and `--output <file>`
//! flags.
//!
//! | Command | Purpose |
//! |---------|---------|
//! | [`innoisp overview`](cli::app::Commands::Overview) | Per-page summary of the whole file |
//! | [`innoisp dslots`](cli::app::Commands::Dslots) | Page directory slots and their record runs |
//! | [`innoisp space`](cli::app::Commands::Space) | FSP header and extent descriptors |
//! | [`innoisp inode`](cli::app::Commands::Inode) | File segment inode entries |
//! | [`innoisp search`](cli::app::Commands::Search) | B+Tree primary-key lookup |
//!
//! # Library API
//!
//! ```no_run
//! use innoisp::innodb::page::DecodeOptions;
//! use innoisp::innodb::tablespace::Tablespace;
//! use innoisp::innodb::search::search;
//!
//! // Open a tablespace (the file length must be a multiple of 16384)
//! let mut ts = Tablespace::open("table.ibd").unwrap();
//!
//! // Read and inspect a page
//! let page = ts.read_page(3, &DecodeOptions::default()).unwrap();
//! println!("page type: {}", page.header.page_type);
//!
//! // Look up a primary key in the clustered index
//! let report = search(&mut ts, 42, 8).unwrap();
//! println!("{:?} after {} pages", report.outcome, report.stats.pages_searched);
//! ```
//!
//! ## Module overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`innodb::tablespace`] | File I/O, sequential page walk, single-page reads |
//! | [`innodb::page`] | File header/trailer, decode options, polymorphic page view |
//! | [`innodb::page_types`] | Page type codes and names |
//! | [`innodb::index`] | INDEX page header, directory slots, record chain |
//! | [`innodb::record`] | Compact record header and decoded records |
//! | [`innodb::fsp`] | FSP header and extent descriptors |
//! | [`innodb::inode`] | File segment inode pages |
//! | [`innodb::list`] | On-disk doubly-linked list nodes |
//! | [`innodb::search`] | B+Tree primary-key seeker |
//! | [`innodb::checksum`] | CRC-32C page checksum |
//! | [`innodb::constants`] | On-disk offsets and sizes |

pub mod innodb;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;

use thiserror::Error;

/// Errors returned by `innoisp` operations.
#[derive(Error, Debug)]
pub enum IbdError {
    /// An I/O error occurred (file open, read, or seek failure).
    #[error("I/O error: {0}")]
    Io(String),

    /// The file length is not a whole multiple of the page size, or a read
    /// came back short.
    #[error("truncated tablespace: {0}")]
    Truncated(String),

    /// A decode-time invariant was violated on a page.
    #[error("malformed page {page_no}: {field} at offset {offset}: {reason}")]
    MalformedPage {
        /// Page index within the tablespace.
        page_no: u64,
        /// Name of the field that failed to decode.
        field: &'static str,
        /// Byte offset of the failing read, relative to the page start.
        offset: usize,
        /// What went wrong.
        reason: String,
    },

    /// An invalid argument was supplied (unsupported key width, bad page
    /// number, missing file path).
    #[error("invalid argument: {0}")]
    BadOptions(String),

    /// A structural precondition for the requested operation does not hold
    /// (no index page, inode not initialized, root not allocated or out of
    /// range).
    #[error("unavailable: {0}")]
    Unavailable(String),
}
