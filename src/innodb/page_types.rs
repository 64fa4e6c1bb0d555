//! InnoDB page type definitions.
//!
//! Maps the 2-byte page type field (bytes 24-25 of the FIL header) to a
//! [`PageType`] enum. Only the types that appear in a file-per-table
//! tablespace are listed; anything else is carried as [`PageType::Unknown`]
//! with its raw code so the original bytes can always be reproduced.

use serde::Serialize;
use std::fmt;

/// Page types found in a single-table `.ibd` tablespace.
///
/// Values are from `fil0fil.h` in the MySQL source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PageType {
    /// B+Tree index page for table and index data (FIL_PAGE_INDEX = 0x45BF)
    Index,
    /// Freshly allocated, type field not initialized (0x0000)
    Allocated,
    /// Undo log page (0x0002)
    UndoLog,
    /// File segment inode (0x0003)
    Inode,
    /// Insert buffer free list (0x0004)
    IbufFreeList,
    /// Insert buffer bitmap (0x0005)
    IbufBitmap,
    /// System internal page (0x0006)
    Sys,
    /// Transaction system header (0x0007)
    TrxSys,
    /// File space header, page 0 of each tablespace (0x0008)
    FspHdr,
    /// Extent descriptor (0x0009)
    Xdes,
    /// Uncompressed BLOB page (0x000A)
    Blob,
    /// Any other page type, carrying the raw on-disk code.
    Unknown(u16),
}

impl PageType {
    /// Parse a page type from a u16 value read from the FIL header.
    ///
    /// # Examples
    ///
    /// ```
    /// use innoisp::innodb::page_types::PageType;
    ///
    /// // INDEX pages (B+Tree data) use type code 0x45BF
    /// assert_eq!(PageType::from_u16(0x45BF), PageType::Index);
    ///
    /// // FSP_HDR (file space header, page 0) uses type code 8
    /// assert_eq!(PageType::from_u16(8), PageType::FspHdr);
    ///
    /// // Unrecognized values keep their raw code
    /// assert_eq!(PageType::from_u16(9999), PageType::Unknown(9999));
    /// ```
    pub fn from_u16(value: u16) -> Self {
        match value {
            0x45BF => PageType::Index,
            0x0000 => PageType::Allocated,
            0x0002 => PageType::UndoLog,
            0x0003 => PageType::Inode,
            0x0004 => PageType::IbufFreeList,
            0x0005 => PageType::IbufBitmap,
            0x0006 => PageType::Sys,
            0x0007 => PageType::TrxSys,
            0x0008 => PageType::FspHdr,
            0x0009 => PageType::Xdes,
            0x000A => PageType::Blob,
            other => PageType::Unknown(other),
        }
    }

    /// Returns the raw u16 value of this page type.
    pub fn as_u16(self) -> u16 {
        match self {
            PageType::Index => 0x45BF,
            PageType::Allocated => 0x0000,
            PageType::UndoLog => 0x0002,
            PageType::Inode => 0x0003,
            PageType::IbufFreeList => 0x0004,
            PageType::IbufBitmap => 0x0005,
            PageType::Sys => 0x0006,
            PageType::TrxSys => 0x0007,
            PageType::FspHdr => 0x0008,
            PageType::Xdes => 0x0009,
            PageType::Blob => 0x000A,
            PageType::Unknown(code) => code,
        }
    }

    /// Returns the name of this page type as used in the MySQL source.
    pub fn name(self) -> &'static str {
        match self {
            PageType::Index => "INDEX",
            PageType::Allocated => "ALLOCATED",
            PageType::UndoLog => "UNDO_LOG",
            PageType::Inode => "INODE",
            PageType::IbufFreeList => "IBUF_FREE_LIST",
            PageType::IbufBitmap => "IBUF_BITMAP",
            PageType::Sys => "SYS",
            PageType::TrxSys => "TRX_SYS",
            PageType::FspHdr => "FSP_HDR",
            PageType::Xdes => "XDES",
            PageType::Blob => "BLOB",
            PageType::Unknown(_) => "UNKNOWN",
        }
    }

    /// Returns a human-readable description of this page type.
    pub fn description(self) -> &'static str {
        match self {
            PageType::Index => "Table and index data stored in B+Tree structure.",
            PageType::Allocated => "Freshly allocated, type field not initialized.",
            PageType::UndoLog => "Stores previous values of modified records.",
            PageType::Inode => "Bookkeeping for file segments.",
            PageType::IbufFreeList => "Insert buffer free space management.",
            PageType::IbufBitmap => "Insert buffer writes to be merged.",
            PageType::Sys => "Used for various purposes in the system tablespace.",
            PageType::TrxSys => "Transaction system bookkeeping.",
            PageType::FspHdr => "Header page (page 0) of the tablespace file.",
            PageType::Xdes => "Extent descriptors for subsequent blocks of 16384 pages.",
            PageType::Blob => "Externally-stored uncompressed BLOB column data.",
            PageType::Unknown(_) => "Unknown or unrecognized page type.",
        }
    }
}

impl fmt::Display for PageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageType::Unknown(code) => write!(f, "UNKNOWN(0x{:04X})", code),
            other => write!(f, "{}", other.name()),
        }
    }
}
