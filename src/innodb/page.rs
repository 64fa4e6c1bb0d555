//! Page-level decoding: file header, file trailer, and the polymorphic view.
//!
//! Every InnoDB page begins with a 38-byte file header ([`FileHeader`]) and
//! ends with an 8-byte trailer ([`FileTrailer`]). [`Page::decode`] projects
//! one immutable 16 KiB buffer into a typed view: the header and trailer are
//! always decoded, and the body is dispatched on the page type subject to a
//! [`TypeFilter`] — types left out of the filter keep only the header and an
//! opaque body, which lets a caller walk a whole file cheaply while decoding
//! just the pages it cares about.

use serde::Serialize;

use crate::innodb::constants::*;
use crate::innodb::fsp::FspPage;
use crate::innodb::index::IndexPage;
use crate::innodb::inode::InodePage;
use crate::innodb::page_types::PageType;
use crate::innodb::reader::PageReader;
use crate::IbdError;

/// Parsed file header (38 bytes, at the start of every page).
#[derive(Debug, Clone, Serialize)]
pub struct FileHeader {
    /// Checksum (space id in pre-4.0.14 formats). Bytes 0-3.
    pub space_or_checksum: u32,
    /// Page number within the tablespace. Bytes 4-7.
    pub offset: u32,
    /// Previous page at the same index level, FIL_NULL if none. Bytes 8-11.
    pub prev: u32,
    /// Next page at the same index level, FIL_NULL if none. Bytes 12-15.
    pub next: u32,
    /// LSN of the newest modification. Bytes 16-23.
    pub lsn: u64,
    /// Page type. Bytes 24-25.
    pub page_type: PageType,
    /// Flush LSN, meaningful on page 0 only. Bytes 26-33.
    pub flush_lsn: u64,
    /// Arch log number / space id (space id since 4.0.14). Bytes 34-37.
    pub space_id: u32,
}

impl FileHeader {
    pub(crate) fn decode(r: &mut PageReader<'_>) -> Result<Self, IbdError> {
        Ok(FileHeader {
            space_or_checksum: r.read_u32("space_or_checksum")?,
            offset: r.read_u32("page offset")?,
            prev: r.read_u32("prev page")?,
            next: r.read_u32("next page")?,
            lsn: r.read_u64("lsn")?,
            page_type: PageType::from_u16(r.read_u16("page type")?),
            flush_lsn: r.read_u64("flush_lsn")?,
            space_id: r.read_u32("space_id")?,
        })
    }

    /// Returns true if the prev pointer references a page.
    pub fn has_prev(&self) -> bool {
        self.prev != FIL_NULL && self.prev != 0
    }

    /// Returns true if the next pointer references a page.
    pub fn has_next(&self) -> bool {
        self.next != FIL_NULL && self.next != 0
    }
}

/// Parsed file trailer (the last 8 bytes of every page).
#[derive(Debug, Clone, Serialize)]
pub struct FileTrailer {
    /// Old-style checksum.
    pub checksum: u32,
    /// Low 32 bits of the page LSN.
    pub lsn_low32: u32,
}

impl FileTrailer {
    pub(crate) fn decode(r: &PageReader<'_>) -> Result<Self, IbdError> {
        let base = PAGE_SIZE - SIZE_FIL_TRAILER;
        Ok(FileTrailer {
            checksum: r.u32_at(base, "trailer checksum")?,
            lsn_low32: r.u32_at(base + 4, "trailer lsn")?,
        })
    }
}

/// Bitmask of page types whose bodies should be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeFilter(u16);

impl TypeFilter {
    /// No page passes.
    pub const NONE: TypeFilter = TypeFilter(0);
    /// INDEX pages.
    pub const INDEX: TypeFilter = TypeFilter(1 << 0);
    /// FSP_HDR pages.
    pub const FSP_HDR: TypeFilter = TypeFilter(1 << 1);
    /// XDES pages.
    pub const XDES: TypeFilter = TypeFilter(1 << 2);
    /// INODE pages.
    pub const INODE: TypeFilter = TypeFilter(1 << 3);
    /// Allocated (uninitialized) pages.
    pub const ALLOCATED: TypeFilter = TypeFilter(1 << 4);
    /// Every page type whose body is not decoded (undo, ibuf, sys, ...).
    pub const OTHER: TypeFilter = TypeFilter(1 << 5);
    /// FSP_HDR and XDES together: the space bookkeeping pages.
    pub const SPACE: TypeFilter = TypeFilter(Self::FSP_HDR.0 | Self::XDES.0);
    /// Everything.
    pub const ALL: TypeFilter = TypeFilter(0x3F);

    /// Set union of two filters.
    pub const fn union(self, other: TypeFilter) -> TypeFilter {
        TypeFilter(self.0 | other.0)
    }

    /// Whether pages of `page_type` pass this filter.
    pub fn contains(self, page_type: PageType) -> bool {
        let bit = match page_type {
            PageType::Index => Self::INDEX,
            PageType::FspHdr => Self::FSP_HDR,
            PageType::Xdes => Self::XDES,
            PageType::Inode => Self::INODE,
            PageType::Allocated => Self::ALLOCATED,
            _ => Self::OTHER,
        };
        self.0 & bit.0 != 0
    }
}

/// Options handed to the page decoder.
#[derive(Debug, Clone, Copy)]
pub struct DecodeOptions {
    /// Reconstruct the record chain of index pages.
    pub parse_records: bool,
    /// Primary key width in bytes: 1, 2, 4, or 8.
    pub pk_size: usize,
    /// Page types whose bodies are decoded; everything else stays opaque.
    pub type_filter: TypeFilter,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            parse_records: false,
            pk_size: 8,
            type_filter: TypeFilter::ALL,
        }
    }
}

impl DecodeOptions {
    pub(crate) fn validate(&self) -> Result<(), IbdError> {
        match self.pk_size {
            1 | 2 | 4 | 8 => Ok(()),
            other => Err(IbdError::BadOptions(format!(
                "unsupported primary key size {} (expected 1, 2, 4, or 8)",
                other
            ))),
        }
    }
}

/// Type-specific page body.
#[derive(Debug, Clone, Serialize)]
pub enum PageBody {
    /// B+Tree index page.
    Index(IndexPage),
    /// File space header page (page 0).
    FspHdr(FspPage),
    /// Extent descriptor page.
    Xdes(FspPage),
    /// File segment inode page.
    Inode(InodePage),
    /// Recognized-but-undecoded or filtered-out page; carries the raw type
    /// code.
    Opaque(u16),
}

/// A decoded page: common fields plus the type-specific body.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Zero-based page index within the file.
    pub no: u64,
    /// Byte offset of the page within the file.
    pub offset: u64,
    /// The 38-byte file header.
    pub header: FileHeader,
    /// The 8-byte file trailer.
    pub trailer: FileTrailer,
    /// Decoded body.
    pub body: PageBody,
}

impl Page {
    /// Decode one 16 KiB page buffer.
    pub fn decode(no: u64, data: &[u8], options: &DecodeOptions) -> Result<Page, IbdError> {
        options.validate()?;
        if data.len() != PAGE_SIZE {
            return Err(IbdError::Truncated(format!(
                "page {} is {} bytes, expected {}",
                no,
                data.len(),
                PAGE_SIZE
            )));
        }

        let mut r = PageReader::new(data, no);
        let header = FileHeader::decode(&mut r)?;
        let trailer = FileTrailer::decode(&r)?;

        let body = if !options.type_filter.contains(header.page_type) {
            PageBody::Opaque(header.page_type.as_u16())
        } else {
            match header.page_type {
                PageType::Index => PageBody::Index(IndexPage::decode(data, no, options)?),
                PageType::FspHdr => PageBody::FspHdr(FspPage::decode(data, no)?),
                PageType::Xdes => PageBody::Xdes(FspPage::decode(data, no)?),
                PageType::Inode => PageBody::Inode(InodePage::decode(data, no)?),
                other => PageBody::Opaque(other.as_u16()),
            }
        };

        Ok(Page {
            no,
            offset: no * PAGE_SIZE as u64,
            header,
            trailer,
            body,
        })
    }

    /// The index page body, if this is a decoded INDEX page.
    pub fn as_index(&self) -> Option<&IndexPage> {
        match &self.body {
            PageBody::Index(p) => Some(p),
            _ => None,
        }
    }

    /// The FSP/XDES body, if this is a decoded FSP_HDR or XDES page.
    pub fn as_fsp(&self) -> Option<&FspPage> {
        match &self.body {
            PageBody::FspHdr(p) | PageBody::Xdes(p) => Some(p),
            _ => None,
        }
    }

    /// The inode body, if this is a decoded INODE page.
    pub fn as_inode(&self) -> Option<&InodePage> {
        match &self.body {
            PageBody::Inode(p) => Some(p),
            _ => None,
        }
    }
}
