//! InnoDB page and file structure constants.
//!
//! These values are derived from the MySQL/InnoDB source code headers:
//! - `fil0fil.h` (FIL header/trailer)
//! - `page0page.h` (page header, directory slots)
//! - `fsp0fsp.h` (FSP header, extent descriptors, inodes)

// ── Page size ───────────────────────────────────────────────────────

/// The fixed InnoDB page size handled by this crate (16 KiB).
pub const PAGE_SIZE: usize = 16384;

// ── FIL Header (38 bytes total) ─────────────────────────────────────

/// Size of the FIL header in bytes.
pub const SIZE_FIL_HEAD: usize = 38;
/// Offset of the checksum (or space id in pre-4.0.14 formats). 4 bytes.
pub const FIL_PAGE_SPACE_OR_CHKSUM: usize = 0;
/// Offset of the page number within the tablespace. 4 bytes.
pub const FIL_PAGE_OFFSET: usize = 4;
/// Offset of the previous page pointer (same index level). 4 bytes.
pub const FIL_PAGE_PREV: usize = 8;
/// Offset of the next page pointer (same index level). 4 bytes.
pub const FIL_PAGE_NEXT: usize = 12;
/// Offset of the LSN of the newest modification. 8 bytes.
pub const FIL_PAGE_LSN: usize = 16;
/// Offset of the page type field. 2 bytes.
pub const FIL_PAGE_TYPE: usize = 24;
/// Offset of the flush LSN (meaningful on page 0 only). 8 bytes.
pub const FIL_PAGE_FILE_FLUSH_LSN: usize = 26;
/// Offset of the arch log number / space ID field. 4 bytes.
pub const FIL_PAGE_ARCH_LOG_NO_OR_SPACE_ID: usize = 34;

/// Start of page data (immediately after the FIL header).
pub const FIL_PAGE_DATA: usize = 38;

// ── FIL Trailer (8 bytes total) ─────────────────────────────────────

/// Size of the FIL trailer in bytes.
pub const SIZE_FIL_TRAILER: usize = 8;
// Trailer sits at PAGE_SIZE - SIZE_FIL_TRAILER:
// old-style checksum (4 bytes), then the low 32 bits of the LSN (4 bytes).

// ── Special values ──────────────────────────────────────────────────

/// Null page reference (0xFFFFFFFF / 4294967295).
pub const FIL_NULL: u32 = 0xFFFFFFFF;

// ── INDEX page header (starts at FIL_PAGE_DATA) ─────────────────────

/// Offset of the directory slot count. 2 bytes.
pub const PAGE_N_DIR_SLOTS: usize = 0;
/// Offset of the record heap top pointer. 2 bytes.
pub const PAGE_HEAP_TOP: usize = 2;
/// Offset of the heap record count (bit 15 = compact flag). 2 bytes.
pub const PAGE_N_HEAP: usize = 4;
/// Offset of the free record list pointer. 2 bytes.
pub const PAGE_FREE: usize = 6;
/// Offset of the deleted-record byte count (garbage). 2 bytes.
pub const PAGE_GARBAGE: usize = 8;
/// Offset of the last-inserted record pointer. 2 bytes.
pub const PAGE_LAST_INSERT: usize = 10;
/// Offset of the last insert direction. 2 bytes.
pub const PAGE_DIRECTION: usize = 12;
/// Offset of the consecutive same-direction insert count. 2 bytes.
pub const PAGE_N_DIRECTION: usize = 14;
/// Offset of the user record count. 2 bytes.
pub const PAGE_N_RECS: usize = 16;
/// Offset of the maximum transaction ID. 8 bytes.
pub const PAGE_MAX_TRX_ID: usize = 18;
/// Offset of the B+Tree level (0 = leaf). 2 bytes.
pub const PAGE_LEVEL: usize = 26;
/// Offset of the index ID. 8 bytes.
pub const PAGE_INDEX_ID: usize = 28;
/// Offset of the leaf segment FSEG reference. 10 bytes.
pub const PAGE_BTR_SEG_LEAF: usize = 36;
/// Offset of the non-leaf segment FSEG reference. 10 bytes.
pub const PAGE_BTR_SEG_TOP: usize = 46;
/// Total INDEX page header size, including both FSEG references.
pub const PAGE_HEADER_SIZE: usize = 56;

/// Size of an FSEG (file segment) reference in bytes.
pub const FSEG_REF_SIZE: usize = 10;

/// Size of one directory slot in bytes.
pub const PAGE_DIR_SLOT_SIZE: usize = 2;

// ── Compact records ─────────────────────────────────────────────────

/// Extra bytes preceding each record's data origin in compact format.
pub const REC_N_NEW_EXTRA_BYTES: usize = 5;

/// System record area offset (FIL_PAGE_DATA + PAGE_HEADER_SIZE = 94).
pub const PAGE_DATA_OFFSET: usize = FIL_PAGE_DATA + PAGE_HEADER_SIZE;
/// Data origin of the infimum record on a compact page.
pub const PAGE_NEW_INFIMUM: usize = PAGE_DATA_OFFSET + REC_N_NEW_EXTRA_BYTES; // 99
/// Data origin of the supremum record on a compact page.
pub const PAGE_NEW_SUPREMUM: usize = PAGE_DATA_OFFSET + 2 * REC_N_NEW_EXTRA_BYTES + 8; // 112

// ── Insert direction values ─────────────────────────────────────────

/// Insert direction: left.
pub const PAGE_LEFT: u16 = 1;
/// Insert direction: right.
pub const PAGE_RIGHT: u16 = 2;
/// Insert direction: same record position.
pub const PAGE_SAME_REC: u16 = 3;
/// Insert direction: same page.
pub const PAGE_SAME_PAGE: u16 = 4;
/// Insert direction: no direction.
pub const PAGE_NO_DIRECTION: u16 = 5;

// ── On-disk list nodes ──────────────────────────────────────────────

/// Physical size of a list base node (length + two page:offset pointers).
pub const FLST_BASE_NODE_SIZE: usize = 16;
/// Physical size of a list node (two page:offset pointers).
pub const FLST_NODE_SIZE: usize = 12;

// ── FSP header (112 bytes, at FIL_PAGE_DATA on page 0) ──────────────

/// Size of the FSP header in bytes.
pub const FSP_HEADER_SIZE: usize = 112;
/// Offset of the space ID within the FSP header. 4 bytes.
pub const FSP_SPACE_ID: usize = 0;
/// Unused field in the FSP header. 4 bytes.
pub const FSP_NOT_USED: usize = 4;
/// Offset of the tablespace size (highest page number). 4 bytes.
pub const FSP_SIZE: usize = 8;
/// Offset of the highest initialized page number. 4 bytes.
pub const FSP_FREE_LIMIT: usize = 12;
/// Offset of the FSP flags field. 4 bytes.
pub const FSP_SPACE_FLAGS: usize = 16;
/// Offset of the used-page count of the FREE_FRAG list. 4 bytes.
pub const FSP_FRAG_N_USED: usize = 20;
/// Offset of the FREE extent list base node. 16 bytes.
pub const FSP_FREE: usize = 24;
/// Offset of the FREE_FRAG extent list base node. 16 bytes.
pub const FSP_FREE_FRAG: usize = FSP_FREE + FLST_BASE_NODE_SIZE;
/// Offset of the FULL_FRAG extent list base node. 16 bytes.
pub const FSP_FULL_FRAG: usize = FSP_FREE_FRAG + FLST_BASE_NODE_SIZE;
/// Offset of the next unused segment id. 8 bytes.
pub const FSP_SEG_ID: usize = FSP_FULL_FRAG + FLST_BASE_NODE_SIZE;
/// Offset of the FULL inode page list base node. 16 bytes.
pub const FSP_SEG_INODES_FULL: usize = FSP_SEG_ID + 8;
/// Offset of the FREE inode page list base node. 16 bytes.
pub const FSP_SEG_INODES_FREE: usize = FSP_SEG_INODES_FULL + FLST_BASE_NODE_SIZE;

// ── Extent descriptors ──────────────────────────────────────────────

/// Size of one extent descriptor entry in bytes.
pub const XDES_ENTRY_SIZE: usize = 40;
/// Offset of the owning segment id within a descriptor. 8 bytes.
pub const XDES_ID: usize = 0;
/// Offset of the descriptor list node. 12 bytes.
pub const XDES_FLST_NODE: usize = 8;
/// Offset of the extent state. 4 bytes.
pub const XDES_STATE: usize = XDES_FLST_NODE + FLST_NODE_SIZE;
/// Offset of the page state bitmap. 16 bytes.
pub const XDES_BITMAP: usize = XDES_STATE + 4;
/// Number of extent descriptors on each FSP_HDR/XDES page.
pub const XDES_PER_PAGE: usize = 256;
/// Size of the per-extent page state bitmap (64 pages x 2 bits).
pub const XDES_BITMAP_SIZE: usize = 16;
/// Pages covered by one extent descriptor.
pub const XDES_PAGES_PER_EXTENT: usize = 64;
/// Byte offset of the extent descriptor array within an FSP_HDR/XDES page.
pub const XDES_ARRAY_OFFSET: usize = FIL_PAGE_DATA + FSP_HEADER_SIZE; // 150

// ── File segment inodes ─────────────────────────────────────────────

/// Size of one inode entry in bytes.
pub const INODE_ENTRY_SIZE: usize = 192;
/// Offset of the file segment id within an inode entry. 8 bytes.
pub const FSEG_ID: usize = 0;
/// Offset of the NOT_FULL list used-page count. 4 bytes.
pub const FSEG_NOT_FULL_N_USED: usize = 8;
/// Offset of the FREE extent list base node. 16 bytes.
pub const FSEG_FREE: usize = 12;
/// Offset of the NOT_FULL extent list base node. 16 bytes.
pub const FSEG_NOT_FULL: usize = FSEG_FREE + FLST_BASE_NODE_SIZE;
/// Offset of the FULL extent list base node. 16 bytes.
pub const FSEG_FULL: usize = FSEG_NOT_FULL + FLST_BASE_NODE_SIZE;
/// Offset of the initialization magic within an inode entry. 4 bytes.
pub const FSEG_MAGIC_N: usize = FSEG_FULL + FLST_BASE_NODE_SIZE;
/// Offset of the fragment array within an inode entry. 128 bytes.
pub const FSEG_FRAG_ARR: usize = FSEG_MAGIC_N + 4;
/// Number of inode entries on each INODE page.
pub const INODES_PER_PAGE: usize = 85;
/// Marker stored in an inode entry once it has been initialized.
pub const INODE_MAGIC: u32 = 97937874;
/// Number of fragment array slots per inode entry.
pub const INODE_FRAG_SLOTS: usize = 32;
/// Byte offset of the inode entry array within an INODE page.
pub const INODE_ARRAY_OFFSET: usize = FIL_PAGE_DATA + FLST_NODE_SIZE; // 50
