//! CRC-32C page checksum.
//!
//! MySQL 5.7+ writes a CRC-32C checksum into bytes 0-3 of every page. The
//! checksum covers two ranges, skipping the checksum field itself, the flush
//! LSN, and the trailer:
//!
//! - bytes 4..26 (page number through page type)
//! - bytes 38..page_size-8 (page data)
//!
//! The two CRCs are XORed together. Checksum validation is advisory here:
//! the inspector reports a mismatch but still decodes the page.

use crate::innodb::constants::*;
use crate::innodb::page::FileHeader;

/// Compute the MySQL CRC-32C checksum of a full page buffer.
pub fn page_crc32c(page: &[u8]) -> u32 {
    let end = page.len() - SIZE_FIL_TRAILER;
    let crc1 = crc32c::crc32c(&page[FIL_PAGE_OFFSET..FIL_PAGE_FILE_FLUSH_LSN]);
    let crc2 = crc32c::crc32c(&page[FIL_PAGE_DATA..end]);
    crc1 ^ crc2
}

/// Whether the stored checksum matches the computed CRC-32C.
///
/// All-zero pages store checksum 0 and are considered valid.
pub fn checksum_matches(header: &FileHeader, page: &[u8]) -> bool {
    header.space_or_checksum == page_crc32c(page)
}
