//! FSP header and extent descriptor decoding.
//!
//! Page 0 of every tablespace is an FSP_HDR page: the file space header at
//! byte 38 tracks the space size and the extent/inode lists, and an array of
//! 256 extent descriptors follows at byte 150. Every 16384 pages thereafter
//! an XDES page repeats the descriptor array (its header area is reserved
//! but blank).

use serde::Serialize;

use crate::innodb::constants::*;
use crate::innodb::list::{ListBaseNode, ListNode};
use crate::innodb::reader::PageReader;
use crate::IbdError;

/// Extent state: the extent is in the space free list.
pub const XDES_STATE_FREE: u32 = 1;
/// Extent state: in the free-fragment list.
pub const XDES_STATE_FREE_FRAG: u32 = 2;
/// Extent state: in the full-fragment list.
pub const XDES_STATE_FULL_FRAG: u32 = 3;
/// Extent state: allocated to the file segment named by the descriptor.
pub const XDES_STATE_FSEG: u32 = 4;

/// Parsed FSP header (112 bytes at byte 38 of page 0).
#[derive(Debug, Clone, Serialize)]
pub struct FspHeader {
    /// Space ID of this tablespace.
    pub space_id: u32,
    /// Unused field.
    pub unused: u32,
    /// Highest valid page number in the file.
    pub size: u32,
    /// Highest page number whose FIL header has been initialized.
    pub free_limit: u32,
    /// Space flags.
    pub flags: u32,
    /// Number of used pages in the FREE_FRAG list.
    pub frag_n_used: u32,
    /// Extents that are completely unused and available.
    pub free: ListBaseNode,
    /// Extents with free pages remaining, allocated page-by-page.
    pub free_frag: ListBaseNode,
    /// Fragment extents with no free pages remaining.
    pub full_frag: ListBaseNode,
    /// File segment ID to be used for the next allocated segment.
    pub next_unused_seg_id: u64,
    /// Inode pages with no free inode slots.
    pub full_inodes: ListBaseNode,
    /// Inode pages with free inode slots.
    pub free_inodes: ListBaseNode,
}

impl FspHeader {
    pub(crate) fn decode(r: &mut PageReader<'_>) -> Result<Self, IbdError> {
        Ok(FspHeader {
            space_id: r.read_u32("space_id")?,
            unused: r.read_u32("fsp unused")?,
            size: r.read_u32("size")?,
            free_limit: r.read_u32("free_limit")?,
            flags: r.read_u32("flags")?,
            frag_n_used: r.read_u32("frag_n_used")?,
            free: ListBaseNode::decode(r, "free list")?,
            free_frag: ListBaseNode::decode(r, "free_frag list")?,
            full_frag: ListBaseNode::decode(r, "full_frag list")?,
            next_unused_seg_id: r.read_u64("next_unused_seg_id")?,
            full_inodes: ListBaseNode::decode(r, "full_inodes list")?,
            free_inodes: ListBaseNode::decode(r, "free_inodes list")?,
        })
    }
}

/// One extent descriptor (40 bytes): 64 pages of allocation state.
#[derive(Debug, Clone, Serialize)]
pub struct XdesEntry {
    /// Owning file segment ID when the state is FSEG.
    pub file_segment_id: u64,
    /// Position in the extent descriptor list the extent belongs to.
    pub list: ListNode,
    /// Extent state (FREE, FREE_FRAG, FULL_FRAG, or FSEG).
    pub state: u32,
    /// 2 bits per page; pairs are packed high-to-low within each byte and
    /// the high-order bit of a pair is the FREE bit.
    pub page_state_bitmap: [u8; XDES_BITMAP_SIZE],
}

impl XdesEntry {
    pub(crate) fn decode(r: &mut PageReader<'_>) -> Result<Self, IbdError> {
        let file_segment_id = r.read_u64("xdes file_segment_id")?;
        let list = ListNode::decode(r, "xdes list")?;
        let state = r.read_u32("xdes state")?;
        let bitmap = r.read_bytes(XDES_BITMAP_SIZE, "xdes page state bitmap")?;
        let mut page_state_bitmap = [0u8; XDES_BITMAP_SIZE];
        page_state_bitmap.copy_from_slice(bitmap);
        Ok(XdesEntry {
            file_segment_id,
            list,
            state,
            page_state_bitmap,
        })
    }

    /// Whether the `idx`-th page of the extent (0..64) is free.
    pub fn page_is_free(&self, idx: usize) -> bool {
        debug_assert!(idx < XDES_PAGES_PER_EXTENT);
        let byte = self.page_state_bitmap[idx / 4];
        let shift = 6 - 2 * (idx % 4);
        let pair = (byte >> shift) & 0x03;
        (pair & 0x02) != 0
    }

    /// Number of free pages in the extent.
    pub fn free_pages(&self) -> usize {
        (0..XDES_PAGES_PER_EXTENT).filter(|&i| self.page_is_free(i)).count()
    }

    /// Human-readable extent state.
    pub fn state_name(&self) -> &'static str {
        match self.state {
            XDES_STATE_FREE => "FREE",
            XDES_STATE_FREE_FRAG => "FREE_FRAG",
            XDES_STATE_FULL_FRAG => "FULL_FRAG",
            XDES_STATE_FSEG => "FSEG",
            _ => "NOT_INITED",
        }
    }
}

/// Body of an FSP_HDR or XDES page.
#[derive(Debug, Clone, Serialize)]
pub struct FspPage {
    /// FSP header, present on page 0 only.
    pub header: Option<FspHeader>,
    /// The 256 extent descriptors.
    pub extents: Vec<XdesEntry>,
}

impl FspPage {
    pub(crate) fn decode(data: &[u8], page_no: u64) -> Result<Self, IbdError> {
        let mut r = PageReader::new(data, page_no);
        r.seek(FIL_PAGE_DATA);
        let header = if page_no == 0 {
            Some(FspHeader::decode(&mut r)?)
        } else {
            None
        };
        r.seek(XDES_ARRAY_OFFSET);
        let mut extents = Vec::with_capacity(XDES_PER_PAGE);
        for _ in 0..XDES_PER_PAGE {
            extents.push(XdesEntry::decode(&mut r)?);
        }
        Ok(FspPage { header, extents })
    }
}
