//! File segment inode pages.
//!
//! INODE pages (type 3) carry a 12-byte list node chaining the inode pages
//! of the space, followed by exactly 85 inode entries of 192 bytes each.
//! Every file segment (for example the leaf pages of one index) is described
//! by one entry: its id, three extent lists, and a 32-slot fragment array of
//! individually allocated pages. Page 2 is the first inode page of a
//! file-per-table tablespace, and entry 0 belongs to the non-leaf segment of
//! the clustered index — its first fragment slot is the index root.

use serde::Serialize;

use crate::innodb::constants::*;
use crate::innodb::list::{ListBaseNode, ListNode};
use crate::innodb::reader::PageReader;
use crate::IbdError;

/// One file segment inode entry (192 bytes).
#[derive(Debug, Clone, Serialize)]
pub struct InodeEntry {
    /// ID of the file segment described by this entry; 0 means unused.
    pub file_segment_id: u64,
    /// Used page count of the NOT_FULL list, kept so free pages can be
    /// counted without walking the extents.
    pub used_pages_in_not_full_list: u32,
    /// Extents fully unused but allocated to this segment.
    pub free: ListBaseNode,
    /// Extents with at least one used page.
    pub not_full: ListBaseNode,
    /// Extents with no free pages.
    pub full: ListBaseNode,
    /// Initialization marker, 97937874 once the entry is valid.
    pub magic: u32,
    /// Pages allocated individually from fragment extents; 0xFFFFFFFF marks
    /// an empty slot.
    pub fragment_array: [u32; INODE_FRAG_SLOTS],
}

impl InodeEntry {
    pub(crate) fn decode(r: &mut PageReader<'_>) -> Result<Self, IbdError> {
        let file_segment_id = r.read_u64("inode file_segment_id")?;
        let used_pages_in_not_full_list = r.read_u32("inode used pages")?;
        let free = ListBaseNode::decode(r, "inode free list")?;
        let not_full = ListBaseNode::decode(r, "inode not_full list")?;
        let full = ListBaseNode::decode(r, "inode full list")?;
        let magic = r.read_u32("inode magic")?;
        let mut fragment_array = [0u32; INODE_FRAG_SLOTS];
        for slot in fragment_array.iter_mut() {
            *slot = r.read_u32("inode fragment array")?;
        }
        Ok(InodeEntry {
            file_segment_id,
            used_pages_in_not_full_list,
            free,
            not_full,
            full,
            magic,
            fragment_array,
        })
    }

    /// An entry with file segment id 0 has never been used.
    pub fn is_unused(&self) -> bool {
        self.file_segment_id == 0
    }

    /// The entry carries the magic marker written at initialization.
    pub fn is_initialized(&self) -> bool {
        self.magic == INODE_MAGIC
    }

    /// Fragment array slots that hold a page number.
    pub fn fragment_pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.fragment_array.iter().copied().filter(|&p| p != FIL_NULL)
    }
}

/// Decoded view of an INODE page.
#[derive(Debug, Clone, Serialize)]
pub struct InodePage {
    /// Position of this page in the space's inode page list.
    pub list: ListNode,
    /// The 85 inode entries.
    pub entries: Vec<InodeEntry>,
}

impl InodePage {
    pub(crate) fn decode(data: &[u8], page_no: u64) -> Result<Self, IbdError> {
        let mut r = PageReader::new(data, page_no);
        r.seek(FIL_PAGE_DATA);
        let list = ListNode::decode(&mut r, "inode page list")?;
        let mut entries = Vec::with_capacity(INODES_PER_PAGE);
        for _ in 0..INODES_PER_PAGE {
            entries.push(InodeEntry::decode(&mut r)?);
        }
        Ok(InodePage { list, entries })
    }
}
