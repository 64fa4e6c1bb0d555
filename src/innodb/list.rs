//! On-disk doubly-linked list nodes.
//!
//! FSP headers, extent descriptors, and inode entries all chain structures
//! together with 6-byte file addresses (page number + byte offset within the
//! page). A [`ListNode`] is a prev/next pair of such addresses; a
//! [`ListBaseNode`] additionally carries the list length and lives in the
//! structure that owns the list. A page number of `FIL_NULL` (0xFFFFFFFF)
//! is the nil link.

use serde::Serialize;

use crate::innodb::constants::FIL_NULL;
use crate::innodb::reader::PageReader;
use crate::IbdError;

/// Prev/next file-address pair (12 bytes on disk).
#[derive(Debug, Clone, Serialize)]
pub struct ListNode {
    /// Page number of the previous node, FIL_NULL if none.
    pub prev_page_no: u32,
    /// Byte offset of the previous node within its page.
    pub prev_offset: u16,
    /// Page number of the next node, FIL_NULL if none.
    pub next_page_no: u32,
    /// Byte offset of the next node within its page.
    pub next_offset: u16,
}

impl ListNode {
    pub(crate) fn decode(r: &mut PageReader<'_>, field: &'static str) -> Result<Self, IbdError> {
        Ok(ListNode {
            prev_page_no: r.read_u32(field)?,
            prev_offset: r.read_u16(field)?,
            next_page_no: r.read_u32(field)?,
            next_offset: r.read_u16(field)?,
        })
    }

    /// Returns true if the prev link is nil.
    pub fn prev_is_nil(&self) -> bool {
        self.prev_page_no == FIL_NULL
    }

    /// Returns true if the next link is nil.
    pub fn next_is_nil(&self) -> bool {
        self.next_page_no == FIL_NULL
    }

    /// Render the node as `0xPAGE:0xOFFSET 0xPAGE:0xOFFSET`.
    ///
    /// The stored offsets point at the raw list node bytes; `adjust` is
    /// subtracted from non-nil offsets so the rendered value names the start
    /// of the owning structure (e.g. 8 for structures prefixed by a segment
    /// id, 38 for whole-page structures).
    pub fn display(&self, adjust: u16) -> String {
        let prev = if self.prev_is_nil() { self.prev_offset } else { self.prev_offset.wrapping_sub(adjust) };
        let next = if self.next_is_nil() { self.next_offset } else { self.next_offset.wrapping_sub(adjust) };
        format!(
            "0x{:08X}:0x{:04X} 0x{:08X}:0x{:04X}",
            self.prev_page_no, prev, self.next_page_no, next
        )
    }
}

/// List length plus the first/last node addresses (16 bytes on disk).
#[derive(Debug, Clone, Serialize)]
pub struct ListBaseNode {
    /// Number of nodes in the list.
    pub length: u32,
    /// First node (as prev) and last node (as next) addresses.
    pub node: ListNode,
}

impl ListBaseNode {
    pub(crate) fn decode(r: &mut PageReader<'_>, field: &'static str) -> Result<Self, IbdError> {
        Ok(ListBaseNode {
            length: r.read_u32(field)?,
            node: ListNode::decode(r, field)?,
        })
    }

    /// Render as `len<N> 0xPAGE:0xOFFSET 0xPAGE:0xOFFSET`.
    pub fn display(&self, adjust: u16) -> String {
        format!("len<{}> {}", self.length, self.node.display(adjust))
    }
}
