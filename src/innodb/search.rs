//! B+Tree primary-key seeker.
//!
//! Descends the clustered index from its root page to a leaf. The root page
//! number comes from the first inode entry of page 2 (its fragment array
//! slot 0). At each page the directory slots are binary-searched for the
//! run whose key interval contains the search key, then the run is scanned
//! linearly: on a leaf the scan looks for an exact key match, on an internal
//! page it picks the node pointer whose child interval contains the key.
//!
//! The tree is shallow (height typically at most 4) and pages are re-read on
//! every descent; no cache is kept. Statistics are threaded through the
//! descent as a value and returned alongside the outcome.

use std::time::Instant;

use serde::Serialize;

use crate::innodb::constants::FIL_NULL;
use crate::innodb::index::{DirectorySlot, IndexPage};
use crate::innodb::page::{DecodeOptions, TypeFilter};
use crate::innodb::record::RecordType;
use crate::innodb::tablespace::Tablespace;
use crate::IbdError;

/// Result of a primary-key lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SearchOutcome {
    /// The key exists; offsets locate the record on its leaf page.
    Found {
        /// Page the record lives on.
        page_no: u64,
        /// Offset of the record's 5-byte header within the page.
        record_header_offset: u16,
        /// Offset of the record's data origin within the page.
        record_data_offset: u16,
    },
    /// The key is not stored in the tree.
    NotFound,
}

/// Counters accumulated across one descent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStats {
    /// Pages visited, the inode page included.
    pub pages_searched: u64,
    /// Pages visited with level > 0.
    pub index_pages_searched: u64,
    /// Comparator invocations in slot binary search and run scans.
    pub probes: u64,
    /// Wall-clock time of the whole search.
    pub elapsed_ms: u64,
}

/// Outcome plus statistics.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    /// Where the key was found, if anywhere.
    pub outcome: SearchOutcome,
    /// Descent statistics.
    pub stats: SearchStats,
}

/// Key bound a directory slot or record represents in comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    NegInf,
    Key(u64),
    PosInf,
}

impl Bound {
    fn of_record(page: &IndexPage, arena_index: usize, page_no: u64) -> Result<Bound, IbdError> {
        let rec = page.record(arena_index);
        match rec.header.rec_type {
            RecordType::Infimum => Ok(Bound::NegInf),
            RecordType::Supremum => Ok(Bound::PosInf),
            _ => rec.key.map(Bound::Key).ok_or(IbdError::MalformedPage {
                page_no,
                field: "primary key",
                offset: rec.origin as usize,
                reason: "record has no decoded key".to_string(),
            }),
        }
    }

    /// key <= bound
    fn at_most(self, key: u64) -> bool {
        match self {
            Bound::NegInf => false,
            Bound::Key(k) => key <= k,
            Bound::PosInf => true,
        }
    }

    /// key > bound
    fn below(self, key: u64) -> bool {
        match self {
            Bound::NegInf => true,
            Bound::Key(k) => key > k,
            Bound::PosInf => false,
        }
    }

    /// bound <= key
    fn covers_up_to(self, key: u64) -> bool {
        match self {
            Bound::NegInf => true,
            Bound::Key(k) => k <= key,
            Bound::PosInf => false,
        }
    }

    /// key < bound
    fn covers_beyond(self, key: u64) -> bool {
        match self {
            Bound::NegInf => false,
            Bound::Key(k) => key < k,
            Bound::PosInf => true,
        }
    }
}

/// Look up `key` in the clustered primary-key index.
///
/// `pk_size` is the on-disk key width in bytes (1, 2, 4, or 8). Structural
/// precondition failures (no index page, inode not initialized, root not
/// allocated or out of range) surface as [`IbdError::Unavailable`]; a
/// missing key is a normal [`SearchOutcome::NotFound`] result.
pub fn search(ts: &mut Tablespace, key: u64, pk_size: usize) -> Result<SearchReport, IbdError> {
    let started = Instant::now();
    let mut stats = SearchStats::default();

    if ts.page_count() < 4 {
        return Err(IbdError::Unavailable("no index page".to_string()));
    }

    let root = locate_root(ts, pk_size, &mut stats)?;

    let index_options = DecodeOptions {
        parse_records: true,
        pk_size,
        type_filter: TypeFilter::INDEX,
    };

    let mut page_no = root;
    let mut prev_level: Option<u16> = None;
    let outcome = loop {
        let page = ts.read_page(page_no, &index_options)?;
        stats.pages_searched += 1;
        let index = page.as_index().ok_or(IbdError::MalformedPage {
            page_no,
            field: "page type",
            offset: 24,
            reason: "expected an index page in the descent".to_string(),
        })?;
        let level = index.header.level;
        if level > 0 {
            stats.index_pages_searched += 1;
        }
        if let Some(above) = prev_level {
            if level >= above {
                return Err(IbdError::MalformedPage {
                    page_no,
                    field: "level",
                    offset: 64,
                    reason: format!("child level {} does not descend below {}", level, above),
                });
            }
        }
        prev_level = Some(level);

        // A page with only the infimum and supremum slots skips the binary
        // search; an empty page ends the descent at once.
        let slot = if index.slots.len() == 2 {
            let supremum = &index.slots[1];
            if supremum.owned == 1 && supremum.rec_type == RecordType::Supremum {
                break SearchOutcome::NotFound;
            }
            supremum
        } else {
            &index.slots[choose_slot(index, key, page_no, &mut stats)?]
        };

        if index.header.is_leaf() {
            break scan_leaf(index, slot, key, page_no, &mut stats)?;
        }
        match scan_internal(index, slot, key, page_no, &mut stats)? {
            Some(child) => {
                if child == FIL_NULL || child as u64 >= ts.page_count() {
                    return Err(IbdError::MalformedPage {
                        page_no,
                        field: "child page number",
                        offset: 0,
                        reason: format!("child page {} out of range", child),
                    });
                }
                page_no = child as u64;
            }
            None => break SearchOutcome::NotFound,
        }
    };

    stats.elapsed_ms = started.elapsed().as_millis() as u64;
    Ok(SearchReport { outcome, stats })
}

/// Read the inode page and resolve the clustered index root.
fn locate_root(ts: &mut Tablespace, pk_size: usize, stats: &mut SearchStats) -> Result<u64, IbdError> {
    let inode_options = DecodeOptions {
        parse_records: false,
        pk_size,
        type_filter: TypeFilter::INODE,
    };
    let page = ts.read_page(2, &inode_options)?;
    stats.pages_searched += 1;
    let inode = page
        .as_inode()
        .ok_or_else(|| IbdError::Unavailable("page 2 is not an inode page".to_string()))?;

    let entry = &inode.entries[0];
    if !entry.is_initialized() {
        return Err(IbdError::Unavailable("inode not initialized".to_string()));
    }
    let root = entry.fragment_array[0];
    if root == FIL_NULL {
        return Err(IbdError::Unavailable("root not allocated".to_string()));
    }
    if root as u64 >= ts.page_count() {
        return Err(IbdError::Unavailable(format!(
            "root out of range (page {} of {})",
            root,
            ts.page_count()
        )));
    }
    Ok(root as u64)
}

/// Binary-search the directory for the slot whose run interval contains the
/// key, under the convention that a slot spans
/// `(previous slot's owner key, this slot's owner key]`.
fn choose_slot(
    page: &IndexPage,
    key: u64,
    page_no: u64,
    stats: &mut SearchStats,
) -> Result<usize, IbdError> {
    let n = page.slots.len();
    let mut start = 0usize;
    let mut end = n - 1;

    // Either `end` shrinks or `start` grows each step on a well-formed
    // directory; the iteration bound catches corrupt slot keys.
    for _ in 0..n {
        let mid = (start + end + 1) / 2;
        stats.probes += 1;
        let prev = slot_bound(page, &page.slots[mid - 1], page_no)?;
        let this = slot_bound(page, &page.slots[mid], page_no)?;
        if prev.at_most(key) {
            end = mid;
        } else if this.below(key) {
            start = mid;
        } else {
            return Ok(mid);
        }
    }

    Err(IbdError::MalformedPage {
        page_no,
        field: "directory slot",
        offset: 0,
        reason: "slot binary search did not converge".to_string(),
    })
}

fn slot_bound(page: &IndexPage, slot: &DirectorySlot, page_no: u64) -> Result<Bound, IbdError> {
    let rce = slot.rce.ok_or(IbdError::MalformedPage {
        page_no,
        field: "directory slot",
        offset: slot.value as usize,
        reason: "slot has no owning record".to_string(),
    })?;
    Bound::of_record(page, rce, page_no)
}

/// Walk the slot's run on a leaf page looking for an exact key match.
fn scan_leaf(
    page: &IndexPage,
    slot: &DirectorySlot,
    key: u64,
    page_no: u64,
    stats: &mut SearchStats,
) -> Result<SearchOutcome, IbdError> {
    let mut cursor = run_start(slot, page_no)?;
    let last = run_end(slot, page_no)?;
    loop {
        let rec = page.record(cursor);
        if let Some(k) = rec.key {
            stats.probes += 1;
            if k == key {
                return Ok(SearchOutcome::Found {
                    page_no,
                    record_header_offset: rec.header_offset(),
                    record_data_offset: rec.origin,
                });
            }
        }
        if cursor == last {
            return Ok(SearchOutcome::NotFound);
        }
        cursor = next_in_chain(page, cursor, page_no)?;
    }
}

/// Walk the slot's run on an internal page and pick the child to descend
/// into: the first pair `(lrc, rrc)` along the chain with
/// `key in [lrc.key, rrc.key)`. The supremum record bounds the last pair
/// from above; a key below the whole run selects nothing.
fn scan_internal(
    page: &IndexPage,
    slot: &DirectorySlot,
    key: u64,
    page_no: u64,
    stats: &mut SearchStats,
) -> Result<Option<u32>, IbdError> {
    let mut cursor = run_start(slot, page_no)?;
    let last = run_end(slot, page_no)?;
    loop {
        let rec = page.record(cursor);
        if rec.header.rec_type == RecordType::Supremum {
            return Ok(None);
        }
        let left = Bound::of_record(page, cursor, page_no)?;
        let right_index = next_in_chain(page, cursor, page_no)?;
        let right = Bound::of_record(page, right_index, page_no)?;

        stats.probes += 1;
        if left.covers_up_to(key) && right.covers_beyond(key) {
            let child = rec.child_page_no.ok_or(IbdError::MalformedPage {
                page_no,
                field: "child page number",
                offset: rec.origin as usize,
                reason: "node pointer record has no child".to_string(),
            })?;
            return Ok(Some(child));
        }

        if cursor == last {
            return Ok(None);
        }
        cursor = right_index;
    }
}

fn run_start(slot: &DirectorySlot, page_no: u64) -> Result<usize, IbdError> {
    slot.rcb.ok_or(IbdError::MalformedPage {
        page_no,
        field: "directory slot",
        offset: slot.value as usize,
        reason: "slot has no run start".to_string(),
    })
}

fn run_end(slot: &DirectorySlot, page_no: u64) -> Result<usize, IbdError> {
    slot.rce.ok_or(IbdError::MalformedPage {
        page_no,
        field: "directory slot",
        offset: slot.value as usize,
        reason: "slot has no owning record".to_string(),
    })
}

fn next_in_chain(page: &IndexPage, cursor: usize, page_no: u64) -> Result<usize, IbdError> {
    page.record(cursor).next.ok_or(IbdError::MalformedPage {
        page_no,
        field: "next_record",
        offset: page.record(cursor).origin as usize,
        reason: "record chain ends before supremum".to_string(),
    })
}
