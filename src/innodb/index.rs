//! INDEX page internal structure.
//!
//! INDEX pages (type 0x45BF) are the B+Tree nodes. Each one carries a
//! 56-byte header at byte 38 ([`IndexHeader`] plus two [`FsegRef`] inode
//! pointers), the infimum/supremum system records, the user record heap, and
//! a directory of 2-byte slots packed just before the trailer.
//!
//! The directory is stored in reverse: the physically last two bytes before
//! the trailer are slot 0 (pointing at infimum), and walking backwards
//! reaches the supremum slot. Each slot points at the data origin of the
//! record that "owns" it; the owner's header carries how many chain records
//! belong to that slot's run. With record parsing enabled the whole chain is
//! materialized into a per-page arena and every slot is annotated with the
//! arena indices of its run boundaries (`rcb` first, `rce` owner/last).

use serde::Serialize;

use crate::innodb::constants::*;
use crate::innodb::page::DecodeOptions;
use crate::innodb::reader::PageReader;
use crate::innodb::record::{decode_key, CompactRecord, CompactRecordHeader, RecordType};
use crate::IbdError;

/// Parsed INDEX page header (starts at byte 38).
#[derive(Debug, Clone, Serialize)]
pub struct IndexHeader {
    /// Number of directory slots in the page directory.
    pub n_dir_slots: u16,
    /// Pointer to the record heap top.
    pub heap_top: u16,
    /// Number of records in the heap. Bit 15 is the compact format flag.
    pub n_heap_raw: u16,
    /// Pointer to the start of the free record list (0 if none).
    pub free: u16,
    /// Number of bytes in deleted records.
    pub garbage: u16,
    /// Pointer to the last inserted record (0 if reset).
    pub last_insert: u16,
    /// Last insert direction.
    pub direction: u16,
    /// Number of consecutive inserts in the same direction.
    pub n_direction: u16,
    /// Number of user records on the page.
    pub n_recs: u16,
    /// Highest transaction id that may have modified a record.
    pub max_trx_id: u64,
    /// Level in the B+Tree (0 = leaf).
    pub level: u16,
    /// Index ID the page belongs to.
    pub index_id: u64,
}

impl IndexHeader {
    pub(crate) fn decode(r: &mut PageReader<'_>) -> Result<Self, IbdError> {
        Ok(IndexHeader {
            n_dir_slots: r.read_u16("n_dir_slots")?,
            heap_top: r.read_u16("heap_top")?,
            n_heap_raw: r.read_u16("n_heap")?,
            free: r.read_u16("free")?,
            garbage: r.read_u16("garbage")?,
            last_insert: r.read_u16("last_insert")?,
            direction: r.read_u16("direction")?,
            n_direction: r.read_u16("n_direction")?,
            n_recs: r.read_u16("n_recs")?,
            max_trx_id: r.read_u64("max_trx_id")?,
            level: r.read_u16("level")?,
            index_id: r.read_u64("index_id")?,
        })
    }

    /// Number of records in the heap, with the compact flag masked off.
    pub fn n_heap(&self) -> u16 {
        self.n_heap_raw & 0x7FFF
    }

    /// Returns true if the page uses the compact row format.
    pub fn is_compact(&self) -> bool {
        (self.n_heap_raw & 0x8000) != 0
    }

    /// Returns true if this is a leaf-level page.
    pub fn is_leaf(&self) -> bool {
        self.level == 0
    }

    /// Human-readable insert direction.
    pub fn direction_name(&self) -> &'static str {
        match self.direction {
            PAGE_LEFT => "Left",
            PAGE_RIGHT => "Right",
            PAGE_SAME_REC => "Same Record",
            PAGE_SAME_PAGE => "Same Page",
            PAGE_NO_DIRECTION => "No Direction",
            _ => "Unknown",
        }
    }
}

/// FSEG (file segment) inode reference (10 bytes).
///
/// Two of these follow the INDEX header: the leaf segment and the non-leaf
/// segment of the index the page belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct FsegRef {
    /// Space ID of the inode.
    pub space_id: u32,
    /// Page number of the inode page.
    pub page_no: u32,
    /// Byte offset of the inode entry within that page.
    pub offset: u16,
}

impl FsegRef {
    pub(crate) fn decode(r: &mut PageReader<'_>, field: &'static str) -> Result<Self, IbdError> {
        Ok(FsegRef {
            space_id: r.read_u32(field)?,
            page_no: r.read_u32(field)?,
            offset: r.read_u16(field)?,
        })
    }
}

/// One entry of the page directory.
#[derive(Debug, Clone, Serialize)]
pub struct DirectorySlot {
    /// Slot index, 0 = infimum slot.
    pub index: usize,
    /// Raw slot value: data origin of the owning record.
    pub value: u16,
    /// Owned count taken from the owning record's header.
    pub owned: u8,
    /// Record type of the owning record.
    pub rec_type: RecordType,
    /// Arena index of the first record of this slot's run.
    pub rcb: Option<usize>,
    /// Arena index of the owning record (last of the run).
    pub rce: Option<usize>,
}

/// Decoded view of an INDEX page.
#[derive(Debug, Clone, Serialize)]
pub struct IndexPage {
    /// Page header.
    pub header: IndexHeader,
    /// Leaf segment inode reference.
    pub seg_leaf: FsegRef,
    /// Non-leaf segment inode reference.
    pub seg_top: FsegRef,
    /// Directory slots, index 0 = infimum slot.
    pub slots: Vec<DirectorySlot>,
    /// Record arena, threaded by `CompactRecord::next` in chain order.
    /// Empty unless the page was decoded with `parse_records`.
    pub records: Vec<CompactRecord>,
}

impl IndexPage {
    pub(crate) fn decode(
        data: &[u8],
        page_no: u64,
        options: &DecodeOptions,
    ) -> Result<Self, IbdError> {
        let mut r = PageReader::new(data, page_no);
        r.seek(FIL_PAGE_DATA);
        let header = IndexHeader::decode(&mut r)?;
        let seg_leaf = FsegRef::decode(&mut r, "btr_seg_leaf")?;
        let seg_top = FsegRef::decode(&mut r, "btr_seg_top")?;

        let mut slots = decode_directory(&r, page_no, &header)?;
        let records = if options.parse_records {
            decode_record_chain(&r, page_no, &header, &mut slots, options.pk_size)?
        } else {
            Vec::new()
        };

        Ok(IndexPage {
            header,
            seg_leaf,
            seg_top,
            slots,
            records,
        })
    }

    /// The record a slot's `rce`/`rcb` arena index refers to.
    pub fn record(&self, arena_index: usize) -> &CompactRecord {
        &self.records[arena_index]
    }
}

/// Reconstruct the directory slots.
///
/// The slot array occupies `[PAGE_SIZE - 8 - 2n, PAGE_SIZE - 8)` and is
/// walked backwards two bytes at a time, so the physically last slot bytes
/// become slot 0.
fn decode_directory(
    r: &PageReader<'_>,
    page_no: u64,
    header: &IndexHeader,
) -> Result<Vec<DirectorySlot>, IbdError> {
    let n = header.n_dir_slots as usize;
    let dir_end = PAGE_SIZE - SIZE_FIL_TRAILER;

    if n < 2 {
        return Err(IbdError::MalformedPage {
            page_no,
            field: "n_dir_slots",
            offset: FIL_PAGE_DATA + PAGE_N_DIR_SLOTS,
            reason: format!("{} directory slots, expected at least 2", n),
        });
    }
    if n * PAGE_DIR_SLOT_SIZE > dir_end {
        return Err(IbdError::MalformedPage {
            page_no,
            field: "n_dir_slots",
            offset: FIL_PAGE_DATA + PAGE_N_DIR_SLOTS,
            reason: format!("{} directory slots overrun the page", n),
        });
    }

    let mut slots = Vec::with_capacity(n);
    for index in 0..n {
        let pos = dir_end - PAGE_DIR_SLOT_SIZE * (index + 1);
        let value = r.u16_at(pos, "directory slot")?;
        let origin = value as usize;
        if !(REC_N_NEW_EXTRA_BYTES..PAGE_SIZE).contains(&origin) {
            return Err(IbdError::MalformedPage {
                page_no,
                field: "directory slot",
                offset: pos,
                reason: format!("slot {} offset 0x{:04X} outside page", index, value),
            });
        }
        let owner = CompactRecordHeader::decode_at(r.data(), origin, page_no)?;
        slots.push(DirectorySlot {
            index,
            value,
            owned: owner.owned,
            rec_type: owner.rec_type,
            rcb: None,
            rce: None,
        });
    }

    let first = &slots[0];
    if first.rec_type != RecordType::Infimum {
        return Err(IbdError::MalformedPage {
            page_no,
            field: "directory slot",
            offset: dir_end - PAGE_DIR_SLOT_SIZE,
            reason: "first slot does not point at the infimum record".to_string(),
        });
    }
    let last = &slots[n - 1];
    if last.rec_type != RecordType::Supremum {
        return Err(IbdError::MalformedPage {
            page_no,
            field: "directory slot",
            offset: dir_end - PAGE_DIR_SLOT_SIZE * n,
            reason: "last slot does not point at the supremum record".to_string(),
        });
    }

    Ok(slots)
}

/// Materialize the record chain into an arena, slot by slot.
///
/// The infimum slot owns exactly itself. Every later slot's run starts where
/// the previous record's `next_record` points and spans `owned` records; the
/// run's last record is the one the slot's value points at. The chain must
/// land on supremum after exactly `n_recs + 2` records.
fn decode_record_chain(
    r: &PageReader<'_>,
    page_no: u64,
    header: &IndexHeader,
    slots: &mut [DirectorySlot],
    pk_size: usize,
) -> Result<Vec<CompactRecord>, IbdError> {
    let chain_len = header.n_recs as usize + 2;
    let is_leaf = header.is_leaf();
    let mut records: Vec<CompactRecord> = Vec::with_capacity(chain_len);
    let mut prev: Option<usize> = None;

    let chain_error = |offset: usize| IbdError::MalformedPage {
        page_no,
        field: "next_record",
        offset,
        reason: "chain did not terminate".to_string(),
    };

    for slot in slots.iter_mut() {
        if slot.rec_type == RecordType::Infimum {
            // Infimum owns only itself and opens the chain.
            let hdr = CompactRecordHeader::decode_at(r.data(), slot.value as usize, page_no)?;
            records.push(CompactRecord {
                header: hdr,
                origin: slot.value,
                next: None,
                key: None,
                child_page_no: None,
            });
            let i = records.len() - 1;
            slot.rcb = Some(i);
            slot.rce = Some(i);
            prev = Some(i);
            continue;
        }

        let prev_index = prev.ok_or_else(|| IbdError::MalformedPage {
            page_no,
            field: "directory slot",
            offset: slot.value as usize,
            reason: "slot run precedes the infimum slot".to_string(),
        })?;
        let mut origin = {
            let p = &records[prev_index];
            p.origin.wrapping_add(p.header.next_record)
        };

        for _ in 0..slot.owned {
            if records.len() >= chain_len {
                return Err(chain_error(origin as usize));
            }
            let hdr = CompactRecordHeader::decode_at(r.data(), origin as usize, page_no)?;
            let mut rec = CompactRecord {
                header: hdr,
                origin,
                next: None,
                key: None,
                child_page_no: None,
            };
            if !rec.header.rec_type.is_system() {
                rec.key = Some(decode_key(r, origin as usize, pk_size)?);
                if !is_leaf {
                    rec.child_page_no = Some(r.u32_at(origin as usize + pk_size, "child page number")?);
                }
            }
            let next_origin = rec.origin.wrapping_add(rec.header.next_record);
            records.push(rec);
            let i = records.len() - 1;
            if slot.rcb.is_none() {
                slot.rcb = Some(i);
            }
            if let Some(p) = prev {
                records[p].next = Some(i);
            }
            prev = Some(i);
            origin = next_origin;
        }

        slot.rce = prev;
    }

    if records.len() != chain_len {
        return Err(chain_error(PAGE_SIZE));
    }
    match records.last() {
        Some(last) if last.header.rec_type == RecordType::Supremum => {}
        _ => return Err(chain_error(PAGE_SIZE)),
    }

    Ok(records)
}
