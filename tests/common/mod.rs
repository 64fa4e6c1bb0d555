//! Builders for synthetic InnoDB tablespace files.
//!
//! These construct byte-exact 16 KiB pages (FSP_HDR, INODE, INDEX with a
//! full compact record chain and page directory) so the integration tests
//! can drive the real decoding and search pipeline end to end.

#![allow(dead_code)]

use byteorder::{BigEndian, ByteOrder};
use std::io::Write;
use tempfile::NamedTempFile;

use innoisp::innodb::fsp::XDES_STATE_FSEG;
use innoisp::innodb::page_types::PageType;

pub use innoisp::innodb::constants::*;

/// Shorthand for the fixed page size.
pub const PS: usize = PAGE_SIZE;

/// First free byte after the supremum record's data.
const HEAP_START: usize = PAGE_NEW_SUPREMUM + 8;

/// Write the FIL header fields shared by every page, the trailer LSN, and a
/// valid CRC-32C checksum.
pub fn finish_page(page: &mut [u8], page_no: u32, page_type: PageType, lsn: u64) {
    BigEndian::write_u32(&mut page[FIL_PAGE_OFFSET..], page_no);
    BigEndian::write_u32(&mut page[FIL_PAGE_PREV..], FIL_NULL);
    BigEndian::write_u32(&mut page[FIL_PAGE_NEXT..], FIL_NULL);
    BigEndian::write_u64(&mut page[FIL_PAGE_LSN..], lsn);
    BigEndian::write_u16(&mut page[FIL_PAGE_TYPE..], page_type.as_u16());
    BigEndian::write_u32(&mut page[FIL_PAGE_ARCH_LOG_NO_OR_SPACE_ID..], 1);

    let trailer = PAGE_SIZE - SIZE_FIL_TRAILER;
    BigEndian::write_u32(&mut page[trailer + 4..], (lsn & 0xFFFF_FFFF) as u32);

    let crc1 = crc32c::crc32c(&page[FIL_PAGE_OFFSET..FIL_PAGE_FILE_FLUSH_LSN]);
    let crc2 = crc32c::crc32c(&page[FIL_PAGE_DATA..trailer]);
    BigEndian::write_u32(&mut page[FIL_PAGE_SPACE_OR_CHKSUM..], crc1 ^ crc2);
}

/// Build page 0: FSP_HDR with the space size filled in.
pub fn build_fsp_page(total_pages: u32) -> Vec<u8> {
    let mut page = vec![0u8; PAGE_SIZE];
    let fsp = FIL_PAGE_DATA;
    BigEndian::write_u32(&mut page[fsp + FSP_SPACE_ID..], 1);
    BigEndian::write_u32(&mut page[fsp + FSP_SIZE..], total_pages);
    BigEndian::write_u32(&mut page[fsp + FSP_FREE_LIMIT..], total_pages);
    BigEndian::write_u32(&mut page[fsp + FSP_FRAG_N_USED..], 3);
    BigEndian::write_u64(&mut page[fsp + FSP_SEG_ID..], 2);

    // Extent 0 belongs to segment 1 and has its tail pages free.
    let x0 = XDES_ARRAY_OFFSET;
    BigEndian::write_u64(&mut page[x0 + XDES_ID..], 1);
    BigEndian::write_u32(&mut page[x0 + XDES_STATE..], XDES_STATE_FSEG);
    for b in &mut page[x0 + XDES_BITMAP + 8..x0 + XDES_BITMAP + XDES_BITMAP_SIZE] {
        *b = 0xAA; // FREE bit of every pair in pages 32..64
    }

    finish_page(&mut page, 0, PageType::FspHdr, 100);
    page
}

/// Build an ALLOCATED filler page.
pub fn build_allocated_page(page_no: u32) -> Vec<u8> {
    let mut page = vec![0u8; PAGE_SIZE];
    finish_page(&mut page, page_no, PageType::Allocated, 100);
    page
}

/// Build page 2: INODE page whose entry 0 describes the clustered index.
///
/// `root` lands in fragment array slot 0; `magic` lets callers build an
/// uninitialized entry.
pub fn build_inode_page(root: u32, magic: u32) -> Vec<u8> {
    let mut page = vec![0u8; PAGE_SIZE];
    let e0 = INODE_ARRAY_OFFSET;
    BigEndian::write_u64(&mut page[e0 + FSEG_ID..], 1);
    BigEndian::write_u32(&mut page[e0 + FSEG_MAGIC_N..], magic);
    BigEndian::write_u32(&mut page[e0 + FSEG_FRAG_ARR..], root);
    for i in 1..INODE_FRAG_SLOTS {
        BigEndian::write_u32(&mut page[e0 + FSEG_FRAG_ARR + 4 * i..], FIL_NULL);
    }
    finish_page(&mut page, 2, PageType::Inode, 100);
    page
}

/// Description of one INDEX page to build.
pub struct IndexPageSpec {
    pub page_no: u32,
    /// B+Tree level, 0 = leaf.
    pub level: u16,
    /// Key width in bytes.
    pub pk_size: usize,
    /// Record keys in ascending order. Written verbatim (low `pk_size`
    /// bytes), so a caller can plant a raw sign bit.
    pub keys: Vec<u64>,
    /// Child page per key; required when level > 0.
    pub children: Vec<u32>,
    /// Largest run a non-system directory slot may own.
    pub max_owned: usize,
}

impl IndexPageSpec {
    pub fn leaf(page_no: u32, keys: &[u64]) -> Self {
        IndexPageSpec {
            page_no,
            level: 0,
            pk_size: 8,
            keys: keys.to_vec(),
            children: Vec::new(),
            max_owned: 8,
        }
    }

    pub fn internal(page_no: u32, level: u16, keys: &[u64], children: &[u32]) -> Self {
        IndexPageSpec {
            page_no,
            level,
            pk_size: 8,
            keys: keys.to_vec(),
            children: children.to_vec(),
            max_owned: 8,
        }
    }

    pub fn with_pk_size(mut self, pk_size: usize) -> Self {
        self.pk_size = pk_size;
        self
    }

    pub fn with_max_owned(mut self, max_owned: usize) -> Self {
        self.max_owned = max_owned;
        self
    }

    fn stride(&self) -> usize {
        REC_N_NEW_EXTRA_BYTES + self.pk_size + if self.level > 0 { 4 } else { 0 }
    }

    /// Data origin of user record `i`.
    pub fn origin_of(&self, i: usize) -> usize {
        HEAP_START + i * self.stride() + REC_N_NEW_EXTRA_BYTES
    }
}

fn write_rec_header(
    page: &mut [u8],
    origin: usize,
    byte0: u8,
    heap_no: u16,
    rec_type: u8,
    next_origin: usize,
) {
    let h = origin - REC_N_NEW_EXTRA_BYTES;
    page[h] = byte0;
    page[h + 1] = (heap_no >> 5) as u8;
    page[h + 2] = (((heap_no & 0x1F) as u8) << 3) | (rec_type & 0x07);
    let next = (next_origin as u16).wrapping_sub(origin as u16);
    BigEndian::write_u16(&mut page[h + 3..], next);
}

/// Build a compact-format INDEX page with a well-formed record chain and
/// page directory.
pub fn build_index_page(spec: &IndexPageSpec) -> Vec<u8> {
    assert!(spec.level == 0 || spec.children.len() == spec.keys.len());

    let mut page = vec![0u8; PAGE_SIZE];
    let n = spec.keys.len();
    let stride = spec.stride();

    // Slot plan: infimum owns itself, full runs of max_owned records get
    // their own slot, the tail plus supremum goes to the supremum slot.
    let full_runs = n / spec.max_owned;
    let tail = n % spec.max_owned;
    let n_dir_slots = 2 + full_runs;

    // Page header.
    let ph = FIL_PAGE_DATA;
    BigEndian::write_u16(&mut page[ph + PAGE_N_DIR_SLOTS..], n_dir_slots as u16);
    let heap_top = if n == 0 {
        HEAP_START
    } else {
        spec.origin_of(n - 1) + stride - REC_N_NEW_EXTRA_BYTES
    };
    BigEndian::write_u16(&mut page[ph + PAGE_HEAP_TOP..], heap_top as u16);
    BigEndian::write_u16(&mut page[ph + PAGE_N_HEAP..], 0x8000 | (n as u16 + 2));
    BigEndian::write_u16(&mut page[ph + PAGE_DIRECTION..], PAGE_NO_DIRECTION);
    BigEndian::write_u16(&mut page[ph + PAGE_N_RECS..], n as u16);
    BigEndian::write_u16(&mut page[ph + PAGE_LEVEL..], spec.level);
    BigEndian::write_u64(&mut page[ph + PAGE_INDEX_ID..], 23);
    // FSEG references: inode page 2, entry 0.
    BigEndian::write_u32(&mut page[ph + PAGE_BTR_SEG_LEAF..], 1);
    BigEndian::write_u32(&mut page[ph + PAGE_BTR_SEG_LEAF + 4..], 2);
    BigEndian::write_u16(&mut page[ph + PAGE_BTR_SEG_LEAF + 8..], INODE_ARRAY_OFFSET as u16);
    BigEndian::write_u32(&mut page[ph + PAGE_BTR_SEG_TOP..], 1);
    BigEndian::write_u32(&mut page[ph + PAGE_BTR_SEG_TOP + 4..], 2);
    BigEndian::write_u16(&mut page[ph + PAGE_BTR_SEG_TOP + 8..], INODE_ARRAY_OFFSET as u16);

    // System records.
    let first_origin = if n == 0 { PAGE_NEW_SUPREMUM } else { spec.origin_of(0) };
    write_rec_header(&mut page, PAGE_NEW_INFIMUM, 0x01, 0, 2, first_origin);
    page[PAGE_NEW_INFIMUM..PAGE_NEW_INFIMUM + 8].copy_from_slice(b"infimum\0");
    let sup_owned = (tail + 1) as u8;
    write_rec_header(&mut page, PAGE_NEW_SUPREMUM, sup_owned, 1, 3, PAGE_NEW_SUPREMUM);
    page[PAGE_NEW_SUPREMUM..PAGE_NEW_SUPREMUM + 8].copy_from_slice(b"supremum");

    // User records.
    for (i, &key) in spec.keys.iter().enumerate() {
        let origin = spec.origin_of(i);
        let next_origin = if i + 1 < n { spec.origin_of(i + 1) } else { PAGE_NEW_SUPREMUM };
        let is_run_end = (i + 1) % spec.max_owned == 0 && (i + 1) / spec.max_owned <= full_runs;
        let owned = if is_run_end { spec.max_owned as u8 } else { 0 };
        let min_rec = if spec.level > 0 && i == 0 { 0x10 } else { 0 };
        let rec_type = if spec.level > 0 { 1 } else { 0 };
        write_rec_header(&mut page, origin, owned | min_rec, (i + 2) as u16, rec_type, next_origin);

        match spec.pk_size {
            1 => page[origin] = key as u8,
            2 => BigEndian::write_u16(&mut page[origin..], key as u16),
            4 => BigEndian::write_u32(&mut page[origin..], key as u32),
            8 => BigEndian::write_u64(&mut page[origin..], key),
            other => panic!("unsupported pk size {other}"),
        }
        if spec.level > 0 {
            BigEndian::write_u32(&mut page[origin + spec.pk_size..], spec.children[i]);
        }
    }

    // Directory, written backwards from just before the trailer.
    let dir_end = PAGE_SIZE - SIZE_FIL_TRAILER;
    let mut slot_values = Vec::with_capacity(n_dir_slots);
    slot_values.push(PAGE_NEW_INFIMUM as u16);
    for run in 0..full_runs {
        let owner = spec.origin_of((run + 1) * spec.max_owned - 1);
        slot_values.push(owner as u16);
    }
    slot_values.push(PAGE_NEW_SUPREMUM as u16);
    for (k, value) in slot_values.iter().enumerate() {
        BigEndian::write_u16(&mut page[dir_end - PAGE_DIR_SLOT_SIZE * (k + 1)..], *value);
    }

    finish_page(&mut page, spec.page_no, PageType::Index, 100);
    page
}

/// Write a synthetic multi-page tablespace to a temp file.
pub fn write_tablespace(pages: &[Vec<u8>]) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().expect("create temp file");
    for page in pages {
        tmp.write_all(page).expect("write page");
    }
    tmp.flush().expect("flush");
    tmp
}

/// A 4-page tablespace whose clustered index is the single page `root`.
pub fn single_level_tablespace(root_page: Vec<u8>) -> NamedTempFile {
    write_tablespace(&[
        build_fsp_page(4),
        build_allocated_page(1),
        build_inode_page(3, INODE_MAGIC),
        root_page,
    ])
}
