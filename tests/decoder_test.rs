//! Integration tests for the page decoder and file walker.
//!
//! Synthetic tablespaces are built byte-by-byte (see `common`) and run
//! through the real `Tablespace`/`Page` pipeline.

mod common;

use byteorder::{BigEndian, ByteOrder};
use std::io::Write;
use tempfile::NamedTempFile;

use common::*;
use innoisp::innodb::page::{DecodeOptions, Page, PageBody, TypeFilter};
use innoisp::innodb::page_types::PageType;
use innoisp::innodb::record::RecordType;
use innoisp::innodb::tablespace::Tablespace;
use innoisp::IbdError;

fn records_on(keys: &[u64]) -> innoisp::innodb::index::IndexPage {
    let page = build_index_page(&IndexPageSpec::leaf(3, keys).with_max_owned(4));
    let opts = DecodeOptions {
        parse_records: true,
        ..DecodeOptions::default()
    };
    match Page::decode(3, &page, &opts).unwrap().body {
        PageBody::Index(index) => index,
        _ => panic!("expected an index body"),
    }
}

// ---------- Directory slot and record chain invariants ----------

#[test]
fn test_owned_counts_sum_to_n_recs_plus_two() {
    for n in [0usize, 1, 3, 4, 8, 9, 20] {
        let keys: Vec<u64> = (1..=n as u64).collect();
        let index = records_on(&keys);
        let total: u32 = index.slots.iter().map(|s| s.owned as u32).sum();
        assert_eq!(total, index.header.n_recs as u32 + 2, "n = {n}");
    }
}

#[test]
fn test_chain_walk_reaches_supremum_in_n_recs_plus_two_steps() {
    let index = records_on(&[2, 4, 6, 8, 10, 12, 14]);
    let mut cursor = index.slots[0].rcb.unwrap();
    let last = index.slots.last().unwrap().rce.unwrap();
    let mut steps = 1;
    while cursor != last {
        cursor = index.record(cursor).next.expect("chain must continue");
        steps += 1;
    }
    assert_eq!(steps, index.header.n_recs as usize + 2);
    assert_eq!(index.record(last).header.rec_type, RecordType::Supremum);
}

#[test]
fn test_keys_strictly_increase_along_chain() {
    let index = records_on(&[1, 2, 3, 10, 50, 51, 52, 53, 900]);
    let mut cursor = Some(index.slots[0].rcb.unwrap());
    let mut previous: Option<u64> = None;
    while let Some(i) = cursor {
        if let Some(key) = index.record(i).key {
            if let Some(prev) = previous {
                assert!(key > prev, "{key} must exceed {prev}");
            }
            previous = Some(key);
        }
        cursor = index.record(i).next;
    }
    assert_eq!(previous, Some(900));
}

#[test]
fn test_slot_runs_are_consistent() {
    let index = records_on(&(1..=11).collect::<Vec<u64>>());
    assert!(index.slots.len() > 3, "want a multi-slot directory");

    for pair in index.slots.windows(2) {
        let (prev, slot) = (&pair[0], &pair[1]);
        let rce = slot.rce.unwrap();
        // The owner's header carries the slot's owned count and the slot
        // value points at the owner's data origin.
        assert_eq!(index.record(rce).header.owned, slot.owned);
        assert_eq!(index.record(rce).origin, slot.value);
        // The run starts right after the previous slot's owner.
        let after_prev = index.record(prev.rce.unwrap()).next.unwrap();
        assert_eq!(slot.rcb.unwrap(), after_prev);
        // Walking rcb..=rce takes exactly `owned` records.
        let mut cursor = slot.rcb.unwrap();
        let mut count = 1;
        while cursor != rce {
            cursor = index.record(cursor).next.unwrap();
            count += 1;
        }
        assert_eq!(count, slot.owned as usize);
    }
}

#[test]
fn test_infimum_slot_owns_itself() {
    let index = records_on(&[5, 6]);
    let slot = &index.slots[0];
    assert_eq!(slot.rec_type, RecordType::Infimum);
    assert_eq!(slot.owned, 1);
    assert_eq!(slot.rcb, slot.rce);
    assert_eq!(index.record(slot.rce.unwrap()).origin as usize, PAGE_NEW_INFIMUM);
}

// ---------- Round-trip re-encoding ----------

#[test]
fn test_reencoding_reproduces_original_bytes() {
    let raw = build_index_page(&IndexPageSpec::leaf(3, &[7, 8, 9]).with_max_owned(2));
    let opts = DecodeOptions {
        parse_records: true,
        ..DecodeOptions::default()
    };
    let page = Page::decode(3, &raw, &opts).unwrap();
    let index = page.as_index().unwrap();

    // File header.
    let mut head = vec![0u8; SIZE_FIL_HEAD];
    BigEndian::write_u32(&mut head[FIL_PAGE_SPACE_OR_CHKSUM..], page.header.space_or_checksum);
    BigEndian::write_u32(&mut head[FIL_PAGE_OFFSET..], page.header.offset);
    BigEndian::write_u32(&mut head[FIL_PAGE_PREV..], page.header.prev);
    BigEndian::write_u32(&mut head[FIL_PAGE_NEXT..], page.header.next);
    BigEndian::write_u64(&mut head[FIL_PAGE_LSN..], page.header.lsn);
    BigEndian::write_u16(&mut head[FIL_PAGE_TYPE..], page.header.page_type.as_u16());
    BigEndian::write_u64(&mut head[FIL_PAGE_FILE_FLUSH_LSN..], page.header.flush_lsn);
    BigEndian::write_u32(&mut head[FIL_PAGE_ARCH_LOG_NO_OR_SPACE_ID..], page.header.space_id);
    assert_eq!(&raw[..SIZE_FIL_HEAD], &head[..]);

    // Page index header including both segment references.
    let mut ph = vec![0u8; PAGE_HEADER_SIZE];
    BigEndian::write_u16(&mut ph[PAGE_N_DIR_SLOTS..], index.header.n_dir_slots);
    BigEndian::write_u16(&mut ph[PAGE_HEAP_TOP..], index.header.heap_top);
    BigEndian::write_u16(&mut ph[PAGE_N_HEAP..], index.header.n_heap_raw);
    BigEndian::write_u16(&mut ph[PAGE_FREE..], index.header.free);
    BigEndian::write_u16(&mut ph[PAGE_GARBAGE..], index.header.garbage);
    BigEndian::write_u16(&mut ph[PAGE_LAST_INSERT..], index.header.last_insert);
    BigEndian::write_u16(&mut ph[PAGE_DIRECTION..], index.header.direction);
    BigEndian::write_u16(&mut ph[PAGE_N_DIRECTION..], index.header.n_direction);
    BigEndian::write_u16(&mut ph[PAGE_N_RECS..], index.header.n_recs);
    BigEndian::write_u64(&mut ph[PAGE_MAX_TRX_ID..], index.header.max_trx_id);
    BigEndian::write_u16(&mut ph[PAGE_LEVEL..], index.header.level);
    BigEndian::write_u64(&mut ph[PAGE_INDEX_ID..], index.header.index_id);
    BigEndian::write_u32(&mut ph[PAGE_BTR_SEG_LEAF..], index.seg_leaf.space_id);
    BigEndian::write_u32(&mut ph[PAGE_BTR_SEG_LEAF + 4..], index.seg_leaf.page_no);
    BigEndian::write_u16(&mut ph[PAGE_BTR_SEG_LEAF + 8..], index.seg_leaf.offset);
    BigEndian::write_u32(&mut ph[PAGE_BTR_SEG_TOP..], index.seg_top.space_id);
    BigEndian::write_u32(&mut ph[PAGE_BTR_SEG_TOP + 4..], index.seg_top.page_no);
    BigEndian::write_u16(&mut ph[PAGE_BTR_SEG_TOP + 8..], index.seg_top.offset);
    assert_eq!(&raw[FIL_PAGE_DATA..FIL_PAGE_DATA + PAGE_HEADER_SIZE], &ph[..]);

    // Directory slot array, slot 0 in the last two bytes before the trailer.
    let dir_end = PS - SIZE_FIL_TRAILER;
    let mut dir = vec![0u8; PAGE_DIR_SLOT_SIZE * index.slots.len()];
    for slot in &index.slots {
        let pos = dir.len() - PAGE_DIR_SLOT_SIZE * (slot.index + 1);
        BigEndian::write_u16(&mut dir[pos..], slot.value);
    }
    assert_eq!(&raw[dir_end - dir.len()..dir_end], &dir[..]);
}

// ---------- Key widths ----------

#[test]
fn test_key_decoding_masks_sign_bit_for_every_width() {
    for (pk_size, stored, want) in [
        (1usize, 0x85u64, 5u64),
        (2, 0x8005, 5),
        (4, 0x8000_0001, 1),
        (8, 0x8000_0000_0000_002A, 42),
    ] {
        let spec = IndexPageSpec::leaf(3, &[stored]).with_pk_size(pk_size);
        let raw = build_index_page(&spec);
        let opts = DecodeOptions {
            parse_records: true,
            pk_size,
            ..DecodeOptions::default()
        };
        let page = Page::decode(3, &raw, &opts).unwrap();
        let index = page.as_index().unwrap();
        let keys: Vec<u64> = index.records.iter().filter_map(|r| r.key).collect();
        assert_eq!(keys, vec![want], "pk_size = {pk_size}");
    }
}

// ---------- Malformed pages ----------

#[test]
fn test_cyclic_chain_fails_to_decode() {
    let spec = IndexPageSpec::leaf(3, &[1, 2, 3]);
    let mut raw = build_index_page(&spec);
    // Point the last record back at the first: the chain can no longer
    // reach supremum.
    let last = spec.origin_of(2);
    let back = (spec.origin_of(0) as u16).wrapping_sub(last as u16);
    BigEndian::write_u16(&mut raw[last - REC_N_NEW_EXTRA_BYTES + 3..], back);

    let opts = DecodeOptions {
        parse_records: true,
        ..DecodeOptions::default()
    };
    match Page::decode(3, &raw, &opts) {
        Err(IbdError::MalformedPage { reason, .. }) => {
            assert_eq!(reason, "chain did not terminate");
        }
        other => panic!("expected a malformed page, got {other:?}"),
    }
}

#[test]
fn test_slot_pointing_outside_page_fails_to_decode() {
    let mut raw = build_index_page(&IndexPageSpec::leaf(3, &[1]));
    let dir_end = PS - SIZE_FIL_TRAILER;
    BigEndian::write_u16(&mut raw[dir_end - 2 * PAGE_DIR_SLOT_SIZE..], 0xFFFE);
    let err = Page::decode(3, &raw, &DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, IbdError::MalformedPage { .. }));
}

// ---------- FSP / inode bodies through the full pipeline ----------

#[test]
fn test_fsp_body_decodes_extents() {
    let tmp = single_level_tablespace(build_index_page(&IndexPageSpec::leaf(3, &[1])));
    let mut ts = Tablespace::open(tmp.path()).unwrap();
    let page = ts.read_page(0, &DecodeOptions::default()).unwrap();
    let fsp = page.as_fsp().expect("page 0 is FSP_HDR");

    let header = fsp.header.as_ref().expect("page 0 carries the header");
    assert_eq!(header.space_id, 1);
    assert_eq!(header.size, 4);
    assert_eq!(header.frag_n_used, 3);
    assert_eq!(header.next_unused_seg_id, 2);

    assert_eq!(fsp.extents.len(), 256);
    let x0 = &fsp.extents[0];
    assert_eq!(x0.file_segment_id, 1);
    assert_eq!(x0.state_name(), "FSEG");
    assert!(!x0.page_is_free(0));
    assert!(x0.page_is_free(32));
    assert_eq!(x0.free_pages(), 32);
}

#[test]
fn test_inode_body_decodes_entries() {
    let tmp = single_level_tablespace(build_index_page(&IndexPageSpec::leaf(3, &[1])));
    let mut ts = Tablespace::open(tmp.path()).unwrap();
    let page = ts.read_page(2, &DecodeOptions::default()).unwrap();
    let inode = page.as_inode().expect("page 2 is INODE");

    assert_eq!(inode.entries.len(), 85);
    let entry = &inode.entries[0];
    assert!(entry.is_initialized());
    assert_eq!(entry.fragment_pages().collect::<Vec<_>>(), vec![3]);
    assert!(inode.entries[1].is_unused());
}

// ---------- Walker behavior ----------

#[test]
fn test_walk_reports_every_page_in_order() {
    let tmp = single_level_tablespace(build_index_page(&IndexPageSpec::leaf(3, &[1, 2])));
    let mut ts = Tablespace::open(tmp.path()).unwrap();
    let pages = ts.walk(&DecodeOptions::default()).unwrap();
    assert_eq!(pages.len(), 4);
    assert_eq!(pages.iter().map(|p| p.no).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    assert_eq!(
        pages.iter().map(|p| p.offset).collect::<Vec<_>>(),
        vec![0, PS as u64, 2 * PS as u64, 3 * PS as u64]
    );
    assert_eq!(pages[0].header.page_type, PageType::FspHdr);
    assert_eq!(pages[3].header.page_type, PageType::Index);
}

#[test]
fn test_walk_type_filter_drops_pages_but_numbers_survivors_correctly() {
    let tmp = single_level_tablespace(build_index_page(&IndexPageSpec::leaf(3, &[1, 2])));
    let mut ts = Tablespace::open(tmp.path()).unwrap();
    let opts = DecodeOptions {
        type_filter: TypeFilter::INDEX,
        ..DecodeOptions::default()
    };
    let pages = ts.walk(&opts).unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].no, 3);
}

#[test]
fn test_partial_trailing_page_is_truncated() {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(&build_fsp_page(2)).unwrap();
    tmp.write_all(&vec![0u8; 1000]).unwrap();
    tmp.flush().unwrap();
    assert!(matches!(
        Tablespace::open(tmp.path()),
        Err(IbdError::Truncated(_))
    ));
}

#[test]
fn test_decode_failure_reports_page_and_field() {
    let mut raw = build_index_page(&IndexPageSpec::leaf(3, &[1]));
    BigEndian::write_u16(&mut raw[FIL_PAGE_DATA + PAGE_N_DIR_SLOTS..], 1);
    match Page::decode(3, &raw, &DecodeOptions::default()) {
        Err(IbdError::MalformedPage { page_no, field, .. }) => {
            assert_eq!(page_no, 3);
            assert_eq!(field, "n_dir_slots");
        }
        other => panic!("expected a malformed page, got {other:?}"),
    }
}
