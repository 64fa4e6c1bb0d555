use std::io::Write;

use crate::cli::{wprint, wprintln, write_json};
use crate::innodb::index::IndexPage;
use crate::innodb::page::{DecodeOptions, TypeFilter};
use crate::innodb::tablespace::Tablespace;
use crate::util::hex::format_hex16;
use crate::IbdError;

/// Options for the `innoisp dslots` subcommand.
pub struct DslotsOptions {
    /// Path to the InnoDB tablespace file (.ibd).
    pub file: String,
    /// Restrict output to one page number.
    pub page: Option<u64>,
    /// Show the record run each slot owns.
    pub recorders: bool,
    /// Primary key size in bytes (1, 2, 4, or 8).
    pub pksize: usize,
    /// Output in JSON format.
    pub json: bool,
}

/// Print the page directory of every index page.
///
/// One table per index page: slot index, raw slot offset, record type label
/// of the owning record, owned count, and the owner's decoded key. With
/// `--recorders` the record chain is reconstructed and each slot's ownership
/// run is printed as a chain of data origins.
pub fn execute(opts: &DslotsOptions, writer: &mut dyn Write) -> Result<(), IbdError> {
    let mut ts = Tablespace::open(&opts.file)?;

    let options = DecodeOptions {
        parse_records: opts.recorders,
        pk_size: opts.pksize,
        type_filter: TypeFilter::INDEX,
    };
    let pages = match opts.page {
        Some(no) => {
            let page = ts.read_page(no, &options)?;
            if page.as_index().is_none() {
                return Err(IbdError::BadOptions(format!(
                    "page {} is not an index page",
                    no
                )));
            }
            vec![page]
        }
        None => ts.walk(&options)?,
    };

    if opts.json {
        return write_json(writer, &pages);
    }

    for page in &pages {
        let index = match page.as_index() {
            Some(index) => index,
            None => continue,
        };
        wprintln!(writer, "\t\t\t==========PAGE {}==========", page.no)?;
        wprintln!(
            writer,
            "{:<8}{:<12}{:<12}{:<8}{:<8}",
            "slot",
            "offset",
            "type",
            "owned",
            "key"
        )?;
        for slot in &index.slots {
            wprint!(
                writer,
                "{:<8}{:<12}{:<12}{:<8}",
                slot.index,
                format_hex16(slot.value),
                slot.rec_type.label(),
                slot.owned
            )?;
            let owner_key = slot
                .rce
                .and_then(|rce| index.record(rce).key);
            match owner_key {
                Some(key) => wprintln!(writer, "{:<8}", key)?,
                None => wprintln!(writer)?,
            }

            if opts.recorders {
                print_run(index, slot.rcb, slot.rce, writer)?;
            }
        }
        wprintln!(writer)?;
    }
    Ok(())
}

fn print_run(
    index: &IndexPage,
    rcb: Option<usize>,
    rce: Option<usize>,
    writer: &mut dyn Write,
) -> Result<(), IbdError> {
    let (mut cursor, last) = match (rcb, rce) {
        (Some(b), Some(e)) => (b, e),
        _ => {
            wprintln!(writer, "No records found")?;
            return Ok(());
        }
    };

    wprint!(writer, "slot reference -> ")?;
    loop {
        let rec = index.record(cursor);
        match rec.key {
            Some(key) => wprint!(writer, "[{} key {}]", format_hex16(rec.origin), key)?,
            None => wprint!(writer, "[{} {}]", format_hex16(rec.origin), rec.header.rec_type.label())?,
        }
        if cursor == last {
            break;
        }
        match rec.next {
            Some(next) => {
                wprint!(writer, " -> ")?;
                cursor = next;
            }
            None => break,
        }
    }
    wprintln!(writer)?;
    Ok(())
}
