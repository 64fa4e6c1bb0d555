use std::io::Write;

use crate::cli::{wprint, wprintln, write_json};
use crate::innodb::constants::{INODE_ARRAY_OFFSET, INODE_ENTRY_SIZE, INODE_FRAG_SLOTS};
use crate::innodb::page::{DecodeOptions, TypeFilter};
use crate::innodb::tablespace::Tablespace;
use crate::IbdError;

/// Options for the `innoisp inode` subcommand.
pub struct InodeOptions {
    /// Path to the InnoDB tablespace file (.ibd).
    pub file: String,
    /// Include unused inode entries.
    pub unused: bool,
    /// Append the fragment array of each entry.
    pub fragment: bool,
    /// Output in JSON format.
    pub json: bool,
}

/// Print the file segment inode tables.
///
/// One table per INODE page: the inode page list node, then a row per entry
/// with its byte offset, segment id, NOT_FULL usage, and the three extent
/// lists. Entries with segment id 0 are skipped unless `--unused` is given;
/// entries missing the initialization magic are flagged.
pub fn execute(opts: &InodeOptions, writer: &mut dyn Write) -> Result<(), IbdError> {
    let mut ts = Tablespace::open(&opts.file)?;

    let options = DecodeOptions {
        type_filter: TypeFilter::INODE,
        ..DecodeOptions::default()
    };
    let pages = ts.walk(&options)?;

    if opts.json {
        return write_json(writer, &pages);
    }

    for page in &pages {
        let inode = match page.as_inode() {
            Some(inode) => inode,
            None => continue,
        };
        wprintln!(
            writer,
            "\t\t\t==========PAGE {} OFFSET 0x{:04X}==========",
            page.no,
            page.offset
        )?;
        wprintln!(writer, "{:<51}", "page list")?;
        wprintln!(writer, "{:<51}", inode.list.display(38))?;
        wprintln!(writer)?;

        wprint!(
            writer,
            "{:<20}{:<10}{:<51}{:<51}{:<51}",
            "file segment id",
            "used(nf)",
            "free list",
            "not_full list",
            "full list"
        )?;
        if opts.fragment {
            wprint!(writer, "fragment array")?;
        }
        wprintln!(writer)?;

        for (ni, entry) in inode.entries.iter().enumerate() {
            if entry.is_unused() && !opts.unused {
                continue;
            }

            let offset = INODE_ARRAY_OFFSET + ni * INODE_ENTRY_SIZE;
            if entry.is_unused() {
                wprint!(writer, "0x{:08X}:{:<9}", offset, "<unused>")?;
            } else if !entry.is_initialized() {
                wprint!(writer, "0x{:08X}:{:<9}", offset, "<not initialized>")?;
            } else {
                wprint!(writer, "0x{:08X}:{:<9}", offset, entry.file_segment_id)?;
            }

            wprint!(writer, "{:<10}", entry.used_pages_in_not_full_list)?;
            wprint!(writer, "{:<51}", entry.free.display(8))?;
            wprint!(writer, "{:<51}", entry.not_full.display(8))?;
            wprint!(writer, "{:<51}", entry.full.display(8))?;

            if opts.fragment {
                let pages: Vec<u32> = entry.fragment_pages().collect();
                for p in &pages {
                    wprint!(writer, "{} ", p)?;
                }
                if pages.len() == INODE_FRAG_SLOTS {
                    wprint!(writer, "(extend allocate)")?;
                } else {
                    wprint!(writer, "(page allocate)")?;
                }
            }
            wprintln!(writer)?;
        }
        wprintln!(writer)?;
    }
    Ok(())
}
