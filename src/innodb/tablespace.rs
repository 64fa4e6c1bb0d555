//! Tablespace file I/O.
//!
//! [`Tablespace`] is the entry point for opening a `.ibd` file. The file is
//! opened read-only and its length must be a whole multiple of the 16 KiB
//! page size. Pages can be read one at a time by number (absolute seek) or
//! streamed sequentially with [`Tablespace::walk`]; both paths hand each raw
//! buffer to the page decoder with a caller-supplied [`DecodeOptions`].
//!
//! One `Tablespace` drives one file descriptor with absolute seeks, so
//! concurrent use from multiple logical operations is not supported; callers
//! serialize.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use crate::innodb::constants::PAGE_SIZE;
use crate::innodb::page::{DecodeOptions, Page};
use crate::IbdError;

/// An open InnoDB single-table tablespace file.
pub struct Tablespace {
    file: File,
    file_size: u64,
    page_count: u64,
}

impl Tablespace {
    /// Open a tablespace file read-only.
    ///
    /// Fails with [`IbdError::Truncated`] if the file length is not a whole
    /// multiple of the page size.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IbdError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| IbdError::Io(format!("cannot open {}: {}", path.display(), e)))?;

        let file_size = file
            .metadata()
            .map_err(|e| IbdError::Io(format!("cannot stat {}: {}", path.display(), e)))?
            .len();

        if file_size % PAGE_SIZE as u64 != 0 {
            return Err(IbdError::Truncated(format!(
                "{} is {} bytes, not a multiple of the {} byte page size",
                path.display(),
                file_size,
                PAGE_SIZE
            )));
        }

        Ok(Tablespace {
            file,
            file_size,
            page_count: file_size / PAGE_SIZE as u64,
        })
    }

    /// Total number of pages in the file.
    pub fn page_count(&self) -> u64 {
        self.page_count
    }

    /// File size in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Read and decode a single page by number.
    pub fn read_page(&mut self, page_no: u64, options: &DecodeOptions) -> Result<Page, IbdError> {
        if page_no >= self.page_count {
            return Err(IbdError::BadOptions(format!(
                "page {} out of range (tablespace has {} pages)",
                page_no, self.page_count
            )));
        }

        let offset = page_no * PAGE_SIZE as u64;
        self.file
            .seek(SeekFrom::Start(offset))
            .map_err(|e| IbdError::Io(format!("cannot seek to page {}: {}", page_no, e)))?;

        let mut buf = vec![0u8; PAGE_SIZE];
        read_full_page(&mut self.file, &mut buf, page_no)?;

        Page::decode(page_no, &buf, options)
    }

    /// Read one raw, undecoded page buffer by number.
    pub fn read_raw(&mut self, page_no: u64) -> Result<Vec<u8>, IbdError> {
        if page_no >= self.page_count {
            return Err(IbdError::BadOptions(format!(
                "page {} out of range (tablespace has {} pages)",
                page_no, self.page_count
            )));
        }
        self.file
            .seek(SeekFrom::Start(page_no * PAGE_SIZE as u64))
            .map_err(|e| IbdError::Io(format!("cannot seek to page {}: {}", page_no, e)))?;
        let mut buf = vec![0u8; PAGE_SIZE];
        read_full_page(&mut self.file, &mut buf, page_no)?;
        Ok(buf)
    }

    /// Decode the whole file sequentially.
    ///
    /// Every page is decoded at least at the file-header level so page
    /// numbers stay sequential, but only pages passing the options' type
    /// filter are returned.
    pub fn walk(&mut self, options: &DecodeOptions) -> Result<Vec<Page>, IbdError> {
        options.validate()?;
        self.file
            .seek(SeekFrom::Start(0))
            .map_err(|e| IbdError::Io(format!("cannot seek to start: {}", e)))?;

        let mut pages = Vec::new();
        let mut buf = vec![0u8; PAGE_SIZE];
        for page_no in 0..self.page_count {
            read_full_page(&mut self.file, &mut buf, page_no)?;
            let page = Page::decode(page_no, &buf, options)?;
            if options.type_filter.contains(page.header.page_type) {
                pages.push(page);
            }
        }
        Ok(pages)
    }
}

fn read_full_page(file: &mut File, buf: &mut [u8], page_no: u64) -> Result<(), IbdError> {
    file.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            IbdError::Truncated(format!("short read on page {}", page_no))
        } else {
            IbdError::Io(format!("cannot read page {}: {}", page_no, e))
        }
    })
}
