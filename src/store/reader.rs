//! Lazy Read Stream
//!
//! Read handle returned by `BundleStore::open_file`. Bounded to exactly the
//! record's payload extent; bytes are fetched from the backing medium on
//! demand rather than materialized up front.

use std::io::{self, Read, Seek, SeekFrom};

use crate::format::RecordHeader;

use super::BundleStore;

/// Read-only, seekable view over one committed record's payload.
pub struct BundleReader<'a> {
    store: &'a mut BundleStore,
    name: String,
    size: u64,
    modified: u64,
    /// File position of the first payload byte
    start: u64,
    /// Cursor within the payload, 0..=size
    pos: u64,
}

impl<'a> BundleReader<'a> {
    pub(crate) fn new(store: &'a mut BundleStore, header: RecordHeader) -> Self {
        Self {
            store,
            name: header.name,
            size: u64::from(header.size),
            modified: header.modified,
            start: header.content_offset,
            pos: 0,
        }
    }

    /// Stored name of the record being read
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Payload size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Modified timestamp, unix milliseconds
    pub fn modified(&self) -> u64 {
        self.modified
    }
}

impl Read for BundleReader<'_> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if self.pos >= self.size {
            return Ok(0);
        }
        let remaining = (self.size - self.pos) as usize;
        let want = out.len().min(remaining);

        self.store
            .medium
            .seek(SeekFrom::Start(self.start + self.pos))?;
        let n = self.store.medium.read(&mut out[..want])?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for BundleReader<'_> {
    fn seek(&mut self, from: SeekFrom) -> io::Result<u64> {
        let target = match from {
            SeekFrom::Start(off) => off as i64,
            SeekFrom::End(delta) => self.size as i64 + delta,
            SeekFrom::Current(delta) => self.pos as i64 + delta,
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of record payload",
            ));
        }
        self.pos = target as u64;
        Ok(self.pos)
    }
}
