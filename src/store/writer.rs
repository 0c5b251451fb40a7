//! Deferred Write Stream
//!
//! Write handle returned by `BundleStore::create_file`. Content accumulates
//! in memory; nothing reaches the bundle's index until [`BundleWriter::close`]
//! runs, which commits exactly once. A writer dropped without closing commits
//! nothing: no bucket or free-list pointer ever references its bytes, so the
//! container's structure is unaffected.

use std::io::{self, Write};
use std::mem;

use bytes::BytesMut;

use tracing::warn;

use crate::error::Result;

use super::{unix_millis_now, BundleStore};

/// Write-only byte sink bound to one pending record.
pub struct BundleWriter<'a> {
    store: &'a mut BundleStore,
    name: String,
    buf: BytesMut,
    /// Timestamp to record at commit; defaults to "now" at close
    modified: Option<u64>,
    committed: bool,
}

impl<'a> BundleWriter<'a> {
    pub(crate) fn new(store: &'a mut BundleStore, name: &str) -> Self {
        Self {
            store,
            name: name.to_string(),
            buf: BytesMut::new(),
            modified: None,
            committed: false,
        }
    }

    /// Name this writer will commit under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bytes buffered so far
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Override the modified timestamp recorded at commit (unix milliseconds)
    pub fn set_modified(&mut self, modified: u64) {
        self.modified = Some(modified);
    }

    /// Commit the buffered content as one record and link it into its bucket.
    ///
    /// Consuming `self` makes a double commit unrepresentable; this is the
    /// sole commit point.
    pub fn close(mut self) -> Result<()> {
        let name = mem::take(&mut self.name);
        let buf = mem::take(&mut self.buf);
        let modified = self.modified.unwrap_or_else(unix_millis_now);

        self.committed = true;
        self.store.commit(&name, modified, &buf)?;
        Ok(())
    }
}

impl Write for BundleWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for BundleWriter<'_> {
    fn drop(&mut self) {
        if !self.committed {
            warn!(
                name = %self.name,
                buffered = self.buf.len(),
                "write stream dropped without close; record not committed"
            );
        }
    }
}
