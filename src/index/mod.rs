//! On-Disk Index
//!
//! Linked-list maintenance over records in the bundle arena: bucket chains of
//! live records ([`chain`]) and the reclamation free list ([`freelist`]).
//! Both walk the same link field; which list a record belongs to is decided
//! solely by the root that reaches it.

pub mod chain;
pub mod freelist;

use crate::error::{BundleError, Result};
use crate::format::{BucketTable, Offset, RECORD_FIXED};

pub use chain::ChainHit;

/// Step limiter for chain walks.
///
/// No well-formed chain can hold more records than fit in the file, so
/// exceeding that bound means a link cycle; surfacing it as corruption beats
/// looping forever.
pub(crate) struct WalkGuard {
    steps: u64,
    max_steps: u64,
}

impl WalkGuard {
    pub(crate) fn new(file_len: u64) -> Self {
        Self {
            steps: 0,
            max_steps: file_len / RECORD_FIXED + 1,
        }
    }

    pub(crate) fn step(&mut self, at: Offset) -> Result<()> {
        self.steps += 1;
        if self.steps > self.max_steps {
            return Err(BundleError::CorruptContainer(format!(
                "link cycle detected at offset {at}"
            )));
        }
        Ok(())
    }
}

/// Reject offsets that point into the header or past end-of-file before any
/// record bytes are interpreted.
pub(crate) fn check_offset(table: &BucketTable, file_len: u64, at: Offset) -> Result<()> {
    if at.pos() < table.header_len() || at.pos() >= file_len {
        return Err(BundleError::CorruptContainer(format!(
            "offset {at} outside record area (header {} bytes, file {file_len} bytes)",
            table.header_len()
        )));
    }
    Ok(())
}
