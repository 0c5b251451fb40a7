//! Bucket Chains
//!
//! Traversal, tail insertion, and name lookup over the singly linked chain of
//! live records rooted at a bucket head. Names are compared
//! case-insensitively; new records always go to the tail, never the head, so
//! traversal order within a bucket is insertion order.

use tracing::trace;

use crate::error::Result;
use crate::format::{self, record, BucketTable, Offset, RecordHeader};
use crate::vfs::Medium;

use super::{check_offset, WalkGuard};

/// A record located in its chain
#[derive(Debug, Clone)]
pub struct ChainHit {
    /// Offset of the matching record
    pub offset: Offset,
    /// Offset of its predecessor in the chain; `NONE` when it is the head
    pub prev: Offset,
    /// Decoded prologue of the matching record
    pub header: RecordHeader,
}

/// Find a record by name in the given bucket.
///
/// Walks from the bucket head following link fields. Returns the hit together
/// with its predecessor offset so the caller can unlink without re-walking.
pub fn find<M: Medium + ?Sized>(
    medium: &mut M,
    table: &BucketTable,
    bucket: u32,
    name: &str,
) -> Result<Option<ChainHit>> {
    let file_len = format::medium_len(medium)?;
    let mut guard = WalkGuard::new(file_len);

    let mut prev = Offset::NONE;
    let mut current = table.read_bucket_head(medium, bucket)?;

    while current.is_some() {
        guard.step(current)?;
        check_offset(table, file_len, current)?;

        let header = record::read_header(medium, current)?;
        if format::names_equal(&header.name, name) {
            return Ok(Some(ChainHit {
                offset: current,
                prev,
                header,
            }));
        }

        prev = current;
        current = header.link;
    }

    Ok(None)
}

/// Append a freshly written record at the tail of its bucket's chain.
///
/// An empty chain gets its head set; otherwise the last record's link is
/// patched. The record at `new_offset` must already be fully serialized with
/// link = NONE, so the chain is never left dangling.
pub fn append_tail<M: Medium + ?Sized>(
    medium: &mut M,
    table: &BucketTable,
    bucket: u32,
    new_offset: Offset,
) -> Result<()> {
    let file_len = format::medium_len(medium)?;
    let mut guard = WalkGuard::new(file_len);

    let head = table.read_bucket_head(medium, bucket)?;
    if head.is_none() {
        trace!(bucket, offset = %new_offset, "new chain head");
        return table.write_bucket_head(medium, bucket, new_offset);
    }

    // Walk to the last record (link == NONE)
    let mut current = head;
    loop {
        guard.step(current)?;
        check_offset(table, file_len, current)?;

        let header = record::read_header(medium, current)?;
        if header.link.is_none() {
            trace!(bucket, tail = %current, offset = %new_offset, "appended to chain tail");
            return record::write_link(medium, current, new_offset);
        }
        current = header.link;
    }
}

/// Unlink a record from its bucket chain.
///
/// `prev` and `record_link` come from a preceding [`find`]; the head is
/// rewired when the record was first in the chain, otherwise the predecessor's
/// link skips over it. The record's own bytes are left untouched.
pub fn unlink<M: Medium + ?Sized>(
    medium: &mut M,
    table: &BucketTable,
    bucket: u32,
    prev: Offset,
    record_link: Offset,
) -> Result<()> {
    if prev.is_none() {
        table.write_bucket_head(medium, bucket, record_link)
    } else {
        record::write_link(medium, prev, record_link)
    }
}

/// Collect every live record in a bucket, in chain (insertion) order.
pub fn collect<M: Medium + ?Sized>(
    medium: &mut M,
    table: &BucketTable,
    bucket: u32,
) -> Result<Vec<(Offset, RecordHeader)>> {
    let file_len = format::medium_len(medium)?;
    let mut guard = WalkGuard::new(file_len);

    let mut records = Vec::new();
    let mut current = table.read_bucket_head(medium, bucket)?;

    while current.is_some() {
        guard.step(current)?;
        check_offset(table, file_len, current)?;

        let header = record::read_header(medium, current)?;
        let next = header.link;
        records.push((current, header));
        current = next;
    }

    Ok(records)
}
