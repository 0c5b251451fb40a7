//! Free List
//!
//! Intrusive singly linked list of reclaimed record slots, rooted at the
//! header's free head. Deleted records are pushed here; creates may acquire a
//! slot back before growing the file. Reuse is an optimization only: a store
//! that always appends is fully format-compatible.

use tracing::{debug, trace};

use crate::error::Result;
use crate::format::{self, record, BucketTable, Offset};
use crate::vfs::Medium;

use super::{check_offset, WalkGuard};

/// Push a reclaimed slot onto the free list.
///
/// Classic intrusive push: the record's link becomes the old free head, the
/// free head becomes the record. The caller must have unlinked the record
/// from its bucket chain first, so it is never reachable from both roots.
pub fn push<M: Medium + ?Sized>(
    medium: &mut M,
    table: &BucketTable,
    offset: Offset,
) -> Result<()> {
    let head = table.read_free_head(medium)?;
    record::write_link(medium, offset, head)?;
    table.write_free_head(medium, offset)?;
    trace!(offset = %offset, "slot pushed to free list");
    Ok(())
}

/// Acquire a reclaimed slot with at least `required` bytes of extent.
///
/// First-fit scan of the free chain. A hit is unlinked from the chain and
/// returned for reuse; `None` means the caller must append at end-of-file.
/// When a record smaller than the slot is written into it the leftover tail
/// is leaked rather than split, so capacities only ever shrink.
pub fn try_acquire<M: Medium + ?Sized>(
    medium: &mut M,
    table: &BucketTable,
    required: u64,
) -> Result<Option<Offset>> {
    let file_len = format::medium_len(medium)?;
    let mut guard = WalkGuard::new(file_len);

    let mut prev = Offset::NONE;
    let mut current = table.read_free_head(medium)?;

    while current.is_some() {
        guard.step(current)?;
        check_offset(table, file_len, current)?;

        let header = record::read_header(medium, current)?;
        if header.extent() >= required {
            // Unlink from the free chain
            if prev.is_none() {
                table.write_free_head(medium, header.link)?;
            } else {
                record::write_link(medium, prev, header.link)?;
            }
            debug!(
                offset = %current,
                capacity = header.extent(),
                required,
                "reusing reclaimed slot"
            );
            return Ok(Some(current));
        }

        prev = current;
        current = header.link;
    }

    Ok(None)
}
