//! Tests for chain and free-list maintenance
//!
//! These tests verify:
//! - Tail insertion and insertion-ordered traversal within a bucket
//! - Lookup returning the predecessor for later unlinking
//! - Head / middle / tail unlink rewiring
//! - Free-list push, capacity-based acquisition, and refusal
//! - Cycle detection instead of infinite walks

use std::io::{Cursor, Seek, SeekFrom};

use jbundle::error::BundleError;
use jbundle::format::{self, header::BucketTable, record, Offset};
use jbundle::index::{chain, freelist};

// =============================================================================
// Helper Functions
// =============================================================================

type Medium = Cursor<Vec<u8>>;

fn empty_bundle(bucket_count: u32) -> (Medium, BucketTable) {
    let mut medium = Cursor::new(Vec::new());
    let table = BucketTable::create(&mut medium, bucket_count).unwrap();
    (medium, table)
}

/// Serialize a record at end-of-file and link it into its bucket chain
fn append(medium: &mut Medium, table: &BucketTable, name: &str, content: &[u8]) -> Offset {
    let end = medium.seek(SeekFrom::End(0)).unwrap();
    let offset = Offset(u32::try_from(end).unwrap());
    record::write_record(medium, offset, Offset::NONE, name, 1_000, content).unwrap();
    let bucket = format::bucket_index(name, table.bucket_count());
    chain::append_tail(medium, table, bucket, offset).unwrap();
    offset
}

/// Names in a single-bucket bundle in their chain order
fn chain_names(medium: &mut Medium, table: &BucketTable) -> Vec<String> {
    chain::collect(medium, table, 0)
        .unwrap()
        .into_iter()
        .map(|(_, h)| h.name)
        .collect()
}

/// Delete the way the store does: find, unlink, push to the free list
fn delete(medium: &mut Medium, table: &BucketTable, name: &str) -> Offset {
    let bucket = format::bucket_index(name, table.bucket_count());
    let hit = chain::find(medium, table, bucket, name).unwrap().unwrap();
    chain::unlink(medium, table, bucket, hit.prev, hit.header.link).unwrap();
    freelist::push(medium, table, hit.offset).unwrap();
    hit.offset
}

// =============================================================================
// Chain Insertion Tests
// =============================================================================

#[test]
fn test_first_record_becomes_bucket_head() {
    let (mut medium, table) = empty_bundle(1);

    let offset = append(&mut medium, &table, "first.txt", b"1");
    assert_eq!(offset, Offset(table.header_len() as u32));
    assert_eq!(table.read_bucket_head(&mut medium, 0).unwrap(), offset);
}

#[test]
fn test_appends_go_to_chain_tail() {
    let (mut medium, table) = empty_bundle(1);

    let first = append(&mut medium, &table, "a.txt", b"1");
    append(&mut medium, &table, "b.txt", b"22");
    append(&mut medium, &table, "c.txt", b"333");

    // Head never moves; traversal is insertion order
    assert_eq!(table.read_bucket_head(&mut medium, 0).unwrap(), first);
    assert_eq!(
        chain_names(&mut medium, &table),
        vec!["a.txt", "b.txt", "c.txt"]
    );
}

#[test]
fn test_find_returns_offset_and_predecessor() {
    let (mut medium, table) = empty_bundle(1);

    let first = append(&mut medium, &table, "a.txt", b"1");
    let second = append(&mut medium, &table, "b.txt", b"2");
    let third = append(&mut medium, &table, "c.txt", b"3");

    let hit = chain::find(&mut medium, &table, 0, "a.txt").unwrap().unwrap();
    assert_eq!(hit.offset, first);
    assert_eq!(hit.prev, Offset::NONE);

    let hit = chain::find(&mut medium, &table, 0, "c.txt").unwrap().unwrap();
    assert_eq!(hit.offset, third);
    assert_eq!(hit.prev, second);
    assert_eq!(hit.header.link, Offset::NONE);
}

#[test]
fn test_find_is_case_insensitive() {
    let (mut medium, table) = empty_bundle(1);
    let offset = append(&mut medium, &table, "Dir\\File.TXT", b"x");

    let hit = chain::find(&mut medium, &table, 0, "dir\\file.txt")
        .unwrap()
        .unwrap();
    assert_eq!(hit.offset, offset);
    assert_eq!(hit.header.name, "Dir\\File.TXT");
}

#[test]
fn test_find_missing_name() {
    let (mut medium, table) = empty_bundle(1);
    append(&mut medium, &table, "a.txt", b"1");

    assert!(chain::find(&mut medium, &table, 0, "missing.txt")
        .unwrap()
        .is_none());
}

#[test]
fn test_find_in_empty_bucket() {
    let (mut medium, table) = empty_bundle(2);
    assert!(chain::find(&mut medium, &table, 1, "anything")
        .unwrap()
        .is_none());
}

// =============================================================================
// Unlink Tests
// =============================================================================

#[test]
fn test_unlink_head_rewires_bucket_head() {
    let (mut medium, table) = empty_bundle(1);
    append(&mut medium, &table, "a.txt", b"1");
    let second = append(&mut medium, &table, "b.txt", b"2");

    let freed = delete(&mut medium, &table, "a.txt");

    assert_eq!(table.read_bucket_head(&mut medium, 0).unwrap(), second);
    assert_eq!(chain_names(&mut medium, &table), vec!["b.txt"]);
    assert_eq!(table.read_free_head(&mut medium).unwrap(), freed);
}

#[test]
fn test_unlink_middle_preserves_relative_order() {
    let (mut medium, table) = empty_bundle(1);
    for name in ["n1", "n2", "n3", "n4", "n5"] {
        append(&mut medium, &table, name, b"x");
    }

    let freed = delete(&mut medium, &table, "n3");

    assert_eq!(chain_names(&mut medium, &table), vec!["n1", "n2", "n4", "n5"]);
    assert_eq!(table.read_free_head(&mut medium).unwrap(), freed);
}

#[test]
fn test_unlink_tail_terminates_chain() {
    let (mut medium, table) = empty_bundle(1);
    let first = append(&mut medium, &table, "a.txt", b"1");
    append(&mut medium, &table, "b.txt", b"2");

    delete(&mut medium, &table, "b.txt");

    assert_eq!(chain_names(&mut medium, &table), vec!["a.txt"]);
    let header = record::read_header(&mut medium, first).unwrap();
    assert_eq!(header.link, Offset::NONE);
}

#[test]
fn test_unlink_sole_record_empties_bucket() {
    let (mut medium, table) = empty_bundle(1);
    append(&mut medium, &table, "only.txt", b"1");

    delete(&mut medium, &table, "only.txt");

    assert_eq!(table.read_bucket_head(&mut medium, 0).unwrap(), Offset::NONE);
    assert!(chain_names(&mut medium, &table).is_empty());
}

// =============================================================================
// Free List Tests
// =============================================================================

#[test]
fn test_push_builds_lifo_free_chain() {
    let (mut medium, table) = empty_bundle(1);
    append(&mut medium, &table, "a.txt", b"1");
    append(&mut medium, &table, "b.txt", b"2");

    let freed_a = delete(&mut medium, &table, "a.txt");
    let freed_b = delete(&mut medium, &table, "b.txt");

    // Last freed is the head; its link reaches the earlier slot
    assert_eq!(table.read_free_head(&mut medium).unwrap(), freed_b);
    let header = record::read_header(&mut medium, freed_b).unwrap();
    assert_eq!(header.link, freed_a);
    let header = record::read_header(&mut medium, freed_a).unwrap();
    assert_eq!(header.link, Offset::NONE);
}

#[test]
fn test_acquire_returns_fitting_slot() {
    let (mut medium, table) = empty_bundle(1);
    append(&mut medium, &table, "a.txt", b"12345678");
    let freed = delete(&mut medium, &table, "a.txt");

    let slot = freelist::try_acquire(&mut medium, &table, 10).unwrap();
    assert_eq!(slot, Some(freed));
    // Acquired slot leaves the free chain
    assert_eq!(table.read_free_head(&mut medium).unwrap(), Offset::NONE);
}

#[test]
fn test_acquire_refuses_undersized_slots() {
    let (mut medium, table) = empty_bundle(1);
    append(&mut medium, &table, "a.txt", b"xy");
    let freed = delete(&mut medium, &table, "a.txt");
    let capacity = record::read_header(&mut medium, freed).unwrap().extent();

    let slot = freelist::try_acquire(&mut medium, &table, capacity + 1).unwrap();
    assert_eq!(slot, None);
    // Refused slot stays on the free chain
    assert_eq!(table.read_free_head(&mut medium).unwrap(), freed);

    // Exactly fitting is fine
    let slot = freelist::try_acquire(&mut medium, &table, capacity).unwrap();
    assert_eq!(slot, Some(freed));
}

#[test]
fn test_acquire_empty_free_list() {
    let (mut medium, table) = empty_bundle(1);
    assert_eq!(freelist::try_acquire(&mut medium, &table, 1).unwrap(), None);
}

#[test]
fn test_acquire_unlinks_from_middle_of_free_chain() {
    let (mut medium, table) = empty_bundle(1);
    append(&mut medium, &table, "big.bin", &[0u8; 64]);
    append(&mut medium, &table, "tiny", b"");
    let freed_big = delete(&mut medium, &table, "big.bin");
    let freed_tiny = delete(&mut medium, &table, "tiny");

    // Free chain is tiny -> big; only big can hold 50 bytes
    let slot = freelist::try_acquire(&mut medium, &table, 50).unwrap();
    assert_eq!(slot, Some(freed_big));

    // The head slot stays, now terminating the chain
    assert_eq!(table.read_free_head(&mut medium).unwrap(), freed_tiny);
    let header = record::read_header(&mut medium, freed_tiny).unwrap();
    assert_eq!(header.link, Offset::NONE);
}

// =============================================================================
// Corruption Tests
// =============================================================================

#[test]
fn test_cyclic_chain_detected() {
    let (mut medium, table) = empty_bundle(1);
    let offset = append(&mut medium, &table, "a.txt", b"1");

    // Point the record at itself
    record::write_link(&mut medium, offset, offset).unwrap();

    let result = chain::find(&mut medium, &table, 0, "other.txt");
    assert!(matches!(result, Err(BundleError::CorruptContainer(_))));
}

#[test]
fn test_head_pointing_into_header_detected() {
    let (mut medium, table) = empty_bundle(1);
    append(&mut medium, &table, "a.txt", b"1");

    // A head offset inside the header region is never a valid record start
    table.write_bucket_head(&mut medium, 0, Offset(4)).unwrap();

    let result = chain::find(&mut medium, &table, 0, "a.txt");
    assert!(matches!(result, Err(BundleError::CorruptContainer(_))));
}
