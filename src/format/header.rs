//! Bucket Table
//!
//! Parses and writes the fixed-size header: magic, version, bucket count, the
//! bucket head array, and the free-list head. All head reads and writes are
//! positional 4-byte accesses at offsets derived from the bucket count, which
//! is fixed for the lifetime of a bundle file (no rehashing).

use std::io::SeekFrom;

use crate::error::{BundleError, Result};
use crate::vfs::Medium;

use super::{read_u32_at, write_u32_at, Offset, HEADER_PREFIX, MAGIC, VERSION};

/// Parsed bundle header; handle for positional head accesses.
#[derive(Debug, Clone)]
pub struct BucketTable {
    version: u8,
    bucket_count: u32,
}

impl BucketTable {
    /// Write a fresh all-zero table to an empty medium
    pub fn create<M: Medium + ?Sized>(medium: &mut M, bucket_count: u32) -> Result<Self> {
        if bucket_count == 0 {
            return Err(BundleError::Config(
                "bucket count must be at least 1".to_string(),
            ));
        }

        medium.seek(SeekFrom::Start(0))?;
        medium.write_all(MAGIC)?;
        medium.write_all(&[VERSION])?;
        medium.write_all(&bucket_count.to_le_bytes())?;

        // Bucket heads and free head all start at "no record"
        let zeros = vec![0u8; 4 * bucket_count as usize + 4];
        medium.write_all(&zeros)?;
        medium.flush()?;

        Ok(Self {
            version: VERSION,
            bucket_count,
        })
    }

    /// Parse the header of an existing bundle
    pub fn open<M: Medium + ?Sized>(medium: &mut M) -> Result<Self> {
        let mut prefix = [0u8; HEADER_PREFIX as usize];
        medium.seek(SeekFrom::Start(0))?;
        medium
            .read_exact(&mut prefix)
            .map_err(|_| BundleError::InvalidFormat("file too short for header".to_string()))?;

        if &prefix[0..3] != MAGIC {
            return Err(BundleError::InvalidFormat(format!(
                "bad magic: expected JBD, got {:?}",
                &prefix[0..3]
            )));
        }

        let version = prefix[3];
        if version != VERSION {
            return Err(BundleError::InvalidFormat(format!(
                "unsupported version: {version}"
            )));
        }

        let bucket_count = u32::from_le_bytes(prefix[4..8].try_into().unwrap());
        if bucket_count == 0 {
            return Err(BundleError::InvalidFormat(
                "zero bucket count".to_string(),
            ));
        }

        let table = Self {
            version,
            bucket_count,
        };

        // The head array and free head must fit inside the file
        let len = super::medium_len(medium)?;
        if len < table.header_len() {
            return Err(BundleError::InvalidFormat(format!(
                "file shorter ({len} bytes) than its own header ({} bytes)",
                table.header_len()
            )));
        }

        Ok(table)
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn bucket_count(&self) -> u32 {
        self.bucket_count
    }

    /// Total header length: prefix + bucket heads + free head
    pub fn header_len(&self) -> u64 {
        HEADER_PREFIX + 4 * u64::from(self.bucket_count) + 4
    }

    // =========================================================================
    // Head Accessors
    // =========================================================================

    pub fn read_bucket_head<M: Medium + ?Sized>(&self, medium: &mut M, bucket: u32) -> Result<Offset> {
        debug_assert!(bucket < self.bucket_count);
        Ok(Offset(read_u32_at(medium, self.bucket_pos(bucket))?))
    }

    pub fn write_bucket_head<M: Medium + ?Sized>(
        &self,
        medium: &mut M,
        bucket: u32,
        head: Offset,
    ) -> Result<()> {
        debug_assert!(bucket < self.bucket_count);
        write_u32_at(medium, self.bucket_pos(bucket), head.0)
    }

    pub fn read_free_head<M: Medium + ?Sized>(&self, medium: &mut M) -> Result<Offset> {
        Ok(Offset(read_u32_at(medium, self.free_pos())?))
    }

    pub fn write_free_head<M: Medium + ?Sized>(&self, medium: &mut M, head: Offset) -> Result<()> {
        write_u32_at(medium, self.free_pos(), head.0)
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn bucket_pos(&self, bucket: u32) -> u64 {
        HEADER_PREFIX + 4 * u64::from(bucket)
    }

    fn free_pos(&self) -> u64 {
        HEADER_PREFIX + 4 * u64::from(self.bucket_count)
    }
}
