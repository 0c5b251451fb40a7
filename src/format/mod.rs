//! On-Disk Format
//!
//! Layout of a bundle file (all integers little-endian):
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Header (8 + 4·N + 4 bytes)                               │
//! │   Magic: "JBD" (3) | Version: u8 (1) | BucketCount: u32  │
//! │   BucketHead[0..N]: u32 each | FreeHead: u32             │
//! ├──────────────────────────────────────────────────────────┤
//! │ Records (variable, contiguous)                           │
//! │   [Link: u32][ContentLen: u32][Modified: u64]            │
//! │   [NameLen: u8][Name bytes][Content bytes]               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! An offset of 0 means "no record"; position 0 is always inside the header,
//! so it can never be a valid record start. The same link field serves as the
//! next-in-chain pointer while a record is live and as the next-free pointer
//! once it is reclaimed; which meaning applies is determined purely by which
//! root (a bucket head or the free head) currently reaches the record.

pub mod header;
pub mod record;

use std::fmt;
use std::io::SeekFrom;

use crate::error::{BundleError, Result};
use crate::vfs::Medium;

pub use header::BucketTable;
pub use record::RecordHeader;

// =============================================================================
// Shared Constants
// =============================================================================

/// Magic bytes identifying a bundle file
pub const MAGIC: &[u8; 3] = b"JBD";

/// Current bundle format version
pub const VERSION: u8 = 1;

/// Bytes before the bucket head array: magic (3) + version (1) + count (4)
pub const HEADER_PREFIX: u64 = 8;

/// Fixed record prologue: link (4) + content len (4) + modified (8) + name len (1)
pub const RECORD_FIXED: u64 = 17;

/// Maximum encoded name length in bytes
pub const MAX_NAME_LEN: usize = 255;

/// Path separator inside bundle names
pub const PATH_SEPARATOR: char = '\\';

// =============================================================================
// Offset
// =============================================================================

/// Absolute byte position of a record within the bundle file.
///
/// The backing medium is treated as an arena of byte-addressed records, so
/// offsets are an explicit index type rather than anything pointer-like.
/// `Offset::NONE` (0) is the null value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Offset(pub u32);

impl Offset {
    /// The "no record" sentinel
    pub const NONE: Offset = Offset(0);

    /// Convert a file position into an offset, rejecting positions that do
    /// not fit the 32-bit on-disk field.
    pub fn from_file_pos(pos: u64) -> Result<Offset> {
        u32::try_from(pos)
            .map(Offset)
            .map_err(|_| BundleError::BundleFull(pos))
    }

    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    pub fn is_some(self) -> bool {
        self.0 != 0
    }

    /// File position of this offset
    pub fn pos(self) -> u64 {
        u64::from(self.0)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Name Handling
// =============================================================================

/// Case-normalize a name for hashing and comparison.
///
/// Lookup, delete, and exists all compare names case-insensitively; the hash
/// and the equality check must agree, so both go through this one function.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
}

/// Case-insensitive name equality
pub fn names_equal(a: &str, b: &str) -> bool {
    normalize_name(a) == normalize_name(b)
}

/// Map a name to its bucket index.
///
/// CRC-32 of the case-normalized UTF-8 bytes, reduced modulo the bucket
/// count. Any deterministic function would do; the structure only requires
/// that writes and subsequent reads of the same bundle agree.
pub fn bucket_index(name: &str, bucket_count: u32) -> u32 {
    debug_assert!(bucket_count > 0);
    crc32fast::hash(normalize_name(name).as_bytes()) % bucket_count
}

// =============================================================================
// Positional I/O Helpers
// =============================================================================

pub(crate) fn read_u32_at<M: Medium + ?Sized>(medium: &mut M, pos: u64) -> Result<u32> {
    let mut buf = [0u8; 4];
    medium.seek(SeekFrom::Start(pos))?;
    medium.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

pub(crate) fn write_u32_at<M: Medium + ?Sized>(medium: &mut M, pos: u64, value: u32) -> Result<()> {
    medium.seek(SeekFrom::Start(pos))?;
    medium.write_all(&value.to_le_bytes())?;
    Ok(())
}

pub(crate) fn write_u64_at<M: Medium + ?Sized>(medium: &mut M, pos: u64, value: u64) -> Result<()> {
    medium.seek(SeekFrom::Start(pos))?;
    medium.write_all(&value.to_le_bytes())?;
    Ok(())
}

/// Current length of the backing medium
pub(crate) fn medium_len<M: Medium + ?Sized>(medium: &mut M) -> Result<u64> {
    Ok(medium.seek(SeekFrom::End(0))?)
}
