//! Record Codec
//!
//! Serializes and deserializes a single record: the link field, content
//! length, modified timestamp, length-prefixed name, and payload. Reading a
//! header never touches the payload; content is streamed lazily by the store.

use std::io::SeekFrom;

use bytes::{BufMut, BytesMut};

use crate::error::{BundleError, Result};
use crate::vfs::Medium;

use super::{medium_len, write_u32_at, write_u64_at, Offset, MAX_NAME_LEN, RECORD_FIXED};

// Field positions within a record
const LINK_POS: u64 = 0;
const MODIFIED_POS: u64 = 8;

/// Decoded record prologue; payload bytes stay on disk.
#[derive(Debug, Clone)]
pub struct RecordHeader {
    /// Next record in the bucket chain, or next free slot once reclaimed
    pub link: Offset,
    /// Payload length in bytes
    pub size: u32,
    /// Modified timestamp, unix milliseconds
    pub modified: u64,
    /// Stored name (backslash-separated path)
    pub name: String,
    /// File position of the first payload byte
    pub content_offset: u64,
}

impl RecordHeader {
    /// Byte extent of the whole record as laid out on disk.
    ///
    /// For a reclaimed slot this is the capacity available for reuse. Writing
    /// a smaller record into a slot shrinks the extent later frees will see;
    /// the leftover tail is leaked, never split into a new slot.
    pub fn extent(&self) -> u64 {
        RECORD_FIXED + self.name.len() as u64 + u64::from(self.size)
    }
}

/// Encoded length of a record with the given name and content length.
///
/// Fails with `NameTooLong` before anything is written, so a rejected create
/// leaves the file untouched.
pub fn encoded_len(name: &str, content_len: u64) -> Result<u64> {
    let name_len = name.len();
    if name_len > MAX_NAME_LEN {
        return Err(BundleError::NameTooLong { len: name_len });
    }
    if content_len > u64::from(u32::MAX) {
        return Err(BundleError::PayloadTooLarge { len: content_len });
    }
    Ok(RECORD_FIXED + name_len as u64 + content_len)
}

/// Serialize a complete record starting at `offset`.
///
/// The whole record is staged in one buffer and written with a single
/// `write_all`, so a short write cannot leave a half-decodable prologue in
/// front of stale payload bytes.
pub fn write_record<M: Medium + ?Sized>(
    medium: &mut M,
    offset: Offset,
    link: Offset,
    name: &str,
    modified: u64,
    content: &[u8],
) -> Result<()> {
    encoded_len(name, content.len() as u64)?;

    let mut buf = BytesMut::with_capacity(RECORD_FIXED as usize + name.len() + content.len());
    buf.put_u32_le(link.0);
    buf.put_u32_le(content.len() as u32);
    buf.put_u64_le(modified);
    buf.put_u8(name.len() as u8);
    buf.put_slice(name.as_bytes());
    buf.put_slice(content);

    medium.seek(SeekFrom::Start(offset.pos()))?;
    medium.write_all(&buf)?;
    medium.flush()?;
    Ok(())
}

/// Read a record's prologue without its payload.
///
/// Every declared length is checked against the file length; a record that
/// runs past end-of-file fails with `CorruptContainer` instead of truncating.
pub fn read_header<M: Medium + ?Sized>(medium: &mut M, offset: Offset) -> Result<RecordHeader> {
    let file_len = medium_len(medium)?;
    let start = offset.pos();

    if start + RECORD_FIXED > file_len {
        return Err(BundleError::CorruptContainer(format!(
            "record at {offset} overruns end-of-file ({file_len} bytes)"
        )));
    }

    let mut fixed = [0u8; RECORD_FIXED as usize];
    medium.seek(SeekFrom::Start(start))?;
    medium.read_exact(&mut fixed)?;

    let link = Offset(u32::from_le_bytes(fixed[0..4].try_into().unwrap()));
    let size = u32::from_le_bytes(fixed[4..8].try_into().unwrap());
    let modified = u64::from_le_bytes(fixed[8..16].try_into().unwrap());
    let name_len = fixed[16] as usize;

    let content_offset = start + RECORD_FIXED + name_len as u64;
    if content_offset + u64::from(size) > file_len {
        return Err(BundleError::CorruptContainer(format!(
            "record at {offset} declares {size} content bytes past end-of-file"
        )));
    }

    let mut name_buf = vec![0u8; name_len];
    medium.read_exact(&mut name_buf)?;
    let name = String::from_utf8(name_buf).map_err(|_| {
        BundleError::CorruptContainer(format!("record at {offset} has a non-UTF-8 name"))
    })?;

    Ok(RecordHeader {
        link,
        size,
        modified,
        name,
        content_offset,
    })
}

/// Patch a record's link field in place
pub fn write_link<M: Medium + ?Sized>(medium: &mut M, offset: Offset, link: Offset) -> Result<()> {
    write_u32_at(medium, offset.pos() + LINK_POS, link.0)
}

/// Patch a record's modified timestamp in place
pub fn write_modified<M: Medium + ?Sized>(
    medium: &mut M,
    offset: Offset,
    modified: u64,
) -> Result<()> {
    write_u64_at(medium, offset.pos() + MODIFIED_POS, modified)
}
