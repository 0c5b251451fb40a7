//! Host-file abstraction
//!
//! The core never touches the operating-system file system directly; it goes
//! through the [`Vfs`] trait, which supplies seekable byte streams and a few
//! metadata queries. This indirection is what lets the whole container be
//! exercised against in-memory byte buffers in tests.

mod memory;

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, Write};
use std::path::Path;
use std::time::UNIX_EPOCH;

use crate::error::Result;

pub use memory::{MemFile, MemFs};

// =============================================================================
// Stream Abstraction
// =============================================================================

/// A seekable byte stream backing a bundle.
///
/// Blanket-implemented for anything that is `Read + Write + Seek`, so tests
/// can hand the store a plain `Cursor<Vec<u8>>`.
pub trait Medium: Read + Write + Seek {}

impl<T: Read + Write + Seek> Medium for T {}

/// Open mode for host files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Existing file, read-only access
    Read,
    /// Existing file, read and write access
    ReadWrite,
}

// =============================================================================
// Vfs Trait
// =============================================================================

/// Minimal file abstraction consumed by the bundle core.
pub trait Vfs {
    /// Create (or truncate) a file and return a stream over it
    fn create_file(&self, path: &str) -> Result<Box<dyn Medium>>;

    /// Open an existing file
    fn open_file(&self, path: &str, mode: FileMode) -> Result<Box<dyn Medium>>;

    /// Whether a file exists at `path`
    fn file_exists(&self, path: &str) -> bool;

    /// Whether a directory exists at `path`
    fn directory_exists(&self, path: &str) -> bool;

    /// Create a directory (and any missing parents)
    fn create_directory(&self, path: &str) -> Result<()>;

    /// Size of the file at `path`, in bytes
    fn file_size(&self, path: &str) -> Result<u64>;

    /// Last-modified time of the file at `path`, in unix milliseconds
    fn file_modified(&self, path: &str) -> Result<u64>;
}

// =============================================================================
// Standard File System
// =============================================================================

/// [`Vfs`] implementation backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFs;

impl Vfs for StdFs {
    fn create_file(&self, path: &str) -> Result<Box<dyn Medium>> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Box::new(file))
    }

    fn open_file(&self, path: &str, mode: FileMode) -> Result<Box<dyn Medium>> {
        let file = match mode {
            FileMode::Read => File::open(path)?,
            FileMode::ReadWrite => OpenOptions::new().read(true).write(true).open(path)?,
        };
        Ok(Box::new(file))
    }

    fn file_exists(&self, path: &str) -> bool {
        Path::new(path).is_file()
    }

    fn directory_exists(&self, path: &str) -> bool {
        Path::new(path).is_dir()
    }

    fn create_directory(&self, path: &str) -> Result<()> {
        fs::create_dir_all(path)?;
        Ok(())
    }

    fn file_size(&self, path: &str) -> Result<u64> {
        Ok(fs::metadata(path)?.len())
    }

    fn file_modified(&self, path: &str) -> Result<u64> {
        let modified = fs::metadata(path)?.modified()?;
        let millis = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Ok(millis)
    }
}
