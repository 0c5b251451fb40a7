//! In-memory file system
//!
//! Backs bundle streams with plain byte vectors so the container core can be
//! tested without touching the OS. Cloning a [`MemFs`] clones a handle to the
//! same shared tree, so a test can keep inspecting bytes after handing streams
//! to a store.

use std::collections::{HashMap, HashSet};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::error::{BundleError, Result};

use super::{FileMode, Medium, Vfs};

// =============================================================================
// MemFs
// =============================================================================

/// Shared in-memory file tree
#[derive(Default)]
struct Tree {
    files: HashMap<String, Arc<Mutex<FileBody>>>,
    directories: HashSet<String>,
}

/// Bytes and metadata of one file; timestamp refreshed on every write
struct FileBody {
    bytes: Vec<u8>,
    modified: u64,
}

/// In-memory [`Vfs`] implementation.
#[derive(Clone, Default)]
pub struct MemFs {
    tree: Arc<Mutex<Tree>>,
}

impl MemFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current bytes of a file, if it exists.
    ///
    /// Intended for tests that need byte-for-byte comparisons.
    pub fn read_file(&self, path: &str) -> Option<Vec<u8>> {
        let tree = self.tree.lock();
        tree.files.get(path).map(|body| body.lock().bytes.clone())
    }
}

impl Vfs for MemFs {
    fn create_file(&self, path: &str) -> Result<Box<dyn Medium>> {
        let body = Arc::new(Mutex::new(FileBody {
            bytes: Vec::new(),
            modified: unix_millis_now(),
        }));
        let mut tree = self.tree.lock();
        tree.files.insert(path.to_string(), Arc::clone(&body));
        Ok(Box::new(MemFile { body, pos: 0 }))
    }

    fn open_file(&self, path: &str, _mode: FileMode) -> Result<Box<dyn Medium>> {
        let tree = self.tree.lock();
        let body = tree.files.get(path).ok_or_else(|| not_found(path))?;
        Ok(Box::new(MemFile {
            body: Arc::clone(body),
            pos: 0,
        }))
    }

    fn file_exists(&self, path: &str) -> bool {
        self.tree.lock().files.contains_key(path)
    }

    fn directory_exists(&self, path: &str) -> bool {
        self.tree.lock().directories.contains(path)
    }

    fn create_directory(&self, path: &str) -> Result<()> {
        self.tree.lock().directories.insert(path.to_string());
        Ok(())
    }

    fn file_size(&self, path: &str) -> Result<u64> {
        let tree = self.tree.lock();
        let body = tree.files.get(path).ok_or_else(|| not_found(path))?;
        let size = body.lock().bytes.len() as u64;
        Ok(size)
    }

    fn file_modified(&self, path: &str) -> Result<u64> {
        let tree = self.tree.lock();
        let body = tree.files.get(path).ok_or_else(|| not_found(path))?;
        let modified = body.lock().modified;
        Ok(modified)
    }
}

fn not_found(path: &str) -> BundleError {
    BundleError::Io(io::Error::new(
        io::ErrorKind::NotFound,
        format!("no such in-memory file: {path}"),
    ))
}

fn unix_millis_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// =============================================================================
// MemFile
// =============================================================================

/// Seekable stream over a shared in-memory file.
pub struct MemFile {
    body: Arc<Mutex<FileBody>>,
    pos: u64,
}

impl Read for MemFile {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let body = self.body.lock();
        let len = body.bytes.len() as u64;
        if self.pos >= len {
            return Ok(0);
        }
        let start = self.pos as usize;
        let n = out.len().min((len - self.pos) as usize);
        out[..n].copy_from_slice(&body.bytes[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }
}

impl Write for MemFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut body = self.body.lock();
        let end = self.pos as usize + buf.len();
        // Writing past the end zero-fills the gap, like a sparse file
        if body.bytes.len() < end {
            body.bytes.resize(end, 0);
        }
        let start = self.pos as usize;
        body.bytes[start..end].copy_from_slice(buf);
        body.modified = unix_millis_now();
        self.pos = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemFile {
    fn seek(&mut self, from: SeekFrom) -> io::Result<u64> {
        let len = self.body.lock().bytes.len() as i64;
        let target = match from {
            SeekFrom::Start(off) => off as i64,
            SeekFrom::End(delta) => len + delta,
            SeekFrom::Current(delta) => self.pos as i64 + delta,
        };
        if target < 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "seek before start of in-memory file",
            ));
        }
        self.pos = target as u64;
        Ok(self.pos)
    }
}
