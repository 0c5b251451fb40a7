//! Bundle Store
//!
//! The orchestrator: composes the bucket table, record codec, chain index,
//! and free list over one exclusively owned byte stream, and exposes the
//! public file-like operations (create/open/delete/enumerate).
//!
//! ## Concurrency Model
//!
//! Single-owner and synchronous: one `BundleStore` per backing stream, all
//! I/O blocking, no internal locking. Write and read handles mutably borrow
//! the store, so the borrow checker enforces the serialization the format
//! requires. Callers receive copies ([`FileEntry`] values), never aliases
//! into store internals.

mod reader;
mod writer;

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::format::{self, record, BucketTable, Offset, PATH_SEPARATOR};
use crate::index::{chain, freelist, ChainHit};
use crate::vfs::{FileMode, Medium, Vfs};

pub use reader::BundleReader;
pub use writer::BundleWriter;

/// Name, size, and timestamp of one live record — a read-only copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Stored name (backslash-separated path)
    pub name: String,
    /// Payload size in bytes
    pub size: u64,
    /// Modified timestamp, unix milliseconds
    pub modified: u64,
}

/// Single-file container of named byte blobs.
pub struct BundleStore {
    /// Backing stream, exclusively owned for the store's lifetime
    medium: Box<dyn Medium>,
    /// Parsed header
    table: BucketTable,
    config: Config,
}

impl BundleStore {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Create a fresh bundle at `path` through the given file abstraction
    pub fn create(path: &str, vfs: &dyn Vfs, config: Config) -> Result<Self> {
        let medium = vfs.create_file(path)?;
        Self::create_on_medium(medium, config)
    }

    /// Open an existing bundle at `path` through the given file abstraction
    pub fn open(path: &str, vfs: &dyn Vfs, config: Config) -> Result<Self> {
        let medium = vfs.open_file(path, FileMode::ReadWrite)?;
        Self::from_medium(medium, config)
    }

    /// Open the bundle at `path`, creating it if it does not exist
    pub fn open_or_create(path: &str, vfs: &dyn Vfs, config: Config) -> Result<Self> {
        if vfs.file_exists(path) {
            Self::open(path, vfs, config)
        } else {
            Self::create(path, vfs, config)
        }
    }

    /// Initialize a fresh bundle on a raw stream
    pub fn create_on_medium(mut medium: Box<dyn Medium>, config: Config) -> Result<Self> {
        let table = BucketTable::create(medium.as_mut(), config.bucket_count)?;
        debug!(bucket_count = table.bucket_count(), "created bundle");
        Ok(Self {
            medium,
            table,
            config,
        })
    }

    /// Open an existing bundle on a raw stream
    pub fn from_medium(mut medium: Box<dyn Medium>, config: Config) -> Result<Self> {
        let table = BucketTable::open(medium.as_mut())?;
        debug!(
            bucket_count = table.bucket_count(),
            version = table.version(),
            "opened bundle"
        );
        Ok(Self {
            medium,
            table,
            config,
        })
    }

    /// Bucket count stored in this bundle's header
    pub fn bucket_count(&self) -> u32 {
        self.table.bucket_count()
    }

    // =========================================================================
    // Write Path
    // =========================================================================

    /// Start writing a new file.
    ///
    /// Returns a deferred-commit write stream; the name stays invisible to
    /// every lookup until the stream is closed. An over-long name is rejected
    /// here, before anything is buffered.
    ///
    /// Creating a name that already exists adds a second record; callers that
    /// want update semantics must delete the old name first.
    pub fn create_file(&mut self, name: &str) -> Result<BundleWriter<'_>> {
        record::encoded_len(name, 0)?;
        Ok(BundleWriter::new(self, name))
    }

    /// Delete a file by name.
    ///
    /// Unlinks the record from its bucket chain and pushes the slot onto the
    /// free list. Returns `false` (with the file byte-for-byte unchanged)
    /// when the name is absent.
    pub fn delete_file(&mut self, name: &str) -> Result<bool> {
        let bucket = self.bucket_for(name);
        let hit = match self.find(name)? {
            Some(hit) => hit,
            None => return Ok(false),
        };

        chain::unlink(
            self.medium.as_mut(),
            &self.table,
            bucket,
            hit.prev,
            hit.header.link,
        )?;
        freelist::push(self.medium.as_mut(), &self.table, hit.offset)?;

        debug!(name, offset = %hit.offset, "deleted file");
        Ok(true)
    }

    /// Commit a buffered record: acquire or append a slot, serialize, link.
    ///
    /// The record is fully written (with link = NONE) before any bucket
    /// pointer references it, so an interruption leaves at worst unreferenced
    /// bytes, never a dangling chain.
    pub(crate) fn commit(&mut self, name: &str, modified: u64, content: &[u8]) -> Result<Offset> {
        let required = record::encoded_len(name, content.len() as u64)?;

        let reused = if self.config.reuse_free_slots {
            freelist::try_acquire(self.medium.as_mut(), &self.table, required)?
        } else {
            None
        };

        let offset = match reused {
            Some(offset) => offset,
            None => {
                let end = format::medium_len(self.medium.as_mut())?;
                Offset::from_file_pos(end)?
            }
        };

        record::write_record(
            self.medium.as_mut(),
            offset,
            Offset::NONE,
            name,
            modified,
            content,
        )?;

        let bucket = self.bucket_for(name);
        chain::append_tail(self.medium.as_mut(), &self.table, bucket, offset)?;

        debug!(name, offset = %offset, size = content.len(), "committed file");
        Ok(offset)
    }

    // =========================================================================
    // Read Path
    // =========================================================================

    /// Open a committed file for reading.
    ///
    /// The payload is streamed lazily from the backing medium; `None` when
    /// the name is absent. Reading is the only record-level mode: records
    /// are immutable once committed, so there is no open-for-write — new
    /// content goes through [`Self::create_file`] (delete the old name first
    /// for update semantics).
    pub fn open_file(&mut self, name: &str) -> Result<Option<BundleReader<'_>>> {
        let hit = match self.find(name)? {
            Some(hit) => hit,
            None => return Ok(None),
        };
        Ok(Some(BundleReader::new(self, hit.header)))
    }

    /// Read a whole file into memory; `None` when the name is absent.
    pub fn read_file(&mut self, name: &str) -> Result<Option<Vec<u8>>> {
        use std::io::Read;
        let mut reader = match self.open_file(name)? {
            Some(reader) => reader,
            None => return Ok(None),
        };
        let mut content = Vec::with_capacity(reader.size() as usize);
        reader.read_to_end(&mut content)?;
        Ok(Some(content))
    }

    /// Whether a live record with this name exists
    pub fn file_exists(&mut self, name: &str) -> Result<bool> {
        Ok(self.find(name)?.is_some())
    }

    /// Payload size of a file; `None` when the name is absent
    pub fn get_size(&mut self, name: &str) -> Result<Option<u64>> {
        Ok(self.find(name)?.map(|hit| u64::from(hit.header.size)))
    }

    /// Modified timestamp of a file; `None` when the name is absent
    pub fn get_modified(&mut self, name: &str) -> Result<Option<u64>> {
        Ok(self.find(name)?.map(|hit| hit.header.modified))
    }

    /// Patch a file's modified timestamp in place.
    ///
    /// Returns `false` when the name is absent. The only in-place mutation
    /// the format allows; everything else is delete-then-create.
    pub fn set_modified(&mut self, name: &str, modified: u64) -> Result<bool> {
        let hit = match self.find(name)? {
            Some(hit) => hit,
            None => return Ok(false),
        };
        record::write_modified(self.medium.as_mut(), hit.offset, modified)?;
        Ok(true)
    }

    // =========================================================================
    // Enumeration
    // =========================================================================

    /// Enumerate live files, optionally filtered by a case-insensitive name
    /// prefix. Results are sorted by normalized name.
    pub fn get_files(&mut self, prefix: Option<&str>) -> Result<Vec<FileEntry>> {
        let normalized_prefix = prefix.map(format::normalize_name);

        let mut entries = Vec::new();
        for bucket in 0..self.table.bucket_count() {
            for (_, header) in chain::collect(self.medium.as_mut(), &self.table, bucket)? {
                if let Some(ref p) = normalized_prefix {
                    if !format::normalize_name(&header.name).starts_with(p.as_str()) {
                        continue;
                    }
                }
                entries.push(FileEntry {
                    name: header.name,
                    size: u64::from(header.size),
                    modified: header.modified,
                });
            }
        }

        entries.sort_by_key(|e| format::normalize_name(&e.name));
        Ok(entries)
    }

    /// Derive the set of distinct directory prefixes implied by live names.
    ///
    /// Directories are computed from backslash-separated name components, not
    /// stored; deduplication is case-insensitive, keeping the first-seen
    /// spelling. Sorted output.
    pub fn get_directories(&mut self) -> Result<Vec<String>> {
        // normalized prefix -> original spelling
        let mut directories: BTreeMap<String, String> = BTreeMap::new();
        let separator = PATH_SEPARATOR.to_string();

        for bucket in 0..self.table.bucket_count() {
            for (_, header) in chain::collect(self.medium.as_mut(), &self.table, bucket)? {
                let components: Vec<&str> = header.name.split(PATH_SEPARATOR).collect();
                // Proper prefixes only: every split point except the last
                for end in 1..components.len() {
                    let dir = components[..end].join(&separator);
                    directories
                        .entry(format::normalize_name(&dir))
                        .or_insert(dir);
                }
            }
        }

        Ok(directories.into_values().collect())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn bucket_for(&self, name: &str) -> u32 {
        format::bucket_index(name, self.table.bucket_count())
    }

    fn find(&mut self, name: &str) -> Result<Option<ChainHit>> {
        let bucket = self.bucket_for(name);
        chain::find(self.medium.as_mut(), &self.table, bucket, name)
    }
}

/// Current wall-clock time in unix milliseconds
pub(crate) fn unix_millis_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
