//! # jbundle
//!
//! A single-file container ("bundle") storing an arbitrary number of named
//! byte blobs inside one host file, indexed by an on-disk hash table with
//! separate chaining and a reclamation free list:
//! - Backslash-delimited path names, compared case-insensitively
//! - Deferred-commit write streams (close is the sole commit point)
//! - Deleted slots reclaimed through an intrusive free list
//! - "Directories" derived from name prefixes, never stored
//! - All I/O through a pluggable file abstraction — testable on byte buffers
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       BundleStore                            │
//! │        create / open / delete / enumerate / stat             │
//! └───────┬──────────────────┬──────────────────┬───────────────┘
//!         │                  │                  │
//!         ▼                  ▼                  ▼
//!  ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//!  │ ChainIndex  │    │  FreeList   │    │ RecordCodec │
//!  │ (buckets)   │    │ (reclaim)   │    │ (serialize) │
//!  └──────┬──────┘    └──────┬──────┘    └──────┬──────┘
//!         │                  │                  │
//!         └────────┬─────────┴─────────┬────────┘
//!                  ▼                   ▼
//!           ┌─────────────┐     ┌─────────────┐
//!           │ BucketTable │     │   Medium    │
//!           │  (header)   │     │ (Vfs stream)│
//!           └─────────────┘     └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod vfs;
pub mod format;
pub mod index;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use error::{BundleError, Result};
pub use store::{BundleReader, BundleStore, BundleWriter, FileEntry};
pub use vfs::{FileMode, Medium, MemFs, StdFs, Vfs};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of jbundle
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
