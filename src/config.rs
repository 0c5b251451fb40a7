//! Configuration for jbundle
//!
//! Centralized configuration with sensible defaults.

/// Configuration for a bundle store instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Hash Table Configuration
    // -------------------------------------------------------------------------
    /// Number of hash buckets written when a bundle is created.
    ///
    /// Only applies at creation; an existing bundle uses the count stored in
    /// its header (the count is fixed for the lifetime of the file, there is
    /// no rehashing).
    pub bucket_count: u32,

    // -------------------------------------------------------------------------
    // Free List Configuration
    // -------------------------------------------------------------------------
    /// Whether new records may reuse reclaimed slots from the free list.
    ///
    /// When `false` the store always appends at end-of-file. Both modes are
    /// format-compatible; always-appending just grows the file monotonically.
    pub reuse_free_slots: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket_count: 64,
            reuse_free_slots: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the bucket count used when creating a new bundle
    pub fn bucket_count(mut self, count: u32) -> Self {
        self.config.bucket_count = count;
        self
    }

    /// Enable or disable free-slot reuse
    pub fn reuse_free_slots(mut self, reuse: bool) -> Self {
        self.config.reuse_free_slots = reuse;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
