// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Session configuration and the builder that opens sessions.
//!
//! Configuration can be set through [`DstSourceBuilder`] or loaded from a
//! TOML file:
//!
//! ```toml
//! max_events = 1000
//! batch_size = 200
//! allowed_tels = [1, 2, 3, 4]
//! header_entry = "last"
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::constants::DEFAULT_BATCH_SIZE;
use super::source::DstEventSource;
use crate::instrument::SubarrayResolver;
use crate::io::formats::memory::SnapshotReader;
use crate::io::metadata::HeaderEntryPolicy;
use crate::io::traits::ColumnarReader;
use crate::{DstError, Result};

/// Options of one event source session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Stop after this many events (None = read to end of file)
    pub max_events: Option<u64>,
    /// Entries read per batch from the event tree
    pub batch_size: usize,
    /// Only decode these telescopes (None = whole subarray)
    pub allowed_tels: Option<BTreeSet<u16>>,
    /// Which run header entry to use when a file holds several
    pub header_entry: HeaderEntryPolicy,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            max_events: None,
            batch_size: DEFAULT_BATCH_SIZE,
            allowed_tels: None,
            header_entry: HeaderEntryPolicy::default(),
        }
    }
}

impl SourceConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            DstError::config(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Check that the options are usable.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(DstError::config("batch_size must be greater than 0"));
        }
        Ok(())
    }
}

/// Builder for [`DstEventSource`] sessions.
///
/// # Example
///
/// ```rust,no_run
/// use hessdst::DstEventSource;
///
/// let source = DstEventSource::builder()
///     .path("run_170720.root")
///     .max_events(100)
///     .allowed_tels([1, 2, 3, 4])
///     .build()?;
/// println!("{} events from run {}", source.len(), source.obs_id());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct DstSourceBuilder {
    path: PathBuf,
    config: SourceConfig,
    reader: Arc<dyn ColumnarReader>,
    resolver: Arc<SubarrayResolver>,
}

impl Default for DstSourceBuilder {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            config: SourceConfig::default(),
            reader: Arc::new(SnapshotReader::new()),
            resolver: Arc::new(SubarrayResolver::hess()),
        }
    }
}

impl DstSourceBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the path to the file.
    pub fn path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = path.as_ref().to_path_buf();
        self
    }

    /// Replace all options at once.
    pub fn config(mut self, config: SourceConfig) -> Self {
        self.config = config;
        self
    }

    /// Stop after `count` events.
    pub fn max_events(mut self, count: u64) -> Self {
        self.config.max_events = Some(count);
        self
    }

    /// Set the number of entries read per batch.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Restrict decoding to the given telescopes.
    ///
    /// The restriction is intersected with the resolved subarray; it never
    /// adds telescopes.
    pub fn allowed_tels<I: IntoIterator<Item = u16>>(mut self, tels: I) -> Self {
        self.config.allowed_tels = Some(tels.into_iter().collect());
        self
    }

    /// Choose which run header entry to use.
    pub fn header_entry(mut self, policy: HeaderEntryPolicy) -> Self {
        self.config.header_entry = policy;
        self
    }

    /// Use another columnar reader backend.
    pub fn reader(mut self, reader: Arc<dyn ColumnarReader>) -> Self {
        self.reader = reader;
        self
    }

    /// Use another era table.
    pub fn resolver(mut self, resolver: Arc<SubarrayResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Open the session.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path is not set or the options are invalid
    /// - The file is not a compatible DST (`IncompatibleFormat`)
    /// - The run metadata or event header cannot be read (`MetadataExtraction`)
    pub fn build(self) -> Result<DstEventSource> {
        if self.path.as_os_str().is_empty() {
            return Err(DstError::config("path is not set"));
        }
        self.config.validate()?;

        DstEventSource::open_with(self.path, self.config, self.reader, &self.resolver)
    }
}
