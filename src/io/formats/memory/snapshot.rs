// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! File-backed snapshots of in-memory columnar files.
//!
//! A snapshot is a serialized [`MemoryFile`]. [`SnapshotReader`] maps the file
//! into memory and deserializes it on open, so any file that is not a valid
//! snapshot fails to open rather than producing a partial handle.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::file::{MemoryFile, MemoryHandle, ReaderStats};
use crate::io::traits::{ColumnarFile, ColumnarReader};
use crate::{DstError, Result};

impl MemoryFile {
    /// Write this file as a snapshot.
    pub fn write_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            DstError::io(
                "Snapshot",
                format!("Failed to create '{}': {e}", path.display()),
            )
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }

    /// Load a snapshot from disk.
    pub fn read_snapshot<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            DstError::io(
                "Snapshot",
                format!("Failed to open '{}': {e}", path.display()),
            )
        })?;
        let len = file.metadata()?.len();
        if len == 0 {
            return Err(DstError::io(
                "Snapshot",
                format!("'{}' is empty", path.display()),
            ));
        }

        // The map is dropped before returning; only owned data escapes.
        let mmap = unsafe { memmap2::Mmap::map(&file) }.map_err(|e| {
            DstError::io(
                "Snapshot",
                format!("Failed to mmap '{}': {e}", path.display()),
            )
        })?;
        let parsed: MemoryFile = serde_json::from_slice(&mmap)?;
        parsed.validate()?;

        debug!(
            path = %path.display(),
            bytes = len,
            trees = parsed.trees.len(),
            "loaded snapshot"
        );
        Ok(parsed)
    }
}

/// Reader for snapshot files on disk.
#[derive(Debug, Default, Clone)]
pub struct SnapshotReader {
    stats: Arc<ReaderStats>,
}

impl SnapshotReader {
    /// Create a new snapshot reader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters for handles opened through this reader.
    pub fn stats(&self) -> Arc<ReaderStats> {
        Arc::clone(&self.stats)
    }
}

impl ColumnarReader for SnapshotReader {
    fn open(&self, path: &Path) -> Result<Box<dyn ColumnarFile>> {
        let file = MemoryFile::read_snapshot(path)?;
        Ok(Box::new(MemoryHandle::new(
            path.to_string_lossy(),
            Arc::new(file),
            Arc::clone(&self.stats),
        )))
    }

    fn name(&self) -> &str {
        "snapshot"
    }
}
