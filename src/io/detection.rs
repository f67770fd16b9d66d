// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! DST compatibility detection.
//!
//! Detection is cheap and never fails loudly: a path is compatible when it
//! carries the container extension, opens through the columnar reader, and
//! contains the canonical event tree. Any failure along the way means "not
//! compatible". The probe handle is released before returning.
//!
//! # Example
//!
//! ```rust,no_run
//! use hessdst::io::detection::is_compatible;
//!
//! if is_compatible("run_170720_DST_001.root") {
//!     println!("H.E.S.S. DST detected");
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use super::formats::dst::constants::{DST_EXTENSION, EVENT_TREE};
use super::formats::memory::SnapshotReader;
use super::traits::{ColumnarFile, ColumnarReader};
use crate::{DstError, Result};

/// Decides whether the DST engine can service a file.
#[derive(Clone)]
pub struct FormatDetector {
    reader: Arc<dyn ColumnarReader>,
}

impl Default for FormatDetector {
    fn default() -> Self {
        Self::new(Arc::new(SnapshotReader::new()))
    }
}

impl FormatDetector {
    /// Create a detector probing through the given reader.
    pub fn new(reader: Arc<dyn ColumnarReader>) -> Self {
        Self { reader }
    }

    /// Check whether the file is a DST this engine can read.
    pub fn is_compatible(&self, path: &Path) -> bool {
        match self.probe(path) {
            Ok(()) => true,
            Err(e) => {
                debug!(path = %path.display(), reason = %e, "not a compatible DST");
                false
            }
        }
    }

    /// Probe a file, returning why it is incompatible.
    pub fn probe(&self, path: &Path) -> Result<()> {
        self.open_checked(path).map(drop)
    }

    /// Probe a file and keep the handle open on success.
    ///
    /// The extension is checked before anything is opened.
    pub fn open_checked(&self, path: &Path) -> Result<Box<dyn ColumnarFile>> {
        let path_str = path.display().to_string();

        if !has_dst_extension(path) {
            return Err(DstError::incompatible(
                path_str,
                format!("extension is not '.{DST_EXTENSION}'"),
            ));
        }

        let file = self
            .reader
            .open(path)
            .map_err(|e| DstError::incompatible(&path_str, format!("cannot open: {e}")))?;
        probe_handle(file.as_ref())?;
        Ok(file)
    }
}

/// Check an open handle for the canonical event tree.
pub fn probe_handle(file: &dyn ColumnarFile) -> Result<()> {
    let has_event_tree = file
        .has_tree(EVENT_TREE)
        .map_err(|e| DstError::incompatible(file.path(), format!("cannot list trees: {e}")))?;

    if !has_event_tree {
        return Err(DstError::incompatible(
            file.path(),
            format!("no '{EVENT_TREE}' tree"),
        ));
    }

    Ok(())
}

fn has_dst_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(DST_EXTENSION))
        .unwrap_or(false)
}

/// Check if a file on disk is a compatible DST, using the snapshot reader.
pub fn is_compatible<P: AsRef<Path>>(path: P) -> bool {
    FormatDetector::default().is_compatible(path.as_ref())
}
