// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core traits for columnar file access.
//!
//! The DST engine never parses the physical byte layout of a file. It issues
//! reads by logical tree and branch name through [`ColumnarFile`], obtained
//! from a [`ColumnarReader`]. Backends (the in-memory and snapshot backends
//! in [`crate::io::formats::memory`], or an external ROOT parser) plug in
//! behind these traits.

use std::collections::BTreeSet;
use std::fmt;
use std::ops::Range;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{ColumnValue, ScalarKind};
use crate::Result;

/// Storage shape of a branch, resolved once at schema discovery.
///
/// This is a closed set: every branch a reader exposes maps to exactly one
/// of these shapes, and decoding dispatches on the shape rather than on
/// per-value type inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchShape {
    /// One scalar per entry
    Scalar(ScalarKind),
    /// A fixed-length array per entry
    FixedArray {
        /// Element type
        kind: ScalarKind,
        /// Number of elements per entry
        len: usize,
    },
    /// A variable-length array per entry
    Jagged(ScalarKind),
    /// A nested object that needs a class streamer to decode
    Object {
        /// Stored class name
        class_name: String,
    },
}

impl BranchShape {
    /// Whether the branch can be read with the simple (streamer-less) path.
    pub fn is_simple(&self) -> bool {
        matches!(self, BranchShape::Scalar(_))
    }

    /// Element type of scalar and array branches.
    pub fn element_kind(&self) -> Option<ScalarKind> {
        match self {
            BranchShape::Scalar(kind)
            | BranchShape::FixedArray { kind, .. }
            | BranchShape::Jagged(kind) => Some(*kind),
            BranchShape::Object { .. } => None,
        }
    }

    /// Whether each entry holds an array.
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            BranchShape::FixedArray { .. } | BranchShape::Jagged(_)
        )
    }
}

impl fmt::Display for BranchShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchShape::Scalar(kind) => write!(f, "{kind}"),
            BranchShape::FixedArray { kind, len } => write!(f, "{kind}[{len}]"),
            BranchShape::Jagged(kind) => write!(f, "{kind}[]"),
            BranchShape::Object { class_name } => write!(f, "object<{class_name}>"),
        }
    }
}

/// Name and storage shape of one branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    /// Branch path within its tree (e.g. "EventHeader/EventNumber")
    pub name: String,
    /// Storage shape
    pub shape: BranchShape,
}

impl BranchInfo {
    /// Create a new BranchInfo.
    pub fn new(name: impl Into<String>, shape: BranchShape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }
}

/// An open handle onto a columnar file.
///
/// The handle is released when dropped. Implementations take `&self` for
/// reads so one handle can be shared by the metadata cache and the event
/// stream of a single session.
pub trait ColumnarFile: Send + Sync {
    /// Path the handle was opened from.
    fn path(&self) -> &str;

    /// Names of all top-level trees.
    fn list_trees(&self) -> Result<BTreeSet<String>>;

    /// Check whether a top-level tree exists.
    fn has_tree(&self, tree: &str) -> Result<bool> {
        Ok(self.list_trees()?.contains(tree))
    }

    /// Branches of a tree with their storage shapes.
    fn branches(&self, tree: &str) -> Result<Vec<BranchInfo>>;

    /// Number of entries in a tree.
    fn entry_count(&self, tree: &str) -> Result<u64>;

    /// Read a branch over an entry range, one value per entry.
    fn read_branch(&self, tree: &str, branch: &str, range: Range<u64>)
        -> Result<Vec<ColumnValue>>;
}

/// Capability to open columnar files.
///
/// # Example
///
/// ```no_run
/// use hessdst::io::traits::ColumnarReader;
/// use hessdst::io::formats::memory::SnapshotReader;
///
/// let reader = SnapshotReader::new();
/// let file = reader.open("run_170720.root".as_ref())?;
/// println!("Trees: {:?}", file.list_trees()?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait ColumnarReader: Send + Sync {
    /// Open a file for reading.
    fn open(&self, path: &Path) -> Result<Box<dyn ColumnarFile>>;

    /// Get the name of this reader backend.
    fn name(&self) -> &str {
        "unknown"
    }
}
