// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! In-memory columnar files.
//!
//! [`MemoryFile`] holds trees of fully materialized branches. Entries can be
//! marked corrupt so that reads touching them fail the way a damaged basket
//! would in a real file. [`MemoryHandle`] wraps a shared file and keeps
//! [`ReaderStats`] current, which makes handle lifetimes and scan counts
//! observable.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::core::ColumnValue;
use crate::io::traits::{BranchInfo, BranchShape, ColumnarFile, ColumnarReader};
use crate::{DstError, Result};

/// A single branch with one value per tree entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryBranch {
    /// Storage shape
    pub shape: BranchShape,
    /// Values, one per entry
    pub values: Vec<ColumnValue>,
    /// Entries whose storage is unreadable
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub corrupt: BTreeSet<u64>,
}

/// A tree of equally long branches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryTree {
    /// Number of entries
    pub entries: u64,
    /// Branches by path, in name order
    pub branches: BTreeMap<String, MemoryBranch>,
}

impl MemoryTree {
    /// Create an empty tree with a fixed entry count.
    pub fn new(entries: u64) -> Self {
        Self {
            entries,
            branches: BTreeMap::new(),
        }
    }

    /// Add a branch.
    pub fn with_branch(
        mut self,
        name: impl Into<String>,
        shape: BranchShape,
        values: Vec<ColumnValue>,
    ) -> Self {
        self.branches.insert(
            name.into(),
            MemoryBranch {
                shape,
                values,
                corrupt: BTreeSet::new(),
            },
        );
        self
    }

    /// Mark one entry of a branch as corrupt. Unknown branches are ignored.
    pub fn with_corrupt_entry(mut self, branch: &str, entry: u64) -> Self {
        if let Some(b) = self.branches.get_mut(branch) {
            b.corrupt.insert(entry);
        }
        self
    }

    fn validate(&self, tree: &str) -> Result<()> {
        for (name, branch) in &self.branches {
            if branch.values.len() as u64 != self.entries {
                return Err(DstError::io(
                    "MemoryTree",
                    format!(
                        "branch '{tree}/{name}' has {} values for {} entries",
                        branch.values.len(),
                        self.entries
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// A columnar file held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryFile {
    /// Top-level trees by name
    pub trees: BTreeMap<String, MemoryTree>,
}

impl MemoryFile {
    /// Create an empty file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tree, checking that every branch matches the entry count.
    pub fn insert_tree(&mut self, name: impl Into<String>, tree: MemoryTree) -> Result<()> {
        let name = name.into();
        tree.validate(&name)?;
        self.trees.insert(name, tree);
        Ok(())
    }

    /// Validate every tree. Used after deserializing a snapshot.
    pub fn validate(&self) -> Result<()> {
        for (name, tree) in &self.trees {
            tree.validate(name)?;
        }
        Ok(())
    }

    fn tree(&self, tree: &str) -> Result<&MemoryTree> {
        self.trees
            .get(tree)
            .ok_or_else(|| DstError::missing_tree(tree))
    }

    fn read(&self, tree: &str, branch: &str, range: Range<u64>) -> Result<Vec<ColumnValue>> {
        let t = self.tree(tree)?;
        let b = t
            .branches
            .get(branch)
            .ok_or_else(|| DstError::missing_branch(tree, branch))?;

        if let BranchShape::Object { class_name } = &b.shape {
            return Err(DstError::type_mismatch(
                format!("{tree}/{branch}"),
                "simple branch",
                format!("object<{class_name}>"),
            ));
        }

        if range.start > range.end || range.end > t.entries {
            return Err(DstError::io(
                "MemoryFile",
                format!(
                    "range {}..{} out of bounds for '{tree}' with {} entries",
                    range.start, range.end, t.entries
                ),
            ));
        }

        if let Some(&entry) = b.corrupt.range(range.clone()).next() {
            return Err(DstError::corrupt(tree, branch, entry));
        }

        Ok(b.values[range.start as usize..range.end as usize].to_vec())
    }
}

/// Counters shared by all handles of one reader.
#[derive(Debug, Default)]
pub struct ReaderStats {
    opened: AtomicUsize,
    live: AtomicUsize,
    entry_count_calls: AtomicUsize,
    branch_reads: AtomicUsize,
}

impl ReaderStats {
    /// Total number of handles ever opened.
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    /// Number of handles not yet released.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Number of `entry_count` calls across all handles.
    pub fn entry_count_calls(&self) -> usize {
        self.entry_count_calls.load(Ordering::SeqCst)
    }

    /// Number of `read_branch` calls across all handles.
    pub fn branch_reads(&self) -> usize {
        self.branch_reads.load(Ordering::SeqCst)
    }
}

/// Open handle onto a shared [`MemoryFile`].
pub struct MemoryHandle {
    path: String,
    file: Arc<MemoryFile>,
    stats: Arc<ReaderStats>,
}

impl MemoryHandle {
    /// Open a handle, counting it in `stats` until dropped.
    pub fn new(path: impl Into<String>, file: Arc<MemoryFile>, stats: Arc<ReaderStats>) -> Self {
        stats.opened.fetch_add(1, Ordering::SeqCst);
        stats.live.fetch_add(1, Ordering::SeqCst);
        Self {
            path: path.into(),
            file,
            stats,
        }
    }
}

impl Drop for MemoryHandle {
    fn drop(&mut self) {
        self.stats.live.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ColumnarFile for MemoryHandle {
    fn path(&self) -> &str {
        &self.path
    }

    fn list_trees(&self) -> Result<BTreeSet<String>> {
        Ok(self.file.trees.keys().cloned().collect())
    }

    fn branches(&self, tree: &str) -> Result<Vec<BranchInfo>> {
        Ok(self
            .file
            .tree(tree)?
            .branches
            .iter()
            .map(|(name, b)| BranchInfo::new(name.clone(), b.shape.clone()))
            .collect())
    }

    fn entry_count(&self, tree: &str) -> Result<u64> {
        self.stats.entry_count_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.file.tree(tree)?.entries)
    }

    fn read_branch(
        &self,
        tree: &str,
        branch: &str,
        range: Range<u64>,
    ) -> Result<Vec<ColumnValue>> {
        self.stats.branch_reads.fetch_add(1, Ordering::SeqCst);
        self.file.read(tree, branch, range)
    }
}

/// Reader serving registered in-memory files by path.
///
/// # Example
///
/// ```
/// use hessdst::io::formats::memory::{MemoryFile, MemoryReader};
/// use hessdst::io::traits::ColumnarReader;
///
/// let reader = MemoryReader::new();
/// reader.insert("run.root", MemoryFile::new());
/// let file = reader.open("run.root".as_ref())?;
/// assert!(file.list_trees()?.is_empty());
/// # Ok::<(), hessdst::DstError>(())
/// ```
#[derive(Debug, Default)]
pub struct MemoryReader {
    files: RwLock<HashMap<PathBuf, Arc<MemoryFile>>>,
    stats: Arc<ReaderStats>,
}

impl MemoryReader {
    /// Create a reader with no files.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a file under a path, replacing any previous one.
    pub fn insert(&self, path: impl AsRef<Path>, file: MemoryFile) {
        let mut files = match self.files.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        files.insert(path.as_ref().to_path_buf(), Arc::new(file));
    }

    /// Counters for handles opened through this reader.
    pub fn stats(&self) -> Arc<ReaderStats> {
        Arc::clone(&self.stats)
    }
}

impl ColumnarReader for MemoryReader {
    fn open(&self, path: &Path) -> Result<Box<dyn ColumnarFile>> {
        let files = match self.files.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let file = files.get(path).cloned().ok_or_else(|| {
            DstError::io(
                "MemoryReader",
                format!("no such file: {}", path.display()),
            )
        })?;
        Ok(Box::new(MemoryHandle::new(
            path.to_string_lossy(),
            file,
            Arc::clone(&self.stats),
        )))
    }

    fn name(&self) -> &str {
        "memory"
    }
}
