// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Run metadata extracted from a DST file.
//!
//! [`RunMetadataCache`] reads the event count and the run header once per
//! open handle and memoizes the result. The first call does the scan; every
//! later call, from any thread, returns the same [`DstMetadata`].

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::formats::dst::constants::{
    DURATION_FIELD, EVENT_TREE, RUN_HEADER_TREE, RUN_NUMBER_FIELD, START_TIME_FIELD,
};
use super::traits::ColumnarFile;
use crate::core::ColumnValue;
use crate::{DstError, Result};

/// A single run header field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HeaderValue {
    /// Decoded scalar
    Scalar(ColumnValue),
    /// The field exists but could not be decoded
    Unreadable {
        /// Why decoding failed
        reason: String,
    },
}

impl HeaderValue {
    /// Check if the field could not be decoded.
    pub fn is_unreadable(&self) -> bool {
        matches!(self, HeaderValue::Unreadable { .. })
    }

    /// The decoded scalar, if any.
    pub fn value(&self) -> Option<&ColumnValue> {
        match self {
            HeaderValue::Scalar(v) => Some(v),
            HeaderValue::Unreadable { .. } => None,
        }
    }
}

impl std::fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeaderValue::Scalar(v) => write!(f, "{v}"),
            HeaderValue::Unreadable { reason } => write!(f, "<unreadable: {reason}>"),
        }
    }
}

/// Field name to value table of one run header entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RunHeader {
    fields: BTreeMap<String, HeaderValue>,
}

impl RunHeader {
    /// Create a header from a field table.
    pub fn new(fields: BTreeMap<String, HeaderValue>) -> Self {
        Self { fields }
    }

    /// Get a field.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.fields.get(name)
    }

    /// Iterate fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields, readable or not.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the header has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Names of fields that could not be decoded.
    pub fn unreadable_fields(&self) -> Vec<&str> {
        self.iter()
            .filter(|(_, v)| v.is_unreadable())
            .map(|(k, _)| k)
            .collect()
    }

    /// Run number, the observation id of every event in the file.
    pub fn run_number(&self) -> Option<u64> {
        self.get(RUN_NUMBER_FIELD)
            .and_then(HeaderValue::value)
            .and_then(ColumnValue::as_u64)
    }

    /// Run duration.
    pub fn duration(&self) -> Option<Duration> {
        self.get(DURATION_FIELD)
            .and_then(HeaderValue::value)
            .and_then(ColumnValue::as_f64)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// Run start time, from integer or floating point unix seconds.
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        let value = self.get(START_TIME_FIELD).and_then(HeaderValue::value)?;
        if let Some(secs) = value.as_i64() {
            return DateTime::<Utc>::from_timestamp(secs, 0);
        }

        let secs = value.as_f64().filter(|s| s.is_finite())?;
        let whole = secs.floor();
        let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
        DateTime::<Utc>::from_timestamp(whole as i64, nanos)
    }
}

/// Summary of one DST file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DstMetadata {
    /// Entries in the canonical event tree
    pub num_events: u64,
    /// Selected run header entry
    pub run_header: RunHeader,
}

impl DstMetadata {
    /// The run identifier read from the run header.
    ///
    /// The file name is never consulted.
    pub fn obs_id(&self) -> Result<u64> {
        self.run_header.run_number().ok_or_else(|| {
            DstError::metadata(
                RUN_HEADER_TREE,
                format!("field '{RUN_NUMBER_FIELD}' is missing or unreadable"),
            )
        })
    }
}

/// Which physical run header entry to use when a file holds several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderEntryPolicy {
    /// The first entry
    First,
    /// The last entry, reflecting the final run conditions of concatenated files
    #[default]
    Last,
}

impl HeaderEntryPolicy {
    /// Pick an entry among `count` header entries. `count` must be non-zero.
    pub fn select(self, count: u64) -> u64 {
        match self {
            HeaderEntryPolicy::First => 0,
            HeaderEntryPolicy::Last => count.saturating_sub(1),
        }
    }
}

/// Lazily computed, memoized run metadata for one open file handle.
pub struct RunMetadataCache {
    file: Arc<dyn ColumnarFile>,
    policy: HeaderEntryPolicy,
    cell: OnceLock<Result<Arc<DstMetadata>>>,
}

impl RunMetadataCache {
    /// Create a cache over an open handle. Nothing is read until first use.
    pub fn new(file: Arc<dyn ColumnarFile>, policy: HeaderEntryPolicy) -> Self {
        Self {
            file,
            policy,
            cell: OnceLock::new(),
        }
    }

    /// Get the metadata, scanning the file on first call only.
    ///
    /// A failed extraction is cached too: the same error is returned on
    /// every call.
    pub fn metadata(&self) -> Result<Arc<DstMetadata>> {
        self.cell
            .get_or_init(|| extract(self.file.as_ref(), self.policy).map(Arc::new))
            .clone()
    }

    /// Check whether the metadata has been computed.
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// The handle this cache reads from.
    pub fn file(&self) -> &Arc<dyn ColumnarFile> {
        &self.file
    }
}

fn extract(file: &dyn ColumnarFile, policy: HeaderEntryPolicy) -> Result<DstMetadata> {
    let trees = file
        .list_trees()
        .map_err(|e| DstError::metadata(EVENT_TREE, e.to_string()))?;
    for tree in [EVENT_TREE, RUN_HEADER_TREE] {
        if !trees.contains(tree) {
            return Err(DstError::metadata(tree, "tree not found"));
        }
    }

    let num_events = file
        .entry_count(EVENT_TREE)
        .map_err(|e| DstError::metadata(EVENT_TREE, e.to_string()))?;

    let header_entries = file
        .entry_count(RUN_HEADER_TREE)
        .map_err(|e| DstError::metadata(RUN_HEADER_TREE, e.to_string()))?;
    if header_entries == 0 {
        return Err(DstError::metadata(RUN_HEADER_TREE, "no run header entries"));
    }
    let entry = policy.select(header_entries);

    let branches = file
        .branches(RUN_HEADER_TREE)
        .map_err(|e| DstError::metadata(RUN_HEADER_TREE, e.to_string()))?;

    let mut fields = BTreeMap::new();
    for branch in branches {
        let value = if branch.shape.is_simple() {
            read_header_field(file, &branch.name, entry)
        } else {
            Err(DstError::field_decode(
                &branch.name,
                format!("{} storage needs a streamer", branch.shape),
            ))
        };

        let value = value.unwrap_or_else(|e| {
            warn!(entry, fields = ?e.log_fields(), "run header field unreadable");
            HeaderValue::Unreadable {
                reason: e.to_string(),
            }
        });
        fields.insert(branch.name, value);
    }

    debug!(
        path = file.path(),
        num_events,
        header_entries,
        header_entry = entry,
        fields = fields.len(),
        "extracted run metadata"
    );

    Ok(DstMetadata {
        num_events,
        run_header: RunHeader::new(fields),
    })
}

fn read_header_field(file: &dyn ColumnarFile, name: &str, entry: u64) -> Result<HeaderValue> {
    let mut values = file.read_branch(RUN_HEADER_TREE, name, entry..entry + 1)?;
    match values.pop() {
        Some(ColumnValue::Array(_)) | Some(ColumnValue::Null) | None => Err(
            DstError::field_decode(name, "expected a single scalar value"),
        ),
        Some(value) => Ok(HeaderValue::Scalar(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ScalarKind;
    use crate::io::formats::memory::{MemoryFile, MemoryReader, MemoryTree};
    use crate::io::traits::{BranchShape, ColumnarReader};
    use std::path::Path;

    fn header_tree(run_nums: &[u32]) -> MemoryTree {
        let n = run_nums.len();
        MemoryTree::new(n as u64)
            .with_branch(
                RUN_NUMBER_FIELD,
                BranchShape::Scalar(ScalarKind::UInt32),
                run_nums.iter().copied().map(ColumnValue::UInt32).collect(),
            )
            .with_branch(
                DURATION_FIELD,
                BranchShape::Scalar(ScalarKind::Float64),
                vec![ColumnValue::Float64(1872.0); n],
            )
            .with_branch(
                "Target",
                BranchShape::Scalar(ScalarKind::String),
                vec![ColumnValue::String("Crab".into()); n],
            )
            .with_branch(
                "Sash::RunHeader",
                BranchShape::Object {
                    class_name: "Sash::RunHeader".into(),
                },
                vec![ColumnValue::Null; n],
            )
    }

    fn open(file: MemoryFile) -> (MemoryReader, Arc<dyn ColumnarFile>) {
        let reader = MemoryReader::new();
        reader.insert("run.root", file);
        let handle: Arc<dyn ColumnarFile> =
            Arc::from(reader.open(Path::new("run.root")).unwrap());
        (reader, handle)
    }

    fn dst(run_nums: &[u32], events: u64) -> MemoryFile {
        let mut file = MemoryFile::new();
        file.insert_tree(EVENT_TREE, MemoryTree::new(events)).unwrap();
        file.insert_tree(RUN_HEADER_TREE, header_tree(run_nums))
            .unwrap();
        file
    }

    #[test]
    fn test_extracts_header_fields() {
        let (_reader, handle) = open(dst(&[170720], 42));
        let cache = RunMetadataCache::new(handle, HeaderEntryPolicy::Last);

        let meta = cache.metadata().unwrap();
        assert_eq!(meta.num_events, 42);
        assert_eq!(meta.obs_id().unwrap(), 170720);
        assert_eq!(meta.run_header.duration(), Some(Duration::from_secs(1872)));
        assert_eq!(
            meta.run_header.get("Target").and_then(HeaderValue::value),
            Some(&ColumnValue::String("Crab".into()))
        );
    }

    #[test]
    fn test_streamer_field_is_sentinel() {
        let (_reader, handle) = open(dst(&[1], 1));
        let cache = RunMetadataCache::new(handle, HeaderEntryPolicy::Last);

        let meta = cache.metadata().unwrap();
        assert_eq!(meta.run_header.len(), 4);
        assert_eq!(meta.run_header.unreadable_fields(), vec!["Sash::RunHeader"]);
        assert_eq!(meta.obs_id().unwrap(), 1);
    }

    #[test]
    fn test_corrupt_field_is_sentinel() {
        let mut file = MemoryFile::new();
        file.insert_tree(EVENT_TREE, MemoryTree::new(3)).unwrap();
        file.insert_tree(
            RUN_HEADER_TREE,
            header_tree(&[99]).with_corrupt_entry(DURATION_FIELD, 0),
        )
        .unwrap();
        let (_reader, handle) = open(file);

        let meta = RunMetadataCache::new(handle, HeaderEntryPolicy::Last)
            .metadata()
            .unwrap();
        assert!(meta.run_header.get(DURATION_FIELD).unwrap().is_unreadable());
        assert_eq!(meta.run_header.duration(), None);
        assert_eq!(meta.obs_id().unwrap(), 99);
    }

    #[test]
    fn test_start_time_integer_and_float() {
        let header = |value: ColumnValue| {
            RunHeader::new(BTreeMap::from([(
                START_TIME_FIELD.to_string(),
                HeaderValue::Scalar(value),
            )]))
        };

        assert_eq!(
            header(ColumnValue::Int64(1_600_000_000)).start_time(),
            DateTime::<Utc>::from_timestamp(1_600_000_000, 0)
        );
        assert_eq!(
            header(ColumnValue::Float64(1_600_000_000.5)).start_time(),
            DateTime::<Utc>::from_timestamp(1_600_000_000, 500_000_000)
        );
        assert_eq!(header(ColumnValue::Float64(f64::NAN)).start_time(), None);
        assert_eq!(
            header(ColumnValue::String("yesterday".into())).start_time(),
            None
        );
        assert_eq!(RunHeader::default().start_time(), None);
    }

    #[test]
    fn test_last_header_entry_wins() {
        let (_reader, handle) = open(dst(&[100, 200, 300], 1));
        let meta = RunMetadataCache::new(handle, HeaderEntryPolicy::Last)
            .metadata()
            .unwrap();
        assert_eq!(meta.obs_id().unwrap(), 300);
    }

    #[test]
    fn test_first_header_entry_policy() {
        let (_reader, handle) = open(dst(&[100, 200, 300], 1));
        let meta = RunMetadataCache::new(handle, HeaderEntryPolicy::First)
            .metadata()
            .unwrap();
        assert_eq!(meta.obs_id().unwrap(), 100);
    }

    #[test]
    fn test_missing_trees_are_fatal() {
        let mut file = MemoryFile::new();
        file.insert_tree(EVENT_TREE, MemoryTree::new(3)).unwrap();
        let (_reader, handle) = open(file);

        let err = RunMetadataCache::new(handle, HeaderEntryPolicy::Last)
            .metadata()
            .unwrap_err();
        assert_eq!(err, DstError::metadata(RUN_HEADER_TREE, "tree not found"));
    }

    #[test]
    fn test_empty_header_tree_is_fatal() {
        let (_reader, handle) = open(dst(&[], 3));
        let err = RunMetadataCache::new(handle, HeaderEntryPolicy::Last)
            .metadata()
            .unwrap_err();
        assert!(matches!(err, DstError::MetadataExtraction { .. }));
    }

    #[test]
    fn test_metadata_computed_once() {
        let (reader, handle) = open(dst(&[170720], 10));
        let stats = reader.stats();
        let cache = RunMetadataCache::new(handle, HeaderEntryPolicy::Last);
        assert!(!cache.is_loaded());

        let first = cache.metadata().unwrap();
        let scans = stats.entry_count_calls();
        let reads = stats.branch_reads();
        let second = cache.metadata().unwrap();

        assert!(cache.is_loaded());
        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(stats.entry_count_calls(), scans);
        assert_eq!(stats.branch_reads(), reads);
    }

    #[test]
    fn test_metadata_concurrent_callers() {
        let (reader, handle) = open(dst(&[170720], 10));
        let stats = reader.stats();
        let cache = Arc::new(RunMetadataCache::new(handle, HeaderEntryPolicy::Last));

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.metadata().unwrap())
            })
            .collect();
        let results: Vec<_> = threads.into_iter().map(|t| t.join().unwrap()).collect();

        for meta in &results {
            assert!(Arc::ptr_eq(meta, &results[0]));
        }
        // One scan reads the event tree and the header tree entry counts.
        assert_eq!(stats.entry_count_calls(), 2);
    }

    #[test]
    fn test_header_entry_policy_serde() {
        let policy: HeaderEntryPolicy = serde_json::from_str("\"first\"").unwrap();
        assert_eq!(policy, HeaderEntryPolicy::First);
        assert_eq!(HeaderEntryPolicy::default(), HeaderEntryPolicy::Last);
        assert_eq!(HeaderEntryPolicy::Last.select(3), 2);
    }
}
