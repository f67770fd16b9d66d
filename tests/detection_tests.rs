// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Compatibility probing and snapshot-backed sessions.
//!
//! Run with: cargo test --test detection_tests

mod common;

use std::fs::File;
use std::io::Write;
use std::sync::Arc;

use common::{builder, DstFixture, TempFile, FIXTURE_PATH};
use hessdst::io::formats::dst::constants::EVENT_TREE;
use hessdst::io::formats::memory::{MemoryFile, MemoryReader, MemoryTree, SnapshotReader};
use hessdst::io::{ColumnarReader, FormatDetector};
use hessdst::{is_compatible, DstError, DstEventSource, Era, Result};

#[test]
fn test_snapshot_is_compatible() {
    let file = DstFixture::new(170720, 12).write("compatible");
    assert!(is_compatible(file.path()));
    assert!(DstEventSource::is_compatible(file.path()));
}

#[test]
fn test_garbage_root_file_not_compatible() {
    let file = TempFile::new("garbage", "root");
    {
        let mut f = File::create(file.path()).unwrap();
        f.write_all(b"root\0\0\0\x06garbage bytes").unwrap();
        f.sync_all().unwrap();
    }
    assert!(!is_compatible(file.path()));
}

#[test]
fn test_empty_root_file_not_compatible() {
    let file = TempFile::new("empty", "root");
    File::create(file.path()).unwrap();
    assert!(!is_compatible(file.path()));
}

#[test]
fn test_wrong_extension_not_compatible() {
    let fixture = DstFixture::new(170720, 3);
    let file = TempFile::new("wrong_ext", "fits");
    fixture.build().write_snapshot(file.path()).unwrap();
    assert!(!is_compatible(file.path()));
}

#[test]
fn test_uppercase_extension_compatible() {
    let fixture = DstFixture::new(170720, 3);
    let file = TempFile::new("upper_ext", "ROOT");
    fixture.build().write_snapshot(file.path()).unwrap();
    assert!(is_compatible(file.path()));
}

#[test]
fn test_missing_file_not_compatible() {
    assert!(!is_compatible("/nonexistent/run_170720.root"));
}

#[test]
fn test_missing_event_tree_not_compatible() {
    let mut memory = MemoryFile::new();
    memory.insert_tree("RunHeader", MemoryTree::new(1)).unwrap();
    let file = TempFile::new("no_event_tree", "root");
    memory.write_snapshot(file.path()).unwrap();

    let err = FormatDetector::default().probe(file.path()).unwrap_err();
    assert!(matches!(err, DstError::IncompatibleFormat { .. }));
    assert!(err.to_string().contains(EVENT_TREE));
}

#[test]
fn test_probe_releases_handle() {
    let reader = DstFixture::new(170720, 3).reader();
    let detector = FormatDetector::new(Arc::clone(&reader) as Arc<dyn ColumnarReader>);

    assert!(detector.is_compatible(FIXTURE_PATH.as_ref()));
    assert_eq!(reader.stats().opened(), 1);
    assert_eq!(reader.stats().live(), 0);
}

#[test]
fn test_open_rejects_incompatible_before_scanning() {
    let reader = Arc::new(MemoryReader::new());
    let mut memory = MemoryFile::new();
    memory.insert_tree("RunHeader", MemoryTree::new(1)).unwrap();
    reader.insert(FIXTURE_PATH, memory);

    let err = builder(&reader).build().unwrap_err();
    assert!(matches!(err, DstError::IncompatibleFormat { .. }));
    assert_eq!(reader.stats().entry_count_calls(), 0);
    assert_eq!(reader.stats().branch_reads(), 0);
    assert_eq!(reader.stats().live(), 0);
}

#[test]
fn test_open_fails_fast_without_run_header() {
    let reader = Arc::new(MemoryReader::new());
    let mut memory = DstFixture::new(170720, 3).build();
    memory.trees.remove("RunHeader");
    reader.insert(FIXTURE_PATH, memory);

    let err = builder(&reader).build().unwrap_err();
    assert!(matches!(err, DstError::MetadataExtraction { .. }));
    assert_eq!(reader.stats().live(), 0);
}

#[test]
fn test_open_fails_without_run_number() {
    let reader = Arc::new(MemoryReader::new());
    let mut memory = DstFixture::new(170720, 3).build();
    if let Some(header) = memory.trees.get_mut("RunHeader") {
        header.branches.remove("RunNum");
    }
    reader.insert(FIXTURE_PATH, memory);

    let err = builder(&reader).build().unwrap_err();
    assert!(err.to_string().contains("RunNum"));
}

#[test]
fn test_open_snapshot_session() {
    let file = DstFixture::new(42_000, 20).telescopes(&[1]).write("session");
    let source = DstEventSource::open(file.path()).unwrap();

    assert_eq!(source.obs_id(), 42_000);
    assert_eq!(source.subarray().era, Era::Hess2);
    assert_eq!(source.len(), 20);

    let events = source.into_iter().collect::<Result<Vec<_>>>().unwrap();
    assert_eq!(events.len(), 20);
    assert_eq!(events[19].image(1).unwrap().pixel_values.len(), 960);
}

#[test]
fn test_snapshot_keeps_corrupt_entries() {
    let file = DstFixture::new(170720, 30).corrupt_event(12).write("corrupt");
    let reader = SnapshotReader::new();
    let source = DstEventSource::builder()
        .path(file.path())
        .reader(Arc::new(reader.clone()))
        .batch_size(5)
        .build()
        .unwrap();

    let items: Vec<_> = source.into_iter().collect();
    assert_eq!(items.len(), 13);
    assert!(matches!(items[12], Err(DstError::Decode { entry: 12, .. })));
    assert_eq!(reader.stats().live(), 0);
}

#[test]
fn test_snapshot_session_parses_file_once() {
    let file = DstFixture::new(170720, 8).write("single_open");
    let reader = SnapshotReader::new();
    let source = DstEventSource::builder()
        .path(file.path())
        .reader(Arc::new(reader.clone()))
        .build()
        .unwrap();

    assert_eq!(reader.stats().opened(), 1);
    assert_eq!(source.into_iter().count(), 8);
    assert_eq!(reader.stats().opened(), 1);
    assert_eq!(reader.stats().live(), 0);
}
