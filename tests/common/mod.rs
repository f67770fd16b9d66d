// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Common utilities for integration tests.
//!
//! [`DstFixture`] synthesizes DST files in memory. They can be served
//! through a [`MemoryReader`] or written as snapshot files to the temp dir.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use hessdst::io::formats::dst::constants::{
    altitude_branch, azimuth_branch, image_branch, image_mask_branch, BUNCH_NUMBER_BRANCH,
    DURATION_FIELD, EVENT_NUMBER_BRANCH, EVENT_TREE, RUN_HEADER_TREE, RUN_NUMBER_FIELD,
    START_TIME_FIELD,
};
use hessdst::io::formats::memory::{MemoryFile, MemoryReader, MemoryTree};
use hessdst::io::{BranchShape, ColumnarReader};
use hessdst::{ColumnValue, DstEventSource, DstSourceBuilder, ScalarKind};

/// Pixels per camera in every era.
pub const N_PIXELS: usize = 960;

/// Path under which fixtures are served by [`DstFixture::reader`].
pub const FIXTURE_PATH: &str = "run.root";

// ============================================================================
// Fixture Builder
// ============================================================================

/// Description of a synthetic DST file.
#[derive(Debug, Clone)]
pub struct DstFixture {
    /// Run numbers, one per run header entry
    pub run_numbers: Vec<u32>,
    /// Entries in the event tree
    pub events: u64,
    /// Run duration in seconds
    pub duration: Option<f64>,
    /// Run start, unix seconds
    pub start_time: Option<ColumnValue>,
    /// Telescopes with image, mask and pointing columns
    pub telescopes: Vec<u16>,
    /// Telescopes with an image column only
    pub image_only: Vec<u16>,
    /// Pixels per image
    pub n_pixels: usize,
    /// Corrupt entries of the event number column
    pub corrupt_events: Vec<u64>,
    /// Corrupt (telescope, entry) image cells
    pub corrupt_images: Vec<(u16, u64)>,
}

impl DstFixture {
    /// A run with no telescope columns.
    pub fn new(run_number: u32, events: u64) -> Self {
        Self {
            run_numbers: vec![run_number],
            events,
            duration: Some(1872.0),
            start_time: None,
            telescopes: Vec::new(),
            image_only: Vec::new(),
            n_pixels: N_PIXELS,
            corrupt_events: Vec::new(),
            corrupt_images: Vec::new(),
        }
    }

    pub fn run_numbers(mut self, runs: &[u32]) -> Self {
        self.run_numbers = runs.to_vec();
        self
    }

    pub fn duration(mut self, secs: f64) -> Self {
        self.duration = Some(secs);
        self
    }

    pub fn start_time(mut self, unix_secs: i64) -> Self {
        self.start_time = Some(ColumnValue::Int64(unix_secs));
        self
    }

    /// Store the run start as a double, the usual ROOT storage.
    pub fn start_time_float(mut self, unix_secs: f64) -> Self {
        self.start_time = Some(ColumnValue::Float64(unix_secs));
        self
    }

    pub fn telescopes(mut self, tels: &[u16]) -> Self {
        self.telescopes = tels.to_vec();
        self
    }

    pub fn image_only(mut self, tels: &[u16]) -> Self {
        self.image_only = tels.to_vec();
        self
    }

    pub fn pixels(mut self, n: usize) -> Self {
        self.n_pixels = n;
        self
    }

    pub fn corrupt_event(mut self, entry: u64) -> Self {
        self.corrupt_events.push(entry);
        self
    }

    pub fn corrupt_image(mut self, tel: u16, entry: u64) -> Self {
        self.corrupt_images.push((tel, entry));
        self
    }

    /// Event id the fixture stores for an entry.
    pub fn event_id(entry: u64) -> u64 {
        ((entry / 256) << 32) | (entry % 256)
    }

    /// Pixel value the fixture stores.
    pub fn pixel(tel: u16, entry: u64, pixel: usize) -> f32 {
        ((entry as usize + pixel) % 100) as f32 + tel as f32 * 0.5
    }

    /// Build the in-memory file.
    pub fn build(&self) -> MemoryFile {
        let n = self.events;
        let mut events = MemoryTree::new(n)
            .with_branch(
                BUNCH_NUMBER_BRANCH,
                BranchShape::Scalar(ScalarKind::UInt32),
                (0..n).map(|i| ColumnValue::UInt32((i / 256) as u32)).collect(),
            )
            .with_branch(
                EVENT_NUMBER_BRANCH,
                BranchShape::Scalar(ScalarKind::UInt32),
                (0..n).map(|i| ColumnValue::UInt32((i % 256) as u32)).collect(),
            );

        for &tel in self.telescopes.iter().chain(&self.image_only) {
            events = events.with_branch(
                image_branch(tel),
                BranchShape::FixedArray {
                    kind: ScalarKind::Float32,
                    len: self.n_pixels,
                },
                (0..n)
                    .map(|i| {
                        ColumnValue::Array(
                            (0..self.n_pixels)
                                .map(|p| ColumnValue::Float32(Self::pixel(tel, i, p)))
                                .collect(),
                        )
                    })
                    .collect(),
            );
        }

        for &tel in &self.telescopes {
            events = events
                .with_branch(
                    image_mask_branch(tel),
                    BranchShape::FixedArray {
                        kind: ScalarKind::Bool,
                        len: self.n_pixels,
                    },
                    (0..n)
                        .map(|_| {
                            ColumnValue::Array(
                                (0..self.n_pixels)
                                    .map(|p| ColumnValue::Bool(p % 2 == 0))
                                    .collect(),
                            )
                        })
                        .collect(),
                )
                .with_branch(
                    azimuth_branch(tel),
                    BranchShape::Scalar(ScalarKind::Float64),
                    vec![ColumnValue::Float64(3.1); n as usize],
                )
                .with_branch(
                    altitude_branch(tel),
                    BranchShape::Scalar(ScalarKind::Float64),
                    vec![ColumnValue::Float64(1.2); n as usize],
                );
        }

        for &entry in &self.corrupt_events {
            events = events.with_corrupt_entry(EVENT_NUMBER_BRANCH, entry);
        }
        for &(tel, entry) in &self.corrupt_images {
            events = events.with_corrupt_entry(&image_branch(tel), entry);
        }

        let entries = self.run_numbers.len();
        let mut header = MemoryTree::new(entries as u64).with_branch(
            RUN_NUMBER_FIELD,
            BranchShape::Scalar(ScalarKind::UInt32),
            self.run_numbers.iter().copied().map(ColumnValue::UInt32).collect(),
        );
        if let Some(secs) = self.duration {
            header = header.with_branch(
                DURATION_FIELD,
                BranchShape::Scalar(ScalarKind::Float64),
                vec![ColumnValue::Float64(secs); entries],
            );
        }
        if let Some(start) = &self.start_time {
            let kind = match start {
                ColumnValue::Float64(_) => ScalarKind::Float64,
                _ => ScalarKind::Int64,
            };
            header = header.with_branch(
                START_TIME_FIELD,
                BranchShape::Scalar(kind),
                vec![start.clone(); entries],
            );
        }
        header = header.with_branch(
            "Sash::HESSArray",
            BranchShape::Object {
                class_name: "Sash::HESSArray".into(),
            },
            vec![ColumnValue::Null; entries],
        );

        let mut file = MemoryFile::new();
        file.insert_tree(EVENT_TREE, events).unwrap();
        file.insert_tree(RUN_HEADER_TREE, header).unwrap();
        file
    }

    /// Serve the file at [`FIXTURE_PATH`] through a memory reader.
    pub fn reader(&self) -> Arc<MemoryReader> {
        let reader = MemoryReader::new();
        reader.insert(FIXTURE_PATH, self.build());
        Arc::new(reader)
    }

    /// Write the file as a snapshot in the temp dir.
    pub fn write(&self, name: &str) -> TempFile {
        let file = TempFile::new(name, "root");
        self.build().write_snapshot(file.path()).unwrap();
        file
    }
}

/// Builder over a memory reader serving `FIXTURE_PATH`.
pub fn builder(reader: &Arc<MemoryReader>) -> DstSourceBuilder {
    DstEventSource::builder()
        .path(FIXTURE_PATH)
        .reader(Arc::clone(reader) as Arc<dyn ColumnarReader>)
}

/// Open a session over a memory reader with default options.
pub fn open(reader: &Arc<MemoryReader>) -> DstEventSource {
    builder(reader).build().unwrap()
}

// ============================================================================
// Temp Files
// ============================================================================

/// A file in the temp dir, removed on drop.
pub struct TempFile {
    path: PathBuf,
}

impl TempFile {
    pub fn new(name: &str, extension: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "hessdst_test_{}_{}.{}",
            name,
            std::process::id(),
            extension
        ));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn path_str(&self) -> &str {
        self.path.to_str().unwrap()
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
