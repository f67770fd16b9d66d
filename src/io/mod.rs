// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! I/O layer for DST files.
//!
//! This module provides the columnar reader abstraction, compatibility
//! detection, run metadata extraction and the DST format itself.

pub mod detection;
pub mod formats;
pub mod metadata;

// Re-exports
pub use detection::{is_compatible, FormatDetector};
pub use metadata::{DstMetadata, HeaderEntryPolicy, HeaderValue, RunHeader, RunMetadataCache};

// Traits for columnar readers
pub mod traits;
pub use traits::{BranchInfo, BranchShape, ColumnarFile, ColumnarReader};

pub use formats::dst::{DstEventSource, DstSourceBuilder, EventStream, SourceConfig};
