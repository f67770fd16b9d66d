// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! In-memory columnar backend.
//!
//! - [`MemoryFile`] / [`MemoryReader`] - files built in code, served by path
//! - [`SnapshotReader`] - files loaded from serialized snapshots on disk

pub mod file;
pub mod snapshot;

pub use file::{MemoryBranch, MemoryFile, MemoryHandle, MemoryReader, MemoryTree, ReaderStats};
pub use snapshot::SnapshotReader;
