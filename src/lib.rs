// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! # hessdst
//!
//! Ingestion engine for H.E.S.S. DST files.
//!
//! A DST file stores one observation run as column-oriented trees. This
//! library turns it into a stream of per-trigger array events:
//! - **Detection** of compatible files in [`io::detection`](crate::io::detection)
//! - **Run metadata** extracted once per session in [`io::metadata`](crate::io::metadata)
//! - **Subarray resolution** by run number in [`instrument`](crate::instrument)
//! - **Event decoding** in [`io::formats::dst`](crate::io::formats::dst)
//!
//! ## Architecture
//!
//! - `core/` - Error taxonomy and column values
//! - `io/traits.rs` - Columnar reader capability the engine reads through
//! - `io/formats/memory/` - In-memory and snapshot backends
//! - `io/formats/dst/` - Sessions, schema discovery, the event stream
//! - `instrument/` - Telescope descriptions and era table
//! - `containers/` - Records handed to the consuming pipeline
//!
//! ## Example: Reading events
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use hessdst::DstEventSource;
//!
//! let source = DstEventSource::builder()
//!     .path("run_170720.root")
//!     .max_events(10)
//!     .build()?;
//!
//! println!("run {} ({})", source.obs_id(), source.subarray().era);
//! for event in source {
//!     let event = event?;
//!     for (tel_id, image) in &event.dl1.tel {
//!         println!("CT{tel_id}: {:.1} p.e.", image.total_intensity());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// Core types
pub mod core;

// Re-export core types for convenience
pub use core::{ColumnValue, DstError, Result, ScalarKind};

// Consumer container model
pub mod containers;

// Telescope and subarray descriptions
pub mod instrument;

// I/O (reader traits, detection, metadata, formats)
pub mod io;

pub use containers::{ArrayEvent, DataLevel, ObservationBlock, SchedulingBlock};
pub use instrument::{Era, SubarrayConfig, SubarrayResolver};
pub use io::{
    is_compatible, DstEventSource, DstMetadata, DstSourceBuilder, EventStream, SourceConfig,
};
