// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core types used throughout hessdst.
//!
//! - [`DstError`] - Error taxonomy for probing, metadata and decoding
//! - [`ColumnValue`] - Unified value representation for branch reads
//! - [`ScalarKind`] - Element type of a branch

pub mod error;
pub mod value;

pub use error::{DstError, Result};
pub use value::{ColumnValue, ScalarKind};
