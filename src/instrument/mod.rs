// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Instrument model: telescope descriptions and era-based subarray
//! resolution.

pub mod description;
pub mod subarray;

pub use description::{
    CameraDescription, OpticsDescription, ReflectorShape, SiteLocation, SizeType,
    TelescopeDescription,
};
pub use subarray::{Era, SubarrayConfig, SubarrayResolver, FLASHCAM_FIRST_RUN, HESS2_FIRST_RUN};
