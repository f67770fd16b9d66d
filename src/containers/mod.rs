// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Records handed to the consuming pipeline.

pub mod blocks;
pub mod event;

pub use blocks::{
    DataLevel, ObservationBlock, ObservationBlockState, SchedulingBlock, SchedulingBlockType,
};
pub use event::{
    ArrayEvent, Dl1Container, EventIndex, EventType, ImageRecord, PointingContainer,
    PointingRecord, TriggerRecord,
};
