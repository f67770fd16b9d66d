// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Observation and scheduling block records and data level identifiers.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Processing level of the data a source provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DataLevel {
    /// Raw waveforms
    R0,
    /// Calibrated waveforms
    R1,
    /// Data-volume reduced waveforms
    Dl0,
    /// Calibrated camera images
    Dl1Images,
    /// Image parameters
    Dl1Parameters,
    /// Reconstructed shower properties
    Dl2,
}

/// Execution state of an observation block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObservationBlockState {
    /// Finished without abort
    Completed,
    /// State unknown
    Unknown,
}

/// Kind of scheduling block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SchedulingBlockType {
    /// Regular science observation
    Observation,
}

/// One executed observation (a run).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservationBlock {
    /// Run identifier
    pub obs_id: u64,
    /// Scheduling block the run belongs to
    pub sb_id: u64,
    /// Facility that produced the data
    pub producer_id: String,
    /// Execution state
    pub state: ObservationBlockState,
    /// Start of data taking
    pub actual_start_time: Option<DateTime<Utc>>,
    /// Length of data taking
    pub actual_duration: Option<Duration>,
}

impl ObservationBlock {
    /// Duration in minutes.
    pub fn actual_duration_minutes(&self) -> Option<f64> {
        self.actual_duration.map(|d| d.as_secs_f64() / 60.0)
    }
}

/// The scheduling unit a run was taken under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulingBlock {
    /// Scheduling block identifier
    pub sb_id: u64,
    /// Facility that produced the data
    pub producer_id: String,
    /// Block kind
    pub sb_type: SchedulingBlockType,
}
