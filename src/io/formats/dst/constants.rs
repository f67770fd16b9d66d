// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! DST file layout constants.

/// Expected container file extension.
pub const DST_EXTENSION: &str = "root";

/// Canonical event tree. Its entry count is the run's event count.
pub const EVENT_TREE: &str = "DST_tree";

/// Run header tree, one entry per physical run header.
pub const RUN_HEADER_TREE: &str = "RunHeader";

/// Bunch number of an event (high 32 bits of the event id).
pub const BUNCH_NUMBER_BRANCH: &str = "EventHeader/BunchNumber";

/// Event number within a bunch (low 32 bits of the event id).
pub const EVENT_NUMBER_BRANCH: &str = "EventHeader/EventNumber";

/// Run header field holding the run number.
pub const RUN_NUMBER_FIELD: &str = "RunNum";

/// Run header field holding the run duration in seconds.
pub const DURATION_FIELD: &str = "Duration";

/// Run header field holding the run start as unix seconds.
pub const START_TIME_FIELD: &str = "StartTime";

/// Producer id reported on observation and scheduling blocks.
pub const PRODUCER_ID: &str = "HESS";

/// Entries read per batch from the event tree.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Per-telescope branch names: `CT<id>/<column>`.
pub const TELESCOPE_BRANCH_PATTERN: &str = r"^CT(\d+)/(image|image_mask|azimuth|altitude)$";

/// Image (pixel intensity) branch of a telescope.
pub fn image_branch(tel_id: u16) -> String {
    format!("CT{tel_id}/image")
}

/// Image mask branch of a telescope.
pub fn image_mask_branch(tel_id: u16) -> String {
    format!("CT{tel_id}/image_mask")
}

/// Pointing azimuth branch of a telescope (radians).
pub fn azimuth_branch(tel_id: u16) -> String {
    format!("CT{tel_id}/azimuth")
}

/// Pointing altitude branch of a telescope (radians).
pub fn altitude_branch(tel_id: u16) -> String {
    format!("CT{tel_id}/altitude")
}
