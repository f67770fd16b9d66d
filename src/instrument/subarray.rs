// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Run-number driven subarray resolution.
//!
//! The array configuration changed over the observatory's lifetime. Each
//! [`Era`] covers a half-open run range `[lower, next_lower)`; the last era
//! extends to infinity. A run number equal to a boundary belongs to the
//! later era.
//!
//! # Example
//!
//! ```
//! use hessdst::instrument::{Era, SubarrayResolver};
//!
//! let resolver = SubarrayResolver::hess();
//! assert_eq!(resolver.resolve(15_999).era, Era::Hess1);
//! assert_eq!(resolver.resolve(16_000).era, Era::Hess2);
//! assert_eq!(resolver.resolve(170_720).era, Era::HessFlashCam);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use super::description::{
    CameraDescription, OpticsDescription, SiteLocation, TelescopeDescription,
};
use crate::{DstError, Result};

/// First run of the H.E.S.S. II era (CT5 joins the array).
pub const HESS2_FIRST_RUN: u64 = 16_000;

/// First run of the FlashCam era.
pub const FLASHCAM_FIRST_RUN: u64 = 160_000;

/// A span of runs sharing one array configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Era {
    /// Four 12 m telescopes
    Hess1,
    /// Four 12 m telescopes and the 28 m CT5
    Hess2,
    /// The array after the FlashCam camera upgrade
    HessFlashCam,
}

impl Era {
    /// Era name as used in run catalogues.
    pub fn as_str(&self) -> &'static str {
        match self {
            Era::Hess1 => "HESS1",
            Era::Hess2 => "HESS2",
            Era::HessFlashCam => "HESS-FlashCam",
        }
    }

    /// Build the fixed configuration of this era.
    pub fn config(&self) -> SubarrayConfig {
        let (telescope_ids, camera): (&[u16], CameraDescription) = match self {
            Era::Hess1 => (&[1, 2, 3, 4][..], CameraDescription::hess1()),
            Era::Hess2 => (&[1, 2, 3, 4, 5][..], CameraDescription::hess1()),
            Era::HessFlashCam => (&[1, 2, 3, 4, 5][..], CameraDescription::flashcam()),
        };

        SubarrayConfig {
            name: self.as_str().to_string(),
            era: *self,
            telescope_ids: telescope_ids.iter().copied().collect(),
            optics: OpticsDescription::hess1(),
            camera,
            site_location: SiteLocation::HESS,
            positions: telescope_ids
                .iter()
                .map(|&id| (id, ground_position(id)))
                .collect(),
        }
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Telescope id of the 28 m dish.
pub const CT5_ID: u16 = 5;

// Positions relative to the array centre, metres (east, north, up). The
// 12 m positions are a schematic layout, not surveyed coordinates. CT5
// stands at the centre.
fn ground_position(tel_id: u16) -> [f64; 3] {
    match tel_id {
        1 => [-40.0, 0.0, 0.0],
        2 => [40.0, 0.0, 0.0],
        3 => [0.0, 40.0, 0.0],
        4 => [0.0, -40.0, 0.0],
        _ => [0.0, 0.0, 0.0],
    }
}

/// Telescope array configuration in effect for a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubarrayConfig {
    /// Subarray name
    pub name: String,
    /// Era this configuration belongs to
    pub era: Era,
    /// Telescopes present in the array
    pub telescope_ids: BTreeSet<u16>,
    /// Optics of the 12 m telescopes
    pub optics: OpticsDescription,
    /// Camera shared by the telescopes
    pub camera: CameraDescription,
    /// Array reference location
    pub site_location: SiteLocation,
    /// Ground positions relative to the reference location
    pub positions: BTreeMap<u16, [f64; 3]>,
}

impl SubarrayConfig {
    /// Number of telescopes.
    pub fn n_tels(&self) -> usize {
        self.telescope_ids.len()
    }

    /// Telescope ids in ascending order.
    pub fn tel_ids(&self) -> impl Iterator<Item = u16> + '_ {
        self.telescope_ids.iter().copied()
    }

    /// Check if a telescope is part of the subarray.
    pub fn contains(&self, tel_id: u16) -> bool {
        self.telescope_ids.contains(&tel_id)
    }

    /// Optics of one telescope. CT5 carries the large dish.
    pub fn tel_optics(&self, tel_id: u16) -> Option<OpticsDescription> {
        match tel_id {
            _ if !self.contains(tel_id) => None,
            CT5_ID => Some(OpticsDescription::ct5()),
            _ => Some(self.optics.clone()),
        }
    }

    /// Description of one telescope.
    pub fn tel(&self, tel_id: u16) -> Option<TelescopeDescription> {
        self.tel_optics(tel_id).map(|optics| TelescopeDescription {
            name: format!("CT{tel_id}"),
            optics,
            camera: self.camera.clone(),
        })
    }
}

/// Maps run numbers to array configurations.
///
/// Configurations are built once and shared read-only; every session that
/// resolves to the same era receives the same `Arc`.
#[derive(Debug, Clone)]
pub struct SubarrayResolver {
    // Sorted by lower bound; the first bound is always 0.
    eras: Vec<(u64, Arc<SubarrayConfig>)>,
}

impl SubarrayResolver {
    /// Create a resolver from the earliest configuration and the later eras
    /// with their first run numbers.
    ///
    /// Boundaries must be strictly increasing and greater than zero.
    pub fn new(
        earliest: SubarrayConfig,
        later: Vec<(u64, SubarrayConfig)>,
    ) -> Result<Self> {
        let mut eras = Vec::with_capacity(later.len() + 1);
        eras.push((0, Arc::new(earliest)));

        let mut previous = 0;
        for (lower, config) in later {
            if lower <= previous {
                return Err(DstError::config(format!(
                    "era boundary {lower} must be greater than {previous}"
                )));
            }
            previous = lower;
            eras.push((lower, Arc::new(config)));
        }

        Ok(Self { eras })
    }

    /// The H.E.S.S. era table.
    pub fn hess() -> Self {
        Self {
            eras: vec![
                (0, Arc::new(Era::Hess1.config())),
                (HESS2_FIRST_RUN, Arc::new(Era::Hess2.config())),
                (FLASHCAM_FIRST_RUN, Arc::new(Era::HessFlashCam.config())),
            ],
        }
    }

    /// Resolve the configuration in effect for a run.
    ///
    /// Total over all run numbers: runs past the last boundary fall into the
    /// last era.
    pub fn resolve(&self, run_id: u64) -> Arc<SubarrayConfig> {
        let idx = self.eras.partition_point(|(lower, _)| *lower <= run_id);
        let (_, config) = &self.eras[idx.saturating_sub(1)];
        Arc::clone(config)
    }

    /// Lower bounds of all eras after the first.
    pub fn boundaries(&self) -> Vec<u64> {
        self.eras.iter().skip(1).map(|(lower, _)| *lower).collect()
    }
}

impl Default for SubarrayResolver {
    fn default() -> Self {
        Self::hess()
    }
}
