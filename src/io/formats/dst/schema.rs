// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Event tree schema discovery.
//!
//! The event tree's branch list is inspected once per session. Branch
//! shapes are validated here so the stream never has to inspect a storage
//! type again while decoding.

use std::collections::{BTreeMap, BTreeSet};

use regex::Regex;
use tracing::{debug, warn};

use super::constants::{BUNCH_NUMBER_BRANCH, EVENT_NUMBER_BRANCH, EVENT_TREE, TELESCOPE_BRANCH_PATTERN};
use crate::core::ScalarKind;
use crate::io::traits::{BranchInfo, BranchShape};
use crate::{DstError, Result};

/// Resolved columns of one telescope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelescopeColumns {
    /// Telescope id
    pub tel_id: u16,
    /// Pixel intensity branch
    pub image: String,
    /// Pixel mask branch; an all-false mask is used when absent
    pub image_mask: Option<String>,
    /// Pointing azimuth branch
    pub azimuth: Option<String>,
    /// Pointing altitude branch
    pub altitude: Option<String>,
}

impl TelescopeColumns {
    /// Whether both pointing columns are present.
    pub fn has_pointing(&self) -> bool {
        self.azimuth.is_some() && self.altitude.is_some()
    }
}

/// Decoding plan for the event tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSchema {
    /// Bunch number branch
    pub bunch_number: String,
    /// Event number branch
    pub event_number: String,
    /// Decodable telescopes, ascending by id
    pub telescopes: Vec<TelescopeColumns>,
    /// Telescopes of the active set that cannot be decoded, with the reason
    pub dropped: BTreeMap<u16, String>,
    /// Expected pixels per image
    pub n_pixels: usize,
}

#[derive(Default)]
struct Candidate<'a> {
    image: Option<&'a BranchInfo>,
    image_mask: Option<&'a BranchInfo>,
    azimuth: Option<&'a BranchInfo>,
    altitude: Option<&'a BranchInfo>,
}

impl EventSchema {
    /// Build the decoding plan from the event tree's branches.
    ///
    /// `active` is the set of telescopes to decode. Telescope columns
    /// outside it are ignored. The event header branches are required;
    /// everything per telescope degrades.
    pub fn discover(
        branches: &[BranchInfo],
        active: &BTreeSet<u16>,
        n_pixels: usize,
    ) -> Result<Self> {
        let bunch_number = require_id_branch(branches, BUNCH_NUMBER_BRANCH)?;
        let event_number = require_id_branch(branches, EVENT_NUMBER_BRANCH)?;

        let pattern = Regex::new(TELESCOPE_BRANCH_PATTERN)
            .map_err(|e| DstError::Other(format!("invalid telescope pattern: {e}")))?;

        let mut candidates: BTreeMap<u16, Candidate> = BTreeMap::new();
        for branch in branches {
            let Some(caps) = pattern.captures(&branch.name) else {
                continue;
            };
            let Ok(tel_id) = caps[1].parse::<u16>() else {
                debug!(branch = %branch.name, "telescope id out of range");
                continue;
            };
            if !active.contains(&tel_id) {
                continue;
            }

            let slot = candidates.entry(tel_id).or_default();
            match &caps[2] {
                "image" => slot.image = Some(branch),
                "image_mask" => slot.image_mask = Some(branch),
                "azimuth" => slot.azimuth = Some(branch),
                _ => slot.altitude = Some(branch),
            }
        }

        let mut telescopes = Vec::new();
        let mut dropped = BTreeMap::new();
        for &tel_id in active {
            let candidate = candidates.remove(&tel_id).unwrap_or_default();

            let image = match candidate.image {
                None => Err("no image column".to_string()),
                Some(b) => check_pixel_shape(b, n_pixels, ScalarKind::is_numeric).map(|_| b),
            };
            let image = match image {
                Ok(b) => b.name.clone(),
                Err(reason) => {
                    warn!(tel_id, reason = %reason, "telescope dropped from decoding");
                    dropped.insert(tel_id, reason);
                    continue;
                }
            };

            let image_mask = candidate.image_mask.and_then(|b| {
                check_pixel_shape(b, n_pixels, is_flag)
                    .map_err(|reason| {
                        warn!(tel_id, branch = %b.name, reason = %reason, "ignoring image mask column");
                    })
                    .ok()
                    .map(|_| b.name.clone())
            });

            telescopes.push(TelescopeColumns {
                tel_id,
                image,
                image_mask,
                azimuth: candidate.azimuth.and_then(|b| pointing_column(tel_id, b)),
                altitude: candidate.altitude.and_then(|b| pointing_column(tel_id, b)),
            });
        }

        debug!(
            telescopes = telescopes.len(),
            dropped = dropped.len(),
            n_pixels,
            "discovered event schema"
        );

        Ok(Self {
            bunch_number,
            event_number,
            telescopes,
            dropped,
            n_pixels,
        })
    }

    /// Ids of decodable telescopes, ascending.
    pub fn tel_ids(&self) -> Vec<u16> {
        self.telescopes.iter().map(|t| t.tel_id).collect()
    }

    /// Columns of one telescope.
    pub fn telescope(&self, tel_id: u16) -> Option<&TelescopeColumns> {
        self.telescopes.iter().find(|t| t.tel_id == tel_id)
    }
}

fn is_integer(kind: ScalarKind) -> bool {
    kind.is_numeric() && !matches!(kind, ScalarKind::Float32 | ScalarKind::Float64)
}

fn is_flag(kind: ScalarKind) -> bool {
    kind == ScalarKind::Bool || is_integer(kind)
}

fn require_id_branch(branches: &[BranchInfo], name: &str) -> Result<String> {
    let branch = branches
        .iter()
        .find(|b| b.name == name)
        .ok_or_else(|| DstError::metadata(EVENT_TREE, format!("branch '{name}' not found")))?;

    match branch.shape {
        BranchShape::Scalar(kind) if is_integer(kind) => Ok(branch.name.clone()),
        ref shape => Err(DstError::metadata(
            EVENT_TREE,
            format!("branch '{name}' has {shape} storage, expected an integer scalar"),
        )),
    }
}

fn check_pixel_shape(
    branch: &BranchInfo,
    n_pixels: usize,
    kind_ok: fn(ScalarKind) -> bool,
) -> std::result::Result<(), String> {
    match &branch.shape {
        BranchShape::FixedArray { kind, len } if kind_ok(*kind) => {
            if *len == n_pixels {
                Ok(())
            } else {
                Err(format!("'{}' holds {len} pixels, camera has {n_pixels}", branch.name))
            }
        }
        // Length is checked per event.
        BranchShape::Jagged(kind) if kind_ok(*kind) => Ok(()),
        shape => Err(format!("'{}' has unusable {shape} storage", branch.name)),
    }
}

fn pointing_column(tel_id: u16, branch: &BranchInfo) -> Option<String> {
    match branch.shape {
        BranchShape::Scalar(kind) if kind.is_numeric() => Some(branch.name.clone()),
        ref shape => {
            warn!(tel_id, branch = %branch.name, shape = %shape, "ignoring pointing column");
            None
        }
    }
}
