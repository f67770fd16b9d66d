// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Telescope, optics, camera and site descriptions.

use serde::Serialize;

/// Telescope size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SizeType {
    /// Medium-sized telescope (the 12 m H.E.S.S. dishes)
    Mst,
    /// Large-sized telescope (the 28 m H.E.S.S. dish)
    Lst,
}

/// Reflector geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReflectorShape {
    /// Davies-Cotton tessellated reflector
    DaviesCotton,
    /// Parabolic reflector
    Parabolic,
}

/// Optical properties of a telescope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpticsDescription {
    /// Optics name
    pub name: String,
    /// Size class
    pub size_type: SizeType,
    /// Number of mirrors in the optical path
    pub n_mirrors: u32,
    /// Equivalent focal length in metres
    pub equivalent_focal_length_m: f64,
    /// Effective focal length in metres
    pub effective_focal_length_m: f64,
    /// Total mirror area in square metres
    pub mirror_area_m2: f64,
    /// Number of mirror facets
    pub n_mirror_tiles: u32,
    /// Reflector geometry
    pub reflector_shape: ReflectorShape,
}

/// Camera readout and pixel layout summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraDescription {
    /// Camera name
    pub name: String,
    /// Number of pixels; the length of every image from this camera
    pub n_pixels: usize,
    /// Number of gain channels
    pub n_channels: u32,
    /// Waveform samples per pixel
    pub n_samples: u32,
    /// Sampling rate in GHz
    pub sampling_rate_ghz: f64,
}

/// Geodetic location of the array reference point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SiteLocation {
    /// Latitude in degrees
    pub lat_deg: f64,
    /// Longitude in degrees
    pub lon_deg: f64,
    /// Height above sea level in metres
    pub height_m: f64,
}

impl SiteLocation {
    /// The H.E.S.S. site in the Khomas Highland, Namibia.
    pub const HESS: SiteLocation = SiteLocation {
        lat_deg: -23.2771843,
        lon_deg: 16.5051989,
        height_m: 1800.0,
    };
}

/// One telescope of a subarray.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelescopeDescription {
    /// Telescope name (e.g. "CT1")
    pub name: String,
    /// Optics
    pub optics: OpticsDescription,
    /// Camera
    pub camera: CameraDescription,
}

impl OpticsDescription {
    /// Optics of the 12 m H.E.S.S. I telescopes.
    pub fn hess1() -> Self {
        Self {
            name: "HESS1".to_string(),
            size_type: SizeType::Mst,
            n_mirrors: 1,
            equivalent_focal_length_m: 15.0,
            effective_focal_length_m: 15.2,
            mirror_area_m2: 107.0,
            n_mirror_tiles: 382,
            reflector_shape: ReflectorShape::DaviesCotton,
        }
    }

    /// Optics of the 28 m CT5 telescope.
    pub fn ct5() -> Self {
        Self {
            name: "HESS2".to_string(),
            size_type: SizeType::Lst,
            n_mirrors: 1,
            equivalent_focal_length_m: 36.0,
            effective_focal_length_m: 36.0,
            mirror_area_m2: 614.0,
            n_mirror_tiles: 875,
            reflector_shape: ReflectorShape::Parabolic,
        }
    }
}

impl CameraDescription {
    /// The original H.E.S.S. I camera.
    pub fn hess1() -> Self {
        Self {
            name: "HESS-I".to_string(),
            n_pixels: 960,
            n_channels: 2,
            n_samples: 16,
            sampling_rate_ghz: 1.0,
        }
    }

    /// The FlashCam camera installed in the upgraded array.
    pub fn flashcam() -> Self {
        Self {
            name: "FlashCam".to_string(),
            n_pixels: 960,
            n_channels: 1,
            n_samples: 128,
            sampling_rate_ghz: 0.25,
        }
    }
}
