// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Per-event records emitted by the decoder.
//!
//! Field names follow the downstream pipeline's container layout
//! (`index.event_id`, `trigger.telescopes_with_trigger`,
//! `dl1.tel[id].image`, `pointing.tel[id].azimuth`). Every event owns its
//! data; nothing points back into reader buffers.

use std::collections::BTreeMap;

use serde::Serialize;

/// Identifies an event within the whole data set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EventIndex {
    /// Run identifier
    pub obs_id: u64,
    /// Event identifier, unique within the run
    pub event_id: u64,
}

impl EventIndex {
    /// Compose an event id from its bunch number (high 32 bits) and event
    /// number within the bunch (low 32 bits).
    pub fn compose_event_id(bunch_number: u32, event_number: u32) -> u64 {
        ((bunch_number as u64) << 32) | event_number as u64
    }

    /// Bunch number part of the event id.
    pub fn bunch_number(&self) -> u32 {
        (self.event_id >> 32) as u32
    }

    /// Event number part of the event id.
    pub fn event_number(&self) -> u32 {
        self.event_id as u32
    }
}

/// Kind of trigger that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventType {
    /// Regular stereo/mono air-shower trigger
    Subarray,
    /// Not known
    Unknown,
}

/// Array trigger information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerRecord {
    /// Telescopes that took part in the trigger, ascending
    pub telescopes_with_trigger: Vec<u16>,
    /// Trigger type
    pub event_type: EventType,
}

/// Calibrated camera image of one telescope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageRecord {
    /// Pixel intensities, one per camera pixel
    #[serde(rename = "image")]
    pub pixel_values: Vec<f32>,
    /// Pixel selection mask, one per camera pixel
    #[serde(rename = "image_mask")]
    pub pixel_mask: Vec<bool>,
}

impl ImageRecord {
    /// Number of pixels.
    pub fn len(&self) -> usize {
        self.pixel_values.len()
    }

    /// Check if the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixel_values.is_empty()
    }

    /// Sum of all pixel intensities.
    pub fn total_intensity(&self) -> f64 {
        self.pixel_values.iter().map(|&v| v as f64).sum()
    }
}

/// Pointing direction of one telescope, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointingRecord {
    /// Azimuth
    pub azimuth: f64,
    /// Altitude
    pub altitude: f64,
}

impl PointingRecord {
    /// Pointing for telescopes without pointing columns.
    pub const UNKNOWN: PointingRecord = PointingRecord {
        azimuth: f64::NAN,
        altitude: f64::NAN,
    };

    /// Check if both angles are known.
    pub fn is_known(&self) -> bool {
        self.azimuth.is_finite() && self.altitude.is_finite()
    }
}

/// DL1 data of an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dl1Container {
    /// Images by telescope id
    pub tel: BTreeMap<u16, ImageRecord>,
}

/// Pointing data of an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PointingContainer {
    /// Pointing by telescope id
    pub tel: BTreeMap<u16, PointingRecord>,
}

/// One multi-telescope trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayEvent {
    /// Event identity
    pub index: EventIndex,
    /// 0-based position in the stream
    pub count: u64,
    /// Trigger information
    pub trigger: TriggerRecord,
    /// Per-telescope images
    pub dl1: Dl1Container,
    /// Per-telescope pointing
    pub pointing: PointingContainer,
}

impl ArrayEvent {
    /// Create an event with no telescope data yet.
    pub fn new(index: EventIndex, count: u64, trigger: TriggerRecord) -> Self {
        Self {
            index,
            count,
            trigger,
            dl1: Dl1Container::default(),
            pointing: PointingContainer::default(),
        }
    }

    /// Image of a telescope.
    pub fn image(&self, tel_id: u16) -> Option<&ImageRecord> {
        self.dl1.tel.get(&tel_id)
    }

    /// Telescope ids that have an image, ascending.
    pub fn tels_with_image(&self) -> impl Iterator<Item = u16> + '_ {
        self.dl1.tel.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_event_id() {
        let id = EventIndex::compose_event_id(3, 7);
        assert_eq!(id, (3u64 << 32) | 7);

        let index = EventIndex {
            obs_id: 170720,
            event_id: id,
        };
        assert_eq!(index.bunch_number(), 3);
        assert_eq!(index.event_number(), 7);
    }

    #[test]
    fn test_compose_event_id_disambiguates_bunches() {
        assert_ne!(
            EventIndex::compose_event_id(0, 5),
            EventIndex::compose_event_id(1, 5)
        );
        assert!(EventIndex::compose_event_id(1, 0) > EventIndex::compose_event_id(0, u32::MAX));
    }

    #[test]
    fn test_image_record() {
        let image = ImageRecord {
            pixel_values: vec![1.0, 2.5, 0.0],
            pixel_mask: vec![true, true, false],
        };
        assert_eq!(image.len(), 3);
        assert!((image.total_intensity() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_pointing() {
        assert!(!PointingRecord::UNKNOWN.is_known());
        assert!(PointingRecord {
            azimuth: 0.1,
            altitude: 1.2
        }
        .is_known());
    }

    #[test]
    fn test_event_serializes_with_pipeline_names() {
        let mut event = ArrayEvent::new(
            EventIndex {
                obs_id: 1,
                event_id: 2,
            },
            0,
            TriggerRecord {
                telescopes_with_trigger: vec![1],
                event_type: EventType::Subarray,
            },
        );
        event.dl1.tel.insert(
            1,
            ImageRecord {
                pixel_values: vec![1.0],
                pixel_mask: vec![false],
            },
        );

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["index"]["event_id"], 2);
        assert_eq!(json["trigger"]["telescopes_with_trigger"][0], 1);
        assert_eq!(json["dl1"]["tel"]["1"]["image"][0], 1.0);
        assert_eq!(json["dl1"]["tel"]["1"]["image_mask"][0], false);
    }
}
