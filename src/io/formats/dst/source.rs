// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! The DST event source: one session over one file.
//!
//! Opening a session does all structural work up front: the compatibility
//! probe, run metadata extraction, subarray resolution and schema
//! discovery. A session that opens successfully has a known length and
//! run identity before the first event is decoded.
//!
//! # Example
//!
//! ```rust,no_run
//! use hessdst::DstEventSource;
//!
//! let source = DstEventSource::open("run_170720.root")?;
//! for event in source {
//!     let event = event?;
//!     println!("{} {}", event.index.obs_id, event.index.event_id);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use super::config::{DstSourceBuilder, SourceConfig};
use super::constants::{EVENT_TREE, PRODUCER_ID, START_TIME_FIELD};
use super::schema::EventSchema;
use super::stream::EventStream;
use crate::containers::{
    ArrayEvent, DataLevel, ObservationBlock, ObservationBlockState, SchedulingBlock,
    SchedulingBlockType,
};
use crate::instrument::{SubarrayConfig, SubarrayResolver};
use crate::io::detection::{self, FormatDetector};
use crate::io::metadata::{DstMetadata, HeaderValue, RunMetadataCache};
use crate::io::traits::{ColumnarFile, ColumnarReader};
use crate::{DstError, Result};

const DATALEVELS: &[DataLevel] = &[DataLevel::Dl1Images];

/// An open DST session.
pub struct DstEventSource {
    path: PathBuf,
    config: SourceConfig,
    cache: RunMetadataCache,
    metadata: Arc<DstMetadata>,
    obs_id: u64,
    subarray: Arc<SubarrayConfig>,
    trigger_tels: Vec<u16>,
    schema: Arc<EventSchema>,
}

impl DstEventSource {
    /// Open a file with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().path(path).build()
    }

    /// Start configuring a session.
    pub fn builder() -> DstSourceBuilder {
        DstSourceBuilder::new()
    }

    /// Check if a file on disk can be opened as a session.
    pub fn is_compatible<P: AsRef<Path>>(path: P) -> bool {
        detection::is_compatible(path)
    }

    pub(crate) fn open_with(
        path: PathBuf,
        config: SourceConfig,
        reader: Arc<dyn ColumnarReader>,
        resolver: &SubarrayResolver,
    ) -> Result<Self> {
        let file: Arc<dyn ColumnarFile> =
            Arc::from(FormatDetector::new(Arc::clone(&reader)).open_checked(&path)?);
        let cache = RunMetadataCache::new(Arc::clone(&file), config.header_entry);
        let metadata = cache.metadata()?;
        let obs_id = metadata.obs_id()?;
        if let Some(HeaderValue::Scalar(value)) = metadata.run_header.get(START_TIME_FIELD) {
            if metadata.run_header.start_time().is_none() {
                warn!(obs_id, field = START_TIME_FIELD, %value, "run start time not convertible");
            }
        }

        let subarray = resolver.resolve(obs_id);
        let active: BTreeSet<u16> = match &config.allowed_tels {
            Some(allowed) => subarray
                .telescope_ids
                .intersection(allowed)
                .copied()
                .collect(),
            None => subarray.telescope_ids.clone(),
        };

        let branches = file
            .branches(EVENT_TREE)
            .map_err(|e| DstError::metadata(EVENT_TREE, e.to_string()))?;
        let schema = EventSchema::discover(&branches, &active, subarray.camera.n_pixels)?;

        debug!(
            path = %path.display(),
            backend = reader.name(),
            obs_id,
            era = %subarray.era,
            num_events = metadata.num_events,
            telescopes = ?schema.tel_ids(),
            "opened DST session"
        );

        Ok(Self {
            path,
            config,
            cache,
            metadata,
            obs_id,
            subarray,
            trigger_tels: active.into_iter().collect(),
            schema: Arc::new(schema),
        })
    }

    /// Path the session was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Session options.
    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Run identifier of every event in the file.
    pub fn obs_id(&self) -> u64 {
        self.obs_id
    }

    /// Run identifiers covered by this session.
    pub fn obs_ids(&self) -> Vec<u64> {
        vec![self.obs_id]
    }

    /// Cached run metadata.
    pub fn metadata(&self) -> &Arc<DstMetadata> {
        &self.metadata
    }

    /// Whether the metadata scan has run. Always true for an open session.
    pub fn metadata_loaded(&self) -> bool {
        self.cache.is_loaded()
    }

    /// Array configuration in effect for this run.
    pub fn subarray(&self) -> &Arc<SubarrayConfig> {
        &self.subarray
    }

    /// Decoding plan of the event tree.
    pub fn schema(&self) -> &EventSchema {
        &self.schema
    }

    /// Data levels this source provides.
    pub fn datalevels(&self) -> &'static [DataLevel] {
        DATALEVELS
    }

    /// Whether the file holds simulated events.
    pub fn is_simulation(&self) -> bool {
        false
    }

    /// Configured event cap.
    pub fn max_events(&self) -> Option<u64> {
        self.config.max_events
    }

    /// Number of events a full iteration yields: the event count, or the
    /// cap when it is smaller.
    pub fn len(&self) -> u64 {
        let total = self.metadata.num_events;
        self.config.max_events.map_or(total, |cap| cap.min(total))
    }

    /// Check if iteration yields no events.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Observation blocks keyed by obs_id.
    pub fn observation_blocks(&self) -> BTreeMap<u64, ObservationBlock> {
        let header = &self.metadata.run_header;
        let block = ObservationBlock {
            obs_id: self.obs_id,
            sb_id: self.obs_id,
            producer_id: PRODUCER_ID.to_string(),
            state: ObservationBlockState::Completed,
            actual_start_time: header.start_time(),
            actual_duration: header.duration(),
        };
        BTreeMap::from([(self.obs_id, block)])
    }

    /// Scheduling blocks keyed by obs_id.
    pub fn scheduling_blocks(&self) -> BTreeMap<u64, SchedulingBlock> {
        let block = SchedulingBlock {
            sb_id: self.obs_id,
            producer_id: PRODUCER_ID.to_string(),
            sb_type: SchedulingBlockType::Observation,
        };
        BTreeMap::from([(self.obs_id, block)])
    }
}

impl fmt::Debug for DstEventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DstEventSource")
            .field("path", &self.path)
            .field("obs_id", &self.obs_id)
            .field("era", &self.subarray.era)
            .field("len", &self.len())
            .field("telescopes", &self.schema.tel_ids())
            .finish()
    }
}

impl IntoIterator for DstEventSource {
    type Item = Result<ArrayEvent>;
    type IntoIter = EventStream;

    /// Consume the session into its event stream. The stream becomes the
    /// sole owner of the file handle.
    fn into_iter(self) -> EventStream {
        let limit = self.len();
        let file = Arc::clone(self.cache.file());
        drop(self.cache);

        EventStream::new(
            file,
            self.schema,
            self.obs_id,
            self.trigger_tels,
            limit,
            self.config.batch_size,
        )
    }
}
