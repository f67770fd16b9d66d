// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Streaming event decoder.
//!
//! [`EventStream`] walks the event tree in file order. Columns are read in
//! fixed-size batches and events are handed out one at a time. A batch read
//! that fails is re-issued entry by entry so the first bad entry is known
//! exactly: every event before it is still yielded, followed by one
//! terminal [`DstError::Decode`].
//!
//! Failures in the event header columns end the stream. Failures in a
//! telescope column only remove that telescope's record from that event.

use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::ops::Range;
use std::sync::Arc;

use tracing::{debug, warn};

use super::constants::EVENT_TREE;
use super::schema::{EventSchema, TelescopeColumns};
use crate::containers::{
    ArrayEvent, EventIndex, EventType, ImageRecord, PointingRecord, TriggerRecord,
};
use crate::core::ColumnValue;
use crate::io::traits::ColumnarFile;
use crate::{DstError, Result};

/// Forward-only iterator over the events of one session.
///
/// Yields `Ok(event)` for every decoded entry. A stream that hits an
/// undecodable entry yields exactly one `Err` and then ends; a stream that
/// ends without an `Err` was fully consumed (or reached its cap). The file
/// handle is released as soon as the stream ends, and on drop otherwise.
pub struct EventStream {
    file: Option<Arc<dyn ColumnarFile>>,
    schema: Arc<EventSchema>,
    obs_id: u64,
    trigger_tels: Vec<u16>,
    batch_size: usize,
    next_entry: u64,
    end: u64,
    buffer: VecDeque<ArrayEvent>,
    pending_error: Option<DstError>,
    yielded: u64,
    last_event_id: Option<u64>,
}

impl EventStream {
    /// Create a stream over entries `0..limit` of the event tree.
    pub(crate) fn new(
        file: Arc<dyn ColumnarFile>,
        schema: Arc<EventSchema>,
        obs_id: u64,
        trigger_tels: Vec<u16>,
        limit: u64,
        batch_size: usize,
    ) -> Self {
        Self {
            file: Some(file),
            schema,
            obs_id,
            trigger_tels,
            batch_size: batch_size.max(1),
            next_entry: 0,
            end: limit,
            buffer: VecDeque::new(),
            pending_error: None,
            yielded: 0,
            last_event_id: None,
        }
    }

    /// Run identifier stamped on every event.
    pub fn obs_id(&self) -> u64 {
        self.obs_id
    }

    /// Number of events yielded so far.
    pub fn yielded(&self) -> u64 {
        self.yielded
    }

    /// Whether the stream has ended and released its file handle.
    pub fn is_finished(&self) -> bool {
        self.file.is_none() && self.buffer.is_empty() && self.pending_error.is_none()
    }

    fn release(&mut self) {
        if self.file.take().is_some() {
            debug!(obs_id = self.obs_id, events = self.yielded, "event stream released file");
        }
    }

    fn fill_batch(&mut self) {
        let Some(file) = self.file.clone() else {
            return;
        };
        let schema = Arc::clone(&self.schema);
        let start = self.next_entry;
        let stop = start.saturating_add(self.batch_size as u64).min(self.end);

        let (ids, failure) = read_event_ids(file.as_ref(), &schema, start..stop);
        let good = start..start + ids.len() as u64;

        let columns: Vec<TelescopeBatch> = schema
            .telescopes
            .iter()
            .map(|tel| TelescopeBatch::read(file.as_ref(), tel, good.clone()))
            .collect();

        for (i, event_id) in ids.into_iter().enumerate() {
            let entry = start + i as u64;
            if let Some(previous) = self.last_event_id {
                if event_id <= previous {
                    warn!(obs_id = self.obs_id, entry, event_id, previous, "event ids not increasing");
                }
            }
            self.last_event_id = Some(event_id);

            let mut event = ArrayEvent::new(
                EventIndex {
                    obs_id: self.obs_id,
                    event_id,
                },
                self.yielded + self.buffer.len() as u64,
                TriggerRecord {
                    telescopes_with_trigger: self.trigger_tels.clone(),
                    event_type: EventType::Subarray,
                },
            );

            for batch in &columns {
                batch.assemble(i, entry, schema.n_pixels, &mut event);
            }
            self.buffer.push_back(event);
        }

        debug!(start, stop, decoded = good.end - start, "read event batch");

        self.next_entry = good.end;
        if let Some((entry, cause)) = failure {
            let error = DstError::decode(entry, cause.to_string());
            warn!(obs_id = self.obs_id, fields = ?error.log_fields(), "event stream ended by decode error");
            self.pending_error = Some(error);
            self.next_entry = self.end;
        }
    }
}

impl Iterator for EventStream {
    type Item = Result<ArrayEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(event) = self.buffer.pop_front() {
                self.yielded += 1;
                return Some(Ok(event));
            }
            if let Some(err) = self.pending_error.take() {
                self.release();
                return Some(Err(err));
            }
            if self.file.is_none() || self.next_entry >= self.end {
                self.release();
                return None;
            }
            self.fill_batch();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.is_finished() {
            return (0, Some(0));
        }
        let buffered = self.buffer.len();
        let remaining = usize::try_from(self.end - self.next_entry).ok();
        // One extra slot for a terminal error.
        (
            buffered,
            remaining.and_then(|r| r.checked_add(buffered + 1)),
        )
    }
}

impl FusedIterator for EventStream {}

/// Per-telescope columns of one batch, one result per entry.
struct TelescopeBatch<'a> {
    columns: &'a TelescopeColumns,
    image: Vec<Result<ColumnValue>>,
    mask: Option<Vec<Result<ColumnValue>>>,
    azimuth: Option<Vec<Result<ColumnValue>>>,
    altitude: Option<Vec<Result<ColumnValue>>>,
}

impl<'a> TelescopeBatch<'a> {
    fn read(file: &dyn ColumnarFile, columns: &'a TelescopeColumns, range: Range<u64>) -> Self {
        let read = |branch: &String| read_isolated(file, branch, range.clone());
        Self {
            columns,
            image: read(&columns.image),
            mask: columns.image_mask.as_ref().map(read),
            azimuth: columns.azimuth.as_ref().map(read),
            altitude: columns.altitude.as_ref().map(read),
        }
    }

    fn assemble(&self, i: usize, entry: u64, n_pixels: usize, event: &mut ArrayEvent) {
        let tel_id = self.columns.tel_id;

        match self.image(i, n_pixels) {
            Ok(image) => {
                event.dl1.tel.insert(tel_id, image);
            }
            Err(e) => warn!(tel_id, entry, fields = ?e.log_fields(), "omitting telescope image"),
        }

        match self.pointing(i) {
            Ok(pointing) => {
                event.pointing.tel.insert(tel_id, pointing);
            }
            Err(e) => warn!(tel_id, entry, fields = ?e.log_fields(), "omitting telescope pointing"),
        }
    }

    fn image(&self, i: usize, n_pixels: usize) -> Result<ImageRecord> {
        let branch = &self.columns.image;
        let pixel_values = decode_pixels(branch, &self.image[i], n_pixels, |v| {
            v.as_f64().map(|x| x as f32)
        })?;

        let pixel_mask = match (&self.columns.image_mask, &self.mask) {
            (Some(branch), Some(mask)) => {
                decode_pixels(branch, &mask[i], n_pixels, ColumnValue::as_bool).unwrap_or_else(
                    |e| {
                        warn!(tel_id = self.columns.tel_id, fields = ?e.log_fields(), "using empty image mask");
                        vec![false; n_pixels]
                    },
                )
            }
            _ => vec![false; n_pixels],
        };

        Ok(ImageRecord {
            pixel_values,
            pixel_mask,
        })
    }

    fn pointing(&self, i: usize) -> Result<PointingRecord> {
        let angle = |branch: &Option<String>, values: &Option<Vec<Result<ColumnValue>>>| {
            match (branch, values) {
                (Some(branch), Some(values)) => match &values[i] {
                    Ok(v) => v.as_f64().ok_or_else(|| {
                        DstError::type_mismatch(branch.as_str(), "number", v.type_name())
                    }),
                    Err(e) => Err(DstError::field_decode(branch.as_str(), e.to_string())),
                },
                _ => Ok(f64::NAN),
            }
        };

        Ok(PointingRecord {
            azimuth: angle(&self.columns.azimuth, &self.azimuth)?,
            altitude: angle(&self.columns.altitude, &self.altitude)?,
        })
    }
}

fn decode_pixels<T>(
    branch: &str,
    value: &Result<ColumnValue>,
    n_pixels: usize,
    convert: impl Fn(&ColumnValue) -> Option<T>,
) -> Result<Vec<T>> {
    let value = value
        .as_ref()
        .map_err(|e| DstError::field_decode(branch, e.to_string()))?;
    let elements = value
        .as_array()
        .ok_or_else(|| DstError::type_mismatch(branch, "array", value.type_name()))?;
    if elements.len() != n_pixels {
        return Err(DstError::field_decode(
            branch,
            format!("{} pixels, camera has {n_pixels}", elements.len()),
        ));
    }

    elements
        .iter()
        .map(|e| {
            convert(e).ok_or_else(|| DstError::field_decode(branch, format!("bad pixel value {e}")))
        })
        .collect()
}

type Failure = (u64, DstError);

fn earliest(a: Option<Failure>, b: Option<Failure>) -> Option<Failure> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.0 < a.0 { b } else { a }),
        (a, b) => a.or(b),
    }
}

/// Decode event ids up to the first entry whose header cannot be read.
fn read_event_ids(
    file: &dyn ColumnarFile,
    schema: &EventSchema,
    range: Range<u64>,
) -> (Vec<u64>, Option<Failure>) {
    let start = range.start;
    let (bunches, bunch_failure) = read_until_error(file, &schema.bunch_number, range.clone());
    let (numbers, number_failure) = read_until_error(file, &schema.event_number, range);
    let mut failure = earliest(bunch_failure, number_failure);

    let mut ids = Vec::with_capacity(bunches.len().min(numbers.len()));
    for (i, (bunch, number)) in bunches.iter().zip(&numbers).enumerate() {
        let (Some(bunch), Some(number)) = (bunch.as_u32(), number.as_u32()) else {
            let entry = start + i as u64;
            let err = DstError::type_mismatch(
                format!("{}+{}", schema.bunch_number, schema.event_number),
                "uint32",
                format!("{bunch}, {number}"),
            );
            failure = earliest(failure, Some((entry, err)));
            break;
        };
        ids.push(EventIndex::compose_event_id(bunch, number));
    }

    (ids, failure)
}

fn read_one(file: &dyn ColumnarFile, branch: &str, entry: u64) -> Result<ColumnValue> {
    let mut values = file.read_branch(EVENT_TREE, branch, entry..entry + 1)?;
    match (values.pop(), values.is_empty()) {
        (Some(value), true) => Ok(value),
        _ => Err(DstError::field_decode(
            branch,
            format!("expected one value at entry {entry}"),
        )),
    }
}

fn read_batch(file: &dyn ColumnarFile, branch: &str, range: Range<u64>) -> Option<Vec<ColumnValue>> {
    let expected = (range.end - range.start) as usize;
    match file.read_branch(EVENT_TREE, branch, range.clone()) {
        Ok(values) if values.len() == expected => Some(values),
        Ok(values) => {
            debug!(branch, expected, got = values.len(), "short batch read, retrying per entry");
            None
        }
        Err(e) => {
            debug!(branch, start = range.start, end = range.end, error = %e, "batch read failed, retrying per entry");
            None
        }
    }
}

/// Read a column, stopping at the first unreadable entry.
fn read_until_error(
    file: &dyn ColumnarFile,
    branch: &str,
    range: Range<u64>,
) -> (Vec<ColumnValue>, Option<Failure>) {
    if let Some(values) = read_batch(file, branch, range.clone()) {
        return (values, None);
    }

    let mut values = Vec::with_capacity((range.end - range.start) as usize);
    for entry in range {
        match read_one(file, branch, entry) {
            Ok(value) => values.push(value),
            Err(e) => return (values, Some((entry, e))),
        }
    }
    (values, None)
}

/// Read a column, keeping one result per entry.
fn read_isolated(file: &dyn ColumnarFile, branch: &str, range: Range<u64>) -> Vec<Result<ColumnValue>> {
    if range.is_empty() {
        return Vec::new();
    }
    match read_batch(file, branch, range.clone()) {
        Some(values) => values.into_iter().map(Ok).collect(),
        None => range.map(|entry| read_one(file, branch, entry)).collect(),
    }
}
