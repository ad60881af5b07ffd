//! Conversion between [`DischargeEvent`]s and stored attribute records.

use crate::tracker::{
    CELL_SIZE_UM, DischargeEvent, Point, SpeedProvenance, instant_speeds, synthetic_timestamps,
};

use super::record::{AttrValue, AttributeStore, Record};
use super::{Result, StoreError};

const RECORD_PREFIX: &str = "discharge_";

/// Group key for an analysis window, e.g. `"10.00_20.00"`.
pub fn window_key(start: f64, stop: f64) -> String {
    format!("{start:.2}_{stop:.2}")
}

/// Record key for the event at `index` within a window.
pub fn record_key(index: usize) -> String {
    format!("{RECORD_PREFIX}{index}")
}

fn record_index(key: &str) -> Option<usize> {
    key.strip_prefix(RECORD_PREFIX)?.parse().ok()
}

/// Persists discharge events grouped by analysis window.
#[derive(Debug)]
pub struct EventStore<S: AttributeStore> {
    backend: S,
    cell_size_um: f64,
}

impl<S: AttributeStore> EventStore<S> {
    pub fn new(backend: S) -> Self {
        Self {
            backend,
            cell_size_um: CELL_SIZE_UM,
        }
    }

    /// Electrode pitch used to recompute speeds for legacy records.
    pub fn with_cell_size(mut self, cell_size_um: f64) -> Self {
        self.cell_size_um = cell_size_um;
        self
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Write `events` under the window `start..stop`.
    ///
    /// Record `i` overwrites any existing `discharge_i`; records past the end of
    /// `events` left by an earlier save are removed.
    ///
    /// # Errors
    /// Returns an error if the backend cannot be written. Records committed before
    /// the failure stay in place.
    pub fn save(&mut self, events: &[DischargeEvent], start: f64, stop: f64) -> Result<()> {
        let window = window_key(start, stop);
        for (index, event) in events.iter().enumerate() {
            let record = event_to_record(event);
            self.backend
                .write_record(&window, &record_key(index), &record)?;
        }

        for key in self.backend.record_keys(&window)? {
            if record_index(&key).is_some_and(|i| i >= events.len()) {
                self.backend.remove_record(&window, &key)?;
            }
        }

        log::debug!("saved {} discharge events under {window}", events.len());
        Ok(())
    }

    /// Read every `discharge_*` record under `window`, ordered by index.
    ///
    /// # Errors
    /// Returns an error if the window does not exist or a record lacks a required
    /// attribute.
    pub fn load(&self, window: &str) -> Result<Vec<DischargeEvent>> {
        let mut indexed: Vec<(usize, String, Record)> = self
            .backend
            .read_records(window)?
            .into_iter()
            .filter_map(|(key, record)| record_index(&key).map(|i| (i, key, record)))
            .collect();
        indexed.sort_by_key(|(i, _, _)| *i);

        indexed
            .iter()
            .map(|(_, key, record)| event_from_record(key, record, self.cell_size_um))
            .collect()
    }

    /// Remove the event at `index` from `window`. Returns whether it existed.
    pub fn delete(&mut self, window: &str, index: usize) -> Result<bool> {
        self.backend.remove_record(window, &record_key(index))
    }

    pub fn list_windows(&self) -> Result<Vec<String>> {
        self.backend.windows()
    }
}

fn pairs(points: &[Point]) -> AttrValue {
    AttrValue::Pairs(points.iter().map(Point::to_array).collect())
}

fn event_to_record(event: &DischargeEvent) -> Record {
    let mut record = Record::new();
    let mut put = |name: &str, value: AttrValue| {
        record.insert(name.to_string(), value);
    };
    put("start_time", AttrValue::Scalar(event.start_time));
    put("end_time", AttrValue::Scalar(event.end_time));
    put("duration", AttrValue::Scalar(event.duration));
    put("length", AttrValue::Scalar(event.length));
    put("avg_speed", AttrValue::Scalar(event.avg_speed));
    put("points", pairs(&event.points));
    put("timestamps", AttrValue::Array(event.timestamps.clone()));
    put("instant_speeds", AttrValue::Array(event.instant_speeds.clone()));
    put("start_point", AttrValue::Array(event.start_point.to_array().to_vec()));
    put("end_point", AttrValue::Array(event.end_point.to_array().to_vec()));
    put(
        "time_since_last_discharge",
        AttrValue::Scalar(event.time_since_last_discharge),
    );
    record
}

struct RecordReader<'a> {
    key: &'a str,
    record: &'a Record,
}

impl RecordReader<'_> {
    fn invalid(&self, field: &'static str, reason: &str) -> StoreError {
        StoreError::InvalidField {
            record: self.key.to_string(),
            field,
            reason: reason.to_string(),
        }
    }

    fn missing(&self, field: &'static str) -> StoreError {
        StoreError::MissingField {
            record: self.key.to_string(),
            field,
        }
    }

    fn scalar(&self, field: &'static str) -> Result<f64> {
        let value = self.record.get(field).ok_or_else(|| self.missing(field))?;
        value
            .as_scalar()
            .ok_or_else(|| self.invalid(field, "expected a scalar"))
    }

    fn array_opt(&self, field: &'static str) -> Result<Option<Vec<f64>>> {
        self.record
            .get(field)
            .map(|v| {
                v.as_array()
                    .map(<[f64]>::to_vec)
                    .ok_or_else(|| self.invalid(field, "expected a 1-D array"))
            })
            .transpose()
    }

    fn points(&self, field: &'static str) -> Result<Vec<Point>> {
        let value = self.record.get(field).ok_or_else(|| self.missing(field))?;
        let pairs = value
            .as_pairs()
            .ok_or_else(|| self.invalid(field, "expected (row, col) pairs"))?;
        Ok(pairs.into_iter().map(Point::from).collect())
    }

    fn point_opt(&self, field: &'static str) -> Result<Option<Point>> {
        self.record
            .get(field)
            .map(|v| {
                v.as_pair()
                    .map(Point::from)
                    .ok_or_else(|| self.invalid(field, "expected a (row, col) pair"))
            })
            .transpose()
    }
}

fn event_from_record(key: &str, record: &Record, cell_size_um: f64) -> Result<DischargeEvent> {
    let r = RecordReader { key, record };

    let start_time = r.scalar("start_time")?;
    let end_time = r.scalar("end_time")?;
    let points = r.points("points")?;

    let stored_timestamps = r.array_opt("timestamps")?;
    let stored_speeds = r.array_opt("instant_speeds")?;
    for (field, values) in [
        ("timestamps", &stored_timestamps),
        ("instant_speeds", &stored_speeds),
    ] {
        if values.as_ref().is_some_and(|v| v.len() != points.len()) {
            return Err(r.invalid(field, "length differs from `points`"));
        }
    }

    let (timestamps, instant_speeds, provenance) = match (stored_timestamps, stored_speeds) {
        (Some(ts), Some(speeds)) => (ts, speeds, SpeedProvenance::Recorded),
        (Some(ts), None) => {
            log::warn!(
                "{key}: legacy record without instant_speeds, recomputing from timestamps"
            );
            let speeds = instant_speeds(&points, &ts, cell_size_um);
            (ts, speeds, SpeedProvenance::DerivedFromTimestamps)
        }
        (None, speeds) => {
            log::warn!("{key}: legacy record without timestamps, speeds are approximate");
            let ts = synthetic_timestamps(&points, start_time, end_time);
            let speeds = speeds.unwrap_or_else(|| instant_speeds(&points, &ts, cell_size_um));
            (ts, speeds, SpeedProvenance::SyntheticTimestamps)
        }
    };

    let start_point = match r.point_opt("start_point")? {
        Some(p) => p,
        None => *points.first().ok_or_else(|| r.missing("start_point"))?,
    };
    let end_point = match r.point_opt("end_point")? {
        Some(p) => p,
        None => *points.last().ok_or_else(|| r.missing("end_point"))?,
    };

    Ok(DischargeEvent {
        start_time,
        end_time,
        duration: r.scalar("duration")?,
        length: r.scalar("length")?,
        avg_speed: r.scalar("avg_speed")?,
        points,
        timestamps,
        instant_speeds,
        start_point,
        end_point,
        time_since_last_discharge: r.scalar("time_since_last_discharge")?,
        provenance,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_key_format() {
        assert_eq!(window_key(10.0, 20.0), "10.00_20.00");
        assert_eq!(window_key(0.124, 3.457), "0.12_3.46");
    }

    #[test]
    fn test_record_index_ordering() {
        assert_eq!(record_index("discharge_10"), Some(10));
        assert_eq!(record_index("discharge_x"), None);
        assert_eq!(record_index("other_1"), None);
    }
}
