//! Finalized discharge events and the statistics derived from a retired track.

use crate::tracker::point::{Point, path_length};

/// Physical electrode pitch, micrometers per grid cell.
pub const CELL_SIZE_UM: f64 = 60.0;

/// Where the per-segment speeds of an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedProvenance {
    /// Computed at finalization, or read back from a current-schema record
    #[default]
    Recorded,
    /// Recomputed on load from stored timestamps
    DerivedFromTimestamps,
    /// Recomputed on load from timestamps interpolated along the path; approximate
    SyntheticTimestamps,
}

/// A finalized, reportable track.
#[derive(Debug, Clone, PartialEq)]
pub struct DischargeEvent {
    /// Time of the first observed point, seconds
    pub start_time: f64,
    /// Time of the last observed point, seconds
    pub end_time: f64,
    /// `end_time - start_time`, milliseconds
    pub duration: f64,
    /// Observed points with consecutive duplicates removed
    pub points: Vec<Point>,
    /// Time of each retained point, seconds
    pub timestamps: Vec<f64>,
    /// Path length, millimeters
    pub length: f64,
    /// Average speed, mm/s
    pub avg_speed: f64,
    /// Per-segment speeds, mm/s, one entry per point
    pub instant_speeds: Vec<f64>,
    pub start_point: Point,
    pub end_point: Point,
    /// Milliseconds since the start of the previous event, 0 for the first one
    pub time_since_last_discharge: f64,
    pub provenance: SpeedProvenance,
}

/// Why a retired track was not promoted to an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    /// Fewer than two distinct points after deduplication
    TooFewPoints(usize),
    /// Path length (mm) below the configured minimum
    TooShort(f64),
}

/// Drop consecutive exact-duplicate points, keeping the time of the first one.
pub fn dedup_consecutive(observations: &[(Point, f64)]) -> (Vec<Point>, Vec<f64>) {
    let mut points: Vec<Point> = Vec::with_capacity(observations.len());
    let mut timestamps = Vec::with_capacity(observations.len());
    for &(p, t) in observations {
        if points.last() == Some(&p) {
            continue;
        }
        points.push(p);
        timestamps.push(t);
    }
    (points, timestamps)
}

/// Path length in millimeters.
pub fn length_mm(points: &[Point], cell_size_um: f64) -> f64 {
    path_length(points) * cell_size_um / 1000.0
}

/// Per-segment speeds in mm/s.
///
/// The result has one entry per point; the last entry repeats the final segment
/// speed, and a segment with zero time delta has speed 0.
pub fn instant_speeds(points: &[Point], timestamps: &[f64], cell_size_um: f64) -> Vec<f64> {
    if points.len() < 2 {
        return vec![0.0; points.len()];
    }
    let mut speeds: Vec<f64> = points
        .windows(2)
        .zip(timestamps.windows(2))
        .map(|(p, t)| {
            let dist_mm = p[0].distance(&p[1]) * cell_size_um / 1000.0;
            let dt = t[1] - t[0];
            if dt == 0.0 { 0.0 } else { dist_mm / dt }
        })
        .collect();
    let last = speeds.last().copied().unwrap_or(0.0);
    speeds.resize(points.len(), last);
    speeds
}

/// Timestamps spread over `start..=end` in proportion to cumulative path distance.
///
/// Used only to recover approximate speeds for records that never stored times.
pub fn synthetic_timestamps(points: &[Point], start: f64, end: f64) -> Vec<f64> {
    match points.len() {
        0 => return Vec::new(),
        1 => return vec![start],
        _ => {}
    }
    let span = end - start;
    let total = path_length(points);
    let last = (points.len() - 1) as f64;
    let mut acc = 0.0;
    let mut out = Vec::with_capacity(points.len());
    out.push(start);
    for (i, w) in points.windows(2).enumerate() {
        acc += w[0].distance(&w[1]);
        let frac = if total > 0.0 {
            acc / total
        } else {
            (i + 1) as f64 / last
        };
        out.push(start + span * frac);
    }
    out
}

impl DischargeEvent {
    /// Build an event from the observed `(point, time)` pairs of a retired track.
    ///
    /// `previous_start` is the start time of the most recent earlier event in the
    /// session, if any.
    pub fn from_observations(
        observations: &[(Point, f64)],
        cell_size_um: f64,
        min_length_mm: f64,
        previous_start: Option<f64>,
    ) -> Result<Self, Rejection> {
        let (points, timestamps) = dedup_consecutive(observations);
        if points.len() < 2 {
            return Err(Rejection::TooFewPoints(points.len()));
        }

        let length = length_mm(&points, cell_size_um);
        if length < min_length_mm {
            return Err(Rejection::TooShort(length));
        }

        let start_time = observations[0].1;
        let end_time = observations[observations.len() - 1].1;
        let duration_s = end_time - start_time;
        let avg_speed = if duration_s == 0.0 {
            0.0
        } else {
            length / duration_s
        };
        let instant_speeds = instant_speeds(&points, &timestamps, cell_size_um);

        Ok(Self {
            start_time,
            end_time,
            duration: duration_s * 1000.0,
            start_point: points[0],
            end_point: points[points.len() - 1],
            points,
            timestamps,
            length,
            avg_speed,
            instant_speeds,
            time_since_last_discharge: previous_start
                .map_or(0.0, |prev| (start_time - prev) * 1000.0),
            provenance: SpeedProvenance::Recorded,
        })
    }

    /// Whether two events describe the same discharge.
    pub fn same_discharge(&self, other: &DischargeEvent) -> bool {
        self.start_time == other.start_time
            && self.end_time == other.end_time
            && self.points == other.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn obs(items: &[(f64, f64, f64)]) -> Vec<(Point, f64)> {
        items
            .iter()
            .map(|&(r, c, t)| (Point::new(r, c), t))
            .collect()
    }

    #[test]
    fn test_statistics() {
        let observations = obs(&[(0.0, 0.0, 0.0), (0.0, 1.0, 0.1), (0.0, 2.0, 0.3)]);
        let event = DischargeEvent::from_observations(&observations, 60.0, 0.0, None).unwrap();

        assert_relative_eq!(event.length, 0.12, epsilon = 1e-12);
        assert_relative_eq!(event.duration, 300.0, epsilon = 1e-9);
        assert_relative_eq!(event.avg_speed, 0.4, epsilon = 1e-9);
        assert_eq!(event.instant_speeds.len(), 3);
        assert_relative_eq!(event.instant_speeds[0], 0.6, epsilon = 1e-9);
        assert_relative_eq!(event.instant_speeds[1], 0.3, epsilon = 1e-9);
        assert_relative_eq!(event.instant_speeds[2], 0.3, epsilon = 1e-9);
        assert_eq!(event.start_point, Point::new(0.0, 0.0));
        assert_eq!(event.end_point, Point::new(0.0, 2.0));
        assert_eq!(event.time_since_last_discharge, 0.0);
    }

    #[test]
    fn test_duplicates_collapse() {
        let observations = obs(&[(1.0, 1.0, 0.0), (1.0, 1.0, 0.1), (1.0, 1.0, 0.2)]);
        assert_eq!(
            DischargeEvent::from_observations(&observations, 60.0, 0.0, None),
            Err(Rejection::TooFewPoints(1))
        );

        let (points, timestamps) =
            dedup_consecutive(&obs(&[(0.0, 0.0, 0.0), (0.0, 0.0, 0.1), (0.0, 1.0, 0.2)]));
        assert_eq!(points.len(), 2);
        assert_eq!(timestamps, vec![0.0, 0.2]);
    }

    #[test]
    fn test_length_gate() {
        let observations = obs(&[(0.0, 0.0, 0.0), (0.0, 1.0, 0.1)]);
        assert!(DischargeEvent::from_observations(&observations, 60.0, 0.06, None).is_ok());
        assert!(matches!(
            DischargeEvent::from_observations(&observations, 60.0, 0.0601, None),
            Err(Rejection::TooShort(_))
        ));
    }

    #[test]
    fn test_zero_time_delta_speed() {
        let points = [Point::new(0.0, 0.0), Point::new(0.0, 1.0)];
        assert_eq!(instant_speeds(&points, &[0.5, 0.5], 60.0), vec![0.0, 0.0]);
        assert_eq!(instant_speeds(&points[..1], &[0.5], 60.0), vec![0.0]);
    }

    #[test]
    fn test_synthetic_timestamps_follow_distance() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(0.0, 4.0),
        ];
        let ts = synthetic_timestamps(&points, 1.0, 2.0);
        assert_relative_eq!(ts[0], 1.0);
        assert_relative_eq!(ts[1], 1.25);
        assert_relative_eq!(ts[2], 2.0);
    }
}
