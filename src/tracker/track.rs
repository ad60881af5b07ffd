//! Single discharge track: the per-frame history of one cluster centroid.

use crate::tracker::point::Point;
use crate::tracker::track_state::TrackState;

/// Stable identifier of a track, allocated in creation order by its tracker.
pub type TrackId = u64;

/// One frame's observation for a track.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSample {
    /// Centroid assigned in this frame, `None` for a silent frame
    pub point: Option<Point>,
    /// Consecutive matched frames ending at this sample, 0 on a silent frame
    pub matched_run_length: u32,
    /// Playback time in seconds
    pub time: f64,
}

impl TrackSample {
    pub fn matched(point: Point, matched_run_length: u32, time: f64) -> Self {
        Self {
            point: Some(point),
            matched_run_length,
            time,
        }
    }

    pub fn silent(time: f64) -> Self {
        Self {
            point: None,
            matched_run_length: 0,
            time,
        }
    }
}

/// An ordered, append-only sequence of samples for one discharge.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    /// Unique track identifier
    pub track_id: TrackId,
    samples: Vec<TrackSample>,
}

impl Track {
    /// Start a track from an unmatched centroid.
    pub fn new(track_id: TrackId, point: Point, time: f64) -> Self {
        Self {
            track_id,
            samples: vec![TrackSample::matched(point, 1, time)],
        }
    }

    pub fn samples(&self) -> &[TrackSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last_sample(&self) -> Option<&TrackSample> {
        self.samples.last()
    }

    /// Point of the most recent sample, `None` if the track is currently silent.
    pub fn last_point(&self) -> Option<Point> {
        self.samples.last().and_then(|s| s.point)
    }

    pub fn state(&self) -> TrackState {
        match self.last_point() {
            Some(_) => TrackState::Tracked,
            None => TrackState::Lost,
        }
    }

    /// Record a centroid for this frame, extending the matched run.
    pub fn update(&mut self, point: Point, time: f64) {
        let run = self.samples.last().map_or(0, |s| s.matched_run_length);
        self.samples.push(TrackSample::matched(point, run + 1, time));
    }

    /// Record a frame in which no centroid was assigned.
    pub fn mark_silent(&mut self, time: f64) {
        self.samples.push(TrackSample::silent(time));
    }

    /// Non-null points with their times, in temporal order.
    pub fn observations(&self) -> impl Iterator<Item = (Point, f64)> + '_ {
        self.samples
            .iter()
            .filter_map(|s| s.point.map(|p| (p, s.time)))
    }

    /// Non-null points in temporal order.
    pub fn points(&self) -> Vec<Point> {
        self.observations().map(|(p, _)| p).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_length_resets_on_silence() {
        let mut track = Track::new(1, Point::new(1.0, 1.0), 0.0);
        track.update(Point::new(1.0, 2.0), 0.1);
        assert_eq!(track.last_sample().unwrap().matched_run_length, 2);
        assert_eq!(track.state(), TrackState::Tracked);

        track.mark_silent(0.2);
        assert_eq!(track.last_sample().unwrap().matched_run_length, 0);
        assert_eq!(track.state(), TrackState::Lost);
        assert_eq!(track.len(), 3);
        assert_eq!(track.points().len(), 2);
    }
}
