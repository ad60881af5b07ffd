//! Main cluster tracking algorithm: association, rewind and event finalization.

use crate::tracker::config::{ConfigError, TrackerConfig};
use crate::tracker::discharge::DischargeEvent;
use crate::tracker::history::History;
use crate::tracker::matching::{self, AssignmentResult};
use crate::tracker::point::Point;
use crate::tracker::track::{Track, TrackId};
use crate::tracker::track_state::TrackState;

/// RGB display color.
pub type Rgb = [u8; 3];

/// Display palette, cycled by track id.
pub const PALETTE: [Rgb; 10] = [
    [31, 119, 180],
    [255, 127, 14],
    [44, 160, 44],
    [214, 39, 40],
    [148, 103, 189],
    [140, 86, 75],
    [227, 119, 194],
    [127, 127, 127],
    [188, 189, 34],
    [23, 190, 207],
];

/// Identity of a discharge that has been finalized in this session.
#[derive(Debug, Clone, PartialEq)]
struct Finalized {
    start_time: f64,
    end_time: f64,
    points: Vec<Point>,
}

impl Finalized {
    fn of(event: &DischargeEvent) -> Self {
        Self {
            start_time: event.start_time,
            end_time: event.end_time,
            points: event.points.clone(),
        }
    }
}

pub struct ClusterTracker {
    active_tracks: Vec<Track>,
    current_time: f64,
    history: History,
    events: Vec<DischargeEvent>,
    // Sorted by start time; survives `take_events`.
    finalized: Vec<Finalized>,
    next_track_id: TrackId,
    config: TrackerConfig,
}

impl Default for ClusterTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl ClusterTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            active_tracks: Vec::new(),
            current_time: 0.0,
            history: History::new(config.max_checkpoints),
            events: Vec::new(),
            finalized: Vec::new(),
            next_track_id: 0,
            config,
        }
    }

    /// Like [`ClusterTracker::new`], but rejects an invalid configuration.
    pub fn try_new(config: TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Advance (or rewind) to `time` with the centroids detected in that frame.
    ///
    /// Moving backward restores the latest checkpoint at or before `time` and
    /// ignores `centroids`.
    pub fn update(&mut self, centroids: &[Point], time: f64) {
        if time < self.current_time {
            self.rewind(time);
        } else {
            self.associate(centroids, time);
        }

        self.cleanup_and_finalize();
        self.history.push(self.active_tracks.clone(), time);
        self.current_time = time;
    }

    fn rewind(&mut self, time: f64) {
        self.active_tracks = match self.history.latest_at_or_before(time) {
            Some(checkpoint) => {
                log::trace!(
                    "rewind {:.3}s -> {:.3}s using checkpoint at {:.3}s",
                    self.current_time,
                    time,
                    checkpoint.time
                );
                checkpoint.tracks.clone()
            }
            None => {
                log::trace!("rewind to {time:.3}s precedes every checkpoint");
                Vec::new()
            }
        };
        self.history.truncate_after(time);
    }

    fn associate(&mut self, centroids: &[Point], time: f64) {
        let heads: Vec<Option<Point>> = self.active_tracks.iter().map(Track::last_point).collect();
        let dists = matching::distance_matrix(&heads, centroids);

        let AssignmentResult {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = matching::greedy_assignment(&dists, self.config.max_association_distance);

        for (itrack, icentroid) in matches {
            self.active_tracks[itrack].update(centroids[icentroid], time);
        }
        for itrack in unmatched_tracks {
            self.active_tracks[itrack].mark_silent(time);
        }

        for icentroid in unmatched_detections {
            let track_id = self.next_track_id;
            self.next_track_id += 1;
            self.active_tracks
                .push(Track::new(track_id, centroids[icentroid], time));
        }
    }

    fn cleanup_and_finalize(&mut self) {
        let min_frames = self.config.min_consistent_frames;
        let tracks = std::mem::take(&mut self.active_tracks);
        let mut survivors = Vec::with_capacity(tracks.len());

        for track in tracks {
            if track.state() == TrackState::Tracked || track.len() < min_frames {
                survivors.push(track);
            } else {
                self.retire(&track);
            }
        }

        self.active_tracks = survivors;
    }

    fn retire(&mut self, track: &Track) {
        let observations: Vec<(Point, f64)> = track.observations().collect();
        let Some(&(_, start_time)) = observations.first() else {
            return;
        };
        // Chain to the discharge that precedes this one in recording time, which
        // after a rewind is not necessarily the last one finalized.
        let slot = self.finalized.partition_point(|f| f.start_time <= start_time);
        let previous_start = slot.checked_sub(1).map(|i| self.finalized[i].start_time);

        let event = match DischargeEvent::from_observations(
            &observations,
            self.config.cell_size_um,
            self.config.min_event_length_mm,
            previous_start,
        ) {
            Ok(event) => event,
            Err(rejection) => {
                log::debug!("discarded track {}: {rejection:?}", track.track_id);
                return;
            }
        };

        let key = Finalized::of(&event);
        let already_finalized = self.finalized[..slot]
            .iter()
            .rev()
            .take_while(|f| f.start_time == start_time)
            .any(|f| *f == key);
        if already_finalized {
            log::trace!(
                "track {} replays an already finalized event at {:.3}s",
                track.track_id,
                event.start_time
            );
            return;
        }

        log::debug!(
            "finalized discharge event {}: {:.3}s..{:.3}s, {:.3} mm, {:.3} mm/s",
            self.events.len(),
            event.start_time,
            event.end_time,
            event.length,
            event.avg_speed
        );
        self.finalized.insert(slot, key);
        self.events.push(event);
    }

    /// Active tracks old enough to be drawn.
    pub fn get_live_tracks(&self) -> Vec<&Track> {
        self.active_tracks
            .iter()
            .filter(|t| t.len() >= self.config.min_consistent_frames)
            .collect()
    }

    /// All active tracks, including ones too young to be drawn.
    pub fn active_tracks(&self) -> &[Track] {
        &self.active_tracks
    }

    pub fn get_events(&self) -> &[DischargeEvent] {
        &self.events
    }

    pub fn last_event(&self) -> Option<&DischargeEvent> {
        self.events.last()
    }

    /// Drain finalized events. Drained events still count for
    /// `time_since_last_discharge` and are not finalized again on replay.
    pub fn take_events(&mut self) -> Vec<DischargeEvent> {
        std::mem::take(&mut self.events)
    }

    /// Display color of a track created in this session.
    pub fn color_of(&self, track_id: TrackId) -> Option<Rgb> {
        (track_id < self.next_track_id)
            .then(|| PALETTE[(track_id % PALETTE.len() as u64) as usize])
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn checkpoint_count(&self) -> usize {
        self.history.len()
    }

    /// Times that can be rewound to exactly.
    pub fn checkpoint_times(&self) -> impl Iterator<Item = f64> + '_ {
        self.history.checkpoints().iter().map(|c| c.time)
    }

    /// Reset every piece of session state; the configuration is kept.
    pub fn clear(&mut self) {
        self.active_tracks.clear();
        self.current_time = 0.0;
        self.history.clear();
        self.events.clear();
        self.finalized.clear();
        self.next_track_id = 0;
    }
}
