//! Time-ordered checkpoints of the active track set, used for exact rewind.

use crate::tracker::track::Track;

/// Smallest accepted checkpoint cap.
pub const MIN_CHECKPOINTS: usize = 4;

/// Snapshot of the active tracks at one playback time.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub tracks: Vec<Track>,
    pub time: f64,
}

#[derive(Debug, Clone, Default)]
pub struct History {
    checkpoints: Vec<Checkpoint>,
    max_checkpoints: Option<usize>,
}

impl History {
    pub fn new(max_checkpoints: Option<usize>) -> Self {
        Self {
            checkpoints: Vec::new(),
            max_checkpoints,
        }
    }

    pub fn len(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    /// Append a checkpoint. Callers push in non-decreasing time order.
    pub fn push(&mut self, tracks: Vec<Track>, time: f64) {
        self.checkpoints.push(Checkpoint { tracks, time });
        if let Some(cap) = self.max_checkpoints {
            if self.checkpoints.len() > cap.max(MIN_CHECKPOINTS) {
                self.thin_oldest_half();
            }
        }
    }

    /// Latest checkpoint with `time <= target`.
    pub fn latest_at_or_before(&self, target: f64) -> Option<&Checkpoint> {
        self.checkpoints.iter().rev().find(|c| c.time <= target)
    }

    /// Drop every checkpoint later than `time`.
    pub fn truncate_after(&mut self, time: f64) {
        let keep = self.checkpoints.partition_point(|c| c.time <= time);
        self.checkpoints.truncate(keep);
    }

    pub fn clear(&mut self) {
        self.checkpoints.clear();
    }

    // Every other checkpoint in the older half goes; the oldest one always stays.
    fn thin_oldest_half(&mut self) {
        let half = self.checkpoints.len() / 2;
        let mut index = 0;
        self.checkpoints.retain(|_| {
            let keep = index >= half || index % 2 == 0;
            index += 1;
            keep
        });
        log::trace!(
            "thinned checkpoint history to {} entries",
            self.checkpoints.len()
        );
    }
}
