//! TrackerPipeline for combining centroid detection with tracking.

use crate::tracker::{ClusterTracker, Track, TrackerConfig};

use super::CentroidSource;

/// Bundles a [`CentroidSource`] with a [`ClusterTracker`].
///
/// The driver (playback timer or frame stepper) calls [`process_frame`] with the
/// current playback time; moving the time backward rewinds the tracker.
///
/// [`process_frame`]: TrackerPipeline::process_frame
pub struct TrackerPipeline<S: CentroidSource> {
    source: S,
    tracker: ClusterTracker,
}

impl<S: CentroidSource> TrackerPipeline<S> {
    pub fn new(source: S, config: TrackerConfig) -> Self {
        Self {
            source,
            tracker: ClusterTracker::new(config),
        }
    }

    pub fn with_default_config(source: S) -> Self {
        Self::new(source, TrackerConfig::default())
    }

    /// Detect centroids at `time`, update the tracker and return the live tracks.
    ///
    /// On a rewind the source is not queried, since the restored checkpoint
    /// already determines the state.
    pub fn process_frame(&mut self, time: f64) -> Result<Vec<&Track>, S::Error> {
        let centroids = if time < self.tracker.current_time() {
            Vec::new()
        } else {
            self.source.centroids(time)?
        };
        self.tracker.update(&centroids, time);
        Ok(self.tracker.get_live_tracks())
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn tracker(&self) -> &ClusterTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut ClusterTracker {
        &mut self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::Point;

    /// Emits one centroid moving one column per frame and counts queries.
    struct MovingSource {
        queries: usize,
    }

    impl CentroidSource for MovingSource {
        type Error = std::convert::Infallible;

        fn centroids(&mut self, time: f64) -> Result<Vec<Point>, Self::Error> {
            self.queries += 1;
            Ok(vec![Point::new(32.0, (time * 10.0).round())])
        }
    }

    #[test]
    fn test_tracker_pipeline() {
        let mut pipeline = TrackerPipeline::with_default_config(MovingSource { queries: 0 });

        for frame in 0..5 {
            pipeline.process_frame(f64::from(frame) * 0.1).unwrap();
        }
        let live = pipeline.process_frame(0.5).unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].len(), 6);

        let live = pipeline.process_frame(0.2).unwrap();
        assert_eq!(live[0].len(), 3);
        assert_eq!(pipeline.source().queries, 6);
    }
}
