//! Temporal tracking of discharge centroids on a microelectrode grid.
//!
//! [`ClusterTracker`] associates per-frame centroids into tracks, supports exact
//! rewind through checkpoints, and finalizes retired tracks into
//! [`DischargeEvent`]s. [`store::EventStore`] persists those events grouped by
//! analysis window.

pub mod integration;
pub mod store;
pub mod tracker;

pub use integration::{CentroidSource, IntoCentroids, TrackerPipeline};
pub use tracker::{
    CELL_SIZE_UM, ClusterTracker, DischargeEvent, Point, SpeedProvenance, Track, TrackId,
    TrackSample, TrackerConfig,
};
