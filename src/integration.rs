//! Integration module for feeding centroids from an upstream detector into the tracker.
//!
//! Spatial clustering of per-channel discharge flags happens upstream; this module
//! only defines the seam through which its centroids reach a [`ClusterTracker`].
//!
//! [`ClusterTracker`]: crate::tracker::ClusterTracker

mod detector;
mod pipeline;

pub use detector::{CentroidSource, IntoCentroids};
pub use pipeline::TrackerPipeline;
