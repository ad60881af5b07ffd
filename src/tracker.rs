mod cluster_tracker;
mod config;
mod discharge;
mod history;
mod matching;
mod point;
mod track;
mod track_state;

pub use cluster_tracker::{ClusterTracker, PALETTE, Rgb};
pub use config::{ConfigError, TrackerConfig};
pub use discharge::{
    CELL_SIZE_UM, DischargeEvent, Rejection, SpeedProvenance, instant_speeds, length_mm,
    synthetic_timestamps,
};
pub use history::MIN_CHECKPOINTS;
pub use point::{Point, path_length};
pub use track::{Track, TrackId, TrackSample};
pub use track_state::TrackState;
