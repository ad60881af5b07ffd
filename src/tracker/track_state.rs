/// Track state derived from the most recent sample of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// The last frame assigned a centroid to this track
    #[default]
    Tracked,
    /// The last frame left this track without a centroid
    Lost,
}
