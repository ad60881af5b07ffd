//! Trait for upstream centroid detectors.

use crate::tracker::Point;

/// Trait for detectors that reduce a frame of discharge flags to cluster centroids.
///
/// Implement this trait to connect any spatial clustering stage to the tracker.
///
/// # Example
///
/// ```ignore
/// use discharge_tracker::{CentroidSource, Point};
///
/// struct FixedCentroids(Vec<Point>);
///
/// impl CentroidSource for FixedCentroids {
///     type Error = std::convert::Infallible;
///
///     fn centroids(&mut self, _time: f64) -> Result<Vec<Point>, Self::Error> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
pub trait CentroidSource {
    /// Error type for detection failures.
    type Error;

    /// Centroids of the discharge clusters active at `time` (seconds).
    fn centroids(&mut self, time: f64) -> Result<Vec<Point>, Self::Error>;
}

/// Helper trait for converting detector-specific outputs to centroids.
pub trait IntoCentroids {
    fn into_centroids(self) -> Vec<Point>;
}

impl IntoCentroids for Vec<Point> {
    fn into_centroids(self) -> Vec<Point> {
        self
    }
}

impl IntoCentroids for Vec<(f64, f64)> {
    fn into_centroids(self) -> Vec<Point> {
        self.into_iter().map(Point::from).collect()
    }
}

/// Each inner slice is one cluster of integer `(row, col)` cells.
impl IntoCentroids for &[Vec<(u32, u32)>] {
    fn into_centroids(self) -> Vec<Point> {
        self.iter()
            .filter_map(|cells| Point::centroid_of(cells))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_clusters_into_centroids() {
        let clusters = vec![vec![(0, 0), (0, 2)], vec![], vec![(5, 5)]];
        let centroids = clusters.as_slice().into_centroids();
        assert_eq!(centroids, vec![Point::new(0.0, 1.0), Point::new(5.0, 5.0)]);
    }
}
