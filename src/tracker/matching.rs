//! Nearest-neighbour association of track heads to frame centroids.

use crate::tracker::point::Point;
use ndarray::Array2;

/// Compute the Euclidean distance matrix between track heads and centroids.
///
/// A silent track head (`None`) gets an infinite row so it can never claim a
/// centroid.
pub fn distance_matrix(heads: &[Option<Point>], centroids: &[Point]) -> Array2<f64> {
    let mut dists = Array2::from_elem((heads.len(), centroids.len()), f64::INFINITY);
    for (i, head) in heads.iter().enumerate() {
        let Some(h) = head else { continue };
        for (j, c) in centroids.iter().enumerate() {
            dists[[i, j]] = h.distance(c);
        }
    }
    dists
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Greedy assignment in row order.
///
/// Each row, in turn, claims its nearest still-unclaimed column if that distance is
/// within `thresh`. Ties go to the lowest column index.
pub fn greedy_assignment(cost_matrix: &Array2<f64>, thresh: f64) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();
    let mut claimed = vec![false; num_cols];
    let mut matches = Vec::new();
    let mut unmatched_tracks = Vec::new();

    for i in 0..num_rows {
        let mut best: Option<(usize, f64)> = None;
        for j in 0..num_cols {
            if claimed[j] {
                continue;
            }
            let d = cost_matrix[[i, j]];
            if best.is_none_or(|(_, bd)| d < bd) {
                best = Some((j, d));
            }
        }
        match best {
            Some((j, d)) if d.is_finite() && d <= thresh => {
                claimed[j] = true;
                matches.push((i, j));
            }
            _ => unmatched_tracks.push(i),
        }
    }

    let unmatched_detections = claimed
        .iter()
        .enumerate()
        .filter_map(|(j, &c)| if c { None } else { Some(j) })
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}
