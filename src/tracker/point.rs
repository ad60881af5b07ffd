/// A location on the electrode grid, in grid-cell units.
///
/// Coordinates are floating point because a centroid is usually the average of
/// several integer cell coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    /// Row coordinate
    pub row: f64,
    /// Column coordinate
    pub col: f64,
}

impl Point {
    /// Create a new point from row and column coordinates.
    #[inline]
    pub const fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }

    /// Centroid of a set of integer `(row, col)` cells. `None` for an empty set.
    pub fn centroid_of(cells: &[(u32, u32)]) -> Option<Self> {
        if cells.is_empty() {
            return None;
        }
        let n = cells.len() as f64;
        let (sum_r, sum_c) = cells.iter().fold((0.0, 0.0), |(r, c), &(cr, cc)| {
            (r + f64::from(cr), c + f64::from(cc))
        });
        Some(Self::new(sum_r / n, sum_c / n))
    }

    /// View as a nalgebra point.
    #[inline]
    pub fn to_point2(&self) -> nalgebra::Point2<f64> {
        nalgebra::Point2::new(self.row, self.col)
    }

    /// Convert to a `[row, col]` pair.
    #[inline]
    pub fn to_array(&self) -> [f64; 2] {
        [self.row, self.col]
    }

    /// Euclidean distance to another point, in grid cells.
    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        nalgebra::distance(&self.to_point2(), &other.to_point2())
    }
}

impl From<(f64, f64)> for Point {
    fn from((row, col): (f64, f64)) -> Self {
        Self::new(row, col)
    }
}

impl From<[f64; 2]> for Point {
    fn from([row, col]: [f64; 2]) -> Self {
        Self::new(row, col)
    }
}

/// Sum of the Euclidean distances between consecutive points, in grid cells.
pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(&w[1])).sum()
}
