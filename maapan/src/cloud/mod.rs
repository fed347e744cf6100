//! Ground-truth point clouds.
//!
//! - [`GroundTruthCloud`]: immutable, ordered sample of the real surface
//! - [`CoverageGrid`]: fixed-resolution voxelization of a cloud's bounding box

mod voxel_filter;

pub use voxel_filter::{CoverageCell, CoverageGrid};

use crate::core::{Bounds3, Point};

/// Dense sample of the ground-truth surface in the world frame.
///
/// Point order is preserved from the source so that indices returned by the
/// spatial index dereference into [`GroundTruthCloud::points`].
#[derive(Clone, Debug, Default)]
pub struct GroundTruthCloud {
    points: Vec<Point>,
    bounds: Option<Bounds3>,
}

impl GroundTruthCloud {
    /// Take ownership of a point sequence.
    ///
    /// Non-finite points are kept; they never match anything and the caller
    /// is expected to have filtered them at load time.
    pub fn new(points: Vec<Point>) -> Self {
        let bounds = Bounds3::from_points(&points);
        Self { points, bounds }
    }

    /// All points in source order.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check whether the cloud has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    /// Tight bounding box, `None` for an empty cloud.
    #[inline]
    pub fn bounds(&self) -> Option<Bounds3> {
        self.bounds
    }
}

impl From<Vec<Point>> for GroundTruthCloud {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cloud_bounds() {
        let cloud = GroundTruthCloud::new(vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 2.0, -1.0),
        ]);
        assert_eq!(cloud.len(), 2);
        let bounds = cloud.bounds().unwrap();
        assert_eq!(bounds.min, Point::new(0.0, 0.0, -1.0));
        assert_eq!(bounds.max, Point::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn test_empty_cloud() {
        let cloud = GroundTruthCloud::default();
        assert!(cloud.is_empty());
        assert!(cloud.bounds().is_none());
        assert!(cloud.get(0).is_none());
    }
}
