//! Distance query trait.

use crate::core::Point;

/// Result of querying a distance field at one point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceSample {
    /// Whether the point lies in sufficiently integrated space
    pub observed: bool,
    /// Signed distance in meters; meaningless when unobserved
    pub distance: f32,
}

impl DistanceSample {
    /// An observed sample.
    #[inline]
    pub fn observed(distance: f32) -> Self {
        Self {
            observed: true,
            distance,
        }
    }

    /// A sample outside observed space.
    #[inline]
    pub fn unobserved() -> Self {
        Self {
            observed: false,
            distance: 0.0,
        }
    }
}

impl From<Option<f32>> for DistanceSample {
    fn from(distance: Option<f32>) -> Self {
        distance.map_or_else(Self::unobserved, Self::observed)
    }
}

/// A signed-distance field that can be queried at world points.
///
/// Implementations are read-only and safe to query from multiple threads.
/// Distances are returned unclamped.
pub trait DistanceField: Send + Sync {
    /// Signed distance and observation state at `point`.
    fn query(&self, point: Point) -> DistanceSample;

    /// Observation state only.
    fn is_observed(&self, point: Point) -> bool {
        self.query(point).observed
    }

    /// Name used in log messages.
    fn name(&self) -> &'static str;
}
