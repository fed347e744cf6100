//! Static KD-tree over a point snapshot.
//!
//! Wraps kiddo's immutable tree. The tree is built once and only read
//! afterwards, so a single instance can be shared between threads and
//! between evaluation requests.
//!
//! kiddo does not order equidistant results, so k-nearest queries widen the
//! search to every point tied with the k-th distance and break ties by
//! insertion index. Duplicated points therefore always resolve to the same
//! neighbor.
//!
//! Planar scans and repeated points are common in ground truth; the tree
//! accepts any number of points sharing a coordinate on one axis.

use std::cmp::Ordering;
use std::num::NonZero;

use kiddo::{ImmutableKdTree, SquaredEuclidean};

use crate::core::Point;
use crate::error::{EvalError, Stage};

/// Relative slack added to the tie radius so boundary points are not lost to
/// rounding inside the tree's distance computation.
const TIE_RADIUS_SLACK: f32 = 1e-6;

/// One query result.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbor {
    /// Index into the snapshot the index was built from
    pub index: usize,
    /// Squared Euclidean distance to the query
    pub distance_sq: f32,
}

impl Neighbor {
    /// Euclidean distance to the query.
    #[inline]
    pub fn distance(&self) -> f32 {
        self.distance_sq.sqrt()
    }

    fn cmp_rank(&self, other: &Self) -> Ordering {
        self.distance_sq
            .total_cmp(&other.distance_sq)
            .then(self.index.cmp(&other.index))
    }
}

/// Exact nearest-neighbor index over a fixed point set.
pub struct SpatialIndex {
    tree: ImmutableKdTree<f32, 3>,
    points: Vec<[f32; 3]>,
}

impl SpatialIndex {
    /// Build the index from a point snapshot.
    ///
    /// Index positions follow `points`, so returned indices dereference into
    /// the same slice.
    pub fn build(points: &[Point]) -> Result<Self, EvalError> {
        if points.is_empty() {
            return Err(EvalError::EmptyInput {
                stage: Stage::IndexBuild,
            });
        }
        let points: Vec<[f32; 3]> = points.iter().map(|p| p.to_array()).collect();
        let tree = ImmutableKdTree::new_from_slice(&points);
        Ok(Self { tree, points })
    }

    /// Number of indexed points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; an index is never built from an empty snapshot.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Indexed point at `index`.
    #[inline]
    pub fn point(&self, index: usize) -> Option<Point> {
        self.points.get(index).map(|&p| Point::from_array(p))
    }

    /// Distance to the closest indexed point.
    ///
    /// Faster than [`SpatialIndex::nearest`] when only the distance matters,
    /// which is independent of tie-breaking.
    #[inline]
    pub fn nearest_distance(&self, query: Point) -> f32 {
        self.tree
            .nearest_one::<SquaredEuclidean>(&query.to_array())
            .distance
            .sqrt()
    }

    /// The `k` closest points, ascending by distance then insertion index.
    ///
    /// Returns fewer than `k` results only when the index holds fewer points.
    pub fn nearest(&self, query: Point, k: usize) -> Vec<Neighbor> {
        let Some(k) = NonZero::new(k.min(self.points.len())) else {
            return Vec::new();
        };
        let q = query.to_array();

        let mut result: Vec<Neighbor> = self
            .tree
            .nearest_n::<SquaredEuclidean>(&q, k)
            .into_iter()
            .map(|nn| Neighbor {
                index: nn.item as usize,
                distance_sq: nn.distance,
            })
            .collect();

        let Some(boundary) = result.iter().map(|n| n.distance_sq).reduce(f32::max) else {
            return result;
        };

        // Pull in every point tied with the k-th distance.
        let radius = boundary + boundary.abs() * TIE_RADIUS_SLACK + f32::EPSILON;
        result.extend(
            self.tree
                .within::<SquaredEuclidean>(&q, radius)
                .into_iter()
                .map(|nn| Neighbor {
                    index: nn.item as usize,
                    distance_sq: nn.distance,
                }),
        );

        result.sort_by(Neighbor::cmp_rank);
        result.dedup_by_key(|n| n.index);
        result.truncate(k.get());
        result
    }

    /// Every point within `radius` of `query`, ascending by distance then
    /// insertion index, keeping at most `limit` results.
    pub fn within(&self, query: Point, radius: f32, limit: usize) -> Vec<Neighbor> {
        if limit == 0 || !(radius >= 0.0) {
            return Vec::new();
        }
        let radius_sq = radius * radius;
        let mut result: Vec<Neighbor> = self
            .tree
            .within::<SquaredEuclidean>(&query.to_array(), radius_sq)
            .into_iter()
            .filter(|nn| nn.distance <= radius_sq)
            .map(|nn| Neighbor {
                index: nn.item as usize,
                distance_sq: nn.distance,
            })
            .collect();
        result.sort_by(Neighbor::cmp_rank);
        result.truncate(limit);
        result
    }
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("points", &self.points.len())
            .finish()
    }
}
