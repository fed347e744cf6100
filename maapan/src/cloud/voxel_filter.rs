//! Leaf-size voxel filter used by coverage analysis.
//!
//! Cells are cubes of side `leaf_size` on a lattice anchored at the world
//! origin; the grid spans every lattice cell touched by the cloud's bounding
//! box. Occupied cells keep the centroid of their points; empty cells report
//! their geometric center.
//!
//! Like PCL's leaf filter, a grid whose cell count does not fit the 32-bit
//! index range is refused rather than built.

use std::collections::HashMap;

use crate::core::{Bounds3, Point, VoxelIndex};
use crate::error::{EvalError, Stage};

/// Largest cell count a grid may span; cell indices are `i32`.
pub const MAX_CELL_COUNT: usize = i32::MAX as usize;

/// One cell of a [`CoverageGrid`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverageCell {
    /// Cell index relative to the grid origin
    pub index: VoxelIndex,
    /// Centroid of the cell's points, or the cell center when empty
    pub point: Point,
    /// Whether any cloud point fell into the cell
    pub occupied: bool,
}

/// Fixed-resolution voxelization of a point cloud's bounding box.
#[derive(Clone, Debug)]
pub struct CoverageGrid {
    origin: Point,
    leaf_size: f32,
    dims: [usize; 3],
    centroids: HashMap<VoxelIndex, Point>,
}

impl CoverageGrid {
    /// Voxelize `points` with cubes of side `leaf_size`.
    ///
    /// Fails for an empty cloud, a non-positive leaf size, non-finite
    /// coordinates, or a box with more than [`MAX_CELL_COUNT`] cells.
    pub fn build(points: &[Point], leaf_size: f32) -> Result<Self, EvalError> {
        if !(leaf_size > 0.0) || !leaf_size.is_finite() {
            return Err(coverage_error(format!(
                "leaf size must be a positive finite number, got {leaf_size}"
            )));
        }
        let bounds = Bounds3::from_points(points).ok_or(EvalError::EmptyInput {
            stage: Stage::Coverage,
        })?;
        if !bounds.min.is_finite() || !bounds.max.is_finite() {
            return Err(coverage_error("cloud has non-finite coordinates"));
        }
        let origin = (bounds.min / leaf_size).floor() * leaf_size;
        let extent = ((bounds.max - origin) / leaf_size).floor();
        let dims = grid_dims(extent.to_array()).ok_or_else(|| {
            coverage_error(format!(
                "leaf size {leaf_size} is too small for a {:.1} x {:.1} x {:.1} m cloud",
                bounds.max.x - bounds.min.x,
                bounds.max.y - bounds.min.y,
                bounds.max.z - bounds.min.z
            ))
        })?;

        // Sums in f64 so large clouds keep their centroid precision.
        let mut sums: HashMap<VoxelIndex, ([f64; 3], u32)> = HashMap::new();
        for &p in points {
            let index = VoxelIndex::containing(p, origin, leaf_size);
            let entry = sums.entry(index).or_insert(([0.0; 3], 0));
            entry.0[0] += p.x as f64;
            entry.0[1] += p.y as f64;
            entry.0[2] += p.z as f64;
            entry.1 += 1;
        }

        let centroids = sums
            .into_iter()
            .map(|(index, (sum, count))| {
                let n = count as f64;
                let c = Point::new(
                    (sum[0] / n) as f32,
                    (sum[1] / n) as f32,
                    (sum[2] / n) as f32,
                );
                (index, c)
            })
            .collect();

        Ok(Self {
            origin,
            leaf_size,
            dims,
            centroids,
        })
    }

    /// Cells along x, y and z.
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Total number of cells in the box.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.dims[0] * self.dims[1] * self.dims[2]
    }

    /// Number of cells holding at least one point.
    #[inline]
    pub fn occupied_count(&self) -> usize {
        self.centroids.len()
    }

    /// Minimum corner of cell `(0, 0, 0)`.
    #[inline]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Leaf size in meters.
    #[inline]
    pub fn leaf_size(&self) -> f32 {
        self.leaf_size
    }

    /// Cell at linear position `linear`, ordered with x outermost and z innermost.
    pub fn cell(&self, linear: usize) -> Option<CoverageCell> {
        if linear >= self.cell_count() {
            return None;
        }
        let [_, ny, nz] = self.dims;
        let x = linear / (ny * nz);
        let y = (linear / nz) % ny;
        let z = linear % nz;
        let index = VoxelIndex::new(x as i32, y as i32, z as i32);

        Some(match self.centroids.get(&index) {
            Some(&centroid) => CoverageCell {
                index,
                point: centroid,
                occupied: true,
            },
            None => CoverageCell {
                index,
                point: self.cell_center(index),
                occupied: false,
            },
        })
    }

    /// Iterate every cell in linear order.
    pub fn cells(&self) -> impl Iterator<Item = CoverageCell> + '_ {
        (0..self.cell_count()).filter_map(move |i| self.cell(i))
    }

    /// Geometric center of a cell.
    #[inline]
    pub fn cell_center(&self, index: VoxelIndex) -> Point {
        self.origin
            + Point::new(
                index.x as f32 + 0.5,
                index.y as f32 + 0.5,
                index.z as f32 + 0.5,
            ) * self.leaf_size
    }
}

/// Cells per axis for floored extents, if the total fits the index range.
fn grid_dims(extent: [f32; 3]) -> Option<[usize; 3]> {
    let mut dims = [0usize; 3];
    for (dim, e) in dims.iter_mut().zip(extent) {
        if !(e >= 0.0) || e >= MAX_CELL_COUNT as f32 {
            return None;
        }
        *dim = e as usize + 1;
    }
    let count = dims[0].checked_mul(dims[1])?.checked_mul(dims[2])?;
    (count <= MAX_CELL_COUNT).then_some(dims)
}

fn coverage_error(message: impl Into<String>) -> EvalError {
    EvalError::Configuration {
        stage: Stage::Coverage,
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_centroid_of_occupied_cell() {
        let points = vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(0.1, 0.1, 0.0),
            Point::new(1.0, 0.0, 0.0),
        ];
        let grid = CoverageGrid::build(&points, 0.25).unwrap();
        assert_eq!(grid.dims(), [5, 1, 1]);
        assert_eq!(grid.occupied_count(), 2);

        let first = grid.cell(0).unwrap();
        assert!(first.occupied);
        assert_relative_eq!(first.point.x, 0.05, epsilon = 1e-6);
        assert_relative_eq!(first.point.y, 0.05, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_cell_reports_center() {
        let points = vec![Point::new(0.0, 0.0, 0.0), Point::new(1.0, 0.0, 0.0)];
        let grid = CoverageGrid::build(&points, 0.25).unwrap();

        let cell = grid.cell(2).unwrap();
        assert!(!cell.occupied);
        assert_relative_eq!(cell.point.x, 0.625, epsilon = 1e-6);
        assert_relative_eq!(cell.point.y, 0.125, epsilon = 1e-6);
        assert_eq!(grid.cells().count(), grid.cell_count());
    }

    #[test]
    fn test_linear_order_x_outermost() {
        let points = vec![Point::new(0.0, 0.0, 0.0), Point::new(0.5, 0.5, 0.5)];
        let grid = CoverageGrid::build(&points, 0.5).unwrap();
        assert_eq!(grid.dims(), [2, 2, 2]);
        assert_eq!(grid.cell(1).unwrap().index, VoxelIndex::new(0, 0, 1));
        assert_eq!(grid.cell(4).unwrap().index, VoxelIndex::new(1, 0, 0));
        assert!(grid.cell(8).is_none());
    }

    #[test]
    fn test_lattice_anchored_at_world_origin() {
        let points = vec![Point::new(0.3, 0.3, 0.3), Point::new(0.7, 0.3, 0.3)];
        let grid = CoverageGrid::build(&points, 0.25).unwrap();
        assert_eq!(grid.origin(), Point::new(0.25, 0.25, 0.25));
        assert_eq!(grid.dims(), [2, 1, 1]);
        let center = grid.cell_center(VoxelIndex::new(1, 0, 0));
        assert_relative_eq!(center.x, 0.625, epsilon = 1e-6);
    }

    #[test]
    fn test_rejects_bad_input() {
        let err = CoverageGrid::build(&[], 0.05).unwrap_err();
        assert!(matches!(err, EvalError::EmptyInput { stage: Stage::Coverage }));

        let err = CoverageGrid::build(&[Point::ZERO], 0.0).unwrap_err();
        assert_eq!(err.stage(), Stage::Coverage);

        let err = CoverageGrid::build(&[Point::new(f32::NAN, 0.0, 0.0)], 0.05).unwrap_err();
        assert_eq!(err.stage(), Stage::Coverage);
    }

    #[test]
    fn test_refuses_grid_beyond_index_range() {
        // One stray point a kilometer away at 5cm leaves
        let points = vec![Point::ZERO, Point::new(1e6, 1e6, 1e6)];
        let err = CoverageGrid::build(&points, 0.05).unwrap_err();
        assert_eq!(err.stage(), Stage::Coverage);
        assert!(matches!(err, EvalError::Configuration { .. }));

        // Same spread is fine at a coarse leaf
        let grid = CoverageGrid::build(&points, 1e5).unwrap();
        assert_eq!(grid.dims(), [11, 11, 11]);
        assert_eq!(grid.cell_count(), 1331);
    }

    #[test]
    fn test_grid_dims_limits() {
        assert_eq!(grid_dims([0.0, 0.0, 0.0]), Some([1, 1, 1]));
        assert_eq!(grid_dims([2.0, 1.0, 0.0]), Some([3, 2, 1]));
        assert_eq!(grid_dims([70_000.0, 70_000.0, 0.0]), None);
        assert_eq!(grid_dims([f32::NAN, 0.0, 0.0]), None);
    }
}
