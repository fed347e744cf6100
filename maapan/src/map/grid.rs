//! Dense signed-distance voxel storage.
//!
//! Structure-of-arrays layout: distances, integration weights and colors live
//! in separate vectors indexed by the same linear voxel index. Voxel `(x, y, z)`
//! spans `origin + [x, x+1) * voxel_size` on each axis; its center is at the
//! half-voxel offset.
//!
//! ```text
//! Distances: [D D D D D D D D ...]
//! Weights:   [W W W W W W W W ...]
//! Colors:    [C C C C C C C C ...]
//!             x fastest, then y, then z
//! ```

use crate::core::{Bounds3, Color, Point, VoxelIndex};

/// Integration weight above which a voxel counts as observed.
pub const MIN_OBSERVED_WEIGHT: f32 = 1e-4;

/// Flat truncated signed-distance grid.
#[derive(Clone, Debug, PartialEq)]
pub struct TsdfGrid {
    origin: Point,
    voxel_size: f32,
    dims: [usize; 3],
    truncation_distance: f32,
    distances: Vec<f32>,
    weights: Vec<f32>,
    colors: Vec<Color>,
}

impl TsdfGrid {
    /// Create an unobserved grid.
    ///
    /// Distances start at the truncation bound with zero weight.
    pub fn new(origin: Point, voxel_size: f32, dims: [usize; 3], truncation_distance: f32) -> Self {
        let count = dims[0] * dims[1] * dims[2];
        Self {
            origin,
            voxel_size,
            dims,
            truncation_distance,
            distances: vec![truncation_distance; count],
            weights: vec![0.0; count],
            colors: vec![Color::BLACK; count],
        }
    }

    /// Grid origin (minimum corner of voxel `(0, 0, 0)`).
    #[inline]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Voxel edge length in meters.
    #[inline]
    pub fn voxel_size(&self) -> f32 {
        self.voxel_size
    }

    /// Voxels along x, y and z.
    #[inline]
    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    /// Truncation bound of the stored distances.
    #[inline]
    pub fn truncation_distance(&self) -> f32 {
        self.truncation_distance
    }

    /// Total number of voxels.
    #[inline]
    pub fn voxel_count(&self) -> usize {
        self.distances.len()
    }

    /// Region covered by the grid.
    pub fn bounds(&self) -> Bounds3 {
        let extent = Point::new(
            self.dims[0] as f32,
            self.dims[1] as f32,
            self.dims[2] as f32,
        ) * self.voxel_size;
        Bounds3::new(self.origin, self.origin + extent)
    }

    /// Linear index of a voxel, `None` outside the grid.
    #[inline]
    pub fn linear_index(&self, index: VoxelIndex) -> Option<usize> {
        let [nx, ny, nz] = self.dims;
        if index.x < 0 || index.y < 0 || index.z < 0 {
            return None;
        }
        let (x, y, z) = (index.x as usize, index.y as usize, index.z as usize);
        if x >= nx || y >= ny || z >= nz {
            return None;
        }
        Some(x + nx * (y + ny * z))
    }

    /// Voxel coordinates of a linear index.
    #[inline]
    pub fn voxel_index(&self, linear: usize) -> VoxelIndex {
        let [nx, ny, _] = self.dims;
        VoxelIndex::new(
            (linear % nx) as i32,
            ((linear / nx) % ny) as i32,
            (linear / (nx * ny)) as i32,
        )
    }

    /// Voxel containing a grid-frame point.
    #[inline]
    pub fn voxel_at(&self, point: Point) -> VoxelIndex {
        VoxelIndex::containing(point, self.origin, self.voxel_size)
    }

    /// Center of a voxel in the grid frame.
    #[inline]
    pub fn voxel_center(&self, index: VoxelIndex) -> Point {
        self.origin
            + Point::new(
                index.x as f32 + 0.5,
                index.y as f32 + 0.5,
                index.z as f32 + 0.5,
            ) * self.voxel_size
    }

    /// Signed distance of a voxel.
    #[inline]
    pub fn distance(&self, index: VoxelIndex) -> Option<f32> {
        self.linear_index(index).map(|i| self.distances[i])
    }

    /// Integration weight of a voxel.
    #[inline]
    pub fn weight(&self, index: VoxelIndex) -> Option<f32> {
        self.linear_index(index).map(|i| self.weights[i])
    }

    /// Color of a voxel.
    #[inline]
    pub fn color(&self, index: VoxelIndex) -> Option<Color> {
        self.linear_index(index).map(|i| self.colors[i])
    }

    /// Is the voxel inside the grid and sufficiently integrated?
    #[inline]
    pub fn is_observed(&self, index: VoxelIndex) -> bool {
        self.linear_index(index)
            .is_some_and(|i| self.weights[i] > MIN_OBSERVED_WEIGHT)
    }

    /// Observed-check on a linear index.
    #[inline]
    pub fn is_observed_linear(&self, linear: usize) -> bool {
        self.weights
            .get(linear)
            .is_some_and(|&w| w > MIN_OBSERVED_WEIGHT)
    }

    /// Distance at a linear index.
    #[inline]
    pub fn distance_linear(&self, linear: usize) -> f32 {
        self.distances[linear]
    }

    /// Weight at a linear index.
    #[inline]
    pub fn weight_linear(&self, linear: usize) -> f32 {
        self.weights[linear]
    }

    /// Color at a linear index.
    #[inline]
    pub fn color_linear(&self, linear: usize) -> Color {
        self.colors[linear]
    }

    /// Store distance and weight. Returns false outside the grid.
    pub fn set_voxel(&mut self, index: VoxelIndex, distance: f32, weight: f32) -> bool {
        match self.linear_index(index) {
            Some(i) => {
                self.distances[i] = distance;
                self.weights[i] = weight;
                true
            }
            None => false,
        }
    }

    /// Store a voxel color. Returns false outside the grid.
    pub fn set_color(&mut self, index: VoxelIndex, color: Color) -> bool {
        match self.linear_index(index) {
            Some(i) => {
                self.colors[i] = color;
                true
            }
            None => false,
        }
    }

    /// Overwrite colors for a batch of linear indices.
    pub fn apply_colors(&mut self, updates: &[(usize, Color)]) {
        for &(i, color) in updates {
            if let Some(slot) = self.colors.get_mut(i) {
                *slot = color;
            }
        }
    }

    /// Number of observed voxels.
    pub fn observed_count(&self) -> usize {
        self.weights
            .iter()
            .filter(|&&w| w > MIN_OBSERVED_WEIGHT)
            .count()
    }

    /// Linear indices of all observed voxels in ascending order.
    pub fn observed_indices(&self) -> Vec<usize> {
        self.weights
            .iter()
            .enumerate()
            .filter(|(_, w)| **w > MIN_OBSERVED_WEIGHT)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        let grid = TsdfGrid::new(Point::ZERO, 0.1, [4, 3, 2], 0.3);
        assert_eq!(grid.voxel_count(), 24);
        for linear in 0..grid.voxel_count() {
            let index = grid.voxel_index(linear);
            assert_eq!(grid.linear_index(index), Some(linear));
        }
        assert_eq!(grid.linear_index(VoxelIndex::new(4, 0, 0)), None);
        assert_eq!(grid.linear_index(VoxelIndex::new(0, -1, 0)), None);
    }

    #[test]
    fn test_new_grid_unobserved() {
        let grid = TsdfGrid::new(Point::ZERO, 0.1, [2, 2, 2], 0.3);
        assert_eq!(grid.observed_count(), 0);
        assert_eq!(grid.distance(VoxelIndex::new(1, 1, 1)), Some(0.3));
        assert!(!grid.is_observed(VoxelIndex::new(0, 0, 0)));
    }

    #[test]
    fn test_set_voxel() {
        let mut grid = TsdfGrid::new(Point::new(-1.0, -1.0, -1.0), 0.5, [4, 4, 4], 1.0);
        let index = VoxelIndex::new(1, 2, 3);
        assert!(grid.set_voxel(index, -0.2, 1.0));
        assert!(grid.is_observed(index));
        assert_eq!(grid.distance(index), Some(-0.2));
        assert!(!grid.set_voxel(VoxelIndex::new(9, 0, 0), 0.0, 1.0));

        assert!(grid.set_color(index, Color::GRAY));
        assert_eq!(grid.color(index), Some(Color::GRAY));
        assert_eq!(grid.observed_indices(), vec![grid.linear_index(index).unwrap()]);
    }

    #[test]
    fn test_voxel_geometry() {
        let grid = TsdfGrid::new(Point::new(1.0, 0.0, 0.0), 0.5, [4, 4, 4], 1.0);
        assert_eq!(grid.voxel_center(VoxelIndex::new(0, 1, 0)), Point::new(1.25, 0.75, 0.25));
        assert_eq!(grid.voxel_at(Point::new(1.6, 0.1, 1.9)), VoxelIndex::new(1, 0, 3));
        assert_eq!(grid.bounds().max, Point::new(3.0, 2.0, 2.0));
    }
}
