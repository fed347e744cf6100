//! Global-grid distance field.

use super::traits::{DistanceField, DistanceSample};
use crate::core::Point;
use crate::map::{TsdfGrid, trilinear};

/// Trilinear queries over one world-frame grid.
#[derive(Clone, Copy, Debug)]
pub struct GridField<'a> {
    grid: &'a TsdfGrid,
}

impl<'a> GridField<'a> {
    /// Query `grid` directly.
    pub fn new(grid: &'a TsdfGrid) -> Self {
        Self { grid }
    }
}

impl DistanceField for GridField<'_> {
    fn query(&self, point: Point) -> DistanceSample {
        trilinear(self.grid, point).into()
    }

    fn name(&self) -> &'static str {
        "global grid"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::VoxelIndex;
    use approx::assert_relative_eq;

    #[test]
    fn test_grid_query() {
        let mut grid = TsdfGrid::new(Point::ZERO, 0.5, [2, 2, 2], 1.0);
        for linear in 0..grid.voxel_count() {
            let index = grid.voxel_index(linear);
            grid.set_voxel(index, 0.3, 1.0);
        }
        let field = GridField::new(&grid);

        let sample = field.query(Point::new(0.5, 0.5, 0.5));
        assert!(sample.observed);
        assert_relative_eq!(sample.distance, 0.3, epsilon = 1e-6);

        assert!(!field.is_observed(Point::new(5.0, 0.0, 0.0)));

        grid.set_voxel(VoxelIndex::new(1, 1, 1), 0.3, 0.0);
        let field = GridField::new(&grid);
        assert!(!field.query(Point::new(0.5, 0.5, 0.5)).observed);
        assert!(field.query(Point::new(0.25, 0.25, 0.25)).observed);
    }
}
