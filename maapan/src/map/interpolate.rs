//! Trilinear interpolation of signed distances.

use super::grid::TsdfGrid;
use crate::core::{Point, VoxelIndex};

/// Interpolate the signed distance at a grid-frame point.
///
/// Uses the 8 voxel centers surrounding `point`. Returns `None` when any
/// corner with non-zero weight is outside the grid or unobserved; a point
/// sitting exactly on an observed voxel center therefore only needs that
/// voxel. Points are never moved onto the lattice, so the result is the
/// exact trilinear value wherever it is defined.
pub fn trilinear(grid: &TsdfGrid, point: Point) -> Option<f32> {
    let rel = (point - grid.origin()) / grid.voxel_size() - Point::splat(0.5);
    if !rel.is_finite() {
        return None;
    }

    let mut base = [0i32; 3];
    let mut frac = [0.0f32; 3];
    for axis in 0..3 {
        let b = rel[axis].floor();
        base[axis] = b as i32;
        frac[axis] = rel[axis] - b;
    }

    let mut value = 0.0f32;
    for corner in 0..8 {
        let offset = [corner & 1, (corner >> 1) & 1, (corner >> 2) & 1];
        let mut weight = 1.0f32;
        for axis in 0..3 {
            weight *= if offset[axis] == 1 {
                frac[axis]
            } else {
                1.0 - frac[axis]
            };
        }
        if weight == 0.0 {
            continue;
        }

        let index = VoxelIndex::new(
            base[0] + offset[0] as i32,
            base[1] + offset[1] as i32,
            base[2] + offset[2] as i32,
        );
        if !grid.is_observed(index) {
            return None;
        }
        value += weight * grid.distance(index)?;
    }
    Some(value)
}
