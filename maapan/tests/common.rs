//! Test utilities for maapan integration tests.
//!
//! Grids use voxel size 0.25 with origin -0.125 so voxel centers land on
//! exact multiples of 0.25 and interpolation at those centers is exact.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use maapan::io::{map_format, ply};
use maapan::{GlobalMap, Point, ReconstructedMap, TsdfGrid, VoxelIndex};

pub const VOXEL_SIZE: f32 = 0.25;

pub fn grid_origin() -> Point {
    Point::splat(-VOXEL_SIZE * 0.5)
}

/// Unit right triangle in the XY plane.
pub fn triangle_cloud() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0, 0.0),
        Point::new(1.0, 0.0, 0.0),
        Point::new(0.0, 1.0, 0.0),
    ]
}

/// Square grid of points in the z = 0 plane.
pub fn plane_cloud(n: usize, step: f32) -> Vec<Point> {
    let mut points = Vec::with_capacity(n * n);
    for x in 0..n {
        for y in 0..n {
            points.push(Point::new(x as f32 * step, y as f32 * step, 0.0));
        }
    }
    points
}

/// Empty 5x5x1 grid covering [0, 1] x [0, 1] at z = 0.
pub fn empty_grid() -> TsdfGrid {
    TsdfGrid::new(grid_origin(), VOXEL_SIZE, [5, 5, 1], 0.5)
}

/// Every voxel of the 5x5x1 grid observed with the same distance.
pub fn uniform_grid(distance: f32) -> TsdfGrid {
    let mut grid = empty_grid();
    for linear in 0..grid.voxel_count() {
        let index = grid.voxel_index(linear);
        grid.set_voxel(index, distance, 1.0);
    }
    grid
}

/// 5x5x3 grid whose distances are the signed height above z = 0.
pub fn plane_grid() -> TsdfGrid {
    let mut grid = TsdfGrid::new(
        Point::new(-0.125, -0.125, -0.375),
        VOXEL_SIZE,
        [5, 5, 3],
        0.5,
    );
    for linear in 0..grid.voxel_count() {
        let index = grid.voxel_index(linear);
        let z = grid.voxel_center(index).z;
        grid.set_voxel(index, z, 1.0);
    }
    grid
}

/// Only the voxel centered on the origin is observed.
pub fn single_voxel_grid(distance: f32) -> TsdfGrid {
    let mut grid = empty_grid();
    grid.set_voxel(VoxelIndex::new(0, 0, 0), distance, 1.0);
    grid
}

pub fn global(grid: TsdfGrid) -> ReconstructedMap {
    ReconstructedMap::Grid(GlobalMap::new(grid))
}

pub fn write_map(dir: &Path, name: &str, map: &ReconstructedMap) -> PathBuf {
    let path = dir.join(format!("{name}.json"));
    map_format::save_map(&path, map).unwrap();
    path
}

pub fn write_cloud(dir: &Path, points: &[Point]) -> PathBuf {
    let path = dir.join("ground_truth.ply");
    ply::write_points(&path, points).unwrap();
    path
}
