//! Coordinate types.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// World-frame point in meters.
pub type Point = glam::Vec3;

/// Integer voxel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct VoxelIndex {
    /// X index
    pub x: i32,
    /// Y index
    pub y: i32,
    /// Z index
    pub z: i32,
}

impl VoxelIndex {
    /// Create a new voxel index.
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Voxel containing `point` on a lattice of cubes of side `size` anchored at `origin`.
    #[inline]
    pub fn containing(point: Point, origin: Point, size: f32) -> Self {
        let rel = (point - origin) / size;
        Self::new(
            rel.x.floor() as i32,
            rel.y.floor() as i32,
            rel.z.floor() as i32,
        )
    }
}

impl Add for VoxelIndex {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for VoxelIndex {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds3 {
    /// Minimum corner
    pub min: Point,
    /// Maximum corner
    pub max: Point,
}

impl Bounds3 {
    /// Create a box from two corners.
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Tight bounds of a point set, `None` when the set is empty.
    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = *points.first()?;
        let mut bounds = Self::new(first, first);
        for &p in &points[1..] {
            bounds.extend(p);
        }
        Some(bounds)
    }

    /// Grow the box to include `point`.
    #[inline]
    pub fn extend(&mut self, point: Point) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Check whether `point` lies inside the closed box.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Box extent along each axis.
    #[inline]
    pub fn size(&self) -> Point {
        self.max - self.min
    }
}
