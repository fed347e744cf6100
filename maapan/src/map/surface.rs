//! Surface vertex extraction from signed-distance grids.

use serde::{Deserialize, Serialize};

use super::grid::TsdfGrid;
use crate::core::{Color, Point, Transform, VoxelIndex};

/// Reconstructed surface samples with per-vertex colors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMesh {
    /// Vertex positions
    pub vertices: Vec<Point>,
    /// Vertex colors, parallel to `vertices`
    pub colors: Vec<Color>,
}

impl SurfaceMesh {
    /// Empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Check whether the mesh has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Append a colored vertex.
    pub fn push(&mut self, vertex: Point, color: Color) {
        self.vertices.push(vertex);
        self.colors.push(color);
    }

    /// Copy of the mesh with every vertex mapped through `transform`.
    pub fn transformed(&self, transform: &Transform) -> SurfaceMesh {
        SurfaceMesh {
            vertices: self
                .vertices
                .iter()
                .map(|&v| transform.to_world(v))
                .collect(),
            colors: self.colors.clone(),
        }
    }

    /// Append all vertices of `other`.
    pub fn extend_from(&mut self, other: &SurfaceMesh) {
        self.vertices.extend_from_slice(&other.vertices);
        self.colors.extend_from_slice(&other.colors);
    }
}

const AXES: [VoxelIndex; 3] = [
    VoxelIndex::new(1, 0, 0),
    VoxelIndex::new(0, 1, 0),
    VoxelIndex::new(0, 0, 1),
];

/// Extract zero-crossing vertices in the grid frame.
///
/// Every pair of observed neighbors along +x, +y and +z whose distances
/// change sign yields one vertex at the linear zero crossing, colored by
/// blending the two voxel colors. Output follows voxel linear order, then
/// axis order.
pub fn extract_surface(grid: &TsdfGrid) -> SurfaceMesh {
    let mut mesh = SurfaceMesh::new();
    for linear in grid.observed_indices() {
        let index = grid.voxel_index(linear);
        let d0 = grid.distance_linear(linear);
        let p0 = grid.voxel_center(index);
        let c0 = grid.color_linear(linear);

        for axis in AXES {
            let neighbor = index + axis;
            let Some(n) = grid.linear_index(neighbor) else {
                continue;
            };
            if !grid.is_observed_linear(n) {
                continue;
            }
            let d1 = grid.distance_linear(n);
            if (d0 < 0.0) == (d1 < 0.0) {
                continue;
            }
            let t = d0 / (d0 - d1);
            let p1 = grid.voxel_center(neighbor);
            mesh.push(p0.lerp(p1, t), c0.lerp(grid.color_linear(n), t));
        }
    }
    mesh
}
