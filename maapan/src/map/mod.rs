//! Reconstructed volumetric maps.
//!
//! A map is either one global signed-distance grid or a collection of
//! overlapping submaps, each with its own grid, transform and state.
//!
//! ## Key Types
//!
//! - [`TsdfGrid`]: dense SoA voxel storage (distance, weight, color)
//! - [`SurfaceMesh`]: extracted surface vertices with colors
//! - [`Submap`] / [`SubmapCollection`]: multi-volume reconstruction
//! - [`ClassVoxel`] / [`ClassLayer`]: per-voxel classification
//! - [`ReconstructedMap`]: either of the two map variants

mod class_voxel;
mod collection;
mod grid;
mod interpolate;
mod submap;
mod surface;

pub use class_voxel::{ClassLayer, ClassVoxel, ClassVoxelKind};
pub use collection::SubmapCollection;
pub use grid::{MIN_OBSERVED_WEIGHT, TsdfGrid};
pub use interpolate::trilinear;
pub use submap::{ChangeState, PanopticLabel, Submap, SubmapId};
pub use surface::{SurfaceMesh, extract_surface};

use crate::core::Point;

/// Single flat reconstruction in the world frame.
#[derive(Clone, Debug)]
pub struct GlobalMap {
    /// Signed-distance voxels.
    pub grid: TsdfGrid,
    /// Surface vertices.
    pub mesh: SurfaceMesh,
}

impl GlobalMap {
    /// Wrap a grid and extract its surface.
    pub fn new(grid: TsdfGrid) -> Self {
        let mesh = extract_surface(&grid);
        Self { grid, mesh }
    }

    /// Regenerate the surface mesh from the grid.
    pub fn update_mesh(&mut self) {
        self.mesh = extract_surface(&self.grid);
    }
}

/// A reconstruction under evaluation.
#[derive(Clone, Debug)]
pub enum ReconstructedMap {
    /// One global grid.
    Grid(GlobalMap),
    /// Overlapping local volumes.
    Submaps(SubmapCollection),
}

impl ReconstructedMap {
    /// Is this a multi-volume map?
    pub fn is_submaps(&self) -> bool {
        matches!(self, ReconstructedMap::Submaps(_))
    }

    /// World-frame surface vertices scored by the mesh pass.
    ///
    /// Submaps failing [`Submap::scores_mesh`] are skipped unless
    /// `single_tsdf` is set. Order: submap load order, then vertex order.
    pub fn surface_vertices(&self, single_tsdf: bool) -> Vec<Point> {
        match self {
            ReconstructedMap::Grid(map) => map.mesh.vertices.clone(),
            ReconstructedMap::Submaps(collection) => collection
                .iter()
                .filter(|s| single_tsdf || s.scores_mesh())
                .flat_map(|s| s.world_vertices())
                .collect(),
        }
    }

    /// Merged world-frame mesh of every volume, for export.
    pub fn world_mesh(&self) -> SurfaceMesh {
        match self {
            ReconstructedMap::Grid(map) => map.mesh.clone(),
            ReconstructedMap::Submaps(collection) => {
                let mut merged = SurfaceMesh::new();
                for submap in collection.iter() {
                    merged.extend_from(&submap.mesh.transformed(&submap.transform));
                }
                merged
            }
        }
    }

    /// Regenerate every surface mesh from its grid.
    pub fn update_meshes(&mut self) {
        match self {
            ReconstructedMap::Grid(map) => map.update_mesh(),
            ReconstructedMap::Submaps(collection) => {
                for submap in collection.iter_mut() {
                    submap.update_mesh();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Transform;

    fn plane_grid() -> TsdfGrid {
        let mut grid = TsdfGrid::new(Point::ZERO, 0.5, [4, 4, 4], 2.0);
        for linear in 0..grid.voxel_count() {
            let index = grid.voxel_index(linear);
            grid.set_voxel(index, grid.voxel_center(index).z - 1.0, 1.0);
        }
        grid
    }

    #[test]
    fn test_surface_vertices_filtering() {
        let mut kept = Submap::new(SubmapId::new(0), plane_grid());
        kept.transform = Transform::from_translation(Point::new(10.0, 0.0, 0.0));
        kept.update_mesh();
        let mut free = Submap::new(SubmapId::new(1), plane_grid());
        free.label = PanopticLabel::FreeSpace;
        free.update_mesh();

        let map = ReconstructedMap::Submaps([kept, free].into_iter().collect());
        let scored = map.surface_vertices(false);
        assert_eq!(scored.len(), 16);
        assert!(scored.iter().all(|v| v.x >= 10.0));
        assert_eq!(map.surface_vertices(true).len(), 32);
        assert_eq!(map.world_mesh().len(), 32);
    }

    #[test]
    fn test_global_map_mesh() {
        let map = ReconstructedMap::Grid(GlobalMap::new(plane_grid()));
        assert!(!map.is_submaps());
        assert_eq!(map.surface_vertices(false).len(), 16);
    }
}
