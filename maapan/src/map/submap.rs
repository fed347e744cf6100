//! Local volumes of a multi-volume reconstruction.

use serde::{Deserialize, Serialize};

use super::class_voxel::ClassLayer;
use super::grid::TsdfGrid;
use super::surface::{SurfaceMesh, extract_surface};
use crate::core::{Point, Transform};

/// Unique identifier for a submap.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmapId(pub u32);

impl SubmapId {
    /// Create a new submap ID.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the numeric value.
    #[inline]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for SubmapId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Submap({})", self.0)
    }
}

/// Semantic role of a submap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanopticLabel {
    /// Not yet classified.
    #[default]
    Unknown,
    /// Static background structure.
    Background,
    /// A single object instance.
    Instance,
    /// Background volume tracking free space.
    FreeSpace,
}

/// Change-detection state of a submap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeState {
    /// Newly observed in the current session.
    #[default]
    New,
    /// Matched against a previous map, not yet confirmed.
    Matched,
    /// Confirmed present.
    Persistent,
    /// Confirmed gone; never answers distance queries.
    Absent,
    /// Not seen in the current session.
    Unobserved,
}

impl ChangeState {
    /// Can this submap answer distance queries?
    #[inline]
    pub fn is_queryable(&self) -> bool {
        !matches!(self, ChangeState::Absent)
    }
}

/// Independently transformable local volume.
#[derive(Clone, Debug)]
pub struct Submap {
    /// Unique identifier.
    pub id: SubmapId,

    /// Semantic class id.
    pub class_id: i32,

    /// Instance id, meaningful for [`PanopticLabel::Instance`] submaps.
    pub instance_id: i32,

    /// Semantic role.
    pub label: PanopticLabel,

    /// Change-detection state.
    pub change_state: ChangeState,

    /// Submap frame to world frame.
    pub transform: Transform,

    /// Signed-distance voxels in the submap frame.
    pub grid: TsdfGrid,

    /// Optional per-voxel classification, aligned with `grid`.
    pub class_layer: Option<ClassLayer>,

    /// Surface vertices in the submap frame.
    pub mesh: SurfaceMesh,
}

impl Submap {
    /// Submap with identity transform, default label and state, and no mesh.
    pub fn new(id: SubmapId, grid: TsdfGrid) -> Self {
        Self {
            id,
            class_id: 0,
            instance_id: 0,
            label: PanopticLabel::default(),
            change_state: ChangeState::default(),
            transform: Transform::IDENTITY,
            grid,
            class_layer: None,
            mesh: SurfaceMesh::new(),
        }
    }

    /// Is this the free-space volume?
    #[inline]
    pub fn is_free_space(&self) -> bool {
        self.label == PanopticLabel::FreeSpace
    }

    /// Does this submap's surface count toward mesh error?
    ///
    /// Free-space volumes and surfaces that are absent or unobserved in the
    /// current session are excluded.
    pub fn scores_mesh(&self) -> bool {
        !self.is_free_space()
            && !matches!(
                self.change_state,
                ChangeState::Absent | ChangeState::Unobserved
            )
    }

    /// Is this submap painted by error colorization?
    pub fn is_colorable(&self) -> bool {
        self.change_state == ChangeState::Persistent && !self.is_free_space()
    }

    /// Regenerate the surface mesh from the grid.
    pub fn update_mesh(&mut self) {
        self.mesh = extract_surface(&self.grid);
    }

    /// World-frame mesh vertices.
    pub fn world_vertices(&self) -> Vec<Point> {
        self.mesh
            .vertices
            .iter()
            .map(|&v| self.transform.to_world(v))
            .collect()
    }
}
