//! Reconstructed maps as JSON documents.
//!
//! Grids are stored sparsely: only voxels with weight or color are listed.
//! Meshes are optional; a volume loaded without one gets its mesh extracted
//! from the grid.
//!
//! ```json
//! {
//!   "submaps": {
//!     "free_space_id": 0,
//!     "submaps": [{
//!       "id": 0, "label": "free_space", "change_state": "persistent",
//!       "transform": { "rotation": [0, 0, 0, 1], "translation": [0, 0, 0] },
//!       "grid": {
//!         "origin": [0, 0, 0], "voxel_size": 0.05, "dims": [64, 64, 32],
//!         "truncation_distance": 0.15,
//!         "voxels": [{ "index": { "x": 3, "y": 4, "z": 5 }, "distance": -0.02, "weight": 2.5 }]
//!       }
//!     }]
//!   }
//! }
//! ```
//!
//! A global map is `{ "global": { "grid": { ... } } }`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::FormatError;
use crate::core::{Color, Point, Transform, VoxelIndex};
use crate::map::{
    ChangeState, ClassLayer, ClassVoxel, GlobalMap, PanopticLabel, ReconstructedMap, Submap,
    SubmapCollection, SubmapId, SurfaceMesh, TsdfGrid,
};

// Externally tagged so class voxel maps keep their integer keys.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MapDocument {
    Global(GlobalDocument),
    Submaps(SubmapsDocument),
}

#[derive(Serialize, Deserialize)]
struct GlobalDocument {
    grid: GridDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mesh: Option<SurfaceMesh>,
}

#[derive(Serialize, Deserialize)]
struct SubmapsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    free_space_id: Option<SubmapId>,
    submaps: Vec<SubmapDocument>,
}

#[derive(Serialize, Deserialize)]
struct GridDocument {
    origin: Point,
    voxel_size: f32,
    dims: [usize; 3],
    truncation_distance: f32,
    voxels: Vec<VoxelRecord>,
}

#[derive(Serialize, Deserialize)]
struct VoxelRecord {
    index: VoxelIndex,
    distance: f32,
    weight: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<Color>,
}

#[derive(Serialize, Deserialize)]
struct SubmapDocument {
    id: SubmapId,
    #[serde(default)]
    class_id: i32,
    #[serde(default)]
    instance_id: i32,
    #[serde(default)]
    label: PanopticLabel,
    #[serde(default)]
    change_state: ChangeState,
    #[serde(default)]
    transform: Transform,
    grid: GridDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    class_voxels: Option<Vec<ClassVoxelRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mesh: Option<SurfaceMesh>,
}

#[derive(Serialize, Deserialize)]
struct ClassVoxelRecord {
    index: VoxelIndex,
    voxel: ClassVoxel,
}

impl GridDocument {
    fn from_grid(grid: &TsdfGrid) -> Self {
        let voxels = (0..grid.voxel_count())
            .filter(|&i| grid.weight_linear(i) > 0.0 || grid.color_linear(i) != Color::BLACK)
            .map(|i| {
                let color = grid.color_linear(i);
                VoxelRecord {
                    index: grid.voxel_index(i),
                    distance: grid.distance_linear(i),
                    weight: grid.weight_linear(i),
                    color: (color != Color::BLACK).then_some(color),
                }
            })
            .collect();
        Self {
            origin: grid.origin(),
            voxel_size: grid.voxel_size(),
            dims: grid.dims(),
            truncation_distance: grid.truncation_distance(),
            voxels,
        }
    }

    fn into_grid(self) -> Result<TsdfGrid, FormatError> {
        if !(self.voxel_size > 0.0) || !self.voxel_size.is_finite() {
            return Err(FormatError::Invalid(format!(
                "voxel_size must be positive, got {}",
                self.voxel_size
            )));
        }
        let mut grid = TsdfGrid::new(self.origin, self.voxel_size, self.dims, self.truncation_distance);
        for voxel in self.voxels {
            if !grid.set_voxel(voxel.index, voxel.distance, voxel.weight) {
                return Err(FormatError::Invalid(format!(
                    "voxel {:?} outside grid of dims {:?}",
                    voxel.index, self.dims
                )));
            }
            if let Some(color) = voxel.color {
                grid.set_color(voxel.index, color);
            }
        }
        Ok(grid)
    }
}

impl SubmapDocument {
    fn from_submap(submap: &Submap) -> Self {
        Self {
            id: submap.id,
            class_id: submap.class_id,
            instance_id: submap.instance_id,
            label: submap.label,
            change_state: submap.change_state,
            transform: submap.transform,
            grid: GridDocument::from_grid(&submap.grid),
            class_voxels: submap.class_layer.as_ref().map(|layer| {
                layer
                    .sorted_entries()
                    .into_iter()
                    .map(|(index, voxel)| ClassVoxelRecord {
                        index,
                        voxel: voxel.clone(),
                    })
                    .collect()
            }),
            mesh: (!submap.mesh.is_empty()).then(|| submap.mesh.clone()),
        }
    }

    fn into_submap(self) -> Result<Submap, FormatError> {
        let mut submap = Submap::new(self.id, self.grid.into_grid()?);
        submap.class_id = self.class_id;
        submap.instance_id = self.instance_id;
        submap.label = self.label;
        submap.change_state = self.change_state;
        submap.transform = self.transform;
        submap.class_layer = self.class_voxels.map(|records| {
            let mut layer = ClassLayer::new();
            for record in records {
                layer.insert(record.index, record.voxel);
            }
            layer
        });
        match self.mesh {
            Some(mesh) if !mesh.is_empty() => {
                check_mesh(&mesh)?;
                submap.mesh = mesh;
            }
            _ => submap.update_mesh(),
        }
        Ok(submap)
    }
}

fn check_mesh(mesh: &SurfaceMesh) -> Result<(), FormatError> {
    if mesh.vertices.len() != mesh.colors.len() {
        return Err(FormatError::Invalid(format!(
            "mesh has {} vertices but {} colors",
            mesh.vertices.len(),
            mesh.colors.len()
        )));
    }
    Ok(())
}

/// Parse a map document.
pub fn parse_map(json: &str) -> Result<ReconstructedMap, FormatError> {
    let document: MapDocument = serde_json::from_str(json)?;
    from_document(document)
}

fn from_document(document: MapDocument) -> Result<ReconstructedMap, FormatError> {
    match document {
        MapDocument::Global(GlobalDocument { grid, mesh }) => {
            let grid = grid.into_grid()?;
            let map = match mesh {
                Some(mesh) if !mesh.is_empty() => {
                    check_mesh(&mesh)?;
                    GlobalMap { grid, mesh }
                }
                _ => GlobalMap::new(grid),
            };
            Ok(ReconstructedMap::Grid(map))
        }
        MapDocument::Submaps(SubmapsDocument {
            free_space_id,
            submaps,
        }) => {
            let mut collection = submaps
                .into_iter()
                .map(SubmapDocument::into_submap)
                .collect::<Result<SubmapCollection, _>>()?;
            collection.set_free_space_id(free_space_id);
            Ok(ReconstructedMap::Submaps(collection))
        }
    }
}

fn to_document(map: &ReconstructedMap) -> MapDocument {
    match map {
        ReconstructedMap::Grid(global) => MapDocument::Global(GlobalDocument {
            grid: GridDocument::from_grid(&global.grid),
            mesh: (!global.mesh.is_empty()).then(|| global.mesh.clone()),
        }),
        ReconstructedMap::Submaps(collection) => MapDocument::Submaps(SubmapsDocument {
            free_space_id: collection.free_space_id(),
            submaps: collection.iter().map(SubmapDocument::from_submap).collect(),
        }),
    }
}

/// Serialize a map to a JSON string.
pub fn map_to_string(map: &ReconstructedMap) -> Result<String, FormatError> {
    Ok(serde_json::to_string(&to_document(map))?)
}

/// Load a map file.
pub fn load_map(path: &Path) -> Result<ReconstructedMap, FormatError> {
    let reader = BufReader::new(File::open(path)?);
    let document: MapDocument = serde_json::from_reader(reader)?;
    from_document(document)
}

/// Save a map file.
pub fn save_map(path: &Path, map: &ReconstructedMap) -> Result<(), FormatError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, &to_document(map))?;
    writer.flush()?;
    Ok(())
}
