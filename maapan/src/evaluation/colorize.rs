//! Error colorization of reconstructed surfaces and voxels.
//!
//! Colors are computed for every target volume first and written back only
//! when the whole pass finished, so a cancelled run leaves the map untouched.

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::BLOCK_SIZE;
use crate::config::EvaluationRequest;
use crate::core::{CancelToken, Color, Transform};
use crate::error::{EvalError, PartialResult, Stage};
use crate::map::{ReconstructedMap, SurfaceMesh, TsdfGrid, extract_surface, trilinear};
use crate::spatial::SpatialIndex;

/// Map an error to the green-yellow-red gradient.
///
/// `frac = min(error, maximum_distance) / maximum_distance`. Red ramps up to
/// full at `frac = 0.5`. Green starts at 190 and rises to saturation at
/// `frac = 0.5`, then falls linearly to zero at `frac = 1`.
pub fn error_color(error: f32, maximum_distance: f32) -> Color {
    let frac = error.min(maximum_distance) / maximum_distance;
    let r = ((frac - 0.5) * 2.0 + 1.0).min(1.0) * 255.0;
    let g = if frac <= 0.5 {
        190.0 + 130.0 * frac
    } else {
        (1.0 - frac) * 2.0 * 255.0
    };
    Color::from_f32(r, g, 0.0)
}

/// What gets colored and by which error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    /// Surface vertices by distance to the nearest ground-truth point
    MeshDistance,
    /// Voxels by the mean interpolated error at nearby ground-truth points
    VoxelMean,
    /// Voxels by the max interpolated error at nearby ground-truth points
    VoxelMax,
}

impl ColorMode {
    /// Tag used in the colored map file name.
    pub fn file_tag(&self) -> &'static str {
        match self {
            ColorMode::MeshDistance => "evaluated",
            ColorMode::VoxelMean => "evaluated_mean",
            ColorMode::VoxelMax => "evaluated_max",
        }
    }
}

/// Outcome of a colorization pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorizeSummary {
    /// Volumes whose colors were written
    pub volumes_colored: usize,
    /// Volumes left untouched by the submap filter
    pub volumes_skipped: usize,
    /// Vertices or voxels painted
    pub elements_colored: usize,
    /// Voxels painted gray for lack of a ground-truth reference
    pub gray_elements: usize,
    /// False when cancellation stopped the pass early
    pub complete: bool,
}

/// Colors computed for one volume, not yet written.
enum VolumePaint {
    Mesh(SurfaceMesh),
    Voxels {
        updates: Vec<(usize, Color)>,
        gray: usize,
    },
}

impl VolumePaint {
    fn len(&self) -> usize {
        match self {
            VolumePaint::Mesh(mesh) => mesh.len(),
            VolumePaint::Voxels { updates, .. } => updates.len(),
        }
    }

    fn gray(&self) -> usize {
        match self {
            VolumePaint::Mesh(_) => 0,
            VolumePaint::Voxels { gray, .. } => *gray,
        }
    }

    /// Write colors; voxel paints regenerate the mesh so vertex colors follow.
    fn apply(self, grid: &mut TsdfGrid, mesh: &mut SurfaceMesh) {
        match self {
            VolumePaint::Mesh(painted) => *mesh = painted,
            VolumePaint::Voxels { updates, .. } => {
                grid.apply_colors(&updates);
                *mesh = extract_surface(grid);
            }
        }
    }
}

/// Paints per-element reconstruction error onto a map.
pub struct ErrorColorizer<'a> {
    index: &'a SpatialIndex,
    mode: ColorMode,
    maximum_distance: f32,
    max_neighbors_factor: f32,
    single_tsdf: bool,
}

impl<'a> ErrorColorizer<'a> {
    /// Colorizer configured from a request.
    pub fn new(index: &'a SpatialIndex, request: &EvaluationRequest) -> Self {
        Self {
            index,
            mode: request.color_mode(),
            maximum_distance: request.maximum_distance,
            max_neighbors_factor: request.max_neighbors_factor,
            single_tsdf: request.is_single_tsdf,
        }
    }

    /// Coloring mode in effect.
    pub fn mode(&self) -> ColorMode {
        self.mode
    }

    /// Color the map in place.
    ///
    /// In submap maps only persistent, non-free-space submaps are painted
    /// unless the request treats the map as a single volume.
    pub fn colorize(
        &self,
        map: &mut ReconstructedMap,
        cancel: &CancelToken,
    ) -> Result<ColorizeSummary, EvalError> {
        let mut summary = ColorizeSummary::default();

        // Compute.
        let mut paints: Vec<Option<VolumePaint>> = Vec::new();
        let mut cancelled = false;
        match map {
            ReconstructedMap::Grid(global) => {
                let paint = self.paint_volume(&global.grid, &Transform::IDENTITY, cancel);
                cancelled |= paint.is_none();
                paints.push(paint);
            }
            ReconstructedMap::Submaps(collection) => {
                for submap in collection.iter() {
                    if !self.single_tsdf && !submap.is_colorable() {
                        debug!("[Colorize] skipping {} ({:?})", submap.id, submap.change_state);
                        summary.volumes_skipped += 1;
                        paints.push(None);
                        continue;
                    }
                    let paint = self.paint_volume(&submap.grid, &submap.transform, cancel);
                    cancelled |= paint.is_none();
                    paints.push(paint);
                }
            }
        }

        for paint in paints.iter().flatten() {
            summary.volumes_colored += 1;
            summary.elements_colored += paint.len();
            summary.gray_elements += paint.gray();
        }

        if cancelled {
            return Err(EvalError::Cancelled {
                stage: Stage::Colorization,
                partial: Box::new(PartialResult::Colorization(summary)),
            });
        }

        // Write back.
        match map {
            ReconstructedMap::Grid(global) => {
                if let Some(Some(paint)) = paints.pop() {
                    paint.apply(&mut global.grid, &mut global.mesh);
                }
            }
            ReconstructedMap::Submaps(collection) => {
                for (submap, paint) in collection.iter_mut().zip(paints) {
                    if let Some(paint) = paint {
                        paint.apply(&mut submap.grid, &mut submap.mesh);
                    }
                }
            }
        }

        summary.complete = true;
        info!(
            "[Colorize] {:?}: {} volumes, {} elements ({} gray), {} volumes skipped",
            self.mode,
            summary.volumes_colored,
            summary.elements_colored,
            summary.gray_elements,
            summary.volumes_skipped
        );
        Ok(summary)
    }

    fn paint_volume(
        &self,
        grid: &TsdfGrid,
        transform: &Transform,
        cancel: &CancelToken,
    ) -> Option<VolumePaint> {
        match self.mode {
            ColorMode::MeshDistance => self.paint_mesh(grid, transform, cancel),
            ColorMode::VoxelMean | ColorMode::VoxelMax => self.paint_voxels(grid, transform, cancel),
        }
    }

    fn paint_mesh(
        &self,
        grid: &TsdfGrid,
        transform: &Transform,
        cancel: &CancelToken,
    ) -> Option<VolumePaint> {
        let mut mesh = extract_surface(grid);
        let blocks: Vec<Option<Vec<Color>>> = mesh
            .vertices
            .par_chunks(BLOCK_SIZE)
            .map(|chunk| {
                if cancel.is_cancelled() {
                    return None;
                }
                Some(
                    chunk
                        .iter()
                        .map(|&v| {
                            let error = self.index.nearest_distance(transform.to_world(v));
                            error_color(error, self.maximum_distance)
                        })
                        .collect(),
                )
            })
            .collect();

        let mut colors = Vec::with_capacity(mesh.len());
        for block in blocks {
            colors.extend(block?);
        }
        mesh.colors = colors;
        Some(VolumePaint::Mesh(mesh))
    }

    fn paint_voxels(
        &self,
        grid: &TsdfGrid,
        transform: &Transform,
        cancel: &CancelToken,
    ) -> Option<VolumePaint> {
        let truncation = grid.truncation_distance();
        let candidates: Vec<usize> = grid
            .observed_indices()
            .into_iter()
            .filter(|&i| grid.distance_linear(i).abs() <= truncation)
            .collect();
        let voxel_size = grid.voxel_size();
        let max_neighbors = ((self.max_neighbors_factor * voxel_size * voxel_size) as usize).max(1);

        let blocks: Vec<Option<Vec<(usize, Color, bool)>>> = candidates
            .par_chunks(BLOCK_SIZE)
            .map(|chunk| {
                if cancel.is_cancelled() {
                    return None;
                }
                Some(
                    chunk
                        .iter()
                        .map(|&linear| {
                            let (color, gray) =
                                self.voxel_color(grid, transform, linear, max_neighbors);
                            (linear, color, gray)
                        })
                        .collect(),
                )
            })
            .collect();

        let mut updates = Vec::with_capacity(candidates.len());
        let mut gray = 0;
        for block in blocks {
            for (linear, color, is_gray) in block? {
                updates.push((linear, color));
                gray += is_gray as usize;
            }
        }
        Some(VolumePaint::Voxels { updates, gray })
    }

    /// Color of one voxel, and whether it had no ground-truth reference.
    fn voxel_color(
        &self,
        grid: &TsdfGrid,
        transform: &Transform,
        linear: usize,
        max_neighbors: usize,
    ) -> (Color, bool) {
        let voxel_size = grid.voxel_size();
        let center = transform.to_world(grid.voxel_center(grid.voxel_index(linear)));
        let neighbors = self.index.within(center, voxel_size, max_neighbors);
        let Some(nearest) = neighbors.first() else {
            return (Color::GRAY, true);
        };

        let mut total = 0.0f32;
        let mut max = 0.0f32;
        let mut counted = 0usize;
        for neighbor in &neighbors {
            let Some(gt) = self.index.point(neighbor.index) else {
                continue;
            };
            if let Some(distance) = trilinear(grid, transform.to_local(gt)) {
                let error = distance.abs();
                total += error;
                max = max.max(error);
                counted += 1;
            }
        }

        let error = if counted == 0 {
            nearest.distance()
        } else if self.mode == ColorMode::VoxelMax {
            max
        } else {
            total / counted as f32
        };
        (error_color(error, self.maximum_distance), false)
    }
}
