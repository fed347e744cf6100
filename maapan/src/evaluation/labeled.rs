//! Semantically labeled surface points.

use log::debug;

use crate::core::{Color, Point};
use crate::map::{ClassVoxel, ClassVoxelKind, PanopticLabel, ReconstructedMap, Submap};

/// Labels above this value are treated as invalid and dropped.
pub const MAX_EXPORTED_LABEL: u32 = 50000;

/// Class id stride of binary-count labels (`class_id * 1000 + instance_id`).
const CLASS_LABEL_STRIDE: i64 = 1000;

/// World-frame surface vertex with its color and semantic label.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabeledPoint {
    /// Position in the world frame
    pub position: Point,
    /// Vertex color
    pub color: Color,
    /// Semantic label
    pub label: u32,
}

/// Label every surface vertex of submaps carrying a class layer.
///
/// Global maps have no class information and yield nothing.
pub fn labeled_points(map: &ReconstructedMap) -> Vec<LabeledPoint> {
    let ReconstructedMap::Submaps(collection) = map else {
        return Vec::new();
    };

    let mut points = Vec::new();
    for submap in collection.iter() {
        let Some(layer) = &submap.class_layer else {
            continue;
        };
        let before = points.len();
        for (&vertex, &color) in submap.mesh.vertices.iter().zip(&submap.mesh.colors) {
            let label = match layer.get(submap.grid.voxel_at(vertex)) {
                Some(voxel) => match vertex_label(submap, voxel) {
                    Some(label) => label,
                    None => continue,
                },
                None => 0,
            };
            if label > MAX_EXPORTED_LABEL as i64 || label < 0 {
                continue;
            }
            points.push(LabeledPoint {
                position: submap.transform.to_world(vertex),
                color,
                label: label as u32,
            });
        }
        debug!("[Labeled] {}: {} points", submap.id, points.len() - before);
    }
    points
}

/// Kind-specific label of a vertex, `None` when the vertex is not exported.
fn vertex_label(submap: &Submap, voxel: &ClassVoxel) -> Option<i64> {
    let belonging = voxel.belonging_id()?;
    match voxel.kind() {
        ClassVoxelKind::BinaryCount | ClassVoxelKind::MovingBinaryCount => {
            // Keep only voxels owned by this submap.
            if belonging == 0 {
                return None;
            }
            let mut label = submap.class_id as i64 * CLASS_LABEL_STRIDE;
            if submap.label == PanopticLabel::Instance {
                label += submap.instance_id as i64;
            }
            Some(label)
        }
        ClassVoxelKind::FixedCount
        | ClassVoxelKind::VariableCount
        | ClassVoxelKind::PanopticWeight => Some(belonging as i64),
    }
}
