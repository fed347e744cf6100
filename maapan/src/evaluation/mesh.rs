//! Surface vertices through the spatial index.

use log::{debug, trace};
use rayon::prelude::*;

use super::stats::{ErrorStatistics, MeshReport};
use super::BLOCK_SIZE;
use crate::core::{CancelToken, Point};
use crate::error::{EvalError, PartialResult, Stage};
use crate::spatial::SpatialIndex;

/// Score reconstructed surface vertices by distance to the ground truth.
///
/// Each vertex's error is the Euclidean distance to its nearest ground-truth
/// point; vertices within `inlier_distance` are inliers, the rest outliers.
/// Cancellation is checked once per block.
pub fn compute_mesh_error(
    index: &SpatialIndex,
    vertices: &[Point],
    inlier_distance: f32,
    cancel: &CancelToken,
) -> Result<MeshReport, EvalError> {
    let block_count = vertices.len().div_ceil(BLOCK_SIZE);
    let blocks: Vec<Option<Vec<f32>>> = vertices
        .par_chunks(BLOCK_SIZE)
        .enumerate()
        .map(|(i, chunk)| {
            if cancel.is_cancelled() {
                return None;
            }
            let errors = chunk.iter().map(|&v| index.nearest_distance(v)).collect();
            trace!("[Mesh] block {}/{} done", i + 1, block_count);
            Some(errors)
        })
        .collect();

    let mut errors = Vec::with_capacity(vertices.len());
    let mut complete = true;
    for block in blocks {
        match block {
            Some(block_errors) => errors.extend(block_errors),
            None => complete = false,
        }
    }

    let inliers = errors.iter().filter(|&&e| e <= inlier_distance).count() as u64;
    let report = MeshReport {
        stats: ErrorStatistics::from_samples(&errors),
        inliers,
        outliers: errors.len() as u64 - inliers,
        complete,
    };
    debug!("[Mesh] {}", report.summary());

    if !complete {
        return Err(EvalError::Cancelled {
            stage: Stage::Mesh,
            partial: Box::new(PartialResult::Mesh(report)),
        });
    }
    Ok(report)
}
