//! Spatial coverage of the ground truth by the reconstruction.

use log::{debug, trace};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::BLOCK_SIZE;
use crate::cloud::{CoverageGrid, GroundTruthCloud};
use crate::core::{CancelToken, Point};
use crate::error::{EvalError, PartialResult, Stage};
use crate::field::DistanceField;

/// Observed cells of the ground-truth voxelization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Representative point of every observed cell, in cell order
    pub points: Vec<Point>,
    /// Cells in the ground-truth bounding box
    pub total_cells: usize,
    /// Cells holding ground-truth points
    pub occupied_cells: usize,
    /// Occupied cells that were observed
    pub observed_occupied_cells: usize,
    /// False when cancellation stopped the pass early
    pub complete: bool,
}

impl CoverageReport {
    /// Fraction of occupied ground-truth cells that were observed.
    pub fn occupied_ratio(&self) -> f32 {
        if self.occupied_cells == 0 {
            return 0.0;
        }
        self.observed_occupied_cells as f32 / self.occupied_cells as f32
    }
}

/// Classifies ground-truth space as observed or not, ignoring accuracy.
#[derive(Clone, Copy, Debug)]
pub struct CoverageAnalyzer {
    voxel_size: f32,
}

impl CoverageAnalyzer {
    /// Analyzer with the given cell size.
    pub fn new(voxel_size: f32) -> Self {
        Self { voxel_size }
    }

    /// Voxelize the cloud and keep every cell whose representative point is
    /// observed by `field`.
    ///
    /// Occupied cells are represented by their centroid, empty cells by their
    /// center. Cells are visited with x outermost and z innermost.
    pub fn analyze(
        &self,
        field: &dyn DistanceField,
        cloud: &GroundTruthCloud,
        cancel: &CancelToken,
    ) -> Result<CoverageReport, EvalError> {
        let grid = CoverageGrid::build(cloud.points(), self.voxel_size)?;
        let cell_count = grid.cell_count();
        let block_count = cell_count.div_ceil(BLOCK_SIZE);
        debug!(
            "[Coverage] {:?} cells ({} occupied) at {:.3}m",
            grid.dims(),
            grid.occupied_count(),
            self.voxel_size
        );

        let blocks: Vec<Option<(Vec<Point>, usize)>> = (0..block_count)
            .into_par_iter()
            .map(|block| {
                if cancel.is_cancelled() {
                    return None;
                }
                let start = block * BLOCK_SIZE;
                let end = (start + BLOCK_SIZE).min(cell_count);
                let mut points = Vec::new();
                let mut observed_occupied = 0;
                for cell in (start..end).filter_map(|i| grid.cell(i)) {
                    if field.is_observed(cell.point) {
                        points.push(cell.point);
                        observed_occupied += cell.occupied as usize;
                    }
                }
                trace!("[Coverage] block {}/{} done", block + 1, block_count);
                Some((points, observed_occupied))
            })
            .collect();

        let mut report = CoverageReport {
            total_cells: cell_count,
            occupied_cells: grid.occupied_count(),
            complete: true,
            ..Default::default()
        };
        for block in blocks {
            match block {
                Some((points, observed_occupied)) => {
                    report.points.extend(points);
                    report.observed_occupied_cells += observed_occupied;
                }
                None => report.complete = false,
            }
        }
        debug!(
            "[Coverage] {} cells observed, {:.1}% of occupied",
            report.points.len(),
            report.occupied_ratio() * 100.0
        );

        if !report.complete {
            return Err(EvalError::Cancelled {
                stage: Stage::Coverage,
                partial: Box::new(PartialResult::Coverage(report)),
            });
        }
        Ok(report)
    }
}
