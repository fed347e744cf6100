//! Evaluation session: a ground-truth cloud and its index, reused across maps.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use log::info;

use super::colorize::{ColorizeSummary, ErrorColorizer};
use super::coverage::{CoverageAnalyzer, CoverageReport};
use super::labeled::{LabeledPoint, labeled_points};
use super::mesh::compute_mesh_error;
use super::reconstruction::compute_reconstruction_error;
use super::stats::{MeshReport, ReconstructionReport};
use crate::cloud::GroundTruthCloud;
use crate::config::EvaluationRequest;
use crate::core::CancelToken;
use crate::error::EvalError;
use crate::field::field_for;
use crate::io::ply;
use crate::map::ReconstructedMap;
use crate::spatial::SpatialIndex;

/// Everything one request produced.
#[derive(Clone, Debug, Default)]
pub struct EvaluationOutcome {
    /// Ground-truth points through the distance field
    pub reconstruction: Option<ReconstructionReport>,
    /// Surface vertices through the spatial index
    pub mesh: Option<MeshReport>,
    /// Error colorization write-back
    pub coloring: Option<ColorizeSummary>,
    /// Observed ground-truth cells
    pub coverage: Option<CoverageReport>,
    /// Labeled surface vertices
    pub labeled: Option<Vec<LabeledPoint>>,
}

/// Ground truth shared by every evaluation in a batch.
///
/// Cloud and index are immutable and reference counted, so sessions can be
/// cloned cheaply and evaluated from several threads.
#[derive(Clone, Debug)]
pub struct EvaluationSession {
    cloud: Arc<GroundTruthCloud>,
    index: Arc<SpatialIndex>,
}

impl EvaluationSession {
    /// Build the spatial index over `cloud`.
    pub fn new(cloud: GroundTruthCloud) -> Result<Self, EvalError> {
        let start = Instant::now();
        let index = SpatialIndex::build(cloud.points())?;
        info!(
            "[Session] Indexed {} ground-truth points in {:.1}ms",
            cloud.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(Self {
            cloud: Arc::new(cloud),
            index: Arc::new(index),
        })
    }

    /// Load a ground-truth point cloud file and index it.
    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let points = ply::read_point_cloud(path).map_err(|e| EvalError::load(path, e))?;
        info!("[Session] Loaded {} points from {}", points.len(), path.display());
        Self::new(GroundTruthCloud::new(points))
    }

    /// Ground-truth cloud.
    pub fn cloud(&self) -> &GroundTruthCloud {
        &self.cloud
    }

    /// Spatial index over the cloud.
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Reconstruction error of `map` against the ground truth.
    pub fn reconstruction_error(
        &self,
        map: &ReconstructedMap,
        request: &EvaluationRequest,
        cancel: &CancelToken,
    ) -> Result<ReconstructionReport, EvalError> {
        let field = field_for(map, request.query_policy)?;
        compute_reconstruction_error(field.as_ref(), self.cloud.points(), request, cancel)
    }

    /// Mesh error of `map`'s surface against the ground truth.
    pub fn mesh_error(
        &self,
        map: &ReconstructedMap,
        request: &EvaluationRequest,
        cancel: &CancelToken,
    ) -> Result<MeshReport, EvalError> {
        let vertices = map.surface_vertices(request.is_single_tsdf);
        compute_mesh_error(&self.index, &vertices, request.inlier_distance, cancel)
    }

    /// Ground-truth cells observed by `map`.
    pub fn coverage(
        &self,
        map: &ReconstructedMap,
        request: &EvaluationRequest,
        cancel: &CancelToken,
    ) -> Result<CoverageReport, EvalError> {
        let field = field_for(map, request.query_policy)?;
        CoverageAnalyzer::new(request.coverage_voxel_size).analyze(field.as_ref(), &self.cloud, cancel)
    }

    /// Paint error colors onto `map`.
    ///
    /// Takes the map mutably, so no other pass can run on it concurrently.
    pub fn colorize(
        &self,
        map: &mut ReconstructedMap,
        request: &EvaluationRequest,
        cancel: &CancelToken,
    ) -> Result<ColorizeSummary, EvalError> {
        ErrorColorizer::new(&self.index, request).colorize(map, cancel)
    }

    /// Run every pass the request enables.
    ///
    /// Read-only passes run first; colorization runs last because it writes
    /// into the map. The request is validated before any pass starts.
    pub fn evaluate(
        &self,
        map: &mut ReconstructedMap,
        request: &EvaluationRequest,
        cancel: &CancelToken,
    ) -> Result<EvaluationOutcome, EvalError> {
        request.validate()?;
        if map.is_submaps() && request.query_policy.is_none() {
            return Err(EvalError::config(
                "query_policy must be set when evaluating a submap map",
            ));
        }

        let start = Instant::now();
        let mut outcome = EvaluationOutcome::default();

        if request.evaluate {
            let reconstruction = self.reconstruction_error(map, request, cancel)?;
            info!("[Evaluate] Reconstruction: {}", reconstruction.summary());
            outcome.reconstruction = Some(reconstruction);

            let mesh = self.mesh_error(map, request, cancel)?;
            info!("[Evaluate] Mesh: {}", mesh.summary());
            outcome.mesh = Some(mesh);
        }

        if request.export_coverage_pointcloud {
            let coverage = self.coverage(map, request, cancel)?;
            info!(
                "[Evaluate] Coverage: {} of {} cells observed",
                coverage.points.len(),
                coverage.total_cells
            );
            outcome.coverage = Some(coverage);
        }

        if request.compute_coloring {
            outcome.coloring = Some(self.colorize(map, request, cancel)?);
        }

        if request.export_labeled_pointcloud {
            outcome.labeled = Some(labeled_points(map));
        }

        info!("[Evaluate] Done in {:.2}s", start.elapsed().as_secs_f64());
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Point, VoxelIndex};
    use crate::error::Stage;
    use crate::field::QueryPolicy;
    use crate::map::{Submap, SubmapCollection, SubmapId, TsdfGrid};

    fn submap_map() -> ReconstructedMap {
        let mut grid = TsdfGrid::new(Point::ZERO, 0.5, [2, 2, 2], 1.0);
        grid.set_voxel(VoxelIndex::new(0, 0, 0), 0.05, 1.0);
        let mut submap = Submap::new(SubmapId::new(0), grid);
        submap.update_mesh();
        ReconstructedMap::Submaps([submap].into_iter().collect::<SubmapCollection>())
    }

    fn session() -> EvaluationSession {
        EvaluationSession::new(GroundTruthCloud::new(vec![Point::splat(0.25)])).unwrap()
    }

    #[test]
    fn test_submap_map_requires_query_policy() {
        let mut map = submap_map();
        let request = EvaluationRequest::default();
        assert!(request.query_policy.is_none());

        let err = session()
            .evaluate(&mut map, &request, &CancelToken::new())
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Configuration);

        // Individual passes refuse too
        let err = session()
            .reconstruction_error(&map, &request, &CancelToken::new())
            .unwrap_err();
        assert_eq!(err.stage(), Stage::Configuration);
    }

    #[test]
    fn test_submap_map_with_policy_evaluates() {
        let mut map = submap_map();
        let request = EvaluationRequest {
            query_policy: Some(QueryPolicy::ObjectOnly),
            ..Default::default()
        };

        let outcome = session()
            .evaluate(&mut map, &request, &CancelToken::new())
            .unwrap();
        let reconstruction = outcome.reconstruction.unwrap();
        assert_eq!(reconstruction.total_points, 1);
        assert_eq!(reconstruction.unknown_points, 0);
    }
}
