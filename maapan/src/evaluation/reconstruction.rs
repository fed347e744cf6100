//! Ground-truth points through the distance field.

use log::{debug, trace};
use rayon::prelude::*;

use super::stats::{ErrorStatistics, ReconstructionReport};
use super::BLOCK_SIZE;
use crate::config::EvaluationRequest;
use crate::core::{CancelToken, Point};
use crate::error::{EvalError, PartialResult, Stage};
use crate::field::DistanceField;

/// Per-block tally, combined in block order.
#[derive(Default)]
struct BlockTally {
    samples: Vec<f32>,
    total: u64,
    unknown: u64,
    truncated: u64,
    inliers: u64,
}

fn tally_block(field: &dyn DistanceField, points: &[Point], request: &EvaluationRequest) -> BlockTally {
    let mut tally = BlockTally {
        samples: Vec::with_capacity(points.len()),
        ..Default::default()
    };
    for &point in points {
        tally.total += 1;
        let sample = field.query(point);
        if !sample.observed {
            tally.unknown += 1;
            continue;
        }

        let error = sample.distance.abs();
        if error > request.maximum_distance {
            tally.truncated += 1;
            if !request.ignore_truncated_points {
                tally.samples.push(request.maximum_distance);
            }
        } else {
            tally.samples.push(error);
        }
        if error <= request.inlier_distance {
            tally.inliers += 1;
        }
    }
    tally
}

/// Score every ground-truth point against the reconstruction.
///
/// Unobserved points count as unknown. Observed errors above
/// `maximum_distance` are truncated: clamped to the bound, or dropped when
/// `ignore_truncated_points` is set. Inliers are counted on the raw error.
///
/// Cancellation is checked once per block; a cancelled pass returns
/// [`EvalError::Cancelled`] with the blocks finished so far.
pub fn compute_reconstruction_error(
    field: &dyn DistanceField,
    points: &[Point],
    request: &EvaluationRequest,
    cancel: &CancelToken,
) -> Result<ReconstructionReport, EvalError> {
    let block_count = points.len().div_ceil(BLOCK_SIZE);
    let blocks: Vec<Option<BlockTally>> = points
        .par_chunks(BLOCK_SIZE)
        .enumerate()
        .map(|(i, chunk)| {
            if cancel.is_cancelled() {
                return None;
            }
            let tally = tally_block(field, chunk, request);
            trace!("[Reconstruction] block {}/{} done", i + 1, block_count);
            Some(tally)
        })
        .collect();

    let mut samples = Vec::with_capacity(points.len());
    let mut report = ReconstructionReport {
        complete: true,
        ..Default::default()
    };
    for block in blocks {
        let Some(tally) = block else {
            report.complete = false;
            continue;
        };
        samples.extend_from_slice(&tally.samples);
        report.total_points += tally.total;
        report.unknown_points += tally.unknown;
        report.truncated_points += tally.truncated;
        report.inliers += tally.inliers;
    }
    report.stats = ErrorStatistics::from_samples(&samples);

    debug!("[Reconstruction] {} via {}", report.summary(), field.name());

    if !report.complete {
        return Err(EvalError::Cancelled {
            stage: Stage::Reconstruction,
            partial: Box::new(PartialResult::Reconstruction(report)),
        });
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::DistanceSample;
    use approx::assert_relative_eq;

    /// Field answering the same sample everywhere.
    struct ConstantField(DistanceSample);

    impl DistanceField for ConstantField {
        fn query(&self, _point: Point) -> DistanceSample {
            self.0
        }

        fn name(&self) -> &'static str {
            "constant"
        }
    }

    /// Field whose distance is the point's x coordinate.
    struct RampField;

    impl DistanceField for RampField {
        fn query(&self, point: Point) -> DistanceSample {
            DistanceSample::observed(point.x)
        }

        fn name(&self) -> &'static str {
            "ramp"
        }
    }

    fn triangle() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_observed_within_bounds() {
        let field = ConstantField(DistanceSample::observed(0.05));
        let report = compute_reconstruction_error(
            &field,
            &triangle(),
            &EvaluationRequest::default(),
            &CancelToken::new(),
        )
        .unwrap();

        assert_relative_eq!(report.stats.mean, 0.05, epsilon = 1e-7);
        assert_relative_eq!(report.stats.rmse, 0.05, epsilon = 1e-7);
        assert_eq!(report.stats.stddev, 0.0);
        assert_eq!(report.total_points, 3);
        assert_eq!(report.unknown_points, 0);
        assert_eq!(report.truncated_points, 0);
        assert_eq!(report.inliers, 3);
        assert!(report.complete);
    }

    #[test]
    fn test_all_unobserved() {
        let field = ConstantField(DistanceSample::unobserved());
        let report = compute_reconstruction_error(
            &field,
            &triangle(),
            &EvaluationRequest::default(),
            &CancelToken::new(),
        )
        .unwrap();
        assert_eq!(report.unknown_points, 3);
        assert_eq!(report.stats.mean, 0.0);
        assert_eq!(report.stats.rmse, 0.0);
        assert_eq!(report.inliers, 0);
    }

    #[test]
    fn test_truncation_clamps_to_maximum() {
        let field = ConstantField(DistanceSample::observed(-0.5));
        let points = vec![Point::ZERO];
        let report = compute_reconstruction_error(
            &field,
            &points,
            &EvaluationRequest::default(),
            &CancelToken::new(),
        )
        .unwrap();
        assert_eq!(report.truncated_points, 1);
        assert_eq!(report.stats.count, 1);
        assert_eq!(report.stats.mean, 0.2);
        assert_eq!(report.stats.max, 0.2);
    }

    #[test]
    fn test_ignore_truncated_drops_samples() {
        let points: Vec<Point> = [0.05, 0.15, 0.5, -0.9]
            .iter()
            .map(|&x| Point::new(x, 0.0, 0.0))
            .collect();
        let request = EvaluationRequest {
            ignore_truncated_points: true,
            ..Default::default()
        };
        let report =
            compute_reconstruction_error(&RampField, &points, &request, &CancelToken::new()).unwrap();

        assert_eq!(report.truncated_points, 2);
        assert_eq!(report.scored_points(), 2);
        assert_eq!(report.inliers, 1);
        assert_eq!(
            report.unknown_points + report.truncated_points + report.scored_points(),
            report.total_points
        );
    }

    #[test]
    fn test_cancelled_pass_reports_partial() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let points = vec![Point::ZERO; BLOCK_SIZE * 2];
        let err = compute_reconstruction_error(
            &RampField,
            &points,
            &EvaluationRequest::default(),
            &cancel,
        )
        .unwrap_err();

        assert_eq!(err.stage(), Stage::Reconstruction);
        match err.partial() {
            Some(PartialResult::Reconstruction(report)) => {
                assert!(!report.complete);
                assert_eq!(report.total_points, 0);
            }
            other => panic!("unexpected partial result: {other:?}"),
        }
    }

    #[test]
    fn test_parallel_result_is_deterministic() {
        let points: Vec<Point> = (0..(BLOCK_SIZE * 3 + 17))
            .map(|i| Point::new((i % 97) as f32 * 0.003, 0.0, 0.0))
            .collect();
        let request = EvaluationRequest::default();
        let first =
            compute_reconstruction_error(&RampField, &points, &request, &CancelToken::new()).unwrap();
        let second =
            compute_reconstruction_error(&RampField, &points, &request, &CancelToken::new()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.stats.mean.to_bits(), second.stats.mean.to_bits());
    }
}
