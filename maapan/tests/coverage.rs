//! Coverage integration tests.

mod common;

use maapan::evaluation::CoverageAnalyzer;
use maapan::field::GridField;
use maapan::{CancelToken, EvaluationRequest, EvaluationSession, GroundTruthCloud, Point};

#[test]
fn test_observed_voxel_center_is_covered() {
    let cloud = GroundTruthCloud::new(vec![Point::ZERO, Point::new(1.0, 1.0, 0.0)]);
    let grid = common::single_voxel_grid(0.0);
    let field = GridField::new(&grid);

    let report = CoverageAnalyzer::new(0.5)
        .analyze(&field, &cloud, &CancelToken::new())
        .unwrap();

    assert_eq!(report.points, vec![Point::ZERO]);
    assert_eq!(report.occupied_cells, 2);
    assert_eq!(report.observed_occupied_cells, 1);
    assert_eq!(report.occupied_ratio(), 0.5);
}

#[test]
fn test_cells_outside_observed_region_are_excluded() {
    let cloud = GroundTruthCloud::new(common::plane_cloud(4, 0.5));
    let grid = common::empty_grid();
    let field = GridField::new(&grid);

    let report = CoverageAnalyzer::new(0.5)
        .analyze(&field, &cloud, &CancelToken::new())
        .unwrap();

    assert!(report.points.is_empty());
    assert_eq!(report.observed_occupied_cells, 0);
    assert!(report.complete);
}

#[test]
fn test_session_coverage_uses_request_cell_size() {
    let session = EvaluationSession::new(GroundTruthCloud::new(common::plane_cloud(5, 0.25))).unwrap();
    let map = common::global(common::plane_grid());
    let request = EvaluationRequest {
        coverage_voxel_size: 0.25,
        ..Default::default()
    };

    let report = session.coverage(&map, &request, &CancelToken::new()).unwrap();

    // Every ground-truth point sits on an observed voxel center
    assert_eq!(report.occupied_cells, 25);
    assert_eq!(report.observed_occupied_cells, 25);
    for point in &report.points {
        assert!(point.x >= 0.0 && point.x <= 1.0);
    }
}

#[test]
fn test_empty_cloud_is_rejected() {
    let grid = common::uniform_grid(0.0);
    let field = GridField::new(&grid);

    let err = CoverageAnalyzer::new(0.5)
        .analyze(&field, &GroundTruthCloud::new(Vec::new()), &CancelToken::new())
        .unwrap_err();

    assert_eq!(err.stage(), maapan::Stage::Coverage);
}
