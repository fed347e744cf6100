//! Batch driver integration tests.

mod common;

use std::fs;

use maapan::service::{BatchEvaluator, EvaluationQueue};
use maapan::{
    EvaluationRequest, EvaluationSession, ReconstructedMap, Stage, Submap, SubmapCollection, SubmapId,
};
use tempfile::TempDir;

fn setup() -> (TempDir, EvaluationSession) {
    let dir = TempDir::new().unwrap();
    let cloud = common::write_cloud(dir.path(), &common::plane_cloud(5, 0.25));
    let session = EvaluationSession::load(&cloud).unwrap();
    (dir, session)
}

#[test]
fn test_batch_continues_after_failed_load() {
    let (dir, session) = setup();
    let first = common::write_map(dir.path(), "first", &common::global(common::plane_grid()));
    let second = common::write_map(dir.path(), "second", &common::global(common::uniform_grid(0.05)));
    let missing = dir.path().join("missing.json");

    let request = EvaluationRequest {
        output_directory: Some(dir.path().join("out")),
        ..Default::default()
    };
    let mut evaluator = BatchEvaluator::new(session, request);
    let report_path = evaluator.open_batch_report(&dir.path().join("out")).unwrap();

    let summary = evaluator.run([&first, &missing, &second]);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failed, 1);

    let report = fs::read_to_string(report_path).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("MeanGTError [m]"));
    // Plane map matches the plane cloud exactly
    assert!(lines[1].starts_with("0,0,0,25,0,0,25,"));
}

#[test]
fn test_single_map_report_and_artifacts() {
    let (dir, session) = setup();
    let map = common::write_map(dir.path(), "office", &common::global(common::plane_grid()));

    let request = EvaluationRequest {
        export_mesh: true,
        export_coverage_pointcloud: true,
        compute_coloring: true,
        ..Default::default()
    };
    let mut evaluator = BatchEvaluator::new(session, request);
    let outcome = evaluator.process(&map).unwrap();

    assert!(outcome.reconstruction.is_some());
    assert!(outcome.coloring.is_some());
    assert!(dir.path().join("office_evaluation_data.csv").exists());
    assert!(dir.path().join("office_evaluated.json").exists());
    assert!(dir.path().join("office.mesh.ply").exists());
    assert!(dir.path().join("office.coverage.ply").exists());

    // The colored map loads back
    let colored = maapan::io::map_format::load_map(&dir.path().join("office_evaluated.json"));
    assert!(colored.is_ok());
}

#[test]
fn test_invalid_request_fails_before_passes() {
    let (dir, session) = setup();
    let map = common::write_map(dir.path(), "office", &common::global(common::plane_grid()));

    let request = EvaluationRequest {
        inlier_distance: 0.0,
        ..Default::default()
    };
    let mut evaluator = BatchEvaluator::new(session, request);
    let err = evaluator.process(&map).unwrap_err();

    assert_eq!(err.stage(), Stage::Configuration);
    assert!(!dir.path().join("office_evaluation_data.csv").exists());
}

#[test]
fn test_submap_map_without_query_policy_is_rejected() {
    let (dir, session) = setup();
    let mut submap = Submap::new(SubmapId::new(1), common::plane_grid());
    submap.update_mesh();
    let map = ReconstructedMap::Submaps([submap].into_iter().collect::<SubmapCollection>());
    let path = common::write_map(dir.path(), "rooms", &map);

    let request = EvaluationRequest::default();
    assert!(request.query_policy.is_none());
    let mut evaluator = BatchEvaluator::new(session, request);
    let report_path = evaluator.open_batch_report(&dir.path().join("out")).unwrap();

    let err = evaluator.process(&path).unwrap_err();
    assert_eq!(err.stage(), Stage::Configuration);
    assert_eq!(evaluator.summary().failed, 1);

    // Header only, no result row
    let report = fs::read_to_string(report_path).unwrap();
    assert_eq!(report.lines().count(), 1);
    assert!(!dir.path().join("rooms_evaluation_data.csv").exists());
}

#[test]
fn test_queue_processes_in_submission_order() {
    let (dir, session) = setup();
    let good = common::write_map(dir.path(), "good", &common::global(common::plane_grid()));
    let missing = dir.path().join("missing.json");

    let evaluator = BatchEvaluator::new(session, EvaluationRequest::default());
    let queue = EvaluationQueue::spawn(evaluator).unwrap();

    let a = queue.submit(&good).unwrap();
    let b = queue.submit(&missing).unwrap();
    let c = queue.submit(&good).unwrap();

    assert!(a.recv().unwrap().is_ok());
    assert_eq!(b.recv().unwrap().unwrap_err().stage(), Stage::Load);
    assert!(c.recv().unwrap().is_ok());

    let summary = queue.shutdown().unwrap();
    assert_eq!(summary.total(), 3);
}
