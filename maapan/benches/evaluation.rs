//! Benchmark evaluation pass performance.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use maapan::evaluation::{CoverageAnalyzer, compute_mesh_error, compute_reconstruction_error};
use maapan::field::GridField;
use maapan::{CancelToken, EvaluationRequest, GroundTruthCloud, Point, SpatialIndex, TsdfGrid};

/// Deterministic points scattered over a 2m square near z = 0.
fn create_cloud(n: usize) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let t = i as f32;
            Point::new(
                (t * 0.618_034).fract() * 2.0,
                (t * 0.414_213).fract() * 2.0,
                (t * 0.7).sin() * 0.02,
            )
        })
        .collect()
}

/// Grid whose distances are the signed height above z = 0.
fn create_grid() -> TsdfGrid {
    let mut grid = TsdfGrid::new(Point::new(-0.05, -0.05, -0.2), 0.05, [42, 42, 8], 0.15);
    for linear in 0..grid.voxel_count() {
        let index = grid.voxel_index(linear);
        let z = grid.voxel_center(index).z;
        grid.set_voxel(index, z, 1.0);
    }
    grid
}

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    for n in [10_000, 100_000].iter() {
        let cloud = create_cloud(*n);
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, _| {
            b.iter(|| black_box(SpatialIndex::build(black_box(&cloud)).unwrap()))
        });
    }

    group.finish();
}

fn bench_reconstruction(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruction_error");
    let grid = create_grid();
    let field = GridField::new(&grid);
    let request = EvaluationRequest::default();
    let cancel = CancelToken::new();

    for n in [10_000, 100_000].iter() {
        let cloud = create_cloud(*n);
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, _| {
            b.iter(|| {
                black_box(compute_reconstruction_error(&field, black_box(&cloud), &request, &cancel).unwrap())
            })
        });
    }

    group.finish();
}

fn bench_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("mesh_error");
    let cloud = create_cloud(100_000);
    let index = SpatialIndex::build(&cloud).unwrap();
    let cancel = CancelToken::new();

    for n in [1_000, 10_000].iter() {
        let vertices = create_cloud(*n);
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |b, _| {
            b.iter(|| black_box(compute_mesh_error(&index, black_box(&vertices), 0.1, &cancel).unwrap()))
        });
    }

    group.finish();
}

fn bench_coverage(c: &mut Criterion) {
    let grid = create_grid();
    let field = GridField::new(&grid);
    let cloud = GroundTruthCloud::new(create_cloud(100_000));
    let cancel = CancelToken::new();

    c.bench_function("coverage_100k", |b| {
        b.iter(|| black_box(CoverageAnalyzer::new(0.05).analyze(&field, &cloud, &cancel).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_index_build,
    bench_reconstruction,
    bench_mesh,
    bench_coverage
);
criterion_main!(benches);
