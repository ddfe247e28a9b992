//! Benchmark: recovery and estimation scaling
//!
//! Measures the per-round estimator pipeline (edge averaging, patch
//! recovery, per-cell indicators) on structured meshes of growing size.
//!
//! Run with:
//!   cargo bench --bench recovery_scaling
//!
//! For thread scaling of the per-node solves:
//!   RAYON_NUM_THREADS=1 cargo bench --bench recovery_scaling
//!   RAYON_NUM_THREADS=4 cargo bench --bench recovery_scaling

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use maxwell_afem::estimate::estimate;
use maxwell_afem::mesh::{unit_square_triangles, TriMesh};
use maxwell_afem::recovery::{recover_averaging, recover_spr};
use maxwell_afem::timeharmonic::{CosSinData, TimeHarmonicPde};

/// Cellwise curl samples of the manufactured solution
fn cell_field(mesh: &TriMesh) -> Vec<f64> {
    let data = CosSinData;
    (0..mesh.num_cells())
        .map(|c| data.curl(mesh.cell_centroid(c)))
        .collect()
}

fn bench_averaging(c: &mut Criterion) {
    let mut group = c.benchmark_group("averaging_recovery");
    for &n in &[16, 32, 64] {
        let mesh = unit_square_triangles(n);
        let topo = mesh.topology();
        let field = cell_field(&mesh);
        group.throughput(Throughput::Elements(mesh.num_nodes() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let recovered = recover_averaging(&mesh, &topo, &field).unwrap();
                black_box(recovered)
            });
        });
    }
    group.finish();
}

fn bench_patch_recovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("patch_recovery");
    for &n in &[16, 32, 64] {
        let mesh = unit_square_triangles(n);
        let topo = mesh.topology();
        let field = cell_field(&mesh);
        group.throughput(Throughput::Elements(mesh.num_nodes() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let recovered = recover_spr(&mesh, &topo, &field).unwrap();
                black_box(recovered)
            });
        });
    }
    group.finish();
}

fn bench_estimation(c: &mut Criterion) {
    let mut group = c.benchmark_group("error_estimation");
    for &n in &[16, 32, 64] {
        let mesh = unit_square_triangles(n);
        let topo = mesh.topology();
        let field = cell_field(&mesh);
        let recovered = recover_spr(&mesh, &topo, &field).unwrap();
        group.throughput(Throughput::Elements(mesh.num_cells() as u64));

        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| {
                let est = estimate(&mesh, &field, &recovered).unwrap();
                black_box(est)
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_averaging,
    bench_patch_recovery,
    bench_estimation
);
criterion_main!(benches);
