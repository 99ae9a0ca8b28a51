use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use spardiff::vector::{declare_variables, dot};
use spardiff::{ConstVector, Real, SparseMatrix, SparseVector};

/// Vector of dimension `n` with every `stride`-th position occupied.
fn strided(n: usize, stride: usize, offset: usize) -> SparseVector<f64> {
    let indices: Vec<usize> = (offset..n).step_by(stride).collect();
    let values: Vec<f64> = indices.iter().map(|&i| 1.0 + i as f64 * 1e-3).collect();
    SparseVector::from_triplets(&indices, &values, n).unwrap()
}

fn tridiagonal(n: usize) -> SparseMatrix<f64> {
    let mut m = SparseMatrix::<f64>::null(n, n);
    for i in 0..n {
        *m.at(i, i) = 4.0;
        if i + 1 < n {
            *m.at(i, i + 1) = -1.0;
            *m.at(i + 1, i) = -1.0;
        }
    }
    m
}

// ─── Vector kernels ────────────────────────────────────────────────────────

fn bench_vector_kernels(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_vector");
    for n in [1_000, 100_000] {
        let a = strided(n, 3, 0);
        let b = strided(n, 5, 1);

        group.bench_with_input(BenchmarkId::new("vadd_v", n), &n, |bench, &n| {
            let mut r = SparseVector::<f64>::null(n);
            bench.iter(|| {
                r.vadd_v(black_box(&a), black_box(&b)).unwrap();
            })
        });

        group.bench_with_input(BenchmarkId::new("dot", n), &n, |bench, _| {
            bench.iter(|| {
                let mut r = 0.0;
                dot(&mut r, black_box(&a), black_box(&b)).unwrap();
                r
            })
        });

        // one write per entry, then the sweep that sorts the index
        group.bench_with_input(BenchmarkId::new("build_then_iterate", n), &n, |bench, &n| {
            bench.iter(|| {
                let mut v = SparseVector::<f64>::null(n);
                for i in (0..n).rev().step_by(7) {
                    *v.at(i) = i as f64;
                }
                v.const_iter().count()
            })
        });
    }
    group.finish();
}

// ─── Derivative propagation ────────────────────────────────────────────────

fn bench_gradient(c: &mut Criterion) {
    let mut group = c.benchmark_group("gradient");
    for n in [10, 100] {
        let mut x = SparseVector::<Real>::from_triplets(
            &(0..n).collect::<Vec<_>>(),
            &vec![0.5; n],
            n,
        )
        .unwrap();
        declare_variables(&mut x, 1);
        group.bench_with_input(BenchmarkId::new("dot_order1", n), &x, |bench, x| {
            bench.iter(|| {
                let mut r = Real::default();
                dot(&mut r, black_box(x), black_box(x)).unwrap();
                r
            })
        });
    }
    group.finish();
}

// ─── Matrix kernels ────────────────────────────────────────────────────────

fn bench_matrix(c: &mut Criterion) {
    let mut group = c.benchmark_group("sparse_matrix");
    for n in [50, 200] {
        let a = tridiagonal(n);
        group.bench_with_input(BenchmarkId::new("mdot_m", n), &a, |bench, a| {
            let mut r = SparseMatrix::<f64>::null(n, n);
            bench.iter(|| r.mdot_m(black_box(a), black_box(a)).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("tip", n), &a, |bench, a| {
            let mut m = a.clone();
            bench.iter(|| m.tip())
        });
        group.bench_with_input(BenchmarkId::new("cholesky", n), &a, |bench, a| {
            bench.iter(|| spardiff::linalg::cholesky(black_box(a)).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_vector_kernels, bench_gradient, bench_matrix);
criterion_main!(benches);
