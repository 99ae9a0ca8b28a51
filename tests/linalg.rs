use approx::assert_relative_eq;
use spardiff::linalg::{cholesky, householder};
use spardiff::vector::declare_variables;
use spardiff::{
    ConstScalar, ConstVector, DenseMatrix, DenseVector, Error, Matrix, Real, Scalar, SparseMatrix,
    SparseVector, Vector,
};

fn reconstruct<V: Vector>(l: &Matrix<V>) -> DenseMatrix<f64> {
    let mut r = DenseMatrix::<f64>::null(l.rows(), l.rows());
    r.mdot_m(l, &l.t()).unwrap();
    r
}

#[test]
fn cholesky_reconstructs_dense_input() {
    let a = DenseMatrix::<f64>::from_values(
        3,
        3,
        &[4.0, 12.0, -16.0, 12.0, 37.0, -43.0, -16.0, -43.0, 98.0],
    )
    .unwrap();
    let l = cholesky(&a).unwrap();
    assert_eq!(l.values(), vec![2.0, 0.0, 0.0, 6.0, 1.0, 0.0, -8.0, 5.0, 3.0]);
    assert!(reconstruct(&l).equals(&a, 1e-12));
}

#[test]
fn cholesky_preserves_band_sparsity() {
    // tridiagonal SPD matrix: the factor is lower bidiagonal
    let n = 6;
    let mut a = SparseMatrix::<f64>::null(n, n);
    for i in 0..n {
        *a.at(i, i) = 2.0;
        if i + 1 < n {
            *a.at(i + 1, i) = -1.0;
            *a.at(i, i + 1) = -1.0;
        }
    }
    let l = cholesky(&a).unwrap();
    assert_eq!(l.nnz(), 2 * n - 1);
    assert!(reconstruct(&l).equals(&a, 1e-12));
}

#[test]
fn cholesky_rejects_indefinite_and_rectangular_input() {
    let a = DenseMatrix::<f64>::from_values(2, 2, &[1.0, 2.0, 2.0, 1.0]).unwrap();
    match cholesky(&a) {
        Err(Error::NotPositiveDefinite { row, pivot }) => {
            assert_eq!(row, 1);
            assert_relative_eq!(pivot, -3.0);
        }
        other => panic!("unexpected result {other:?}"),
    }

    let rect = DenseMatrix::<f64>::null(2, 3);
    assert!(matches!(cholesky(&rect), Err(Error::NotSquare { .. })));
}

#[test]
fn cholesky_of_a_view() {
    let a = DenseMatrix::<f64>::from_values(2, 2, &[9.0, 3.0, 3.0, 5.0]).unwrap();
    let l = cholesky(&a.t()).unwrap();
    assert_eq!(l.values(), vec![3.0, 0.0, 1.0, 2.0]);
}

#[test]
fn cholesky_propagates_derivatives() {
    // A(θ) = [[θ, 0], [0, 4]]: L₀₀ = √θ, dL₀₀/dθ = 1 / (2√θ)
    let mut a = DenseMatrix::<Real>::null(2, 2);
    *a.at(0, 0) = Real::variable(9.0, 0, 1, 1);
    a.at(1, 1).set_value(4.0);
    let l = cholesky(&a).unwrap();
    let l00 = l.const_at(0, 0);
    assert_relative_eq!(l00.value(), 3.0);
    assert_relative_eq!(l00.derivative(0), 1.0 / 6.0);
    assert_eq!(l.value_at(1, 1), 2.0);
}

fn reflect(nu: &[f64], beta: f64, x: &[f64]) -> Vec<f64> {
    let dot: f64 = nu.iter().zip(x).map(|(a, b)| a * b).sum();
    x.iter().zip(nu).map(|(xi, ni)| xi - beta * ni * dot).collect()
}

#[test]
fn householder_annihilates_below_first_entry() {
    for x in [vec![3.0, 4.0, 0.0], vec![-1.0, 2.0, 2.0], vec![0.0, 0.0, 5.0]] {
        let v = DenseVector::<f64>::from_values(&x);
        let (nu, beta) = householder(&v);
        assert_eq!(nu.value_at(0), 1.0);
        let y = reflect(&nu.values(), beta, &x);
        let norm = x.iter().map(|a| a * a).sum::<f64>().sqrt();
        assert_relative_eq!(y[0].abs(), norm, max_relative = 1e-12);
        for yi in &y[1..] {
            assert!(yi.abs() < 1e-12, "{x:?} -> {y:?}");
        }
    }
}

#[test]
fn householder_of_a_unit_direction_is_identity() {
    let v = SparseVector::<f64>::from_triplets(&[0], &[2.0], 4).unwrap();
    let (nu, beta) = householder(&v);
    assert_eq!(beta, 0.0);
    assert_eq!(nu.indices(), vec![0]);
    assert_eq!(nu.value_at(0), 1.0);
}

#[test]
fn householder_keeps_sparse_pattern() {
    let v = SparseVector::<f64>::from_triplets(&[0, 3], &[1.0, 1.0], 6).unwrap();
    let (nu, beta) = householder(&v);
    assert_eq!(nu.indices(), vec![0, 3]);
    let y = reflect(&nu.values(), beta, &v.values());
    assert_relative_eq!(y[0].abs(), 2.0f64.sqrt(), max_relative = 1e-12);
    assert!(y[3].abs() < 1e-12);
}

#[test]
fn householder_with_derivatives() {
    let mut x = DenseVector::<Real>::from_values(&[3.0, 4.0]);
    declare_variables(&mut x, 1);
    let (nu, beta) = householder(&x);
    assert_relative_eq!(nu[0].value(), 1.0);
    // ν₀ is normalized to one, so its derivative vanishes
    assert_relative_eq!(nu[0].derivative(0), 0.0, epsilon = 1e-12);
    assert!(beta.gradient().iter().any(|d| *d != 0.0));
}
