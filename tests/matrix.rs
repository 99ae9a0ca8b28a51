use spardiff::{
    ConstScalar, ConstVector, DenseMatrix, DenseVector, Error, Matrix, Real, Scalar, SparseMatrix,
    SparseVector, Vector,
};

fn dense(rows: usize, cols: usize, values: &[f64]) -> DenseMatrix<f64> {
    DenseMatrix::from_values(rows, cols, values).unwrap()
}

fn sparse(rows: usize, cols: usize, values: &[f64]) -> SparseMatrix<f64> {
    SparseMatrix::from_values(rows, cols, values).unwrap()
}

/// 3 × 4 matrix with entries 10·i + j, zero at (0, 0).
fn counting<V: Vector>() -> Matrix<V> {
    let values: Vec<f64> = (0..12).map(|k| (10 * (k / 4) + k % 4) as f64).collect();
    Matrix::from_values(3, 4, &values).unwrap()
}

#[test]
fn triplets_and_transpose() {
    let m = SparseMatrix::<f64>::from_triplets(2, 2, &[0, 1], &[1, 0], &[5.0, 7.0]).unwrap();
    assert_eq!(m.t().value_at(1, 0), 5.0);
    assert_eq!(m.t().value_at(0, 1), 7.0);
    assert!(!m.is_symmetric(1e-12));
    assert_eq!(m.nnz(), 2);
}

#[test]
fn construction_checks() {
    assert!(matches!(
        DenseMatrix::<f64>::from_values(2, 2, &[1.0, 2.0, 3.0]),
        Err(Error::DimensionMismatch { expected: 4, actual: 3 })
    ));
    assert!(matches!(
        SparseMatrix::<f64>::from_triplets(2, 2, &[2], &[0], &[1.0]),
        Err(Error::IndexOutOfRange { index: 2, dim: 2 })
    ));
    assert!(Matrix::from_vector(2, 3, DenseVector::<f64>::null(5)).is_err());

    assert!(matches!(
        SparseMatrix::<f64>::from_triplets(usize::MAX, 2, &[], &[], &[]),
        Err(Error::ShapeOverflow { rows: usize::MAX, cols: 2 })
    ));
    assert!(matches!(
        Matrix::from_vector(1 << 40, 1 << 40, SparseVector::<f64>::null(4)),
        Err(Error::ShapeOverflow { .. })
    ));

    let id = SparseMatrix::<f64>::identity(3);
    assert_eq!(id.nnz(), 3);
    assert!(id.is_symmetric(0.0));
}

#[test]
#[should_panic(expected = "overflows the element count")]
fn null_with_overflowing_shape_panics() {
    let _ = SparseMatrix::<f64>::null(usize::MAX, usize::MAX);
}

#[test]
fn element_access() {
    let mut m = SparseMatrix::<f64>::null(2, 3);
    *m.at(1, 2) = 4.0;
    assert_eq!(*m.const_at(1, 2), 4.0);
    assert_eq!(m.value_at(0, 0), 0.0);
    assert!(m.try_at(2, 0).is_err());
    assert!(m.try_const_at(0, 3).is_err());
    assert_eq!(m.values(), vec![0.0, 0.0, 0.0, 0.0, 0.0, 4.0]);
}

#[test]
#[should_panic(expected = "index out of range")]
fn const_at_out_of_range_panics() {
    let m = DenseMatrix::<f64>::null(2, 2);
    let _ = m.const_at(0, 2);
}

#[test]
fn writes_through_views_reach_the_original() {
    let m = counting::<SparseVector<f64>>();
    let mut t = m.t();
    assert!(t.shares_storage(&m));
    *t.at(3, 1) = -1.0;
    assert_eq!(m.value_at(1, 3), -1.0);

    let mut s = m.slice(1, 3, 2, 4).unwrap();
    assert_eq!(s.dims(), (2, 2));
    assert_eq!(s.value_at(0, 0), 12.0);
    *s.at(1, 1) = 99.0;
    assert_eq!(m.value_at(2, 3), 99.0);

    // slice of a transposed view
    let ts = m.t().slice(1, 3, 0, 2).unwrap();
    assert_eq!(ts.value_at(0, 1), m.value_at(1, 1));
    assert_eq!(ts.value_at(1, 0), m.value_at(0, 2));
}

#[test]
fn clone_detaches() {
    let m = counting::<DenseVector<f64>>();
    let mut c = m.clone();
    assert!(!c.shares_storage(&m));
    *c.at(0, 0) = 5.0;
    assert_eq!(m.value_at(0, 0), 0.0);

    let s = m.slice(1, 3, 1, 3).unwrap().clone();
    assert_eq!(s.dims(), (2, 2));
    assert_eq!(s.values(), vec![11.0, 12.0, 21.0, 22.0]);
    assert_eq!(s.backing().dim(), 4);
}

fn tip_matches_transpose_copy<V: Vector>() {
    // full view
    let mut m = counting::<V>();
    let expected = m.t().clone();
    m.tip();
    assert_eq!(m.dims(), (4, 3));
    assert!(m.equals(&expected, 0.0));

    // full transposed view
    let mut t = counting::<V>().t();
    let expected = t.t().clone();
    t.tip();
    assert!(t.equals(&expected, 0.0));

    // square slice: swaps across its own diagonal inside the parent
    let m = counting::<V>();
    let mut s = m.slice(0, 2, 1, 3).unwrap();
    let expected = s.t().clone();
    s.tip();
    assert!(s.equals(&expected, 0.0));
    assert_eq!(m.value_at(0, 2), 11.0);
    assert_eq!(m.value_at(1, 1), 2.0);

    // rectangular slice: detached copy
    let m = counting::<V>();
    let mut s = m.slice(0, 2, 0, 3).unwrap();
    let expected = s.t().clone();
    s.tip();
    assert_eq!(s.dims(), (3, 2));
    assert!(s.equals(&expected, 0.0));
    assert!(!s.shares_storage(&m));
}

#[test]
fn tip_dense() {
    tip_matches_transpose_copy::<DenseVector<f64>>();
}

#[test]
fn tip_sparse() {
    tip_matches_transpose_copy::<SparseVector<f64>>();
}

#[test]
fn tip_tall_and_degenerate_shapes() {
    for (r, c) in [(1, 5), (5, 1), (2, 7), (7, 3), (1, 1), (0, 4)] {
        let values: Vec<f64> = (0..r * c).map(|k| k as f64 + 1.0).collect();
        let mut m = dense(r, c, &values);
        let expected = m.t().clone();
        m.tip();
        assert!(m.equals(&expected, 0.0), "{r}x{c}");
        m.tip();
        assert_eq!(m.values(), values, "{r}x{c} twice");
    }
}

#[test]
fn tip_of_large_sparse_matrix_moves_stored_entries_only() {
    let mut m = SparseMatrix::<f64>::from_triplets(
        3000,
        2000,
        &[0, 1234, 2999],
        &[0, 567, 1999],
        &[1.0, 2.0, 3.0],
    )
    .unwrap();
    m.tip();
    assert_eq!(m.dims(), (2000, 3000));
    assert_eq!(m.nnz(), 3);
    assert_eq!(m.value_at(0, 0), 1.0);
    assert_eq!(m.value_at(567, 1234), 2.0);
    assert_eq!(m.value_at(1999, 2999), 3.0);
    assert_eq!(m.backing().indices(), vec![0, 567 * 3000 + 1234, 1999 * 3000 + 2999]);
}

#[test]
fn tip_swaps_scratch_buffers() {
    let mut m = SparseMatrix::<f64>::null(2, 5);
    assert_eq!(m.tmp1().dim(), 2);
    assert_eq!(m.tmp2().dim(), 5);
    m.tip();
    assert_eq!(m.tmp1().dim(), 5);
    assert_eq!(m.tmp2().dim(), 2);
    let t = m.t();
    assert_eq!(t.tmp1().dim(), 2);
}

#[test]
fn rows_columns_and_diagonal() {
    let m = counting::<SparseVector<f64>>();
    assert_eq!(m.row(1).unwrap().values(), vec![10.0, 11.0, 12.0, 13.0]);
    assert_eq!(m.col(2).unwrap().values(), vec![2.0, 12.0, 22.0]);
    assert!(m.row(3).is_err());
    let line = m.col_view(0);
    assert_eq!(line.dim(), 3);
    assert!(!line.is_contiguous());
    assert_eq!(line.const_iter().count(), 2);
    drop(line);

    assert!(matches!(m.diag(), Err(Error::NotSquare { rows: 3, cols: 4 })));
    let s = m.slice(0, 3, 1, 4).unwrap();
    assert_eq!(s.diag().unwrap().values(), vec![1.0, 12.0, 23.0]);
}

#[test]
fn swaps_and_permutations() {
    let mut m = dense(3, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
    m.swap_rows(0, 2).unwrap();
    assert_eq!(m.values(), vec![7.0, 8.0, 9.0, 4.0, 5.0, 6.0, 1.0, 2.0, 3.0]);
    m.swap_columns(0, 1).unwrap();
    assert_eq!(m.values(), vec![8.0, 7.0, 9.0, 5.0, 4.0, 6.0, 2.0, 1.0, 3.0]);
    m.swap(0, 0, 2, 2);
    assert_eq!(m.value_at(0, 0), 3.0);

    let mut p = sparse(3, 3, &[1.0, 2.0, 0.0, 0.0, 5.0, 6.0, 7.0, 0.0, 9.0]);
    p.permute_rows(&[2, 0, 1]).unwrap();
    assert_eq!(p.values(), vec![7.0, 0.0, 9.0, 1.0, 2.0, 0.0, 0.0, 5.0, 6.0]);
    p.permute_columns(&[2, 0, 1]).unwrap();
    assert_eq!(p.values(), vec![9.0, 7.0, 0.0, 0.0, 1.0, 2.0, 6.0, 0.0, 5.0]);
    assert!(matches!(p.permute_rows(&[0, 0, 1]), Err(Error::InvalidPermutation { .. })));

    let mut rect = sparse(2, 3, &[1.0; 6]);
    assert!(matches!(rect.swap_rows(0, 1), Err(Error::NotSquare { .. })));
    assert!(matches!(rect.symmetric_permutation(&[1, 0]), Err(Error::NotSquare { .. })));
}

#[test]
fn symmetric_permutation_keeps_symmetry() {
    let mut a = sparse(3, 3, &[4.0, 1.0, 0.0, 1.0, 3.0, 2.0, 0.0, 2.0, 5.0]);
    let before = a.clone();
    a.symmetric_permutation(&[2, 0, 1]).unwrap();
    assert!(a.is_symmetric(0.0));
    for i in 0..3 {
        for j in 0..3 {
            let pi = [2, 0, 1];
            assert_eq!(a.value_at(i, j), before.value_at(pi[i], pi[j]));
        }
    }
}

#[test]
fn element_wise_arithmetic() {
    let a = sparse(2, 2, &[1.0, 0.0, 2.0, 3.0]);
    let b = dense(2, 2, &[1.0, 1.0, -2.0, 0.0]);
    let mut r = SparseMatrix::<f64>::null(2, 2);

    r.madd_m(&a, &b).unwrap();
    assert_eq!(r.values(), vec![2.0, 1.0, 0.0, 3.0]);
    assert_eq!(r.nnz(), 3);
    r.msub_m(&a, &b).unwrap();
    assert_eq!(r.values(), vec![0.0, -1.0, 4.0, 3.0]);
    r.mmul_m(&a, &b).unwrap();
    assert_eq!(r.values(), vec![1.0, 0.0, -4.0, 0.0]);
    assert_eq!(r.nnz(), 2);

    r.madd_s(&a, &1.0).unwrap();
    assert_eq!(r.values(), vec![2.0, 1.0, 3.0, 4.0]);
    r.msub_s(&a, &0.0).unwrap();
    assert_eq!(r.nnz(), 3);
    r.mmul_s(&a, &2.0).unwrap();
    assert_eq!(r.values(), vec![2.0, 0.0, 4.0, 6.0]);
    r.mdiv_s(&a, &2.0).unwrap();
    assert_eq!(r.values(), vec![0.5, 0.0, 1.0, 1.5]);

    let wrong = SparseMatrix::<f64>::null(2, 3);
    assert!(matches!(r.madd_m(&a, &wrong), Err(Error::DimensionMismatch { .. })));
}

#[test]
fn operands_may_alias_the_destination() {
    let mut m = sparse(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    let t = m.t();
    let c = m.clone();
    m.madd_m(&c, &t).unwrap();
    assert_eq!(m.values(), vec![2.0, 5.0, 5.0, 8.0]);
    assert!(m.is_symmetric(0.0));

    let mut d = dense(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    let dt = d.t();
    let dc = d.clone();
    d.mdot_m(&dc, &dt).unwrap();
    assert_eq!(d.values(), vec![5.0, 11.0, 11.0, 25.0]);
}

#[test]
fn matrix_product() {
    let a = dense(2, 3, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let b = sparse(3, 2, &[1.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
    let mut r = SparseMatrix::<f64>::null(2, 2);
    r.mdot_m(&a, &b).unwrap();
    assert_eq!(r.values(), vec![4.0, 5.0, 10.0, 11.0]);

    let mut rt = DenseMatrix::<f64>::null(2, 2);
    rt.mdot_m(&b.t(), &a.t()).unwrap();
    assert!(rt.equals(&r.t(), 0.0));

    assert!(r.mdot_m(&a, &a).is_err());
}

#[test]
fn outer_product_and_map() {
    let u = SparseVector::<f64>::from_triplets(&[0, 2], &[1.0, 2.0], 3).unwrap();
    let v = DenseVector::<f64>::from_values(&[3.0, 0.0]);
    let mut m = SparseMatrix::<f64>::null(3, 2);
    m.outer(&u, &v).unwrap();
    assert_eq!(m.values(), vec![3.0, 0.0, 0.0, 0.0, 6.0, 0.0]);
    assert_eq!(m.nnz(), 2);

    m.map(|s| {
        if s.value() > 4.0 {
            s.reset();
        }
    });
    assert_eq!(m.nnz(), 1);
}

#[test]
fn reductions() {
    let m = dense(2, 2, &[3.0, 1.0, 1.0, 4.0]);
    let mut r = 0.0;
    m.trace(&mut r).unwrap();
    assert_eq!(r, 7.0);
    let mut n = 0.0;
    m.norm(&mut n);
    assert_eq!(n, 27.0f64.sqrt());
    assert!(m.is_symmetric(0.0));

    let rect = dense(2, 3, &[0.0; 6]);
    assert!(matches!(rect.trace(&mut r), Err(Error::NotSquare { .. })));
    assert!(!rect.is_symmetric(1.0));
}

#[test]
fn set_reset_and_identity() {
    let src = dense(2, 2, &[1.0, 0.0, 0.0, 2.0]);
    let mut m = SparseMatrix::<f64>::null(2, 2);
    m.set(&src).unwrap();
    assert_eq!(m.nnz(), 2);
    m.set_identity().unwrap();
    assert!(m.equals(&SparseMatrix::<f64>::identity(2), 0.0));

    // resetting a slice leaves the rest of the parent alone
    let big = sparse(3, 3, &[1.0; 9]);
    let mut corner = big.slice(1, 3, 1, 3).unwrap();
    corner.reset();
    assert_eq!(big.nnz(), 5);
}

#[test]
fn derivatives_flow_through_matrix_products() {
    // f(x) = xᵀ·A·x with symmetric A: ∇f = 2·A·x
    let a = SparseMatrix::<Real>::from_triplets(
        2,
        2,
        &[0, 0, 1, 1],
        &[0, 1, 0, 1],
        &[2.0, 1.0, 1.0, 3.0],
    )
    .unwrap();
    let mut x = DenseVector::<Real>::from_values(&[1.0, -1.0]);
    spardiff::vector::declare_variables(&mut x, 1);
    let mut ax = DenseVector::<Real>::null(2);
    ax.mdot_v(&a, &x).unwrap();
    let mut f = Real::default();
    spardiff::vector::dot(&mut f, &x, &ax).unwrap();
    assert_eq!(f.value(), 3.0);
    assert_eq!(f.gradient(), &[2.0, -4.0]);
}
