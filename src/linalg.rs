//! Small factorizations built on the container contract.
//!
//! Both routines are generic over the backing storage and the element kind,
//! so derivatives of the inputs propagate into the factors.

use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::scalar::{ConstScalar, Scalar};
use crate::vector::{dot, Vector};

/// Cholesky factorization `A = L·Lᵀ` of a symmetric positive definite matrix.
///
/// Only the lower triangle of `a` is read. Returns the lower-triangular
/// factor `L` with the same backing kind as `a`.
///
/// # Errors
///
/// `NotSquare` for rectangular input, `NotPositiveDefinite` when a pivot is
/// not strictly positive.
pub fn cholesky<V: Vector>(a: &Matrix<V>) -> Result<Matrix<V>> {
    a.check_square()?;
    let n = a.rows();
    let mut l = Matrix::<V>::null(n, n);
    let mut s = V::Elem::default();
    let mut t = V::Elem::default();
    let mut d = V::Elem::default();
    for j in 0..n {
        // Row j of L holds columns < j only at this point.
        let row_j = l.row(j)?;
        dot(&mut t, &row_j, &row_j)?;
        s.sub(&*a.const_at(j, j), &t);
        let pivot = s.value();
        if pivot <= 0.0 || pivot.is_nan() {
            log::debug!("cholesky: pivot {pivot} at row {j}");
            return Err(Error::NotPositiveDefinite { row: j, pivot });
        }
        d.sqrt(&s);
        for i in j + 1..n {
            dot(&mut t, &l.row_view(i), &row_j)?;
            s.sub(&*a.const_at(i, j), &t);
            let mut x = V::Elem::default();
            x.div(&s, &d);
            if !x.is_structural_zero() {
                *l.at(i, j) = x;
            }
        }
        *l.at(j, j) = d.clone();
    }
    Ok(l)
}

/// Householder reflector for `x`.
///
/// Returns `(ν, β)` with `ν₀ = 1` such that `(I - β·ν·νᵀ)·x` is a multiple
/// of the first unit vector. When `x` already is one, `β = 0`.
pub fn householder<V: Vector>(x: &V) -> (V, V::Elem) {
    let n = x.dim();
    let mut nu = V::null(n);
    let mut beta = V::Elem::default();
    if n == 0 {
        return (nu, beta);
    }
    let mut sigma = V::Elem::default();
    let mut next = V::Elem::default();
    let mut t = V::Elem::default();
    for (i, xi) in x.const_iter() {
        if i == 0 || xi.is_structural_zero() {
            continue;
        }
        nu.at(i).set(xi);
        t.mul(xi, xi);
        next.add(&sigma, &t);
        std::mem::swap(&mut sigma, &mut next);
    }
    if sigma.value() == 0.0 {
        nu.at(0).set_value(1.0);
        return (nu, beta);
    }

    let x0 = x.const_at(0);
    let mut mu = V::Elem::default();
    t.mul(x0, x0);
    next.add(&t, &sigma);
    mu.sqrt(&next);

    // ν₀ = x₀ - μ, rewritten as -σ/(x₀ + μ) for x₀ > 0 to avoid cancellation.
    let mut nu0 = V::Elem::default();
    if x0.value() <= 0.0 {
        nu0.sub(x0, &mu);
    } else {
        t.add(x0, &mu);
        next.div(&sigma, &t);
        nu0.neg(&next);
    }

    // β = 2ν₀² / (σ + ν₀²)
    t.mul(&nu0, &nu0);
    next.add(&sigma, &t);
    mu.div(&t, &next);
    beta.add(&mu, &mu);

    let occupied: Vec<usize> = nu.const_iter().map(|(i, _)| i).collect();
    for i in occupied {
        let xi = nu.at(i).clone();
        nu.at(i).div(&xi, &nu0);
    }
    nu.at(0).div(&nu0, &nu0);
    (nu, beta)
}
