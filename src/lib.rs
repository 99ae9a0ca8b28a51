//! Dense and sparse vectors and matrices over forward-mode differentiable
//! scalars.
//!
//! Containers are generic over the element kind through the [`Scalar`]
//! capability trait: plain `f64` carries values only, [`Real`] additionally
//! carries a gradient and, at order 2, a Hessian that arithmetic propagates
//! by the chain rule.
//!
//! ```
//! use spardiff::{ConstScalar, ConstVector, Real, Scalar, SparseVector, Vector};
//!
//! // f(x) = x₀·x₁ at (3, 4)
//! let mut x = SparseVector::<Real>::from_triplets(&[0, 1], &[3.0, 4.0], 2).unwrap();
//! spardiff::vector::declare_variables(&mut x, 1);
//! let mut y = Real::default();
//! y.mul(x.const_at(0), x.const_at(1));
//! assert_eq!(y.value(), 12.0);
//! assert_eq!(y.gradient(), &[4.0, 3.0]);
//! ```

pub mod error;
pub mod index;
pub mod io;
pub mod linalg;
pub mod matrix;
pub mod real;
pub mod scalar;
#[cfg(feature = "serde")]
pub mod serde_support;
mod traits;
pub mod vector;

pub use error::{Error, Result};
pub use index::SparseIndex;
pub use io::{ExportOptions, Table};
pub use matrix::{DenseMatrix, Matrix, MatrixLine, SparseMatrix};
pub use real::Real;
pub use scalar::{ConstScalar, Scalar};
#[cfg(feature = "serde")]
pub use serde_support::JsonFile;
pub use vector::{ConstVector, DenseVector, JointIter, JointIter3, SparseVector, Vector};

/// Dense vector of differentiable reals.
pub type DenseRealVector = DenseVector<Real>;
/// Sparse vector of differentiable reals.
pub type SparseRealVector = SparseVector<Real>;
/// Dense matrix of differentiable reals.
pub type DenseRealMatrix = DenseMatrix<Real>;
/// Sparse matrix of differentiable reals.
pub type SparseRealMatrix = SparseMatrix<Real>;
