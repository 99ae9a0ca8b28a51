//! Error type shared by every container operation.

use thiserror::Error;

/// Errors reported by vector, matrix, linear-algebra and IO operations.
///
/// Structural errors (`DimensionMismatch`, `IndexOutOfRange`, `NotSquare`,
/// `InvalidPermutation`) describe caller bugs and are raised at the call
/// that detects them. `NotPositiveDefinite`, `Format`, `Io` and `Json` are
/// expected outcomes for some inputs and are always returned.
#[derive(Debug, Error)]
pub enum Error {
    /// Two operands disagree on their dimensions.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// An element index lies outside `[0, dim)`.
    #[error("index out of range: index {index} for dimension {dim}")]
    IndexOutOfRange { index: usize, dim: usize },

    /// A square-only operation was called on a rectangular matrix.
    #[error("matrix must be square: got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    /// A permutation is not a bijection of `[0, len)`.
    #[error("invalid permutation {perm:?} for dimension {dim}")]
    InvalidPermutation { perm: Vec<usize>, dim: usize },

    /// `rows * cols` does not fit in `usize`.
    #[error("matrix shape {rows}x{cols} overflows the element count")]
    ShapeOverflow { rows: usize, cols: usize },

    /// Cholesky factorization met a non-positive pivot.
    #[error("matrix is not positive definite: pivot {pivot} at row {row}")]
    NotPositiveDefinite { row: usize, pivot: f64 },

    /// Malformed table input.
    #[error("invalid table format at line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "serde")]
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn check_index(index: usize, dim: usize) -> Result<()> {
    if index >= dim {
        return Err(Error::IndexOutOfRange { index, dim });
    }
    Ok(())
}

pub(crate) fn check_dim(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::DimensionMismatch { expected, actual });
    }
    Ok(())
}

/// Number of elements of a `rows x cols` matrix.
pub(crate) fn element_count(rows: usize, cols: usize) -> Result<usize> {
    rows.checked_mul(cols).ok_or(Error::ShapeOverflow { rows, cols })
}

/// Validate that `perm` is a bijection of `[0, dim)`.
pub(crate) fn check_permutation(perm: &[usize], dim: usize) -> Result<()> {
    let invalid = || Error::InvalidPermutation {
        perm: perm.to_vec(),
        dim,
    };
    if perm.len() != dim {
        return Err(invalid());
    }
    let mut seen = vec![false; dim];
    for &p in perm {
        if p >= dim || seen[p] {
            return Err(invalid());
        }
        seen[p] = true;
    }
    Ok(())
}
