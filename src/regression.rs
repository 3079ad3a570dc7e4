//! The optimized learning step: least-squares output weights via the Moore–Penrose
//! pseudo-inverse.

use std::{error, fmt};

use nalgebra::{DMatrix, DVector};

/// The reason why the optimized learning step could not be computed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The partial semantics matrix has no rows or no columns.
    Empty,
    /// The number of rows of the partial semantics does not match the length of the target.
    DimensionMismatch {
        /// Rows of the partial semantics (training instances).
        rows: usize,
        /// Length of the target.
        target: usize,
    },
    /// The partial semantics or the target contain NaN or infinite values.
    NonFiniteInput,
    /// The columns of the partial semantics are linearly dependent.
    RankDeficient {
        /// The numerical rank of the partial semantics.
        rank: usize,
        /// The number of columns of the partial semantics.
        columns: usize,
    },
    /// The singular value decomposition failed.
    Decomposition(&'static str),
    /// The computed weights contain NaN or infinite values.
    NonFiniteResult,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "partial semantics are empty"),
            Self::DimensionMismatch { rows, target } => write!(
                f,
                "partial semantics have {} rows but the target has length {}",
                rows, target
            ),
            Self::NonFiniteInput => write!(f, "regression input is not finite"),
            Self::RankDeficient { rank, columns } => write!(
                f,
                "partial semantics have rank {} but {} columns",
                rank, columns
            ),
            Self::Decomposition(e) => write!(f, "decomposition failed: {}", e),
            Self::NonFiniteResult => write!(f, "regression result is not finite"),
        }
    }
}

impl error::Error for Error {}

/// Returns the minimum-norm weights `w = pinv(P) · delta_target`, which minimize the squared error
/// between `P · w` and `delta_target`.
///
/// `partial_semantics` has one row per training instance and one column per neuron. The returned
/// vector has one weight per column.
pub fn optimized_learning_step(
    partial_semantics: &DMatrix<f64>,
    delta_target: &DVector<f64>,
) -> Result<DVector<f64>, Error> {
    let (rows, columns) = partial_semantics.shape();

    if rows == 0 || columns == 0 {
        return Err(Error::Empty);
    }

    if delta_target.len() != rows {
        return Err(Error::DimensionMismatch {
            rows,
            target: delta_target.len(),
        });
    }

    if partial_semantics.iter().chain(delta_target.iter()).any(|x| !x.is_finite()) {
        return Err(Error::NonFiniteInput);
    }

    let svd = partial_semantics.clone().svd(true, true);
    // Same cutoff as numpy's `matrix_rank`
    let tolerance = svd.singular_values.max() * rows.max(columns) as f64 * f64::EPSILON;

    let rank = svd.rank(tolerance);
    if rank < columns {
        return Err(Error::RankDeficient { rank, columns });
    }

    let inverse = svd.pseudo_inverse(tolerance).map_err(Error::Decomposition)?;
    let weights = inverse * delta_target;

    if weights.iter().any(|w| !w.is_finite()) {
        return Err(Error::NonFiniteResult);
    }

    Ok(weights)
}
