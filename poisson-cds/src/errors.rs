//! Error types for poisson-cds

use crate::sparse::Diagonal;

/// Errors raised while building or writing into a structured matrix.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructureError {
    /// A non-zero value was written outside the five stored diagonals.
    #[error(
        "cannot store a non-zero value at ({row}, {col}): offset {offset} is not one of the stored diagonals"
    )]
    OutOfBandWrite {
        row: usize,
        col: usize,
        offset: isize,
    },
    /// A non-zero value was written outside the matrix.
    #[error("index ({row}, {col}) is out of bounds for a matrix of order {size}")]
    OutOfBoundsIndex { row: usize, col: usize, size: usize },
    /// A diagonal does not have the length implied by the matrix order.
    #[error("diagonal {diagonal:?} has length {found}, expected {expected}")]
    BadDiagonalLength {
        diagonal: Diagonal,
        expected: usize,
        found: usize,
    },
    /// Grid dimensions or steps do not describe an interior grid.
    #[error("invalid grid: {0}")]
    InvalidGrid(&'static str),
}

/// Errors raised by the iterative solvers.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolveError {
    #[error("dimension mismatch: expected a vector of length {expected}, got {found}")]
    IncompatibleDimensions { expected: usize, found: usize },
    /// The update formula divides by the diagonal.
    #[error("zero diagonal entry at row {row}")]
    ZeroDiagonal { row: usize },
    /// A near-diagonal coupling links two grid rows, so red and black
    /// points are no longer independent.
    #[error(
        "near-diagonal coupling between rows {row} and {next} crosses a grid row",
        next = .row + 1
    )]
    ColoringViolation { row: usize },
    /// The iteration cap was reached before the tolerance was met. The
    /// iterate passed to the solver holds the last computed values.
    #[error(
        "no convergence after {iterations} iterations (err={err:.2e}, tol={tol:.2e})"
    )]
    NonConvergence {
        iterations: usize,
        err: f64,
        tol: f64,
    },
}

impl SolveError {
    pub fn is_non_convergence(&self) -> bool {
        matches!(self, SolveError::NonConvergence { .. })
    }
}
