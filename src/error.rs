//! The crate-wide error type.
//!
//! Every fallible operation in this crate returns `Result<_, ReduceError>`.
//! There is no global/process-wide error-message string and nothing is ever
//! retried; the orchestrator in [`crate::reduce`] propagates the first error
//! it sees with `?` and drops whatever partial state it built.

use std::fmt;

/// Every fatal condition the core can raise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReduceError {
    /// A row or column index fell outside the bounds of the matrix.
    OutOfRange {
        what: &'static str,
        index: usize,
        bound: usize,
    },

    /// A tombstoned row or column was read or written.
    Tombstoned { axis: Axis, index: usize },

    /// The row view and column view of a cell disagreed.
    ///
    /// Only ever raised by [`crate::sparse::SparseMatrix::check_invariants`],
    /// which is itself only called from `debug_assert!` sites; this variant
    /// exists so the checker can also be invoked directly from tests.
    BilateralMismatch { row: usize, col: usize },

    /// A stored or intermediate entry exceeded `max_magnitude`.
    Overflow { row: usize, col: usize, magnitude: u64, max_magnitude: u64 },

    /// The packed wire format did not match its declared entry count or ring.
    FormatMismatch { detail: String },
}

/// Which axis of a matrix an error pertains to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Col,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Col => write!(f, "col"),
        }
    }
}

impl fmt::Display for ReduceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReduceError::OutOfRange { what, index, bound } => {
                write!(f, "{what} index {index} is out of range (bound {bound})")
            }
            ReduceError::Tombstoned { axis, index } => {
                write!(f, "{axis} {index} is tombstoned and cannot be accessed")
            }
            ReduceError::BilateralMismatch { row, col } => {
                write!(f, "row and column entries don't match at ({row}, {col})")
            }
            ReduceError::Overflow { row, col, magnitude, max_magnitude } => {
                write!(
                    f,
                    "entry at ({row}, {col}) has magnitude {magnitude}, exceeding max_magnitude {max_magnitude}"
                )
            }
            ReduceError::FormatMismatch { detail } => {
                write!(f, "packed matrix format mismatch: {detail}")
            }
        }
    }
}

impl std::error::Error for ReduceError {}
