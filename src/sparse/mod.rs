//! The bilaterally-indexed sparse matrix.
//!
//! A [`SparseMatrix`] stores every non-zero entry twice: once reachable by
//! walking its row, once by walking its column.  Both views are kept
//! consistent by construction -- every method that mutates one view also
//! mutates the other, in the same call.  This is the central invariant of
//! the whole crate; see [`SparseMatrix::check_invariants`].

mod entry;
mod matrix;

pub use entry::EntryId;
pub use matrix::SparseMatrix;
