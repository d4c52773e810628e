//! The ordered sequence of chain groups and boundary matrices.

use crate::error::ReduceError;
use crate::sparse::SparseMatrix;
use crate::value::Value;

/// A boundary matrix slot: either already built, or a thunk that builds it
/// (e.g. by unpacking its wire form) the first time it's touched.
enum MatrixSlot<V: Value> {
    Ready(SparseMatrix<V>),
    Pending(Box<dyn FnOnce() -> Result<SparseMatrix<V>, ReduceError>>),
}

impl<V: Value> std::fmt::Debug for MatrixSlot<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixSlot::Ready(m) => f.debug_tuple("Ready").field(m).finish(),
            MatrixSlot::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A chain complex `D[0] -> D[1] -> ... -> D[N-1]`.
///
/// Group `g` has an original rank `rank[g]` and a current generator count
/// `live[g] <= rank[g]`. The boundary matrix between group `g` and group
/// `g+1` is `matrices[g]`, a `rank[g+1] x rank[g]` matrix; there are
/// `N.saturating_sub(1)` of them.
///
/// A matrix built from already-in-memory data ([`ChainComplex::new`]) is
/// stored ready to use. A matrix built from the wire format
/// ([`ChainComplex::new_lazy`]) is stored as a thunk and only unpacked the
/// first time [`ChainComplex::matrix`] or [`ChainComplex::matrix_mut`]
/// touches its group -- there's no point paying to decode a boundary
/// matrix the reducer never visits (a group entirely outside
/// `first_group..=last_group`).
#[derive(Debug)]
pub struct ChainComplex<V: Value> {
    rank: Vec<usize>,
    live: Vec<usize>,
    matrices: Vec<MatrixSlot<V>>,
    first_group: Option<usize>,
    last_group: Option<usize>,
}

impl<V: Value> ChainComplex<V> {
    /// Build a complex from its ranks and its already-materialized
    /// boundary matrices.
    ///
    /// `matrices.len()` must equal `rank.len().saturating_sub(1)`, and
    /// `matrices[g]` must be `rank[g+1] x rank[g]`. Shape is checked
    /// immediately, since there is nothing left to defer.
    pub fn new(rank: Vec<usize>, matrices: Vec<SparseMatrix<V>>) -> Result<Self, ReduceError> {
        let expected_matrices = rank.len().saturating_sub(1);
        if matrices.len() != expected_matrices {
            return Err(ReduceError::FormatMismatch {
                detail: format!(
                    "expected {} boundary matrices for {} groups, got {}",
                    expected_matrices,
                    rank.len(),
                    matrices.len()
                ),
            });
        }
        for (g, matrix) in matrices.iter().enumerate() {
            // A group with rank 0 never has its matrix touched (it falls
            // outside `first_group..=last_group`), so its slot may be any
            // placeholder shape -- `SparseMatrix` itself cannot represent
            // a literal 0 dimension.
            if rank[g] == 0 || rank[g + 1] == 0 {
                continue;
            }
            if matrix.num_rows() != rank[g + 1] || matrix.num_cols() != rank[g] {
                return Err(ReduceError::FormatMismatch {
                    detail: format!(
                        "D[{}] has shape {}x{}, expected {}x{}",
                        g,
                        matrix.num_rows(),
                        matrix.num_cols(),
                        rank[g + 1],
                        rank[g]
                    ),
                });
            }
        }

        let (first_group, last_group) = bracket(&rank);
        let live = rank.clone();
        let matrices = matrices.into_iter().map(MatrixSlot::Ready).collect();

        Ok(ChainComplex { rank, live, matrices, first_group, last_group })
    }

    /// Build a complex from its ranks and a builder thunk per boundary
    /// matrix, deferring each matrix's construction until the reducer
    /// first reaches its group.
    ///
    /// `sources.len()` must equal `rank.len().saturating_sub(1)`. Shape
    /// validation for `sources[g]` happens when it is first forced, not
    /// here -- the point of this constructor is that building it (e.g.
    /// decoding a packed wire payload) may not need to happen at all.
    pub fn new_lazy(
        rank: Vec<usize>,
        sources: Vec<Box<dyn FnOnce() -> Result<SparseMatrix<V>, ReduceError>>>,
    ) -> Result<Self, ReduceError> {
        let expected_matrices = rank.len().saturating_sub(1);
        if sources.len() != expected_matrices {
            return Err(ReduceError::FormatMismatch {
                detail: format!(
                    "expected {} boundary matrices for {} groups, got {}",
                    expected_matrices,
                    rank.len(),
                    sources.len()
                ),
            });
        }

        let (first_group, last_group) = bracket(&rank);
        let live = rank.clone();
        let matrices = sources.into_iter().map(MatrixSlot::Pending).collect();

        Ok(ChainComplex { rank, live, matrices, first_group, last_group })
    }

    pub fn num_groups(&self) -> usize {
        self.rank.len()
    }

    /// `true` iff every group has rank 0 (§7: "Empty complex ... not an
    /// error; returns empty output").
    pub fn is_empty(&self) -> bool {
        self.first_group.is_none()
    }

    pub fn first_group(&self) -> Option<usize> {
        self.first_group
    }

    pub fn last_group(&self) -> Option<usize> {
        self.last_group
    }

    pub fn rank(&self, group: usize) -> Result<usize, ReduceError> {
        self.rank.get(group).copied().ok_or(ReduceError::OutOfRange {
            what: "group",
            index: group,
            bound: self.rank.len(),
        })
    }

    pub fn live(&self, group: usize) -> Result<usize, ReduceError> {
        self.live.get(group).copied().ok_or(ReduceError::OutOfRange {
            what: "group",
            index: group,
            bound: self.live.len(),
        })
    }

    /// Record that one generator of `group` has collapsed away.
    pub fn decrement_live(&mut self, group: usize) -> Result<(), ReduceError> {
        let count = self.live.get_mut(group).ok_or(ReduceError::OutOfRange {
            what: "group",
            index: group,
            bound: self.live.len(),
        })?;
        debug_assert!(*count > 0, "cannot decrement live count of an already-empty group");
        *count -= 1;
        Ok(())
    }

    pub fn live_counts(&self) -> &[usize] {
        &self.live
    }

    /// Force `matrices[group]` to its materialized form if it hasn't been
    /// already, validating its shape against `rank[group+1] x rank[group]`.
    fn materialize(&mut self, group: usize) -> Result<(), ReduceError> {
        let bound = self.matrices.len();
        let is_pending = match self.matrices.get(group) {
            Some(MatrixSlot::Pending(_)) => true,
            Some(MatrixSlot::Ready(_)) => false,
            None => return Err(ReduceError::OutOfRange { what: "boundary matrix", index: group, bound }),
        };
        if !is_pending {
            return Ok(());
        }

        // Swap in a cheap placeholder to take ownership of the thunk,
        // then overwrite it with the real result (or leave the error to
        // propagate, discarding the placeholder along with it).
        let slot = std::mem::replace(&mut self.matrices[group], MatrixSlot::Ready(SparseMatrix::with_max_magnitude(1, 1, 0)?));
        let thunk = match slot {
            MatrixSlot::Pending(thunk) => thunk,
            MatrixSlot::Ready(_) => unreachable!("checked is_pending above"),
        };

        let built = thunk()?;
        if built.num_rows() != self.rank[group + 1] || built.num_cols() != self.rank[group] {
            return Err(ReduceError::FormatMismatch {
                detail: format!(
                    "D[{}] has shape {}x{}, expected {}x{}",
                    group,
                    built.num_rows(),
                    built.num_cols(),
                    self.rank[group + 1],
                    self.rank[group]
                ),
            });
        }
        self.matrices[group] = MatrixSlot::Ready(built);
        Ok(())
    }

    /// The boundary matrix `D[group]`, i.e. the map from group `group` to
    /// group `group+1`. Materializes it first if it was built lazily and
    /// hasn't been touched yet.
    pub fn matrix(&mut self, group: usize) -> Result<&SparseMatrix<V>, ReduceError> {
        self.materialize(group)?;
        match &self.matrices[group] {
            MatrixSlot::Ready(m) => Ok(m),
            MatrixSlot::Pending(_) => unreachable!("materialize always leaves a Ready slot"),
        }
    }

    pub fn matrix_mut(&mut self, group: usize) -> Result<&mut SparseMatrix<V>, ReduceError> {
        self.materialize(group)?;
        match &mut self.matrices[group] {
            MatrixSlot::Ready(m) => Ok(m),
            MatrixSlot::Pending(_) => unreachable!("materialize always leaves a Ready slot"),
        }
    }

    pub fn num_matrices(&self) -> usize {
        self.matrices.len()
    }
}

fn bracket(rank: &[usize]) -> (Option<usize>, Option<usize>) {
    (rank.iter().position(|&r| r > 0), rank.iter().rposition(|&r| r > 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::integer::IntegerValue;

    #[test]
    fn rejects_wrong_matrix_count() {
        let m0 = SparseMatrix::<IntegerValue>::new(1, 1).unwrap();
        assert!(ChainComplex::new(vec![1, 1, 1], vec![m0]).is_err());
    }

    #[test]
    fn rejects_wrong_matrix_shape() {
        let m0 = SparseMatrix::<IntegerValue>::new(2, 1).unwrap();
        assert!(ChainComplex::new(vec![1, 1], vec![m0]).is_err());
    }

    #[test]
    fn empty_complex_has_no_first_or_last_group() {
        let complex = ChainComplex::<IntegerValue>::new(vec![0, 0, 0], vec![
            SparseMatrix::new(1, 1).unwrap(),
            SparseMatrix::new(1, 1).unwrap(),
        ])
        .unwrap();
        assert!(complex.is_empty());
        assert_eq!(complex.first_group(), None);
        assert_eq!(complex.last_group(), None);
    }

    #[test]
    fn first_and_last_group_bracket_nonempty_ranks() {
        let complex = ChainComplex::<IntegerValue>::new(vec![0, 2, 1, 0], vec![
            SparseMatrix::new(2, 1).unwrap(),
            SparseMatrix::new(1, 2).unwrap(),
            SparseMatrix::new(1, 1).unwrap(),
        ])
        .unwrap();
        assert_eq!(complex.first_group(), Some(1));
        assert_eq!(complex.last_group(), Some(2));
    }

    #[test]
    fn new_lazy_never_calls_a_thunk_for_a_group_the_reducer_never_visits() {
        use std::cell::Cell;
        use std::rc::Rc;

        let touched = Rc::new(Cell::new(false));
        let touched_in_thunk = Rc::clone(&touched);
        let source: Box<dyn FnOnce() -> Result<SparseMatrix<IntegerValue>, ReduceError>> =
            Box::new(move || {
                touched_in_thunk.set(true);
                SparseMatrix::new(1, 1)
            });

        let complex = ChainComplex::<IntegerValue>::new_lazy(vec![0, 0], vec![source]).unwrap();
        assert!(complex.is_empty());
        assert!(!touched.get(), "a lazy source for an empty complex should never be forced");
    }

    #[test]
    fn new_lazy_materializes_on_first_access_and_caches_the_result() {
        use std::cell::Cell;
        use std::rc::Rc;

        let calls = Rc::new(Cell::new(0));
        let calls_in_thunk = Rc::clone(&calls);
        let source: Box<dyn FnOnce() -> Result<SparseMatrix<IntegerValue>, ReduceError>> =
            Box::new(move || {
                calls_in_thunk.set(calls_in_thunk.get() + 1);
                let mut m = SparseMatrix::new(1, 1)?;
                m.put(0, 0, IntegerValue(1))?;
                Ok(m)
            });

        let mut complex = ChainComplex::<IntegerValue>::new_lazy(vec![1, 1], vec![source]).unwrap();
        assert_eq!(calls.get(), 0);
        assert_eq!(complex.matrix(0).unwrap().get(0, 0).unwrap(), IntegerValue(1));
        assert_eq!(calls.get(), 1);
        // A second access reuses the already-materialized matrix.
        assert_eq!(complex.matrix_mut(0).unwrap().get(0, 0).unwrap(), IntegerValue(1));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn new_lazy_propagates_a_shape_mismatch_only_once_forced() {
        let source: Box<dyn FnOnce() -> Result<SparseMatrix<IntegerValue>, ReduceError>> =
            Box::new(|| SparseMatrix::new(2, 2));

        let mut complex = ChainComplex::<IntegerValue>::new_lazy(vec![1, 1], vec![source]).unwrap();
        assert!(complex.matrix(0).is_err());
    }
}
