//! The marshalling boundary between this crate and a calling process: takes
//! ranks plus packed boundary matrices in, hands back the reduced complex
//! in the caller's own (dense, column-major) matrix layout.
//!
//! There is no separate host process in this repository, so `unpack` and
//! `pack` are implemented as ordinary functions rather than an FFI surface;
//! they are the public entry point most callers of this crate use instead
//! of touching `complex`/`reduce` directly.

mod packed;

pub use packed::{DenseMatrix, PackedCodec, PackedMatrix, RingKind, WireWidth};

use crate::complex::ChainComplex;
use crate::error::ReduceError;
use crate::reduce as reduce_mod;
use crate::reduce::ReductionOptions;
use serde::{Deserialize, Serialize};

/// The result of reducing a chain complex, in wire-ready form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReducedComplex {
    pub ranks: Vec<usize>,
    pub matrices: Vec<DenseMatrix>,
    /// Present only for group-ring builds: the parallel `t`-coefficient
    /// channel of each matrix in `matrices`.
    pub matrices_t: Option<Vec<DenseMatrix>>,
}

/// Build a [`ChainComplex`] from its packed wire form and run the full
/// reduction in one step.
///
/// `packed_matrices[k]` must correspond to `D[k]`, the boundary matrix
/// from group `k` to group `k+1` (0-based; see the module-level note on
/// the distilled spec's 1-based matrix numbering).
pub fn reduce<V: PackedCodec>(
    ranks: Vec<usize>,
    packed_matrices: Vec<PackedMatrix>,
    options: ReductionOptions,
) -> Result<ReducedComplex, ReduceError> {
    let _span = tracing::info_span!("host::reduce", groups = ranks.len()).entered();

    let mut sources: Vec<Box<dyn FnOnce() -> Result<crate::sparse::SparseMatrix<V>, ReduceError>>> =
        Vec::with_capacity(packed_matrices.len());
    for (g, packed) in packed_matrices.into_iter().enumerate() {
        let num_rows = *ranks.get(g + 1).ok_or(ReduceError::FormatMismatch {
            detail: format!("no rank recorded for group {}", g + 1),
        })?;
        let num_cols = *ranks.get(g).ok_or(ReduceError::FormatMismatch {
            detail: format!("no rank recorded for group {}", g),
        })?;
        let max_magnitude = options.max_magnitude;
        if num_rows == 0 || num_cols == 0 {
            // Neither side of this boundary can ever be touched by the
            // reducer (one of its groups has rank 0), but the other
            // dimension may still be real -- a placeholder collapsed to
            // 1x1 on both axes would silently discard it.
            let rows = num_rows.max(1);
            let cols = num_cols.max(1);
            sources.push(Box::new(move || {
                crate::sparse::SparseMatrix::with_max_magnitude(rows, cols, max_magnitude)
            }));
        } else {
            sources.push(Box::new(move || packed::unpack_matrix(&packed, num_rows, num_cols, max_magnitude)));
        }
    }

    let mut complex = ChainComplex::new_lazy(ranks, sources)?;
    reduce_mod::reduce(&mut complex, &options)?;
    Ok(pack(&mut complex))
}

/// Repack the surviving (non-tombstoned) generators and boundary matrices
/// of `complex` into dense, column-major wire form.
///
/// Takes `complex` mutably because a matrix the reducer never touched
/// (e.g. one adjacent to a rank-0 group) may still be lazily pending and
/// needs materializing here to be read.
pub fn pack<V: PackedCodec>(complex: &mut ChainComplex<V>) -> ReducedComplex {
    let ranks = complex.live_counts().to_vec();

    let live_indices = |count_fn: &dyn Fn(usize) -> bool, len: usize| -> Vec<usize> {
        (0..len).filter(|&i| count_fn(i)).collect()
    };

    let mut matrices = Vec::with_capacity(complex.num_matrices());
    let mut matrices_t =
        if V::RING_KIND == RingKind::GroupRing { Some(Vec::with_capacity(complex.num_matrices())) } else { None };

    for g in 0..complex.num_matrices() {
        let matrix = complex.matrix(g).expect("g is within bounds by construction");
        let live_rows: Vec<usize> =
            live_indices(&|r| !matrix.is_row_tombstoned(r).unwrap_or(true), matrix.num_rows());
        let live_cols: Vec<usize> =
            live_indices(&|c| !matrix.is_col_tombstoned(c).unwrap_or(true), matrix.num_cols());

        let channel0 = packed::pack_channel(matrix, 0, &live_rows, &live_cols)
            .expect("live row/col indices were just read from this matrix");
        matrices.push(channel0);

        if let Some(ref mut t_matrices) = matrices_t {
            let channel1 = packed::pack_channel(matrix, 1, &live_rows, &live_cols)
                .expect("live row/col indices were just read from this matrix");
            t_matrices.push(channel1);
        }
    }

    ReducedComplex { ranks, matrices, matrices_t }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::packed::{RingKind as PackedRingKind, WireWidth};
    use crate::value::integer::IntegerValue;

    fn word(row: usize, col: usize, sign: i64) -> i64 {
        sign * ((row as i64) * (1i64 << 32) + col as i64)
    }

    #[test]
    fn reduce_collapses_a_single_unit_pair_end_to_end() {
        let packed = PackedMatrix {
            width: WireWidth::Bits64,
            ring: PackedRingKind::Integer,
            entry_count: 1,
            words: vec![word(1, 1, 1)],
        };
        let result =
            reduce::<IntegerValue>(vec![1, 1], vec![packed], ReductionOptions::default()).unwrap();

        assert_eq!(result.ranks, vec![0, 0]);
        assert_eq!(result.matrices, vec![DenseMatrix::zero_placeholder()]);
        assert!(result.matrices_t.is_none());
    }

    #[test]
    fn reduce_is_a_no_op_on_an_empty_complex() {
        let result = reduce::<IntegerValue>(vec![0, 0], vec![PackedMatrix {
            width: WireWidth::Bits64,
            ring: PackedRingKind::Integer,
            entry_count: 0,
            words: vec![],
        }], ReductionOptions::default())
        .unwrap();

        assert_eq!(result.ranks, vec![0, 0]);
    }

    #[test]
    fn reduce_rejects_a_rank_mismatched_entry_count() {
        let packed = PackedMatrix {
            width: WireWidth::Bits64,
            ring: PackedRingKind::Integer,
            entry_count: 3,
            words: vec![word(1, 1, 1)],
        };
        assert!(reduce::<IntegerValue>(vec![1, 1], vec![packed], ReductionOptions::default()).is_err());
    }

    #[test]
    fn reduce_preserves_the_nonzero_dimension_of_a_matrix_adjacent_to_a_rank_zero_group() {
        // ranks = [0, 2, 1]: D[0] (group 0 -> group 1) has num_cols = 0 but
        // a real num_rows = 2, so it gets a placeholder shape rather than
        // being unpacked. D[1]'s only entry sits at column 1 (not 0), so
        // the pivot found there makes `kill_gen` reach into D[0] at row
        // index 1 -- only valid if D[0]'s placeholder kept both of its
        // rows instead of collapsing to 1x1.
        let d0 = PackedMatrix {
            width: WireWidth::Bits64,
            ring: PackedRingKind::Integer,
            entry_count: 0,
            words: vec![],
        };
        let d1 = PackedMatrix {
            width: WireWidth::Bits64,
            ring: PackedRingKind::Integer,
            entry_count: 1,
            words: vec![word(1, 2, 1)],
        };

        let result =
            reduce::<IntegerValue>(vec![0, 2, 1], vec![d0, d1], ReductionOptions::default()).unwrap();

        assert_eq!(result.ranks, vec![0, 1, 0]);
    }

    #[test]
    fn reduced_complex_round_trips_through_json() {
        let packed = PackedMatrix {
            width: WireWidth::Bits64,
            ring: PackedRingKind::Integer,
            entry_count: 1,
            words: vec![word(1, 1, 1)],
        };
        let result =
            reduce::<IntegerValue>(vec![1, 1], vec![packed], ReductionOptions::default()).unwrap();

        let json = serde_json::to_string(&result).unwrap();
        let parsed: ReducedComplex = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, result);
    }
}
