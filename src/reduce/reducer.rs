//! The elimination loop that drives a chain complex to its reduced form.

use crate::complex::ChainComplex;
use crate::error::ReduceError;
use crate::reduce::ReductionOptions;
use crate::value::Value;

/// Which rows [`eliminate`] is willing to consider this call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Only rows with at most two entries (the cheap pass).
    ShortOnly,
    /// Every row.
    AllRows,
}

/// Reduce `complex` in place: for each group from `first_group+1` through
/// `last_group`, run the short pass to fixpoint and then the full pass to
/// fixpoint. A complex with no non-empty group is left untouched (§7: not
/// an error).
pub fn reduce<V: Value>(
    complex: &mut ChainComplex<V>,
    options: &ReductionOptions,
) -> Result<(), ReduceError> {
    let _span = tracing::info_span!("reduce").entered();

    let (first, last) = match (complex.first_group(), complex.last_group()) {
        (Some(f), Some(l)) => (f, l),
        _ => {
            tracing::debug!("empty complex, nothing to reduce");
            return Ok(());
        }
    };

    for g in (first + 1)..=last {
        let _group_span = tracing::debug_span!("group", g).entered();

        if options.run_short_pass {
            let mut passes = 0usize;
            while eliminate(complex, g, ScanMode::ShortOnly)? {
                passes += 1;
            }
            tracing::debug!(passes, "short pass complete");
        }

        let mut passes = 0usize;
        while eliminate(complex, g, ScanMode::AllRows)? {
            passes += 1;
        }
        tracing::debug!(passes, "full pass complete");
    }

    Ok(())
}

/// Scan group `g`'s boundary matrix `D[g-1]` once for rows with a unit
/// entry, eliminating each one found. Returns `true` iff at least one
/// elimination happened.
///
/// `g` must be at least 1 (the caller only invokes this for
/// `first_group+1 ..= last_group`, and `first_group >= 0`, so `D[g-1]`
/// always exists).
pub(crate) fn eliminate<V: Value>(
    complex: &mut ChainComplex<V>,
    g: usize,
    scan_mode: ScanMode,
) -> Result<bool, ReduceError> {
    let rank_g = complex.rank(g)?;
    let mut progress = false;

    for gen in 0..rank_g {
        if complex.matrix_mut(g - 1)?.is_row_tombstoned(gen)? {
            continue;
        }

        let row_len = complex.matrix_mut(g - 1)?.row_len(gen)?;
        if scan_mode == ScanMode::ShortOnly && row_len > 2 {
            continue;
        }

        let (pivot_col, pivot_val) = match complex.matrix_mut(g - 1)?.find_unit_in_row(gen)? {
            Some(found) => found,
            None => continue,
        };
        let scalar = pivot_val.neg();

        let row_entries = complex.matrix_mut(g - 1)?.row_entries(gen)?;
        for (col, value) in row_entries {
            if col == pivot_col {
                continue;
            }
            let alpha = value.mul(&scalar);
            complex.matrix_mut(g - 1)?.add_scaled_col_into_col(col, pivot_col, &alpha)?;
        }

        debug_assert_eq!(complex.matrix_mut(g - 1)?.row_len(gen)?, 1);

        // kill_gen(g-1, pivot_col): the generator of group g-1 paired off
        // by this pivot.
        complex.matrix_mut(g - 1)?.erase_col(pivot_col, true)?;
        if g >= 2 {
            complex.matrix_mut(g - 2)?.erase_row(pivot_col, true)?;
        }
        complex.decrement_live(g - 1)?;

        debug_assert_eq!(complex.matrix_mut(g - 1)?.row_len(gen)?, 0);

        // kill_gen(g, gen): the generator of group g this row belonged to.
        complex.matrix_mut(g - 1)?.erase_row(gen, true)?;
        if g < complex.num_matrices() {
            complex.matrix_mut(g)?.erase_col(gen, true)?;
        }
        complex.decrement_live(g)?;

        progress = true;
        tracing::debug!(group = g, gen, pivot_col, "eliminated generator pair");
    }

    Ok(progress)
}
