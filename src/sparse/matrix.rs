//! The bilaterally-indexed sparse matrix implementation.

use super::entry::{Entry, EntryId};
use crate::error::{Axis, ReduceError};
use crate::value::{Value, MAX_MAGNITUDE};

/// A sparse matrix whose non-zero entries are each reachable two ways: by
/// walking the row they belong to, and by walking the column they belong
/// to.  Both chains are doubly linked through the shared entry arena, so a
/// given cell can be unlinked from either chain in O(1) once its
/// [`EntryId`] is known.
///
/// Rows and columns may be individually *tombstoned*: a permanent mark that
/// the row/column has been collapsed away and must never be read or
/// written again (§3, §7 of the design doc). A freshly constructed matrix
/// has no tombstoned rows or columns.
#[derive(Debug, Clone)]
pub struct SparseMatrix<V: Value> {
    num_rows: usize,
    num_cols: usize,
    max_magnitude: u64,

    arena: Vec<Option<Entry<V>>>,
    free_list: Vec<EntryId>,

    row_head: Vec<Option<EntryId>>,
    col_head: Vec<Option<EntryId>>,
    row_count: Vec<usize>,
    col_count: Vec<usize>,
    row_tombstoned: Vec<bool>,
    col_tombstoned: Vec<bool>,
}

impl<V: Value> SparseMatrix<V> {
    /// Allocate an empty matrix with `num_rows` rows and `num_cols`
    /// columns. Both must be at least 1.
    pub fn new(num_rows: usize, num_cols: usize) -> Result<Self, ReduceError> {
        Self::with_max_magnitude(num_rows, num_cols, MAX_MAGNITUDE)
    }

    /// As [`SparseMatrix::new`], but with a caller-chosen overflow ceiling.
    /// See [`crate::reduce::ReductionOptions`].
    pub fn with_max_magnitude(
        num_rows: usize,
        num_cols: usize,
        max_magnitude: u64,
    ) -> Result<Self, ReduceError> {
        if num_rows == 0 || num_cols == 0 {
            return Err(ReduceError::OutOfRange {
                what: "num_rows/num_cols",
                index: 0,
                bound: 1,
            });
        }
        Ok(SparseMatrix {
            num_rows,
            num_cols,
            max_magnitude,
            arena: Vec::new(),
            free_list: Vec::new(),
            row_head: vec![None; num_rows],
            col_head: vec![None; num_cols],
            row_count: vec![0; num_rows],
            col_count: vec![0; num_cols],
            row_tombstoned: vec![false; num_rows],
            col_tombstoned: vec![false; num_cols],
        })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_cols
    }

    pub fn row_len(&self, row: usize) -> Result<usize, ReduceError> {
        self.check_row_bound(row)?;
        Ok(self.row_count[row])
    }

    pub fn col_len(&self, col: usize) -> Result<usize, ReduceError> {
        self.check_col_bound(col)?;
        Ok(self.col_count[col])
    }

    pub fn is_row_tombstoned(&self, row: usize) -> Result<bool, ReduceError> {
        self.check_row_bound(row)?;
        Ok(self.row_tombstoned[row])
    }

    pub fn is_col_tombstoned(&self, col: usize) -> Result<bool, ReduceError> {
        self.check_col_bound(col)?;
        Ok(self.col_tombstoned[col])
    }

    //  -----------------------------------------------------------------
    //  BOUNDS AND TOMBSTONE CHECKS
    //  -----------------------------------------------------------------

    fn check_row_bound(&self, row: usize) -> Result<(), ReduceError> {
        if row >= self.num_rows {
            return Err(ReduceError::OutOfRange { what: "row", index: row, bound: self.num_rows });
        }
        Ok(())
    }

    fn check_col_bound(&self, col: usize) -> Result<(), ReduceError> {
        if col >= self.num_cols {
            return Err(ReduceError::OutOfRange { what: "col", index: col, bound: self.num_cols });
        }
        Ok(())
    }

    fn check_row_live(&self, row: usize) -> Result<(), ReduceError> {
        self.check_row_bound(row)?;
        if self.row_tombstoned[row] {
            return Err(ReduceError::Tombstoned { axis: Axis::Row, index: row });
        }
        Ok(())
    }

    fn check_col_live(&self, col: usize) -> Result<(), ReduceError> {
        self.check_col_bound(col)?;
        if self.col_tombstoned[col] {
            return Err(ReduceError::Tombstoned { axis: Axis::Col, index: col });
        }
        Ok(())
    }

    fn check_magnitude(&self, row: usize, col: usize, value: &V) -> Result<(), ReduceError> {
        let magnitude = value.magnitude();
        if magnitude > self.max_magnitude {
            return Err(ReduceError::Overflow {
                row,
                col,
                magnitude,
                max_magnitude: self.max_magnitude,
            });
        }
        Ok(())
    }

    //  -----------------------------------------------------------------
    //  ARENA PRIMITIVES
    //  -----------------------------------------------------------------

    fn entry(&self, id: EntryId) -> &Entry<V> {
        self.arena[id].as_ref().expect("entry id refers to a live arena slot")
    }

    fn entry_mut(&mut self, id: EntryId) -> &mut Entry<V> {
        self.arena[id].as_mut().expect("entry id refers to a live arena slot")
    }

    fn alloc_entry(&mut self, row: usize, col: usize, value: V) -> EntryId {
        let entry = Entry::new(row, col, value);
        if let Some(id) = self.free_list.pop() {
            self.arena[id] = Some(entry);
            id
        } else {
            self.arena.push(Some(entry));
            self.arena.len() - 1
        }
    }

    /// Remove `id` from both chains it belongs to and return the slot to
    /// the free list. Does not touch `row_count`/`col_count`; callers
    /// decrement those themselves, since some callers (e.g. `erase_row`)
    /// reset the count in bulk instead.
    fn unlink_from_both_chains(&mut self, id: EntryId) {
        let (row, col, prev_in_row, next_in_row, prev_in_col, next_in_col) = {
            let e = self.entry(id);
            (e.row, e.col, e.prev_in_row, e.next_in_row, e.prev_in_col, e.next_in_col)
        };
        match prev_in_row {
            Some(p) => self.entry_mut(p).next_in_row = next_in_row,
            None => self.row_head[row] = next_in_row,
        }
        if let Some(n) = next_in_row {
            self.entry_mut(n).prev_in_row = prev_in_row;
        }
        match prev_in_col {
            Some(p) => self.entry_mut(p).next_in_col = next_in_col,
            None => self.col_head[col] = next_in_col,
        }
        if let Some(n) = next_in_col {
            self.entry_mut(n).prev_in_col = prev_in_col;
        }
    }

    /// Fully remove entry `id`: unlink from both chains, decrement both
    /// counts, and free its arena slot.
    fn remove_entry(&mut self, id: EntryId) -> V {
        let (row, col) = {
            let e = self.entry(id);
            (e.row, e.col)
        };
        self.unlink_from_both_chains(id);
        self.row_count[row] -= 1;
        self.col_count[col] -= 1;
        let entry = self.arena[id].take().expect("entry id refers to a live arena slot");
        self.free_list.push(id);
        entry.value
    }

    /// Walk row `row`'s chain to find the entry at `col`, or the
    /// insertion point (the entry immediately before where one would go).
    /// Returns `(prev, found_or_next)`.
    fn locate_in_row(&self, row: usize, col: usize) -> (Option<EntryId>, Option<EntryId>) {
        let mut prev = None;
        let mut cur = self.row_head[row];
        while let Some(id) = cur {
            let e = self.entry(id);
            if e.col >= col {
                break;
            }
            prev = cur;
            cur = e.next_in_row;
        }
        (prev, cur)
    }

    fn locate_in_col(&self, col: usize, row: usize) -> (Option<EntryId>, Option<EntryId>) {
        let mut prev = None;
        let mut cur = self.col_head[col];
        while let Some(id) = cur {
            let e = self.entry(id);
            if e.row >= row {
                break;
            }
            prev = cur;
            cur = e.next_in_col;
        }
        (prev, cur)
    }

    /// Splice already-allocated entry `id` into row `row`'s chain between
    /// `prev` and `next` (both previously located by [`Self::locate_in_row`]).
    fn link_into_row(&mut self, row: usize, prev: Option<EntryId>, next: Option<EntryId>, id: EntryId) {
        {
            let e = self.entry_mut(id);
            e.prev_in_row = prev;
            e.next_in_row = next;
        }
        match prev {
            Some(p) => self.entry_mut(p).next_in_row = Some(id),
            None => self.row_head[row] = Some(id),
        }
        if let Some(n) = next {
            self.entry_mut(n).prev_in_row = Some(id);
        }
        self.row_count[row] += 1;
    }

    fn link_into_col(&mut self, col: usize, prev: Option<EntryId>, next: Option<EntryId>, id: EntryId) {
        {
            let e = self.entry_mut(id);
            e.prev_in_col = prev;
            e.next_in_col = next;
        }
        match prev {
            Some(p) => self.entry_mut(p).next_in_col = Some(id),
            None => self.col_head[col] = Some(id),
        }
        if let Some(n) = next {
            self.entry_mut(n).prev_in_col = Some(id);
        }
        self.col_count[col] += 1;
    }

    /// Insert a brand-new entry at `(row, col)` with `value`, splicing it
    /// into both chains in sorted order. The row-chain insertion point
    /// (`row_prev`, `row_next`) must already be known (the merge loops
    /// that call this have it on hand from their own traversal); the
    /// column-chain insertion point is found here by walking column `col`.
    fn insert_new_entry(
        &mut self,
        row: usize,
        row_prev: Option<EntryId>,
        row_next: Option<EntryId>,
        col: usize,
        value: V,
    ) -> EntryId {
        let id = self.alloc_entry(row, col, value);
        self.link_into_row(row, row_prev, row_next, id);
        let (col_prev, col_next) = self.locate_in_col(col, row);
        self.link_into_col(col, col_prev, col_next, id);
        id
    }

    /// Mirror of [`Self::insert_new_entry`] for callers driving the merge
    /// from the column side: the column-chain insertion point is known,
    /// the row-chain insertion point is found here.
    fn insert_new_entry_col_driven(
        &mut self,
        col: usize,
        col_prev: Option<EntryId>,
        col_next: Option<EntryId>,
        row: usize,
        value: V,
    ) -> EntryId {
        let id = self.alloc_entry(row, col, value);
        self.link_into_col(col, col_prev, col_next, id);
        let (row_prev, row_next) = self.locate_in_row(row, col);
        self.link_into_row(row, row_prev, row_next, id);
        id
    }

    //  -----------------------------------------------------------------
    //  PUBLIC QUERY / MUTATION
    //  -----------------------------------------------------------------

    /// Return the stored value at `(row, col)`, or `V::zero()`.
    pub fn get(&self, row: usize, col: usize) -> Result<V, ReduceError> {
        self.check_row_live(row)?;
        self.check_col_live(col)?;
        let (_, found) = self.locate_in_row(row, col);
        match found {
            Some(id) if self.entry(id).col == col => {
                let value = self.entry(id).value.clone();
                debug_assert!(self.col_has_matching_entry(col, row, &value));
                Ok(value)
            }
            _ => Ok(V::zero()),
        }
    }

    /// Cross-check (debug builds only) that the column view agrees with a
    /// value just read from the row view.
    fn col_has_matching_entry(&self, col: usize, row: usize, value: &V) -> bool {
        let (_, found) = self.locate_in_col(col, row);
        match found {
            Some(id) => {
                let e = self.entry(id);
                e.row == row && e.value == *value
            }
            None => false,
        }
    }

    /// Insert, overwrite, or (if `value` is zero) remove the entry at
    /// `(row, col)`.
    pub fn put(&mut self, row: usize, col: usize, value: V) -> Result<(), ReduceError> {
        self.check_row_live(row)?;
        self.check_col_live(col)?;

        let (row_prev, row_next_or_found) = self.locate_in_row(row, col);
        let existing = match row_next_or_found {
            Some(id) if self.entry(id).col == col => Some(id),
            _ => None,
        };

        if value.is_zero() {
            if let Some(id) = existing {
                self.remove_entry(id);
            }
            return Ok(());
        }

        self.check_magnitude(row, col, &value)?;

        if let Some(id) = existing {
            self.entry_mut(id).value = value;
        } else {
            self.insert_new_entry(row, row_prev, row_next_or_found, col, value);
        }
        self.check_bilateral_cell(row, col);
        Ok(())
    }

    #[cfg(debug_assertions)]
    fn check_bilateral_cell(&self, row: usize, col: usize) {
        let row_val = {
            let (_, found) = self.locate_in_row(row, col);
            found.filter(|&id| self.entry(id).col == col).map(|id| self.entry(id).value.clone())
        };
        let col_val = {
            let (_, found) = self.locate_in_col(col, row);
            found.filter(|&id| self.entry(id).row == row).map(|id| self.entry(id).value.clone())
        };
        debug_assert_eq!(row_val, col_val, "row and column entries don't match at ({row}, {col})");
    }

    #[cfg(not(debug_assertions))]
    fn check_bilateral_cell(&self, _row: usize, _col: usize) {}

    /// Remove and return the value at `(row, col)` (or `V::zero()` if
    /// there was none). Fails if either the row or the column is
    /// tombstoned.
    pub fn remove(&mut self, row: usize, col: usize) -> Result<V, ReduceError> {
        self.check_row_live(row)?;
        self.check_col_live(col)?;
        let (_, found) = self.locate_in_row(row, col);
        match found {
            Some(id) if self.entry(id).col == col => Ok(self.remove_entry(id)),
            _ => Ok(V::zero()),
        }
    }

    /// Remove every entry in `row`, fixing up the columns they belonged
    /// to, then (optionally) tombstone the row.
    pub fn erase_row(&mut self, row: usize, tombstone: bool) -> Result<(), ReduceError> {
        self.check_row_live(row)?;
        let mut cur = self.row_head[row];
        while let Some(id) = cur {
            let next = self.entry(id).next_in_row;
            let col = self.entry(id).col;
            self.unlink_from_both_chains(id);
            self.col_count[col] -= 1;
            self.arena[id] = None;
            self.free_list.push(id);
            cur = next;
        }
        self.row_head[row] = None;
        self.row_count[row] = 0;
        if tombstone {
            self.row_tombstoned[row] = true;
        }
        Ok(())
    }

    /// Symmetric to [`Self::erase_row`].
    pub fn erase_col(&mut self, col: usize, tombstone: bool) -> Result<(), ReduceError> {
        self.check_col_live(col)?;
        let mut cur = self.col_head[col];
        while let Some(id) = cur {
            let next = self.entry(id).next_in_col;
            let row = self.entry(id).row;
            self.unlink_from_both_chains(id);
            self.row_count[row] -= 1;
            self.arena[id] = None;
            self.free_list.push(id);
            cur = next;
        }
        self.col_head[col] = None;
        self.col_count[col] = 0;
        if tombstone {
            self.col_tombstoned[col] = true;
        }
        Ok(())
    }

    /// `row[target] <- row[target] + scalar * row[source]`.
    ///
    /// Returns the maximum magnitude reached by any entry produced or
    /// touched during the merge. Fails if either row is tombstoned, or if
    /// an intermediate entry would exceed `max_magnitude`.
    pub fn add_scaled_row_into_row(
        &mut self,
        target: usize,
        source: usize,
        scalar: &V,
    ) -> Result<u64, ReduceError> {
        self.check_row_live(target)?;
        self.check_row_live(source)?;

        let source_entries: Vec<(usize, V)> = {
            let mut out = Vec::with_capacity(self.row_count[source]);
            let mut walker = self.row_head[source];
            while let Some(id) = walker {
                let e = self.entry(id);
                out.push((e.col, e.value.clone()));
                walker = e.next_in_row;
            }
            out
        };

        let mut max_magnitude = 0u64;
        let mut source_idx = 0usize;
        let mut prev: Option<EntryId> = None;
        let mut cur: Option<EntryId> = self.row_head[target];

        loop {
            let cur_col = cur.map(|id| self.entry(id).col);
            let src = source_entries.get(source_idx);

            match (cur_col, src) {
                (Some(cc), Some((sc, _))) if cc < *sc => {
                    prev = cur;
                    cur = self.entry(cur.unwrap()).next_in_row;
                }
                (Some(cc), Some((sc, sv))) if cc == *sc => {
                    let id = cur.unwrap();
                    let next = self.entry(id).next_in_row;
                    let new_value = self.entry(id).value.add(&scalar.mul(sv));
                    if new_value.is_zero() {
                        self.remove_entry(id);
                        cur = next;
                    } else {
                        self.check_magnitude(target, cc, &new_value)?;
                        max_magnitude = max_magnitude.max(new_value.magnitude());
                        self.entry_mut(id).value = new_value;
                        prev = Some(id);
                        cur = next;
                    }
                    source_idx += 1;
                }
                (cur_col_opt, Some((sc, sv))) => {
                    debug_assert!(cur_col_opt.map(|cc| cc > *sc).unwrap_or(true));
                    let new_value = scalar.mul(sv);
                    self.check_magnitude(target, *sc, &new_value)?;
                    max_magnitude = max_magnitude.max(new_value.magnitude());
                    let id = self.insert_new_entry(target, prev, cur, *sc, new_value);
                    prev = Some(id);
                    source_idx += 1;
                }
                (_, None) => break,
            }
        }

        self.check_row_bilateral_debug(target);
        Ok(max_magnitude)
    }

    /// Symmetric to [`Self::add_scaled_row_into_row`].
    pub fn add_scaled_col_into_col(
        &mut self,
        target: usize,
        source: usize,
        scalar: &V,
    ) -> Result<u64, ReduceError> {
        self.check_col_live(target)?;
        self.check_col_live(source)?;

        let source_entries: Vec<(usize, V)> = {
            let mut out = Vec::with_capacity(self.col_count[source]);
            let mut walker = self.col_head[source];
            while let Some(id) = walker {
                let e = self.entry(id);
                out.push((e.row, e.value.clone()));
                walker = e.next_in_col;
            }
            out
        };

        let mut max_magnitude = 0u64;
        let mut source_idx = 0usize;
        let mut prev: Option<EntryId> = None;
        let mut cur: Option<EntryId> = self.col_head[target];

        loop {
            let cur_row = cur.map(|id| self.entry(id).row);
            let src = source_entries.get(source_idx);

            match (cur_row, src) {
                (Some(cr), Some((sr, _))) if cr < *sr => {
                    prev = cur;
                    cur = self.entry(cur.unwrap()).next_in_col;
                }
                (Some(cr), Some((sr, sv))) if cr == *sr => {
                    let id = cur.unwrap();
                    let next = self.entry(id).next_in_col;
                    let new_value = self.entry(id).value.add(&scalar.mul(sv));
                    if new_value.is_zero() {
                        self.remove_entry(id);
                        cur = next;
                    } else {
                        self.check_magnitude(cr, target, &new_value)?;
                        max_magnitude = max_magnitude.max(new_value.magnitude());
                        self.entry_mut(id).value = new_value;
                        prev = Some(id);
                        cur = next;
                    }
                    source_idx += 1;
                }
                (cur_row_opt, Some((sr, sv))) => {
                    debug_assert!(cur_row_opt.map(|cr| cr > *sr).unwrap_or(true));
                    let new_value = scalar.mul(sv);
                    self.check_magnitude(*sr, target, &new_value)?;
                    max_magnitude = max_magnitude.max(new_value.magnitude());
                    let id = self.insert_new_entry_col_driven(target, prev, cur, *sr, new_value);
                    prev = Some(id);
                    source_idx += 1;
                }
                (_, None) => break,
            }
        }

        self.check_col_bilateral_debug(target);
        Ok(max_magnitude)
    }

    #[cfg(debug_assertions)]
    fn check_row_bilateral_debug(&self, row: usize) {
        let mut cur = self.row_head[row];
        while let Some(id) = cur {
            let e = self.entry(id);
            self.check_bilateral_cell(row, e.col);
            cur = e.next_in_row;
        }
    }
    #[cfg(not(debug_assertions))]
    fn check_row_bilateral_debug(&self, _row: usize) {}

    #[cfg(debug_assertions)]
    fn check_col_bilateral_debug(&self, col: usize) {
        let mut cur = self.col_head[col];
        while let Some(id) = cur {
            let e = self.entry(id);
            self.check_bilateral_cell(e.row, col);
            cur = e.next_in_col;
        }
    }
    #[cfg(not(debug_assertions))]
    fn check_col_bilateral_debug(&self, _col: usize) {}

    /// Return the first entry of `row` whose magnitude is 1, if any.
    pub fn find_unit_in_row(&self, row: usize) -> Result<Option<(usize, V)>, ReduceError> {
        self.check_row_live(row)?;
        let mut cur = self.row_head[row];
        while let Some(id) = cur {
            let e = self.entry(id);
            if e.value.is_unit() {
                return Ok(Some((e.col, e.value.clone())));
            }
            cur = e.next_in_row;
        }
        Ok(None)
    }

    /// Return the first entry of `col` whose magnitude is 1, if any.
    pub fn find_unit_in_col(&self, col: usize) -> Result<Option<(usize, V)>, ReduceError> {
        self.check_col_live(col)?;
        let mut cur = self.col_head[col];
        while let Some(id) = cur {
            let e = self.entry(id);
            if e.value.is_unit() {
                return Ok(Some((e.row, e.value.clone())));
            }
            cur = e.next_in_col;
        }
        Ok(None)
    }

    /// Snapshot of `row`'s entries in ascending column order.
    pub fn row_entries(&self, row: usize) -> Result<Vec<(usize, V)>, ReduceError> {
        self.check_row_live(row)?;
        let mut out = Vec::with_capacity(self.row_count[row]);
        let mut cur = self.row_head[row];
        while let Some(id) = cur {
            let e = self.entry(id);
            out.push((e.col, e.value.clone()));
            cur = e.next_in_row;
        }
        Ok(out)
    }

    /// Snapshot of `col`'s entries in ascending row order.
    pub fn col_entries(&self, col: usize) -> Result<Vec<(usize, V)>, ReduceError> {
        self.check_col_live(col)?;
        let mut out = Vec::with_capacity(self.col_count[col]);
        let mut cur = self.col_head[col];
        while let Some(id) = cur {
            let e = self.entry(id);
            out.push((e.row, e.value.clone()));
            cur = e.next_in_col;
        }
        Ok(out)
    }

    //  -----------------------------------------------------------------
    //  CONSISTENCY CHECKER (§8 of the design doc)
    //  -----------------------------------------------------------------

    /// Walk every live row and column and confirm the four invariants
    /// from §8: bilateral agreement, strictly ascending sorted chains
    /// with no stored zero, tombstone consistency, and the magnitude
    /// ceiling. Intended for tests and `debug_assert!` call sites, not
    /// the steady-state hot path.
    pub fn check_invariants(&self) -> Result<(), ReduceError> {
        for row in 0..self.num_rows {
            if self.row_tombstoned[row] {
                if self.row_head[row].is_some() || self.row_count[row] != 0 {
                    return Err(ReduceError::BilateralMismatch { row, col: 0 });
                }
                continue;
            }
            let mut prev_col: Option<usize> = None;
            let mut seen = 0usize;
            let mut cur = self.row_head[row];
            while let Some(id) = cur {
                let e = self.entry(id);
                if e.value.is_zero() {
                    return Err(ReduceError::BilateralMismatch { row, col: e.col });
                }
                if let Some(p) = prev_col {
                    if e.col <= p {
                        return Err(ReduceError::BilateralMismatch { row, col: e.col });
                    }
                }
                prev_col = Some(e.col);
                if e.value.magnitude() > self.max_magnitude {
                    return Err(ReduceError::Overflow {
                        row,
                        col: e.col,
                        magnitude: e.value.magnitude(),
                        max_magnitude: self.max_magnitude,
                    });
                }
                let stored = self.get(row, e.col)?;
                if stored != e.value {
                    return Err(ReduceError::BilateralMismatch { row, col: e.col });
                }
                seen += 1;
                cur = e.next_in_row;
            }
            if seen != self.row_count[row] {
                return Err(ReduceError::BilateralMismatch { row, col: 0 });
            }
        }

        for col in 0..self.num_cols {
            if self.col_tombstoned[col] {
                if self.col_head[col].is_some() || self.col_count[col] != 0 {
                    return Err(ReduceError::BilateralMismatch { row: 0, col });
                }
                continue;
            }
            let mut prev_row: Option<usize> = None;
            let mut seen = 0usize;
            let mut cur = self.col_head[col];
            while let Some(id) = cur {
                let e = self.entry(id);
                if let Some(p) = prev_row {
                    if e.row <= p {
                        return Err(ReduceError::BilateralMismatch { row: e.row, col });
                    }
                }
                prev_row = Some(e.row);
                seen += 1;
                cur = e.next_in_col;
            }
            if seen != self.col_count[col] {
                return Err(ReduceError::BilateralMismatch { row: 0, col });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::integer::IntegerValue;

    fn v(n: i64) -> IntegerValue {
        IntegerValue(n)
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        assert!(SparseMatrix::<IntegerValue>::new(0, 3).is_err());
        assert!(SparseMatrix::<IntegerValue>::new(3, 0).is_err());
    }

    #[test]
    fn put_get_roundtrip_is_bilateral() {
        let mut m = SparseMatrix::<IntegerValue>::new(3, 3).unwrap();
        m.put(0, 1, v(5)).unwrap();
        assert_eq!(m.get(0, 1).unwrap(), v(5));
        assert_eq!(m.row_entries(0).unwrap(), vec![(1, v(5))]);
        assert_eq!(m.col_entries(1).unwrap(), vec![(0, v(5))]);
        m.check_invariants().unwrap();
    }

    #[test]
    fn put_zero_is_a_no_op_remove() {
        let mut m = SparseMatrix::<IntegerValue>::new(2, 2).unwrap();
        m.put(0, 0, v(3)).unwrap();
        m.put(0, 0, v(0)).unwrap();
        assert_eq!(m.get(0, 0).unwrap(), v(0));
        assert_eq!(m.row_len(0).unwrap(), 0);
        assert_eq!(m.col_len(0).unwrap(), 0);
    }

    #[test]
    fn overwrite_keeps_single_entry() {
        let mut m = SparseMatrix::<IntegerValue>::new(2, 2).unwrap();
        m.put(0, 0, v(3)).unwrap();
        m.put(0, 0, v(9)).unwrap();
        assert_eq!(m.get(0, 0).unwrap(), v(9));
        assert_eq!(m.row_len(0).unwrap(), 1);
    }

    #[test]
    fn remove_clears_both_views() {
        let mut m = SparseMatrix::<IntegerValue>::new(2, 2).unwrap();
        m.put(0, 0, v(3)).unwrap();
        let removed = m.remove(0, 0).unwrap();
        assert_eq!(removed, v(3));
        assert_eq!(m.row_len(0).unwrap(), 0);
        assert_eq!(m.col_len(0).unwrap(), 0);
        m.check_invariants().unwrap();
    }

    #[test]
    fn rows_stay_sorted_ascending_after_inserts_out_of_order() {
        let mut m = SparseMatrix::<IntegerValue>::new(1, 5).unwrap();
        m.put(0, 3, v(1)).unwrap();
        m.put(0, 1, v(1)).unwrap();
        m.put(0, 4, v(1)).unwrap();
        m.put(0, 0, v(1)).unwrap();
        assert_eq!(
            m.row_entries(0).unwrap(),
            vec![(0, v(1)), (1, v(1)), (3, v(1)), (4, v(1))]
        );
    }

    #[test]
    fn add_scaled_row_into_row_matches_hand_computation() {
        // target = [1, 0, 2], source = [0, 3, -1]; target += 2*source
        let mut m = SparseMatrix::<IntegerValue>::new(2, 3).unwrap();
        m.put(0, 0, v(1)).unwrap();
        m.put(0, 2, v(2)).unwrap();
        m.put(1, 1, v(3)).unwrap();
        m.put(1, 2, v(-1)).unwrap();

        m.add_scaled_row_into_row(0, 1, &v(2)).unwrap();

        assert_eq!(m.get(0, 0).unwrap(), v(1));
        assert_eq!(m.get(0, 1).unwrap(), v(6));
        assert_eq!(m.get(0, 2).unwrap(), v(0));
        m.check_invariants().unwrap();
    }

    #[test]
    fn add_scaled_row_into_row_drops_cancelling_entries() {
        let mut m = SparseMatrix::<IntegerValue>::new(2, 2).unwrap();
        m.put(0, 0, v(1)).unwrap();
        m.put(1, 0, v(-1)).unwrap();
        m.add_scaled_row_into_row(0, 1, &v(1)).unwrap();
        assert_eq!(m.row_len(0).unwrap(), 0);
        assert_eq!(m.col_len(0).unwrap(), 0);
        m.check_invariants().unwrap();
    }

    #[test]
    fn add_scaled_col_into_col_matches_row_version_by_symmetry() {
        let mut m = SparseMatrix::<IntegerValue>::new(3, 2).unwrap();
        m.put(0, 0, v(1)).unwrap();
        m.put(2, 0, v(2)).unwrap();
        m.put(1, 1, v(3)).unwrap();
        m.put(2, 1, v(-1)).unwrap();

        m.add_scaled_col_into_col(0, 1, &v(2)).unwrap();

        assert_eq!(m.get(0, 0).unwrap(), v(1));
        assert_eq!(m.get(1, 0).unwrap(), v(6));
        assert_eq!(m.get(2, 0).unwrap(), v(0));
        m.check_invariants().unwrap();
    }

    #[test]
    fn erase_row_tombstones_and_clears_columns() {
        let mut m = SparseMatrix::<IntegerValue>::new(2, 2).unwrap();
        m.put(0, 0, v(1)).unwrap();
        m.put(0, 1, v(1)).unwrap();
        m.erase_row(0, true).unwrap();
        assert!(m.is_row_tombstoned(0).unwrap());
        assert_eq!(m.col_len(0).unwrap(), 0);
        assert_eq!(m.col_len(1).unwrap(), 0);
        assert!(m.get(0, 0).is_err());
        assert!(m.put(0, 0, v(1)).is_err());
    }

    #[test]
    fn find_unit_in_row_finds_first_unit() {
        let mut m = SparseMatrix::<IntegerValue>::new(1, 3).unwrap();
        m.put(0, 0, v(4)).unwrap();
        m.put(0, 1, v(-1)).unwrap();
        m.put(0, 2, v(1)).unwrap();
        assert_eq!(m.find_unit_in_row(0).unwrap(), Some((1, v(-1))));
    }

    #[test]
    fn find_unit_in_row_none_when_absent() {
        let mut m = SparseMatrix::<IntegerValue>::new(1, 2).unwrap();
        m.put(0, 0, v(4)).unwrap();
        m.put(0, 1, v(6)).unwrap();
        assert_eq!(m.find_unit_in_row(0).unwrap(), None);
    }

    #[test]
    fn overflow_is_rejected() {
        let mut m = SparseMatrix::<IntegerValue>::with_max_magnitude(1, 1, 10).unwrap();
        assert!(m.put(0, 0, v(11)).is_err());
        assert_eq!(m.get(0, 0).unwrap(), v(0));
    }

    #[test]
    fn tombstoned_row_rejects_further_mutation() {
        let mut m = SparseMatrix::<IntegerValue>::new(2, 2).unwrap();
        m.erase_row(0, true).unwrap();
        assert!(m.add_scaled_row_into_row(0, 1, &v(1)).is_err());
        assert!(m.remove(0, 0).is_err());
        assert!(m.find_unit_in_row(0).is_err());
    }
}
