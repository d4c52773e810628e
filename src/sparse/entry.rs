//! Arena entries and the sibling-index links that thread them into row and
//! column chains.
//!
//! The distilled specification for this crate describes bilateral storage in
//! terms of singly-linked lists of heap-allocated nodes.  This module
//! implements the modern equivalent it recommends instead: a single `Vec` of
//! entries per matrix (the *arena*), addressed by a plain `usize` id, with
//! each entry carrying the index of its successor along the row it belongs
//! to and along the column it belongs to.  No entry is ever heap-allocated
//! on its own, and removing an entry returns its slot to a free list instead
//! of shrinking the `Vec`.

/// An index into a [`crate::sparse::SparseMatrix`]'s entry arena.
pub type EntryId = usize;

/// One non-zero cell of a matrix, plus the links needed to find the next
/// entry along its row and along its column.
#[derive(Debug, Clone)]
pub(crate) struct Entry<V> {
    pub row: usize,
    pub col: usize,
    pub value: V,
    pub prev_in_row: Option<EntryId>,
    pub next_in_row: Option<EntryId>,
    pub prev_in_col: Option<EntryId>,
    pub next_in_col: Option<EntryId>,
}

impl<V> Entry<V> {
    pub fn new(row: usize, col: usize, value: V) -> Self {
        Entry {
            row,
            col,
            value,
            prev_in_row: None,
            next_in_row: None,
            prev_in_col: None,
            next_in_col: None,
        }
    }
}
