//! A chain-complex reducer for computational algebraic topology: given a
//! finite sequence of free chain groups connected by boundary maps, this
//! crate performs elementary simplicial collapses that shrink the complex
//! while preserving its homology.
//!
//! # Start here
//!
//! There are four layers, leaves first.
//!
//! * **Coefficient algebra** ([`value`]). The [`value::Value`] trait is the
//!   only thing the rest of the crate knows about a coefficient ring. Two
//!   rings are provided: [`value::integer::IntegerValue`] (ordinary
//!   integers) and [`value::group_ring::GroupRingValue`] (the group ring
//!   `Z[t]/(t^2-1)` used for Khovanov homology's Frobenius-algebra
//!   coefficients).
//!
//! * **Sparse matrix** ([`sparse`]). [`sparse::SparseMatrix`] stores every
//!   non-zero entry twice -- once reachable by walking its row, once by
//!   walking its column -- and keeps the two views consistent through every
//!   mutation.
//!
//! ```
//! use collapse_reduce::sparse::SparseMatrix;
//! use collapse_reduce::value::integer::IntegerValue;
//!
//! let mut m = SparseMatrix::<IntegerValue>::new(2, 2).unwrap();
//! m.put(0, 0, IntegerValue(1)).unwrap();
//! m.put(1, 0, IntegerValue(-1)).unwrap();
//! assert_eq!(m.get(1, 0).unwrap(), IntegerValue(-1));
//! ```
//!
//! * **Chain complex** ([`complex`]). [`complex::ChainComplex`] holds the
//!   ordered array of boundary matrices plus the current and original
//!   generator counts per group.
//!
//! * **Reducer** ([`reduce`]). [`reduce::reduce`] runs the elimination
//!   loop: for each group, it repeatedly looks for a row with an invertible
//!   (magnitude-1) entry, eliminates the pair of generators it identifies,
//!   and folds the resulting column operation into the rest of the matrix.
//!
//! The [`host`] module is the marshalling boundary most callers use instead
//! of touching the three layers above directly: [`host::reduce`] takes
//! ranks and packed boundary matrices in, and returns the reduced complex
//! in dense, column-major form.
//!
//! ```
//! use collapse_reduce::host::{self, PackedMatrix, RingKind, WireWidth};
//! use collapse_reduce::reduce::ReductionOptions;
//! use collapse_reduce::value::integer::IntegerValue;
//!
//! // A single unit entry connecting group 0's one generator to group 1's
//! // one generator: row 1, column 1, value +1 (1-based, per the wire format).
//! let word = 1i64 * ((1i64 << 32) + 1);
//! let packed = PackedMatrix {
//!     width: WireWidth::Bits64,
//!     ring: RingKind::Integer,
//!     entry_count: 1,
//!     words: vec![word],
//! };
//!
//! let result = host::reduce::<IntegerValue>(vec![1, 1], vec![packed], ReductionOptions::default())
//!     .unwrap();
//! assert_eq!(result.ranks, vec![0, 0]);
//! ```

pub mod complex;
pub mod error;
pub mod host;
pub mod reduce;
pub mod sparse;
pub mod value;
