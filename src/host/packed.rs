//! The flat-array wire format boundary matrices cross in and out of this
//! crate.
//!
//! Each packed matrix is a `Vec<i64>` of entries, 1-based row/column
//! indices, `value ∈ {+1,-1}` only (unit-only is not required of arbitrary
//! inputs in general, but every entry this format can encode is a single
//! signed unit -- larger coefficients never appear in the boundary matrices
//! this crate is handed). Two widths are supported: a 64-bit one-word
//! layout (the default, and the only one exercised end to end by
//! `host::unpack`/`host::pack`) and a 32-bit two-word layout, carried for
//! completeness.

use crate::error::ReduceError;
use crate::value::group_ring::GroupRingValue;
use crate::value::integer::IntegerValue;
use crate::value::Value;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// How many machine words each packed entry occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireWidth {
    Bits64,
    Bits32,
}

impl WireWidth {
    fn words_per_entry(self) -> usize {
        match self {
            WireWidth::Bits64 => 1,
            WireWidth::Bits32 => 2,
        }
    }
}

/// Which coefficient ring a packed matrix's entries decode into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RingKind {
    Integer,
    GroupRing,
}

/// One boundary matrix in wire form: a flat word sequence plus the
/// declared entry count used to pre-size buffers and to catch a malformed
/// payload before it is decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackedMatrix {
    pub width: WireWidth,
    pub ring: RingKind,
    pub entry_count: usize,
    pub words: Vec<i64>,
}

/// Offset a 64-bit packed word is split at: `row * 2^32 + col`.
const ROW_SHIFT_64: i64 = 1 << 32;

fn encode_64(row: usize, col: usize, sign: i64, ring: RingKind, channel: usize) -> i64 {
    // Group-ring matrices reserve the low bit of the row component to
    // select which coefficient (`a` or `b`) the unit lands in; the
    // integer format packs `row` directly, exactly as `value · (row ·
    // 2^32 + col)`.
    let packed_row = match ring {
        RingKind::Integer => row as i64,
        RingKind::GroupRing => (row as i64) * 2 + channel as i64,
    };
    sign * (packed_row * ROW_SHIFT_64 + col as i64)
}

fn decode_64(word: i64, ring: RingKind) -> Result<(usize, usize, i64, usize), ReduceError> {
    if word == 0 {
        return Err(ReduceError::FormatMismatch { detail: "packed entry is zero".to_string() });
    }
    let sign = word.signum();
    let magnitude = word.unsigned_abs() as i64;
    let packed_row = magnitude / ROW_SHIFT_64;
    let col = (magnitude % ROW_SHIFT_64) as usize;
    let (row, channel) = match ring {
        RingKind::Integer => (packed_row as usize, 0usize),
        RingKind::GroupRing => ((packed_row / 2) as usize, (packed_row % 2) as usize),
    };
    Ok((row, col, sign, channel))
}

fn encode_32(row: usize, col: usize, sign: i64, channel: usize) -> (i64, i64) {
    let word_row = if channel == 1 { -(row as i64) } else { row as i64 };
    let word_value_col = sign * (col as i64);
    (word_row, word_value_col)
}

fn decode_32(
    word_row: i64,
    word_value_col: i64,
    ring: RingKind,
) -> Result<(usize, usize, i64, usize), ReduceError> {
    let channel = if word_row < 0 { 1usize } else { 0usize };
    if ring == RingKind::Integer && channel != 0 {
        return Err(ReduceError::FormatMismatch {
            detail: "integer-ring entry has a negative row word".to_string(),
        });
    }
    if word_value_col == 0 {
        return Err(ReduceError::FormatMismatch { detail: "packed entry has zero value".to_string() });
    }
    let row = word_row.unsigned_abs() as usize;
    let col = word_value_col.unsigned_abs() as usize;
    let sign = word_value_col.signum();
    Ok((row, col, sign, channel))
}

/// Decode `row`, `col`, `sign`, and `channel` (0 = `a`/real, 1 = `b`/`t`)
/// for every entry in `packed`.
fn decode_entries(packed: &PackedMatrix) -> Result<Vec<(usize, usize, i64, usize)>, ReduceError> {
    let expected_words = packed.entry_count * packed.width.words_per_entry();
    if packed.words.len() != expected_words {
        return Err(ReduceError::FormatMismatch {
            detail: format!(
                "declared {} entries at {} words each, but the payload has {} words",
                packed.entry_count,
                packed.width.words_per_entry(),
                packed.words.len()
            ),
        });
    }

    let mut out = Vec::with_capacity(packed.entry_count);
    match packed.width {
        WireWidth::Bits64 => {
            for &word in &packed.words {
                let (row, col, sign, channel) = decode_64(word, packed.ring)?;
                out.push((row, col, sign, channel));
            }
        }
        WireWidth::Bits32 => {
            for pair in packed.words.chunks_exact(2) {
                let (row, col, sign, channel) = decode_32(pair[0], pair[1], packed.ring)?;
                out.push((row, col, sign, channel));
            }
        }
    }
    Ok(out)
}

/// A coefficient value that knows how to cross the wire format.
pub trait PackedCodec: Value {
    const RING_KIND: RingKind;
    /// One channel per coordinate the value carries (1 for the integers,
    /// 2 for the group ring).
    fn to_channels(&self) -> Vec<i64>;
    /// Reconstruct the `+1`/`-1` unit value packed on wire channel
    /// `channel`.
    fn from_unit(sign: i64, channel: usize) -> Self;
}

impl PackedCodec for IntegerValue {
    const RING_KIND: RingKind = RingKind::Integer;

    fn to_channels(&self) -> Vec<i64> {
        vec![self.0]
    }

    fn from_unit(sign: i64, channel: usize) -> Self {
        debug_assert_eq!(channel, 0, "the integer ring has a single wire channel");
        IntegerValue(sign)
    }
}

impl PackedCodec for GroupRingValue {
    const RING_KIND: RingKind = RingKind::GroupRing;

    fn to_channels(&self) -> Vec<i64> {
        vec![self.a, self.b]
    }

    fn from_unit(sign: i64, channel: usize) -> Self {
        match channel {
            0 => GroupRingValue::new(sign, 0),
            _ => GroupRingValue::new(0, sign),
        }
    }
}

/// Build a [`crate::sparse::SparseMatrix`] of shape `num_rows x num_cols`
/// from its packed, 1-based wire form.
pub fn unpack_matrix<V: PackedCodec>(
    packed: &PackedMatrix,
    num_rows: usize,
    num_cols: usize,
    max_magnitude: u64,
) -> Result<crate::sparse::SparseMatrix<V>, ReduceError> {
    if packed.ring != V::RING_KIND {
        return Err(ReduceError::FormatMismatch {
            detail: "packed matrix's ring does not match the requested coefficient type"
                .to_string(),
        });
    }

    let mut matrix = crate::sparse::SparseMatrix::with_max_magnitude(num_rows, num_cols, max_magnitude)?;

    // The wire format makes no ordering promise, but inserting in
    // row-major order keeps every `put` an append at the tail of its row
    // chain rather than a mid-chain splice.
    let entries = decode_entries(packed)?.into_iter().sorted_by_key(|&(row, col, _, _)| (row, col));

    for (row, col, sign, channel) in entries {
        if row == 0 || col == 0 {
            return Err(ReduceError::FormatMismatch {
                detail: "packed row/col indices are 1-based and must be positive".to_string(),
            });
        }
        matrix.put(row - 1, col - 1, V::from_unit(sign, channel))?;
    }
    Ok(matrix)
}

/// A reduced boundary matrix in dense, column-major wire form: one `i64`
/// channel, exactly as the integer ring needs. Group-ring output carries
/// a second [`DenseMatrix`] for the `t` channel (see
/// [`crate::host::ReducedComplex`]).
///
/// A matrix with zero rows or zero columns is represented by the
/// `0x0`/empty placeholder rather than an empty-but-dimensioned buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DenseMatrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<i64>,
}

impl DenseMatrix {
    pub fn zero_placeholder() -> Self {
        DenseMatrix { rows: 0, cols: 0, data: Vec::new() }
    }

    pub fn get(&self, row: usize, col: usize) -> i64 {
        self.data[col * self.rows + row]
    }
}

fn local_index(sorted: &[usize], needle: usize) -> Option<usize> {
    sorted.binary_search(&needle).ok()
}

/// Pack one channel of `matrix`, restricted to its live rows/columns, into
/// a [`DenseMatrix`].
pub fn pack_channel<V: PackedCodec>(
    matrix: &crate::sparse::SparseMatrix<V>,
    channel: usize,
    live_rows: &[usize],
    live_cols: &[usize],
) -> Result<DenseMatrix, ReduceError> {
    if live_rows.is_empty() || live_cols.is_empty() {
        return Ok(DenseMatrix::zero_placeholder());
    }
    let mut data = vec![0i64; live_rows.len() * live_cols.len()];
    for (local_row, &row) in live_rows.iter().enumerate() {
        for (col, value) in matrix.row_entries(row)? {
            if let Some(local_col) = local_index(live_cols, col) {
                data[local_col * live_rows.len() + local_row] = value.to_channels()[channel];
            }
        }
    }
    Ok(DenseMatrix { rows: live_rows.len(), cols: live_cols.len(), data })
}
