//! The chain complex: an ordered sequence of free chain groups connected by
//! boundary matrices.

mod chain_complex;

pub use chain_complex::ChainComplex;
