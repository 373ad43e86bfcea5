//! Memoization Module
//!
//! Function wrapping on top of the cache engine: key derivation, timing of
//! the wrapped computation and payload size estimation.

mod memoize;
mod size;

pub use memoize::Memoized;
pub use size::{DeepSize, FnEstimator, Nbytes, SizeEstimator};
