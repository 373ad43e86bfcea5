//! Cache Entry Module
//!
//! Defines the structure for individual cache entries and their scoring metadata.

// == Cache Entry ==
/// Represents a single cached result with its admission metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The cached payload, opaque to the cache
    pub value: V,
    /// Size of the payload in bytes, fixed at admission
    pub nbytes: u64,
    /// Time taken to produce the payload (seconds), fixed at admission
    pub compute_cost: f64,
    /// Accumulated retention score
    score: f64,
    /// Number of scored accesses, the admitting put included
    accesses: u64,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry whose score is the admitting access's increment.
    pub fn new(value: V, nbytes: u64, compute_cost: f64, initial_score: f64) -> Self {
        Self {
            value,
            nbytes,
            compute_cost,
            score: initial_score,
            accesses: 1,
        }
    }

    // == Score ==
    /// Current accumulated score.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Cost per byte; `nbytes` is never zero for an admitted entry.
    pub fn cost_ratio(&self) -> f64 {
        self.compute_cost / self.nbytes as f64
    }

    /// Number of scored accesses since admission.
    pub fn accesses(&self) -> u64 {
        self.accesses
    }

    // == Record Access ==
    /// Adds a non-negative increment and returns the new score.
    pub(crate) fn record_access(&mut self, increment: f64) -> f64 {
        debug_assert!(increment >= 0.0);
        self.score += increment;
        self.accesses += 1;
        self.score
    }

    // == Rescale ==
    /// Divides the score by `factor` during a rebase.
    pub(crate) fn rescale(&mut self, factor: f64) {
        self.score /= factor;
    }
}
