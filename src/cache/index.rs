//! Lazy Priority Index Module
//!
//! Min-heap of `(score, key)` records used to find the eviction victim.
//!
//! Scores only ever grow, and a binary heap cannot cheaply update a record in
//! place. Instead every score change pushes a fresh record and the old one is
//! left behind. `pop_min` re-validates each popped record against the caller's
//! authoritative scores and silently drops the stale ones.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

// == Index Record ==
/// One pushed `(score, key)` pair.
#[derive(Debug, Clone)]
struct IndexRecord<K> {
    score: f64,
    /// Push order, used to break score ties (older first).
    seq: u64,
    key: K,
}

impl<K> PartialEq for IndexRecord<K> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<K> Eq for IndexRecord<K> {}

impl<K> PartialOrd for IndexRecord<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for IndexRecord<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

// == Lazy Priority Index ==
/// Append-only min-heap tolerant of superseded records.
#[derive(Debug)]
pub struct LazyPriorityIndex<K> {
    heap: BinaryHeap<Reverse<IndexRecord<K>>>,
    next_seq: u64,
}

impl<K> Default for LazyPriorityIndex<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> LazyPriorityIndex<K> {
    // == Constructor ==
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    // == Push ==
    /// Records `key` at `score`. Earlier records for `key` become stale.
    pub fn push(&mut self, key: K, score: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(IndexRecord { score, seq, key }));
    }

    // == Pop Min ==
    /// Removes and returns the lowest-scored record that is still current.
    ///
    /// `current_score` returns the authoritative score for a key, or `None`
    /// if the key is no longer live. Records that disagree are discarded.
    /// Returns `None` once the index is exhausted.
    pub fn pop_min<F>(&mut self, mut current_score: F) -> Option<(K, f64)>
    where
        F: FnMut(&K) -> Option<f64>,
    {
        while let Some(Reverse(record)) = self.heap.pop() {
            match current_score(&record.key) {
                Some(score) if score == record.score => return Some((record.key, record.score)),
                _ => continue,
            }
        }
        None
    }

    // == Rebuild ==
    /// Replaces every record with exactly one record per live entry.
    ///
    /// Ties keep the iteration order of `live`.
    pub fn rebuild<I>(&mut self, live: I)
    where
        I: IntoIterator<Item = (K, f64)>,
    {
        self.heap.clear();
        for (key, score) in live {
            self.push(key, score);
        }
    }

    // == Clear ==
    /// Drops every record.
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    // == Length ==
    /// Number of records, stale ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
