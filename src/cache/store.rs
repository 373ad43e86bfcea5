//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with a lazily maintained score
//! index and a byte budget.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use tracing::{debug, info, warn};

use crate::cache::score::cost_ratio;
use crate::cache::{CacheEntry, CacheStats, Clock, LazyPriorityIndex, ScoreFunction};
use crate::config::CacheConfig;
use crate::error::{BudgetUnsatisfiable, CacheError, Result};

/// Stale index records tolerated before the index is rebuilt.
const MIN_COMPACTION_RECORDS: usize = 64;

// == Cache Store ==
/// Byte-bounded cache that evicts the lowest-scored entry first.
#[derive(Debug)]
pub struct CacheStore<K, V> {
    /// Key-value storage, the authoritative source of scores
    entries: HashMap<K, CacheEntry<V>>,
    /// Eviction order, may hold superseded records
    index: LazyPriorityIndex<K>,
    /// Access clock
    clock: Clock,
    /// Score increment calculator
    scorer: ScoreFunction,
    /// Performance statistics
    stats: CacheStats,
    /// Sum of `nbytes` over all live entries
    total_bytes: u64,
    /// Byte budget
    available_bytes: u64,
    /// Minimum cost per byte for admission
    limit: f64,
}

impl<K, V> CacheStore<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates a new CacheStore from a validated configuration.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            entries: HashMap::new(),
            index: LazyPriorityIndex::new(),
            clock: Clock::new(),
            scorer: ScoreFunction::new(config.halflife)?,
            stats: CacheStats::new(),
            total_bytes: 0,
            available_bytes: config.available_bytes,
            limit: config.limit,
        })
    }

    /// Creates a CacheStore with the given budget and default halflife and limit.
    pub fn with_budget(available_bytes: u64) -> Self {
        Self {
            entries: HashMap::new(),
            index: LazyPriorityIndex::new(),
            clock: Clock::new(),
            scorer: ScoreFunction::default(),
            stats: CacheStats::new(),
            total_bytes: 0,
            available_bytes,
            limit: 0.0,
        }
    }

    // == Put ==
    /// Admits `value` under `key`, then evicts until the budget holds.
    ///
    /// An existing entry for `key` is replaced and its access history is
    /// discarded. Returns the keys evicted to make room, which may include
    /// `key` itself when the new entry scores lowest.
    ///
    /// Rejections leave the cache exactly as it was:
    /// - `InvalidEntry` for zero size or a negative/non-finite cost
    /// - `BelowCostLimit` when `compute_cost / nbytes < limit`
    /// - `EntryTooLarge` when `nbytes` exceeds the whole budget
    pub fn put(&mut self, key: K, value: V, nbytes: u64, compute_cost: f64) -> Result<Vec<K>> {
        let ratio = match cost_ratio(compute_cost, nbytes) {
            Ok(ratio) => ratio,
            Err(err) => return Err(self.reject(err)),
        };

        if ratio < self.limit {
            return Err(self.reject(CacheError::BelowCostLimit {
                ratio,
                limit: self.limit,
            }));
        }

        if nbytes > self.available_bytes {
            return Err(self.reject(CacheError::EntryTooLarge {
                nbytes,
                available_bytes: self.available_bytes,
            }));
        }

        self.advance_clock();
        let score = self.scorer.weigh(ratio, self.clock.exponent());

        let entry = CacheEntry::new(value, nbytes, compute_cost, score);
        if let Some(old) = self.entries.insert(key.clone(), entry) {
            self.total_bytes -= old.nbytes;
        }
        self.index.push(key.clone(), score);

        // The new entry competes for eviction, but its bytes are only counted
        // once it survives, so the counter cannot overflow.
        let mut evicted = Vec::new();
        if let Err(err) = self.shrink_into(Some((&key, nbytes)), &mut evicted) {
            // Only reachable if the index lost track of a live entry.
            warn!(%err, "eviction could not satisfy budget, refusing admission");
            self.entries.remove(&key);
            return Err(self.reject(CacheError::EntryTooLarge {
                nbytes,
                available_bytes: self.available_bytes,
            }));
        }
        if self.entries.contains_key(&key) {
            self.total_bytes += nbytes;
        }

        self.maybe_compact();
        Ok(evicted)
    }

    // == Get ==
    /// Retrieves a payload by key, crediting the entry with one access.
    ///
    /// Returns `None` on a miss; a miss only bumps the miss counter.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.entries.contains_key(key) {
            self.stats.record_miss();
            return None;
        }

        self.advance_clock();
        let exponent = self.clock.exponent();

        let (stored_key, entry) = self.entries.get_key_value(key)?;
        let stored_key = stored_key.clone();
        let increment = self.scorer.weigh(entry.cost_ratio(), exponent);

        let entry = self.entries.get_mut(key)?;
        let score = entry.record_access(increment);
        self.index.push(stored_key, score);
        self.stats.record_hit();

        self.maybe_compact();
        self.entries.get(key).map(|entry| &entry.value)
    }

    // == Peek ==
    /// Returns a payload without scoring the access or touching stats.
    pub fn peek<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|entry| &entry.value)
    }

    // == Remove ==
    /// Removes an entry by key. Absent keys are a no-op.
    ///
    /// Index records for the key are left behind and discarded lazily.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.remove(key)?;
        self.total_bytes -= entry.nbytes;
        Some(entry.value)
    }

    // == Resize ==
    /// Changes the byte budget and evicts until the cache fits.
    ///
    /// Returns the evicted keys.
    pub fn resize(&mut self, available_bytes: u64) -> Vec<K> {
        info!(
            old = self.available_bytes,
            new = available_bytes,
            "resizing cache budget"
        );
        self.available_bytes = available_bytes;

        let mut evicted = Vec::new();
        if let Err(err) = self.shrink_into(None, &mut evicted) {
            warn!(%err, "resize left the cache over budget");
        }
        evicted
    }

    // == Clear ==
    /// Drops every entry. The clock keeps running.
    pub fn clear(&mut self) {
        info!(entries = self.entries.len(), "clearing cache");
        self.entries.clear();
        self.index.clear();
        self.total_bytes = 0;
    }

    // == Introspection ==
    /// Returns true if `key` is live. Does not count as an access.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Current score of a live entry.
    pub fn score<Q>(&self, key: &Q) -> Option<f64>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(CacheEntry::score)
    }

    /// Iterates over live keys in arbitrary order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.keys()
    }

    /// Sum of `nbytes` over live entries.
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Current byte budget.
    pub fn available_bytes(&self) -> u64 {
        self.available_bytes
    }

    /// Minimum admissible cost per byte.
    pub fn limit(&self) -> f64 {
        self.limit
    }

    /// Halflife of the recency weighting, in accesses.
    pub fn halflife(&self) -> f64 {
        self.scorer.halflife()
    }

    /// Total scored accesses since construction.
    pub fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Number of index records, stale ones included.
    pub fn index_len(&self) -> usize {
        self.index.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_occupancy(self.entries.len(), self.total_bytes);
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // == Eviction Loop ==
    /// Evicts minimum-score entries until the cache fits its budget.
    ///
    /// `pending` names an entry already in the map whose bytes are not yet in
    /// `total_bytes`; room is made for it unless it is evicted itself. Callers
    /// guarantee its size is within `available_bytes`.
    fn shrink_into(
        &mut self,
        mut pending: Option<(&K, u64)>,
        evicted: &mut Vec<K>,
    ) -> std::result::Result<(), BudgetUnsatisfiable> {
        loop {
            let reserved = pending.map_or(0, |(_, nbytes)| nbytes);
            if self.total_bytes <= self.available_bytes - reserved {
                return Ok(());
            }

            let entries = &self.entries;
            let Some((key, score)) = self
                .index
                .pop_min(|key| entries.get(key).map(CacheEntry::score))
            else {
                return Err(BudgetUnsatisfiable {
                    excess: self
                        .total_bytes
                        .saturating_add(reserved)
                        .saturating_sub(self.available_bytes),
                });
            };

            if let Some(entry) = self.entries.remove(&key) {
                if pending.is_some_and(|(pending_key, _)| *pending_key == key) {
                    pending = None;
                } else {
                    self.total_bytes -= entry.nbytes;
                }
                self.stats.record_eviction();
                debug!(score, nbytes = entry.nbytes, "evicted cache entry");
            }
            evicted.push(key);
        }
    }

    // == Clock Maintenance ==
    /// Advances the clock, rescaling live scores when growth gets too large.
    fn advance_clock(&mut self) {
        self.clock.advance();

        let exponent = self.clock.exponent();
        if !self.scorer.needs_rebase(exponent) {
            return;
        }

        let factor = self.scorer.growth(exponent);
        for entry in self.entries.values_mut() {
            entry.rescale(factor);
        }
        self.clock.rebase();
        self.rebuild_index();
        debug!(
            tick = self.clock.tick(),
            factor, "rebased cache scores"
        );
    }

    // == Index Maintenance ==
    /// Rebuilds the index once stale records dominate it.
    fn maybe_compact(&mut self) {
        let threshold = (self.entries.len() * 2).max(MIN_COMPACTION_RECORDS);
        if self.index.len() > threshold {
            let before = self.index.len();
            self.rebuild_index();
            debug!(before, after = self.index.len(), "compacted score index");
        }
    }

    fn rebuild_index(&mut self) {
        let live = self
            .entries
            .iter()
            .map(|(key, entry)| (key.clone(), entry.score()));
        self.index.rebuild(live);
    }

    // == Rejection ==
    fn reject(&mut self, err: CacheError) -> CacheError {
        self.stats.record_rejection();
        debug!(%err, "cache admission rejected");
        err
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn store(available_bytes: u64) -> CacheStore<String, String> {
        CacheStore::with_budget(available_bytes)
    }

    #[test]
    fn test_store_new() {
        let store = store(1000);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.total_bytes(), 0);
        assert_eq!(store.available_bytes(), 1000);
        assert_eq!(store.halflife(), 1000.0);
        assert_eq!(store.limit(), 0.0);
    }

    #[test]
    fn test_store_new_validates_config() {
        let config = CacheConfig::new(1000).with_halflife(0.0);
        let result: Result<CacheStore<String, String>> = CacheStore::new(config);
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_store_put_and_get() {
        let mut store = store(1000);

        store.put("key1".to_string(), "value1".to_string(), 6, 0.5).unwrap();
        assert_eq!(store.get("key1"), Some(&"value1".to_string()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.total_bytes(), 6);
    }

    #[test]
    fn test_store_get_miss_has_no_side_effects() {
        let mut store = store(1000);
        store.put("a".to_string(), "x".to_string(), 1, 1.0).unwrap();
        let tick = store.tick();

        assert_eq!(store.get("missing"), None);
        assert_eq!(store.tick(), tick);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_clock_advances_per_access() {
        let mut store = store(1000);
        store.put("a".to_string(), "x".to_string(), 1, 1.0).unwrap();
        store.get("a");
        store.get("a");
        assert_eq!(store.tick(), 3);
    }

    #[test]
    fn test_cheap_entry_evicted_first() {
        let mut store = CacheStore::new(CacheConfig::new(1000)).unwrap();

        store.put("a".to_string(), "payload_a".to_string(), 900, 1.0).unwrap();
        let evicted = store
            .put("b".to_string(), "payload_b".to_string(), 900, 100.0)
            .unwrap();

        assert_eq!(evicted, vec!["a".to_string()]);
        assert_eq!(store.get("a"), None);
        assert_eq!(store.get("b"), Some(&"payload_b".to_string()));
        assert_eq!(store.total_bytes(), 900);
    }

    #[test]
    fn test_new_entry_can_be_its_own_victim() {
        let mut store = store(1000);

        store.put("costly".to_string(), "x".to_string(), 900, 100.0).unwrap();
        let evicted = store.put("cheap".to_string(), "y".to_string(), 900, 1.0).unwrap();

        assert_eq!(evicted, vec!["cheap".to_string()]);
        assert!(store.contains_key("costly"));
        assert!(!store.contains_key("cheap"));
    }

    #[test]
    fn test_frequently_read_entry_survives() {
        let mut store = store(1000);

        store.put("x".to_string(), "x".to_string(), 500, 5.0).unwrap();
        store.put("y".to_string(), "y".to_string(), 500, 5.0).unwrap();
        for _ in 0..10 {
            store.get("x");
        }

        assert!(store.score("x").unwrap() > store.score("y").unwrap());

        let evicted = store.resize(500);
        assert_eq!(evicted, vec!["y".to_string()]);
        assert!(store.contains_key("x"));
    }

    #[test]
    fn test_score_monotonic_across_gets() {
        let mut store = store(1000);
        store.put("k".to_string(), "v".to_string(), 10, 1.0).unwrap();

        let mut last = store.score("k").unwrap();
        for _ in 0..20 {
            store.get("k");
            let now = store.score("k").unwrap();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn test_put_existing_key_resets_history() {
        let mut store = store(1000);

        store.put("k".to_string(), "old".to_string(), 100, 10.0).unwrap();
        for _ in 0..5 {
            store.get("k");
        }
        let accumulated = store.score("k").unwrap();

        store.put("k".to_string(), "new".to_string(), 200, 10.0).unwrap();
        let fresh = store.score("k").unwrap();

        assert!(fresh < accumulated);
        assert_eq!(store.len(), 1);
        assert_eq!(store.total_bytes(), 200);
        assert_eq!(store.get("k"), Some(&"new".to_string()));
    }

    #[test]
    fn test_put_below_limit_is_noop() {
        let config = CacheConfig::new(1000).with_limit(1.0);
        let mut store: CacheStore<String, String> = CacheStore::new(config).unwrap();

        let result = store.put("k".to_string(), "v".to_string(), 100, 50.0);
        assert!(matches!(result, Err(CacheError::BelowCostLimit { .. })));
        assert!(!store.contains_key("k"));
        assert_eq!(store.total_bytes(), 0);
        assert_eq!(store.tick(), 0);
        assert_eq!(store.stats().rejections, 1);
    }

    #[test]
    fn test_put_below_limit_keeps_existing_entry() {
        let config = CacheConfig::new(1000).with_limit(1.0);
        let mut store: CacheStore<String, String> = CacheStore::new(config).unwrap();

        store.put("k".to_string(), "keep".to_string(), 10, 100.0).unwrap();
        let result = store.put("k".to_string(), "drop".to_string(), 100, 1.0);

        assert!(result.is_err());
        assert_eq!(store.peek("k"), Some(&"keep".to_string()));
        assert_eq!(store.total_bytes(), 10);
    }

    #[test]
    fn test_put_too_large_leaves_cache_unchanged() {
        let mut store = store(100);
        store.put("small".to_string(), "v".to_string(), 50, 1.0).unwrap();

        let result = store.put("huge".to_string(), "v".to_string(), 101, 1000.0);
        assert_eq!(
            result,
            Err(CacheError::EntryTooLarge {
                nbytes: 101,
                available_bytes: 100
            })
        );
        assert!(store.contains_key("small"));
        assert!(!store.contains_key("huge"));
        assert_eq!(store.total_bytes(), 50);
    }

    #[test]
    fn test_zero_budget_caches_nothing() {
        let mut store = store(0);
        let result = store.put("k".to_string(), "v".to_string(), 1, 1.0);
        assert!(matches!(result, Err(CacheError::EntryTooLarge { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut store = store(100);
        let result = store.put("k".to_string(), "v".to_string(), 0, 1.0);
        assert!(matches!(result, Err(CacheError::InvalidEntry(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_remove() {
        let mut store = store(1000);

        store.put("key1".to_string(), "value1".to_string(), 10, 1.0).unwrap();
        assert_eq!(store.remove("key1"), Some("value1".to_string()));
        assert!(store.is_empty());
        assert_eq!(store.total_bytes(), 0);
        assert_eq!(store.get("key1"), None);

        // Absent keys are fine
        assert_eq!(store.remove("key1"), None);
    }

    #[test]
    fn test_removed_key_never_evicted_again() {
        let mut store = store(100);
        store.put("a".to_string(), "a".to_string(), 50, 0.1).unwrap();
        store.remove("a");
        store.put("b".to_string(), "b".to_string(), 50, 1.0).unwrap();
        let evicted = store.put("c".to_string(), "c".to_string(), 60, 5.0).unwrap();

        assert_eq!(evicted, vec!["b".to_string()]);
        assert_eq!(store.total_bytes(), 60);
    }

    #[test]
    fn test_clear() {
        let mut store = store(1000);
        store.put("a".to_string(), "a".to_string(), 10, 1.0).unwrap();
        store.put("b".to_string(), "b".to_string(), 10, 1.0).unwrap();

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.total_bytes(), 0);
        assert_eq!(store.index_len(), 0);
        assert_eq!(store.tick(), 2);
    }

    #[test]
    fn test_resize_evicts_lowest_scores() {
        let mut store = store(1000);
        store.put("low".to_string(), "v".to_string(), 100, 1.0).unwrap();
        store.put("mid".to_string(), "v".to_string(), 100, 10.0).unwrap();
        store.put("high".to_string(), "v".to_string(), 100, 100.0).unwrap();

        let evicted = store.resize(150);
        assert_eq!(evicted, vec!["low".to_string(), "mid".to_string()]);
        assert_eq!(store.available_bytes(), 150);
        assert!(store.contains_key("high"));
    }

    #[test]
    fn test_stats() {
        let mut store = store(100);

        store.put("key1".to_string(), "v".to_string(), 60, 1.0).unwrap();
        store.get("key1"); // hit
        store.get("nonexistent"); // miss
        store.put("key2".to_string(), "v".to_string(), 60, 10.0).unwrap(); // evicts key1
        let _ = store.put("key3".to_string(), "v".to_string(), 0, 1.0); // rejected

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.rejections, 1);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.total_bytes, 60);
    }

    #[test]
    fn test_index_compaction_bounds_records() {
        let mut store = store(1000);
        store.put("hot".to_string(), "v".to_string(), 10, 1.0).unwrap();

        for _ in 0..1000 {
            store.get("hot");
        }

        assert!(store.index_len() <= MIN_COMPACTION_RECORDS);
        assert_eq!(store.get("hot"), Some(&"v".to_string()));
    }

    #[test]
    fn test_rebase_keeps_scores_finite_and_ordered() {
        let config = CacheConfig::new(1000).with_halflife(1.0);
        let mut store: CacheStore<String, String> = CacheStore::new(config).unwrap();

        store.put("a".to_string(), "a".to_string(), 1, 1.0).unwrap();
        store.put("b".to_string(), "b".to_string(), 1, 2.0).unwrap();
        store.put("c".to_string(), "c".to_string(), 1, 1.0).unwrap();

        // Far past 2^333, where the growth factor would otherwise exceed 1e100
        for _ in 0..700 {
            store.get("c");
        }

        let a = store.score("a").unwrap();
        let b = store.score("b").unwrap();
        let c = store.score("c").unwrap();
        assert!(a.is_finite() && b.is_finite() && c.is_finite());
        assert!(a < b);
        assert!(b < c);
        assert_eq!(store.tick(), 703);

        let evicted = store.resize(1);
        assert_eq!(evicted, vec!["a".to_string(), "b".to_string()]);
        assert!(store.contains_key("c"));
    }

    #[test]
    fn test_put_near_u64_max_budget_keeps_accounting() {
        let mut store = store(u64::MAX);

        store.put("a".to_string(), "a".to_string(), u64::MAX, 1.0).unwrap();
        assert_eq!(store.total_bytes(), u64::MAX);

        // Together the entries exceed u64::MAX; the cheaper one goes
        let evicted = store.put("b".to_string(), "b".to_string(), 1, 5.0).unwrap();
        assert_eq!(evicted, vec!["a".to_string()]);
        assert_eq!(store.total_bytes(), 1);
        assert!(store.contains_key("b"));

        // And the new entry can still lose to a resident one
        let evicted = store
            .put("c".to_string(), "c".to_string(), u64::MAX, 1e-30)
            .unwrap();
        assert_eq!(evicted, vec!["c".to_string()]);
        assert_eq!(store.total_bytes(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_huge_cost_ratios_keep_frequency_ordering() {
        let config = CacheConfig::new(2).with_halflife(10.0);
        let mut store: CacheStore<String, String> = CacheStore::new(config).unwrap();

        store.put("a".to_string(), "a".to_string(), 1, 1e300).unwrap();
        store.put("b".to_string(), "b".to_string(), 1, 1e300).unwrap();
        // 1e300 * 2^(t / 10) would pass f64::MAX around tick 275
        for _ in 0..300 {
            store.get("a");
        }
        store.get("b");

        let a = store.score("a").unwrap();
        let b = store.score("b").unwrap();
        assert!(a.is_finite() && b.is_finite());
        assert!(a > b);

        let evicted = store.put("c".to_string(), "c".to_string(), 1, 1e300).unwrap();
        assert_eq!(evicted, vec!["b".to_string()]);
        assert!(store.contains_key("a"));
    }

    #[test]
    fn test_evicted_key_returns_with_fresh_score() {
        let mut store = store(15);

        store.put("a".to_string(), "a".to_string(), 10, 1.0).unwrap();
        for _ in 0..5 {
            store.get("a");
        }
        let accumulated = store.score("a").unwrap();

        let evicted = store.put("b".to_string(), "b".to_string(), 10, 100.0).unwrap();
        assert_eq!(evicted, vec!["a".to_string()]);
        assert_eq!(store.score("a"), None);
        store.remove("b");

        store.put("a".to_string(), "again".to_string(), 10, 1.0).unwrap();
        let scorer = ScoreFunction::default();
        let fresh = store.score("a").unwrap();

        assert_eq!(fresh, scorer.weigh(0.1, store.tick()));
        assert!(fresh < accumulated);
        assert_eq!(store.total_bytes(), 10);
        assert_eq!(store.get("a"), Some(&"again".to_string()));
    }
}
