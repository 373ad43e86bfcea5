//! Memoize Module
//!
//! Wraps a function so its results are served from a shared cache.
//!
//! On a miss the wrapped function runs, its wall-clock time becomes the
//! entry's compute cost and its result is sized by the injected estimator.
//! Caching is best-effort: a rejected put never changes what the caller gets.

use std::hash::Hash;
use std::time::Instant;

use tracing::debug;

use crate::cache::SharedCache;
use crate::memo::size::{DeepSize, Nbytes, SizeEstimator};

type KeyFn<A, K> = Box<dyn Fn(&A) -> K + Send + Sync>;
type Estimator<V> = Box<dyn SizeEstimator<V> + Send + Sync>;

// == Memoized ==
/// A function whose results are cached in a [`SharedCache`].
pub struct Memoized<A, K, V, F> {
    cache: SharedCache<K, V>,
    func: F,
    key_fn: KeyFn<A, K>,
    sizer: Estimator<V>,
}

impl<A, V, F> Memoized<A, A, V, F>
where
    A: Hash + Eq + Clone + 'static,
    V: Clone + Nbytes + 'static,
    F: Fn(A) -> V,
{
    // == Constructor ==
    /// Memoizes `func`, keyed by its arguments and sized with [`DeepSize`].
    pub fn new(cache: SharedCache<A, V>, func: F) -> Self {
        Self::from_parts(cache, func, A::clone, DeepSize)
    }
}

impl<A, K, V, F> Memoized<A, K, V, F>
where
    K: Hash + Eq + Clone + 'static,
    V: Clone + 'static,
    F: Fn(A) -> V,
{
    /// Memoizes `func` with a custom key derivation, sized with [`DeepSize`].
    pub fn with_key_fn<KF>(cache: SharedCache<K, V>, func: F, key_fn: KF) -> Self
    where
        KF: Fn(&A) -> K + Send + Sync + 'static,
        V: Nbytes,
    {
        Self::from_parts(cache, func, key_fn, DeepSize)
    }

    /// Memoizes `func` with explicit key derivation and size estimation.
    pub fn from_parts<KF, S>(cache: SharedCache<K, V>, func: F, key_fn: KF, sizer: S) -> Self
    where
        KF: Fn(&A) -> K + Send + Sync + 'static,
        S: SizeEstimator<V> + Send + Sync + 'static,
    {
        Self {
            cache,
            func,
            key_fn: Box::new(key_fn),
            sizer: Box::new(sizer),
        }
    }

    /// Replaces the size estimator.
    pub fn size_with<S>(mut self, sizer: S) -> Self
    where
        S: SizeEstimator<V> + Send + Sync + 'static,
    {
        self.sizer = Box::new(sizer);
        self
    }

    // == Call ==
    /// Returns the cached result for `args`, computing and caching it on a miss.
    ///
    /// The cache lock is not held while the wrapped function runs.
    pub fn call(&self, args: A) -> V {
        let key = (self.key_fn)(&args);

        let cached = self.cache.lock().get(&key).cloned();
        if let Some(value) = cached {
            return value;
        }

        let started = Instant::now();
        let result = (self.func)(args);
        let compute_cost = started.elapsed().as_secs_f64();
        let nbytes = self.sizer.estimate(&result).max(1);

        if let Err(err) = self
            .cache
            .lock()
            .put(key, result.clone(), nbytes, compute_cost)
        {
            debug!(%err, nbytes, compute_cost, "memoized result not cached");
        }

        result
    }

    /// The cache backing this function.
    pub fn cache(&self) -> &SharedCache<K, V> {
        &self.cache
    }

    /// Converts into a plain closure with the wrapped function's signature.
    pub fn into_fn(self) -> impl Fn(A) -> V {
        move |args| self.call(args)
    }
}
