//! Size Estimation Module
//!
//! Pluggable payload size estimation. The cache never looks inside payloads;
//! callers supply `nbytes` directly or through a [`SizeEstimator`].

use std::mem::size_of;

// == Size Estimator ==
/// Estimates the stored size of a payload in bytes.
pub trait SizeEstimator<V: ?Sized> {
    fn estimate(&self, value: &V) -> u64;
}

/// A size estimator backed by a closure.
pub struct FnEstimator<F>(pub F);

impl<V, F> SizeEstimator<V> for FnEstimator<F>
where
    V: ?Sized,
    F: Fn(&V) -> u64,
{
    #[inline]
    fn estimate(&self, value: &V) -> u64 {
        (self.0)(value)
    }
}

/// Default estimator for payloads implementing [`Nbytes`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DeepSize;

impl<V> SizeEstimator<V> for DeepSize
where
    V: Nbytes + ?Sized,
{
    #[inline]
    fn estimate(&self, value: &V) -> u64 {
        value.nbytes()
    }
}

// == Nbytes ==
/// Approximate number of payload bytes owned by a value.
///
/// Container overhead (headers, spare capacity) is not counted.
pub trait Nbytes {
    fn nbytes(&self) -> u64;
}

macro_rules! impl_nbytes_for_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Nbytes for $ty {
                #[inline]
                fn nbytes(&self) -> u64 {
                    size_of::<$ty>() as u64
                }
            }
        )*
    };
}

impl_nbytes_for_primitive!(
    bool, char, u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64
);

impl Nbytes for () {
    fn nbytes(&self) -> u64 {
        0
    }
}

impl Nbytes for str {
    fn nbytes(&self) -> u64 {
        self.len() as u64
    }
}

impl Nbytes for String {
    fn nbytes(&self) -> u64 {
        self.len() as u64
    }
}

impl<T: Nbytes> Nbytes for [T] {
    fn nbytes(&self) -> u64 {
        self.iter().map(Nbytes::nbytes).sum()
    }
}

impl<T: Nbytes> Nbytes for Vec<T> {
    fn nbytes(&self) -> u64 {
        self.as_slice().nbytes()
    }
}

impl<T: Nbytes + ?Sized> Nbytes for Box<T> {
    fn nbytes(&self) -> u64 {
        (**self).nbytes()
    }
}

impl<T: Nbytes + ?Sized> Nbytes for std::sync::Arc<T> {
    fn nbytes(&self) -> u64 {
        (**self).nbytes()
    }
}

impl<T: Nbytes> Nbytes for Option<T> {
    fn nbytes(&self) -> u64 {
        self.as_ref().map_or(0, Nbytes::nbytes)
    }
}

impl<A: Nbytes, B: Nbytes> Nbytes for (A, B) {
    fn nbytes(&self) -> u64 {
        self.0.nbytes() + self.1.nbytes()
    }
}

impl<A: Nbytes, B: Nbytes, C: Nbytes> Nbytes for (A, B, C) {
    fn nbytes(&self) -> u64 {
        self.0.nbytes() + self.1.nbytes() + self.2.nbytes()
    }
}
