//! Switch between rayon and plain iterators.
//!
//! Per-timestamp kernels are written as `(0..n).into_par_iter().map(..)`.
//! With the `parallel` feature this is rayon; without it the same call
//! resolves to an ordinary iterator, so results do not depend on the feature.
#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    /// Sequential stand-in for `rayon::prelude::IntoParallelIterator`.
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;

use pvirr_core::TimeSeries;

/// Evaluate `f` at every index in `0..len` and collect into a series,
/// preserving temporal order.
pub(crate) fn series_from_fn<F>(len: usize, f: F) -> TimeSeries<f64>
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    let values: Vec<f64> = (0..len).into_par_iter().map(f).collect();
    TimeSeries::from_vec(values)
}
