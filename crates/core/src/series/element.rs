//! Element trait for time-series values

use std::fmt::Debug;

/// Trait for types that can be stored in a [`TimeSeries`](super::TimeSeries).
///
/// Angles, irradiance values, shading flags and regime tags all flow
/// through the same container, so the bound is kept small.
pub trait SeriesElement: Copy + Clone + Debug + PartialEq + Default + Send + Sync + 'static {
    /// Whether this value represents a missing sample
    fn is_missing(&self) -> bool;
}

macro_rules! impl_series_element_float {
    ($t:ty) => {
        impl SeriesElement for $t {
            fn is_missing(&self) -> bool {
                self.is_nan()
            }
        }
    };
}

impl_series_element_float!(f32);
impl_series_element_float!(f64);

impl SeriesElement for bool {
    fn is_missing(&self) -> bool {
        false
    }
}

impl SeriesElement for u8 {
    fn is_missing(&self) -> bool {
        false
    }
}
