//! Main TimeSeries type

use crate::error::{Error, Result};
use crate::series::SeriesElement;
use ndarray::{Array1, ArrayView1, ArrayViewMut1};
use serde::Serialize;

/// An ordered sequence of values aligned 1:1 with a [`Timestamps`](super::Timestamps)
/// sequence.
///
/// Index order is temporal. Operations combining two series require equal
/// lengths and never reorder elements.
///
/// # Example
///
/// ```ignore
/// use pvirr_core::TimeSeries;
///
/// let altitude = TimeSeries::from_vec(vec![-0.2, 0.01, 0.8]);
/// let above = altitude.map(|h| h > 0.0);
/// assert_eq!(above.count_true(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries<T: SeriesElement> {
    data: Array1<T>,
}

impl<T: SeriesElement> TimeSeries<T> {
    /// Create a series of `len` default values (zero, `false`, `unset`)
    pub fn new(len: usize) -> Self {
        Self {
            data: Array1::from_elem(len, T::default()),
        }
    }

    /// Create a series filled with a specific value
    pub fn filled(len: usize, value: T) -> Self {
        Self {
            data: Array1::from_elem(len, value),
        }
    }

    /// Create a series from a vector
    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            data: Array1::from_vec(data),
        }
    }

    /// Create a series from an ndarray
    pub fn from_array(data: Array1<T>) -> Self {
        Self { data }
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the series has no samples
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at index `i`
    pub fn get(&self, i: usize) -> Result<T> {
        self.data.get(i).copied().ok_or(Error::LengthMismatch {
            name: "index",
            expected: i + 1,
            actual: self.data.len(),
        })
    }

    /// Set value at index `i`
    pub fn set(&mut self, i: usize, value: T) -> Result<()> {
        let len = self.data.len();
        match self.data.get_mut(i) {
            Some(v) => {
                *v = value;
                Ok(())
            }
            None => Err(Error::LengthMismatch {
                name: "index",
                expected: i + 1,
                actual: len,
            }),
        }
    }

    /// Iterate over values in temporal order
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.data.iter()
    }

    pub fn view(&self) -> ArrayView1<'_, T> {
        self.data.view()
    }

    pub fn view_mut(&mut self) -> ArrayViewMut1<'_, T> {
        self.data.view_mut()
    }

    /// Reference to the underlying array
    pub fn data(&self) -> &Array1<T> {
        &self.data
    }

    /// Consume and return the underlying array
    pub fn into_array(self) -> Array1<T> {
        self.data
    }

    /// Copy values into a vector
    pub fn to_vec(&self) -> Vec<T> {
        self.data.to_vec()
    }

    /// Fail with [`Error::LengthMismatch`] unless `len() == expected`.
    pub fn ensure_len(&self, name: &'static str, expected: usize) -> Result<()> {
        if self.len() != expected {
            return Err(Error::LengthMismatch {
                name,
                expected,
                actual: self.len(),
            });
        }
        Ok(())
    }

    /// Element-wise transform into a new series
    pub fn map<U: SeriesElement>(&self, f: impl Fn(T) -> U) -> TimeSeries<U> {
        TimeSeries {
            data: self.data.mapv(f),
        }
    }

    /// Element-wise combination of two aligned series
    pub fn zip_map<U: SeriesElement, V: SeriesElement>(
        &self,
        other: &TimeSeries<U>,
        f: impl Fn(T, U) -> V,
    ) -> Result<TimeSeries<V>> {
        other.ensure_len("zip operand", self.len())?;
        let data: Vec<V> = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(TimeSeries::from_vec(data))
    }

    /// Replace values where `mask` is true with `value`
    pub fn fill_where(&mut self, mask: &TimeSeries<bool>, value: T) -> Result<()> {
        mask.ensure_len("mask", self.len())?;
        for (v, &m) in self.data.iter_mut().zip(mask.data.iter()) {
            if m {
                *v = value;
            }
        }
        Ok(())
    }

    /// Copy values from `source` where `mask` is true
    pub fn assign_where(&mut self, mask: &TimeSeries<bool>, source: &TimeSeries<T>) -> Result<()> {
        mask.ensure_len("mask", self.len())?;
        source.ensure_len("source", self.len())?;
        for ((v, &m), &s) in self
            .data
            .iter_mut()
            .zip(mask.data.iter())
            .zip(source.data.iter())
        {
            if m {
                *v = s;
            }
        }
        Ok(())
    }

    /// Number of samples satisfying `pred`
    pub fn count(&self, pred: impl Fn(&T) -> bool) -> usize {
        self.data.iter().filter(|v| pred(v)).count()
    }

    /// Number of missing samples
    pub fn missing_count(&self) -> usize {
        self.count(|v| v.is_missing())
    }
}

impl TimeSeries<f64> {
    /// Create a series of zeros
    pub fn zeros(len: usize) -> Self {
        Self::new(len)
    }

    /// Sum ignoring NaN
    pub fn sum(&self) -> f64 {
        self.data.iter().filter(|v| !v.is_nan()).sum()
    }

    /// Mean ignoring NaN; NaN for an empty or all-NaN series
    pub fn mean(&self) -> f64 {
        let valid = self.data.len() - self.missing_count();
        if valid == 0 {
            return f64::NAN;
        }
        self.sum() / valid as f64
    }

    /// Maximum ignoring NaN
    pub fn max(&self) -> Option<f64> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
    }

    /// Minimum ignoring NaN
    pub fn min(&self) -> Option<f64> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.min(v))))
    }

    /// Element-wise sum of two aligned series
    pub fn add(&self, other: &TimeSeries<f64>) -> Result<TimeSeries<f64>> {
        self.zip_map(other, |a, b| a + b)
    }

    /// Element-wise difference of two aligned series
    pub fn sub(&self, other: &TimeSeries<f64>) -> Result<TimeSeries<f64>> {
        self.zip_map(other, |a, b| a - b)
    }

    /// Indices of values outside `[lower, upper]`
    pub fn indices_outside(&self, lower: f64, upper: f64) -> Vec<usize> {
        self.data
            .iter()
            .enumerate()
            .filter(|&(_, &v)| v < lower || v > upper)
            .map(|(i, _)| i)
            .collect()
    }

    /// Clamp every value into `[lower, upper]`
    pub fn clip(&self, lower: f64, upper: f64) -> TimeSeries<f64> {
        self.map(|v| v.clamp(lower, upper))
    }

    /// Radians to degrees
    pub fn to_degrees(&self) -> TimeSeries<f64> {
        self.map(f64::to_degrees)
    }

    /// Degrees to radians
    pub fn to_radians(&self) -> TimeSeries<f64> {
        self.map(f64::to_radians)
    }
}

impl TimeSeries<bool> {
    pub fn any(&self) -> bool {
        self.data.iter().any(|&b| b)
    }

    pub fn all(&self) -> bool {
        self.data.iter().all(|&b| b)
    }

    pub fn count_true(&self) -> usize {
        self.count(|&b| b)
    }

    /// Logical negation
    pub fn not(&self) -> TimeSeries<bool> {
        self.map(|b| !b)
    }

    /// Logical conjunction of two aligned masks
    pub fn and(&self, other: &TimeSeries<bool>) -> Result<TimeSeries<bool>> {
        self.zip_map(other, |a, b| a && b)
    }
}

impl<T: SeriesElement> From<Vec<T>> for TimeSeries<T> {
    fn from(data: Vec<T>) -> Self {
        Self::from_vec(data)
    }
}
