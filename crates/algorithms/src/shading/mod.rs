//! Shading and sun-horizon classification
//!
//! - [`surface_in_shade`]: geometric shading against a horizon profile
//!   (flat terrain when none is given)
//! - [`sun_horizon_positions`]: below / low angle / above partition
//! - [`shading_states`]: in shade / sunlit / potentially sunlit partition
//!   used by the diffuse inclined model

mod states;
mod sun_horizon;

pub use states::{classify_shading_state, shading_states, state_counts, ShadingState};
pub use sun_horizon::{classify_sun_horizon, sun_horizon_positions, SunHorizonPosition};

use pvirr_core::{Algorithm, AngleSeries, AzimuthOrigin, AzimuthSeries, Error, Result, TimeSeries};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::cache::{KeyBuilder, MemoCache};
use crate::maybe_rayon::series_from_fn;

// ---------------------------------------------------------------------------
// Horizon profile
// ---------------------------------------------------------------------------

/// Horizon height as a function of azimuth.
///
/// Azimuths are radians clockwise from North, strictly increasing and
/// within `[0, 2π]`; heights are radians above the flat horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizonProfile {
    azimuths: Vec<f64>,
    heights: Vec<f64>,
}

impl HorizonProfile {
    /// Build a profile from paired samples.
    ///
    /// # Errors
    /// - [`Error::EmptySeries`] with no samples
    /// - [`Error::LengthMismatch`] if the two vectors differ in length
    /// - [`Error::InvalidParameter`] for non-increasing or out-of-range azimuths
    ///   and non-finite heights
    pub fn new(azimuths: Vec<f64>, heights: Vec<f64>) -> Result<Self> {
        if azimuths.is_empty() {
            return Err(Error::EmptySeries {
                name: "horizon azimuths",
            });
        }
        if heights.len() != azimuths.len() {
            return Err(Error::LengthMismatch {
                name: "horizon heights",
                expected: azimuths.len(),
                actual: heights.len(),
            });
        }
        if let Some(&a) = azimuths.iter().find(|a| !(0.0..=TAU).contains(*a)) {
            return Err(Error::invalid("horizon azimuth", a, "must be within [0, 2π]"));
        }
        if let Some(w) = azimuths.windows(2).find(|w| w[1] <= w[0]) {
            return Err(Error::invalid(
                "horizon azimuth",
                w[1],
                format!("must be greater than the preceding azimuth {}", w[0]),
            ));
        }
        if let Some(&h) = heights.iter().find(|h| !h.is_finite()) {
            return Err(Error::invalid("horizon height", h, "must be finite"));
        }
        Ok(Self { azimuths, heights })
    }

    /// Heights sampled at `n` equal steps of `2π/n` starting from North.
    pub fn uniform(heights: Vec<f64>) -> Result<Self> {
        let step = TAU / heights.len().max(1) as f64;
        let azimuths = (0..heights.len()).map(|i| i as f64 * step).collect();
        Self::new(azimuths, heights)
    }

    pub fn len(&self) -> usize {
        self.azimuths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.azimuths.is_empty()
    }

    pub fn azimuths(&self) -> &[f64] {
        &self.azimuths
    }

    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Profile closed at 2π with the first height, if it stops short of 2π.
    fn closed(&self) -> (Vec<f64>, Vec<f64>) {
        let mut az = self.azimuths.clone();
        let mut h = self.heights.clone();
        if az.last().is_some_and(|&last| last < TAU) {
            az.push(TAU);
            h.push(self.heights[0]);
        }
        (az, h)
    }

    /// Interpolated height at `azimuth` (radians from North).
    ///
    /// Linear between neighbouring samples, clamped to the end values
    /// outside the sampled range.
    pub fn height_at(&self, azimuth: f64) -> f64 {
        interpolate(&self.azimuths, &self.heights, azimuth)
    }

    /// Heights at every azimuth of `azimuth`.
    ///
    /// When the series reaches past the last profile sample the profile is
    /// first closed at 2π with its first height.
    pub fn heights_at(&self, azimuth: &TimeSeries<f64>) -> TimeSeries<f64> {
        let max_profile = self.azimuths.last().copied().unwrap_or(0.0);
        let wraps = azimuth.max().is_some_and(|m| m > max_profile);
        let (az, h) = if wraps {
            self.closed()
        } else {
            (self.azimuths.clone(), self.heights.clone())
        };
        let values = azimuth.data();
        series_from_fn(values.len(), |i| interpolate(&az, &h, values[i]))
    }
}

fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    if x.is_nan() || xs.is_empty() {
        return f64::NAN;
    }
    let upper = xs.partition_point(|&v| v < x);
    if upper == 0 {
        return ys[0];
    }
    if upper == xs.len() {
        return ys[xs.len() - 1];
    }
    let (x0, x1) = (xs[upper - 1], xs[upper]);
    let (y0, y1) = (ys[upper - 1], ys[upper]);
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

// ---------------------------------------------------------------------------
// Shading
// ---------------------------------------------------------------------------

/// Where the horizon height came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShadingAlgorithm {
    /// No profile: horizon height is zero everywhere
    #[default]
    Flat,
    /// Linear interpolation in a horizon profile
    HorizonInterpolation,
}

impl ShadingAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            ShadingAlgorithm::Flat => "flat",
            ShadingAlgorithm::HorizonInterpolation => "horizon-interpolation",
        }
    }
}

impl fmt::Display for ShadingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShadingAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "flat" => Ok(ShadingAlgorithm::Flat),
            "horizon" | "horizon-interpolation" => Ok(ShadingAlgorithm::HorizonInterpolation),
            _ => Err(Error::invalid("shading_algorithm", s, "expected flat or horizon")),
        }
    }
}

/// Geometric shading per timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShadingResult {
    pub in_shade: TimeSeries<bool>,
    /// Horizon height (radians) at each solar azimuth
    pub horizon_height: TimeSeries<f64>,
    pub algorithm: ShadingAlgorithm,
}

impl ShadingResult {
    pub fn len(&self) -> usize {
        self.in_shade.len()
    }

    pub fn is_empty(&self) -> bool {
        self.in_shade.is_empty()
    }

    /// Number of shaded timestamps
    pub fn shaded_count(&self) -> usize {
        self.in_shade.count_true()
    }
}

/// Compare solar altitude with the horizon height at each solar azimuth.
///
/// An empty azimuth series gives an empty result.
///
/// # Errors
/// [`Error::LengthMismatch`] if altitude and azimuth differ in length.
pub fn surface_in_shade(
    altitude: &AngleSeries,
    azimuth: &AzimuthSeries,
    horizon: Option<&HorizonProfile>,
) -> Result<ShadingResult> {
    let n = azimuth.len();
    let altitude = altitude.radians();
    altitude.ensure_len("solar altitude", n)?;

    let (horizon_height, algorithm) = match horizon {
        Some(profile) => (
            profile.heights_at(&azimuth.radians_from(AzimuthOrigin::North)),
            ShadingAlgorithm::HorizonInterpolation,
        ),
        None => (TimeSeries::zeros(n), ShadingAlgorithm::Flat),
    };
    let in_shade = altitude.zip_map(&horizon_height, |alt, h| alt < h)?;
    debug!(
        algorithm = algorithm.name(),
        shaded = in_shade.count_true(),
        total = n,
        "surface shading"
    );
    Ok(ShadingResult {
        in_shade,
        horizon_height,
        algorithm,
    })
}

/// [`surface_in_shade`] through a memoization cache.
pub fn surface_in_shade_cached(
    cache: &MemoCache<ShadingResult>,
    altitude: &AngleSeries,
    azimuth: &AzimuthSeries,
    horizon: Option<&HorizonProfile>,
) -> Result<ShadingResult> {
    let mut key = KeyBuilder::new("surface_in_shade")
        .series(&altitude.radians())
        .series(&azimuth.radians_from(AzimuthOrigin::North))
        .bool(horizon.is_some());
    if let Some(profile) = horizon {
        key = key.f64s(profile.azimuths()).f64s(profile.heights());
    }
    cache.get_or_compute(key.finish(), || surface_in_shade(altitude, azimuth, horizon))
}

/// Input of the shading classifier
#[derive(Debug, Clone)]
pub struct ShadingInput {
    pub altitude: AngleSeries,
    pub azimuth: AzimuthSeries,
    pub horizon: Option<HorizonProfile>,
}

/// Shading classifier
pub struct ShadingClassifier;

impl Algorithm for ShadingClassifier {
    type Input = ShadingInput;
    type Output = ShadingResult;
    type Params = ();
    type Error = Error;

    fn name(&self) -> &'static str {
        "ShadingClassifier"
    }

    fn description(&self) -> &'static str {
        "Geometric shading of the surface against a horizon profile"
    }

    fn execute(&self, input: Self::Input, _params: Self::Params) -> Result<Self::Output> {
        surface_in_shade(&input.altitude, &input.azimuth, input.horizon.as_ref())
    }
}
