//! Angular reflectivity loss (Martin & Ruiz)
//!
//! Direct irradiance is de-rated by a factor of the typical incidence angle.
//! Diffuse sky and ground-reflected irradiance use a factor of a single
//! coefficient derived from the surface tilt.

use pvirr_core::constants::{ANGULAR_LOSS_C2, ANGULAR_LOSS_COEFFICIENT, TILT_SINGULARITY_EPSILON};
use pvirr_core::{Algorithm, Error, IncidenceSeries, Result, TimeSeries};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

/// First coefficient of the non-direct loss polynomial, `4 / (3π)`
pub const C1: f64 = 4.0 / (3.0 * PI);

/// Which loss model applies to a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReflectivityKind {
    Direct,
    DiffuseSky,
    GroundReflected,
}

impl ReflectivityKind {
    pub fn is_direct(&self) -> bool {
        matches!(self, ReflectivityKind::Direct)
    }
}

impl fmt::Display for ReflectivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReflectivityKind::Direct => write!(f, "direct"),
            ReflectivityKind::DiffuseSky => write!(f, "diffuse sky"),
            ReflectivityKind::GroundReflected => write!(f, "ground reflected"),
        }
    }
}

/// Parameters of the angular loss model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReflectivityParams {
    /// Angular loss coefficient a_r
    pub angular_loss_coefficient: f64,
    /// Second-order coefficient of the non-direct polynomial
    pub c2: f64,
    /// Tilts closer than this to π are moved away from π
    pub tilt_epsilon: f64,
}

impl Default for ReflectivityParams {
    fn default() -> Self {
        Self {
            angular_loss_coefficient: ANGULAR_LOSS_COEFFICIENT,
            c2: ANGULAR_LOSS_C2,
            tilt_epsilon: TILT_SINGULARITY_EPSILON,
        }
    }
}

// ---------------------------------------------------------------------------
// Scalar kernels
// ---------------------------------------------------------------------------

/// Direct loss factor for a typical incidence angle (radians).
///
/// Zero when the sun is at or behind the surface plane.
pub fn direct_reflectivity_factor(incidence_typical: f64, angular_loss_coefficient: f64) -> f64 {
    let cos_aoi = incidence_typical.cos().max(0.0);
    let a_r = angular_loss_coefficient;
    (1.0 - (-cos_aoi / a_r).exp()) / (1.0 - (-1.0 / a_r).exp())
}

fn nudge_tilt(tilt: f64, epsilon: f64) -> f64 {
    if (tilt - PI).abs() < epsilon {
        tilt - epsilon
    } else {
        tilt
    }
}

/// Reflectivity coefficient for diffuse sky irradiance.
pub fn diffuse_reflectivity_coefficient(tilt: f64, epsilon: f64) -> f64 {
    let beta = nudge_tilt(tilt, epsilon);
    beta.sin() + (PI - beta - beta.sin()) / (1.0 + beta.cos())
}

/// Reflectivity coefficient for ground-reflected irradiance.
///
/// Undefined for a horizontal surface (tilt 0), which never sees the ground.
pub fn ground_reflectivity_coefficient(tilt: f64, epsilon: f64) -> f64 {
    let beta = nudge_tilt(tilt, epsilon);
    beta.sin() + (beta - beta.sin()) / (1.0 - beta.cos())
}

/// Non-direct loss factor for a reflectivity coefficient.
pub fn nondirect_reflectivity_factor(coefficient: f64, angular_loss_coefficient: f64, c2: f64) -> f64 {
    1.0 - (-(C1 * coefficient + c2 * coefficient * coefficient) / angular_loss_coefficient).exp()
}

/// Constant loss factor for a non-direct component on a surface of `tilt`.
///
/// # Errors
/// [`Error::InvalidParameter`] for [`ReflectivityKind::Direct`], whose
/// factor depends on the incidence angle.
pub fn nondirect_factor_for(kind: ReflectivityKind, tilt: f64, params: &ReflectivityParams) -> Result<f64> {
    let coefficient = match kind {
        ReflectivityKind::DiffuseSky => diffuse_reflectivity_coefficient(tilt, params.tilt_epsilon),
        ReflectivityKind::GroundReflected => ground_reflectivity_coefficient(tilt, params.tilt_epsilon),
        ReflectivityKind::Direct => {
            return Err(Error::invalid(
                "reflectivity kind",
                kind,
                "direct loss needs an incidence angle",
            ))
        }
    };
    let factor = nondirect_reflectivity_factor(coefficient, params.angular_loss_coefficient, params.c2);
    // a removable 0/0 at tilt 0 would otherwise leak NaN
    Ok(if factor.is_finite() { factor } else { 1.0 })
}

// ---------------------------------------------------------------------------
// Series
// ---------------------------------------------------------------------------

/// Result of applying the loss to a series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReflectivityOutcome {
    pub corrected: TimeSeries<f64>,
    pub factor: TimeSeries<f64>,
    pub before: TimeSeries<f64>,
}

/// Loss factor per timestamp.
///
/// The incidence series may use either definition; it is converted to the
/// typical angle before the direct factor is evaluated.
pub fn reflectivity_factors(
    kind: ReflectivityKind,
    incidence: &IncidenceSeries,
    tilt: f64,
    params: &ReflectivityParams,
) -> Result<TimeSeries<f64>> {
    if kind.is_direct() {
        let typical = incidence.to_typical();
        let a_r = params.angular_loss_coefficient;
        return Ok(typical.radians().map(|aoi| direct_reflectivity_factor(aoi, a_r)));
    }
    let factor = nondirect_factor_for(kind, tilt, params)?;
    Ok(TimeSeries::filled(incidence.len(), factor))
}

/// `corrected / factor` where the factor is non-zero, else 0.
pub fn before_reflectivity(corrected: &TimeSeries<f64>, factor: &TimeSeries<f64>) -> Result<TimeSeries<f64>> {
    corrected.zip_map(factor, |v, f| if f != 0.0 { v / f } else { 0.0 })
}

/// Apply the angular loss to `base`.
///
/// # Errors
/// [`Error::LengthMismatch`] if `base` and `incidence` differ in length.
pub fn apply_reflectivity(
    kind: ReflectivityKind,
    incidence: &IncidenceSeries,
    tilt: f64,
    base: &TimeSeries<f64>,
    params: &ReflectivityParams,
) -> Result<ReflectivityOutcome> {
    base.ensure_len("irradiance", incidence.len())?;
    let factor = reflectivity_factors(kind, incidence, tilt, params)?;
    let corrected = base.zip_map(&factor, |v, f| v * f)?;
    let before = before_reflectivity(&corrected, &factor)?;
    Ok(ReflectivityOutcome {
        corrected,
        factor,
        before,
    })
}

/// Irradiance lost to reflectivity, `before − corrected`
///
/// # Errors
/// [`Error::LengthMismatch`] if the two series differ in length.
pub fn reflectivity_loss(before: &TimeSeries<f64>, corrected: &TimeSeries<f64>) -> Result<TimeSeries<f64>> {
    before.zip_map(corrected, |b, c| b - c)
}

/// Loss relative to the value before reflectivity, in percent (0 where that value is 0)
pub fn reflectivity_loss_percentage(
    before: &TimeSeries<f64>,
    corrected: &TimeSeries<f64>,
) -> Result<TimeSeries<f64>> {
    before.zip_map(corrected, |b, c| if b != 0.0 { 100.0 * (b - c) / b } else { 0.0 })
}

/// Input of the reflectivity corrector
#[derive(Debug, Clone)]
pub struct ReflectivityInput {
    pub kind: ReflectivityKind,
    pub incidence: IncidenceSeries,
    pub tilt: f64,
    pub irradiance: TimeSeries<f64>,
}

/// Angular reflectivity corrector
pub struct ReflectivityCorrector;

impl Algorithm for ReflectivityCorrector {
    type Input = ReflectivityInput;
    type Output = ReflectivityOutcome;
    type Params = ReflectivityParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "ReflectivityCorrector"
    }

    fn description(&self) -> &'static str {
        "Martin & Ruiz angular reflectivity loss"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        apply_reflectivity(input.kind, &input.incidence, input.tilt, &input.irradiance, &params)
    }
}
