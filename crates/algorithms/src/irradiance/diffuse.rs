//! Diffuse sky irradiance on the inclined surface (Muneer 1990)
//!
//! The horizontal diffuse irradiance is redistributed over the tilted plane
//! with a regime chosen per timestamp by its [`ShadingState`].

use pvirr_core::{Error, IncidenceSeries, Result, SurfaceGeometry, TimeSeries};
use std::f64::consts::PI;

use super::component::{ComponentKind, IrradianceComponent};
use crate::maybe_rayon::series_from_fn;
use crate::shading::{ShadingState, SunHorizonPosition};

pub(crate) const MODEL: &str = "Muneer 1990";

/// Thresholds of the diffuse inclined model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffuseInclinedParams {
    /// Surfaces at or below this tilt take the horizontal value
    pub flat_tilt_threshold: f64,
    /// N-term used for shaded timestamps
    pub in_shade_n_term: f64,
}

/// Ratio of direct horizontal to extraterrestrial horizontal irradiance; 0 where the latter is 0.
pub fn kb_ratio(direct_horizontal: f64, extraterrestrial_horizontal: f64) -> f64 {
    if extraterrestrial_horizontal > 0.0 {
        direct_horizontal / extraterrestrial_horizontal
    } else {
        0.0
    }
}

/// kb for every timestamp
pub fn kb_series(
    direct_horizontal: &IrradianceComponent,
    extraterrestrial_horizontal: &IrradianceComponent,
) -> Result<TimeSeries<f64>> {
    direct_horizontal
        .value
        .zip_map(&extraterrestrial_horizontal.value, kb_ratio)
}

/// Muneer's N-term for a sunlit surface
pub fn term_n(kb: f64) -> f64 {
    0.00263 - 0.712 * kb - 0.6883 * kb * kb
}

/// Sky view function `F(N) = (1 + cos β)/2 + (sin β − β cos β − π sin²(β/2))·N`
pub fn sky_view_function(tilt: f64, n: f64) -> f64 {
    let half = (tilt / 2.0).sin();
    (1.0 + tilt.cos()) / 2.0 + (tilt.sin() - tilt * tilt.cos() - PI * half * half) * n
}

/// Sun azimuth relative to the surface orientation, wrapped into `[-π, π]`.
///
/// Both angles are clockwise from North.
pub fn azimuth_difference(sun_azimuth: f64, surface_orientation: f64) -> f64 {
    let d = sun_azimuth - surface_orientation;
    d.sin().atan2(d.cos())
}

/// Per-timestamp inputs of the diffuse inclined model
#[derive(Debug, Clone, Copy)]
pub struct DiffuseSample {
    pub diffuse_horizontal: f64,
    pub kb: f64,
    pub altitude: f64,
    pub azimuth: f64,
    pub complementary_incidence: f64,
    pub state: ShadingState,
    pub position: SunHorizonPosition,
}

/// Diffuse inclined irradiance for one timestamp, before reflectivity.
///
/// Below the horizon the result is 0; on a flat surface it is the
/// horizontal value. Otherwise the shading state selects the regime, and
/// the result is floored at 0. An unset state yields NaN.
pub fn diffuse_inclined_value(s: &DiffuseSample, surface: &SurfaceGeometry, params: &DiffuseInclinedParams) -> f64 {
    if s.position == SunHorizonPosition::Below {
        return 0.0;
    }
    if surface.is_flat(params.flat_tilt_threshold) {
        return s.diffuse_horizontal;
    }
    let beta = surface.tilt;
    let dh = s.diffuse_horizontal;
    let value = match s.state {
        ShadingState::InShade => dh * sky_view_function(beta, params.in_shade_n_term),
        ShadingState::Sunlit => {
            let f = sky_view_function(beta, term_n(s.kb));
            dh * (f * (1.0 - s.kb) + s.kb * s.complementary_incidence.sin() / s.altitude.sin())
        }
        ShadingState::PotentiallySunlit => {
            let f = sky_view_function(beta, term_n(s.kb));
            let delta = azimuth_difference(s.azimuth, surface.orientation);
            dh * (f * (1.0 - s.kb) + s.kb * beta.sin() * delta.cos() / (0.1 - 0.008 * s.altitude))
        }
        ShadingState::Unset => return f64::NAN,
    };
    if value < 0.0 {
        0.0
    } else {
        value
    }
}

/// Series inputs of [`diffuse_inclined`]
pub struct DiffuseInclinedInput<'a> {
    pub diffuse_horizontal: &'a IrradianceComponent,
    pub kb: &'a TimeSeries<f64>,
    pub altitude: &'a TimeSeries<f64>,
    /// Solar azimuth clockwise from North
    pub azimuth: &'a TimeSeries<f64>,
    pub incidence: &'a IncidenceSeries,
    pub states: &'a TimeSeries<ShadingState>,
    pub sun_horizon: &'a TimeSeries<SunHorizonPosition>,
}

/// Diffuse inclined irradiance before reflectivity loss.
///
/// # Errors
/// [`Error::LengthMismatch`] if the series are not aligned.
pub fn diffuse_inclined(
    input: &DiffuseInclinedInput<'_>,
    surface: &SurfaceGeometry,
    params: &DiffuseInclinedParams,
) -> Result<IrradianceComponent> {
    let n = input.diffuse_horizontal.len();
    for (name, len) in [
        ("kb", input.kb.len()),
        ("solar altitude", input.altitude.len()),
        ("solar azimuth", input.azimuth.len()),
        ("incidence", input.incidence.len()),
        ("shading state", input.states.len()),
        ("sun-horizon position", input.sun_horizon.len()),
    ] {
        if len != n {
            return Err(Error::LengthMismatch {
                name,
                expected: n,
                actual: len,
            });
        }
    }

    let complementary = input.incidence.to_complementary();
    let comp = complementary.radians().data();
    let dh = input.diffuse_horizontal.value.data();
    let (kb, alt, az) = (input.kb.data(), input.altitude.data(), input.azimuth.data());
    let (states, pos) = (input.states.data(), input.sun_horizon.data());
    let value = series_from_fn(n, |i| {
        let sample = DiffuseSample {
            diffuse_horizontal: dh[i],
            kb: kb[i],
            altitude: alt[i],
            azimuth: az[i],
            complementary_incidence: comp[i],
            state: states[i],
            position: pos[i],
        };
        diffuse_inclined_value(&sample, surface, params)
    });
    Ok(IrradianceComponent::new(ComponentKind::DiffuseInclined, MODEL, value)
        .with_parents(vec![input.diffuse_horizontal.clone()]))
}
