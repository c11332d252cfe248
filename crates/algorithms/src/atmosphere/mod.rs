//! Clear-sky atmospheric transmission (Hofierka 2002)
//!
//! Extraterrestrial irradiance is attenuated along Kasten's optical air
//! mass into a direct normal beam, and scattered into a diffuse horizontal
//! component, both driven by the Linke turbidity factor.

pub mod air_mass;
pub mod diffuse;
pub mod direct;
pub mod extraterrestrial;

pub use air_mass::{air_mass_series, elevation_correction, optical_air_mass, rayleigh_optical_thickness, refracted_altitude};
pub use diffuse::{clear_sky_diffuse_horizontal, diffuse_horizontal_from_external, diffuse_transmission};
pub use direct::{clear_sky_direct_normal, direct_horizontal, direct_normal_from_horizontal};
pub use extraterrestrial::{extraterrestrial_horizontal, extraterrestrial_normal};

use pvirr_core::constants::SOLAR_CONSTANT;
use pvirr_core::{Algorithm, Error, Result, TimeSeries, Timestamps};
use serde::Serialize;

use crate::cache::{KeyBuilder, MemoCache};
use crate::irradiance::component::{IrradianceComponent, PhysicalLimits};
use crate::position::OrbitalParams;

/// Parameters shared by the clear-sky models
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AtmosphereParams {
    /// Solar constant I0 (W·m⁻²)
    pub solar_constant: f64,
    pub orbit: OrbitalParams,
    pub limits: PhysicalLimits,
}

impl Default for AtmosphereParams {
    fn default() -> Self {
        Self {
            solar_constant: SOLAR_CONSTANT,
            orbit: OrbitalParams::default(),
            limits: PhysicalLimits::default(),
        }
    }
}

/// Linke turbidity series of length `n` filled with `value`
pub fn constant_linke(n: usize, value: f64) -> TimeSeries<f64> {
    TimeSeries::filled(n, value)
}

/// Check a Linke turbidity series against the timestamp count.
///
/// # Errors
/// [`Error::LengthMismatch`] on a length mismatch, [`Error::InvalidParameter`]
/// for negative or non-finite values.
pub fn validate_linke(linke: &TimeSeries<f64>, n: usize) -> Result<()> {
    linke.ensure_len("linke turbidity", n)?;
    if let Some(&v) = linke.iter().find(|v| !v.is_finite() || **v < 0.0) {
        return Err(Error::invalid("linke turbidity", v, "must be finite and non-negative"));
    }
    Ok(())
}

/// Clear-sky irradiance components for one location
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClearSkyIrradiance {
    pub extraterrestrial_normal: IrradianceComponent,
    pub extraterrestrial_horizontal: IrradianceComponent,
    pub direct_normal: IrradianceComponent,
    pub direct_horizontal: IrradianceComponent,
    pub diffuse_horizontal: IrradianceComponent,
    pub air_mass: TimeSeries<f64>,
}

/// Input of the clear-sky model
#[derive(Debug, Clone)]
pub struct ClearSkyInput {
    pub timestamps: Timestamps,
    /// Elevation above sea level, metres
    pub elevation: f64,
    /// Solar altitude, radians
    pub altitude: TimeSeries<f64>,
    pub in_shade: TimeSeries<bool>,
    pub linke: TimeSeries<f64>,
}

/// Compute every clear-sky component.
///
/// # Errors
/// - [`Error::EmptySeries`] for an empty timestamp sequence
/// - [`Error::LengthMismatch`] if any series is not aligned with the timestamps
pub fn clear_sky(input: &ClearSkyInput, params: &AtmosphereParams) -> Result<ClearSkyIrradiance> {
    input.timestamps.ensure_not_empty()?;
    let n = input.timestamps.len();
    input.altitude.ensure_len("solar altitude", n)?;
    input.in_shade.ensure_len("in_shade", n)?;
    validate_linke(&input.linke, n)?;

    let g0 = extraterrestrial_normal(&input.timestamps, params);
    let g0h = extraterrestrial_horizontal(&g0, &input.altitude)?;
    let m = air_mass_series(&input.altitude, input.elevation);
    let b0c = clear_sky_direct_normal(&g0, &input.linke, &m, params)?;
    let bh = direct_horizontal(&b0c, &input.altitude, &input.in_shade, params)?;
    let dh = clear_sky_diffuse_horizontal(&g0, &input.linke, &input.altitude, params)?;
    Ok(ClearSkyIrradiance {
        extraterrestrial_normal: g0,
        extraterrestrial_horizontal: g0h,
        direct_normal: b0c,
        direct_horizontal: bh,
        diffuse_horizontal: dh,
        air_mass: m,
    })
}

/// [`clear_sky`] through a memoization cache.
pub fn clear_sky_cached(
    cache: &MemoCache<ClearSkyIrradiance>,
    input: &ClearSkyInput,
    params: &AtmosphereParams,
) -> Result<ClearSkyIrradiance> {
    let key = KeyBuilder::new("clear_sky")
        .timestamps(&input.timestamps)
        .f64(input.elevation)
        .series(&input.altitude)
        .f64s(&input.in_shade.iter().map(|&s| if s { 1.0 } else { 0.0 }).collect::<Vec<_>>())
        .series(&input.linke)
        .f64(params.solar_constant)
        .f64(params.orbit.perigee_offset)
        .f64(params.orbit.eccentricity_amplitude)
        .f64(params.limits.lower)
        .f64(params.limits.upper)
        .bool(params.limits.clip)
        .finish();
    cache.get_or_compute(key, || clear_sky(input, params))
}

/// Clear-sky atmospheric transmission model
pub struct ClearSkyModel;

impl Algorithm for ClearSkyModel {
    type Input = ClearSkyInput;
    type Output = ClearSkyIrradiance;
    type Params = AtmosphereParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "ClearSky"
    }

    fn description(&self) -> &'static str {
        "Clear-sky extraterrestrial, direct and diffuse irradiance (Hofierka 2002)"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        clear_sky(&input, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn input(altitudes: Vec<f64>) -> ClearSkyInput {
        let n = altitudes.len();
        ClearSkyInput {
            timestamps: Timestamps::hourly(Utc.with_ymd_and_hms(2024, 6, 21, 4, 0, 0).unwrap(), n),
            elevation: 20.0,
            altitude: TimeSeries::from_vec(altitudes),
            in_shade: TimeSeries::filled(n, false),
            linke: constant_linke(n, 3.0),
        }
    }

    #[test]
    fn test_clear_sky_components() {
        let r = clear_sky(&input(vec![-0.2, 0.02, 0.5, 1.2]), &AtmosphereParams::default()).unwrap();
        let bh = &r.direct_horizontal.value;
        let dh = &r.diffuse_horizontal.value;
        assert_eq!(bh.get(0).unwrap(), 0.0);
        assert_eq!(dh.get(0).unwrap(), 0.0);
        assert!(bh.get(3).unwrap() > bh.get(2).unwrap());
        assert!(dh.get(3).unwrap() > 0.0);
        // beam never exceeds what arrives at the top of the atmosphere
        for i in 0..4 {
            assert!(
                bh.get(i).unwrap() <= r.extraterrestrial_horizontal.value.get(i).unwrap() + 1e-9,
                "Bh above G0h at {}",
                i
            );
        }
        assert!(r.direct_horizontal.out_of_range.is_empty());
    }

    #[test]
    fn test_invalid_linke() {
        let mut i = input(vec![0.5, 0.6]);
        i.linke = TimeSeries::from_vec(vec![3.0, -1.0]);
        assert!(matches!(
            clear_sky(&i, &AtmosphereParams::default()),
            Err(Error::InvalidParameter { .. })
        ));
        i.linke = TimeSeries::from_vec(vec![3.0]);
        assert!(matches!(
            clear_sky(&i, &AtmosphereParams::default()),
            Err(Error::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_cached_matches_direct_call() {
        let cache = MemoCache::new(2);
        let params = AtmosphereParams::default();
        let i = input(vec![0.3, 0.9]);
        let a = clear_sky_cached(&cache, &i, &params).unwrap();
        let b = clear_sky_cached(&cache, &i, &params).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, clear_sky(&i, &params).unwrap());
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_algorithm_trait() {
        let r = ClearSkyModel.execute_default(input(vec![0.7])).unwrap();
        assert!(r.direct_normal.value.get(0).unwrap() > 0.0);
    }
}
