//! Solar incidence angle on an inclined surface
//!
//! - Iqbal (1983): `cos I = cos θz·cos β + sin β·sin θz·cos(Az − γ)`,
//!   returned as the typical angle (sun-vector to surface normal).
//! - Jenčo (1992), as used by Hofierka (2002): the inclined plane is replaced
//!   by a horizontal plane at an equivalent latitude φ′ and relative
//!   longitude λ′, giving `sin δexp = cos φ′·cos δ·cos(H − λ′) + sin φ′·sin δ`.
//!   Returned as the complementary angle (sun-vector to surface plane).
//!
//! When the sun is behind the plane or below the horizon, incidence is set
//! to [`NO_SOLAR_INCIDENCE`] on the complementary scale (typical π/2),
//! unless zeroing is disabled.

use pvirr_core::{
    Error, IncidenceDefinition, IncidenceSeries, Location, Result, SurfaceGeometry, TimeSeries,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use super::SolarPositionResult;
use crate::maybe_rayon::series_from_fn;

/// Complementary incidence angle assigned when the surface receives no beam
pub const NO_SOLAR_INCIDENCE: f64 = 0.0;

/// Incidence angle model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IncidenceAlgorithm {
    #[default]
    Iqbal,
    Jenco,
}

impl IncidenceAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            IncidenceAlgorithm::Iqbal => "Iqbal",
            IncidenceAlgorithm::Jenco => "Jenco",
        }
    }

    /// Definition of the angle the model natively produces
    pub fn native_definition(&self) -> IncidenceDefinition {
        match self {
            IncidenceAlgorithm::Iqbal => IncidenceDefinition::Typical,
            IncidenceAlgorithm::Jenco => IncidenceDefinition::Complementary,
        }
    }
}

impl fmt::Display for IncidenceAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IncidenceAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "iqbal" => Ok(IncidenceAlgorithm::Iqbal),
            "jenco" | "jenčo" => Ok(IncidenceAlgorithm::Jenco),
            _ => Err(Error::invalid("incidence_algorithm", s, "expected iqbal or jenco")),
        }
    }
}

/// Parameters for the incidence computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncidenceParams {
    pub algorithm: IncidenceAlgorithm,
    /// Replace negative and below-horizon incidence with [`NO_SOLAR_INCIDENCE`]
    pub zero_negative: bool,
}

impl Default for IncidenceParams {
    fn default() -> Self {
        Self {
            algorithm: IncidenceAlgorithm::Iqbal,
            zero_negative: true,
        }
    }
}

/// Incidence angle series with the model that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarIncidence {
    pub angle: IncidenceSeries,
    pub algorithm: IncidenceAlgorithm,
}

/// Typical incidence (Iqbal) for one sample.
pub fn incidence_iqbal(zenith: f64, azimuth_north: f64, surface: &SurfaceGeometry) -> f64 {
    let beta = surface.tilt;
    let cos_i = zenith.cos() * beta.cos()
        + beta.sin() * zenith.sin() * (azimuth_north - surface.orientation).cos();
    cos_i.clamp(-1.0, 1.0).acos()
}

/// Complementary incidence (Jenčo) for one sample.
pub fn incidence_jenco(
    latitude: f64,
    declination: f64,
    hour_angle: f64,
    surface: &SurfaceGeometry,
) -> f64 {
    let beta = surface.tilt;
    let gamma = surface.orientation_from_south();
    let sin_lat_eq = (-latitude.cos() * beta.sin() * gamma.cos() + latitude.sin() * beta.cos())
        .clamp(-1.0, 1.0);
    let lat_eq = sin_lat_eq.asin();
    let lon_rel = (beta.sin() * gamma.sin())
        .atan2(beta.cos() * latitude.cos() + beta.sin() * gamma.cos() * latitude.sin());
    let sin_delta_exp = lat_eq.cos() * declination.cos() * (hour_angle - lon_rel).cos()
        + sin_lat_eq * declination.sin();
    sin_delta_exp.clamp(-1.0, 1.0).asin()
}

/// Solar incidence for every timestamp of `position`.
pub fn solar_incidence(
    position: &SolarPositionResult,
    location: &Location,
    surface: &SurfaceGeometry,
    params: IncidenceParams,
) -> Result<SolarIncidence> {
    let n = position.len();
    let altitude = position.altitude.radians();
    let azimuth = position.azimuth.radians_from(pvirr_core::AzimuthOrigin::North);
    let declination = position.declination.radians();
    let hour_angle = position.hour_angle.radians();
    for (name, s) in [
        ("azimuth", &azimuth),
        ("declination", &declination),
        ("hour_angle", &hour_angle),
    ] {
        s.ensure_len(name, n)?;
    }

    let (alt, az, dec, ha) = (altitude.data(), azimuth.data(), declination.data(), hour_angle.data());
    let complementary: TimeSeries<f64> = series_from_fn(n, |i| {
        let c = match params.algorithm {
            IncidenceAlgorithm::Iqbal => FRAC_PI_2 - incidence_iqbal(FRAC_PI_2 - alt[i], az[i], surface),
            IncidenceAlgorithm::Jenco => incidence_jenco(location.latitude, dec[i], ha[i], surface),
        };
        if params.zero_negative && (c < 0.0 || alt[i] < 0.0) {
            NO_SOLAR_INCIDENCE
        } else {
            c
        }
    });

    let angle = IncidenceSeries::new(complementary, IncidenceDefinition::Complementary)
        .to_definition(params.algorithm.native_definition());
    Ok(SolarIncidence {
        angle,
        algorithm: params.algorithm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_iqbal_flat_surface_equals_zenith() {
        let flat = SurfaceGeometry::new(PI, 0.0).unwrap();
        assert_relative_eq!(incidence_iqbal(0.7, 2.0, &flat), 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_iqbal_normal_incidence() {
        // sun due south at 60° altitude, surface tilted 30° toward south
        let s = SurfaceGeometry::from_degrees(180.0, 30.0).unwrap();
        let i = incidence_iqbal(30f64.to_radians(), PI, &s);
        assert_relative_eq!(i, 0.0, epsilon = 1e-7);
    }

    #[test]
    fn test_jenco_matches_iqbal() {
        let lat = 41.903_f64.to_radians();
        let dec = 0.35;
        for (orientation, tilt) in [(180.0, 30.0), (90.0, 45.0), (250.0, 20.0), (0.0, 10.0)] {
            let s = SurfaceGeometry::from_degrees(orientation, tilt).unwrap();
            for h in [-1.2, -0.4, 0.0, 0.5, 1.1] {
                let alt = crate::position::altitude::solar_altitude(lat, dec, h);
                let az = crate::position::azimuth::solar_azimuth_atan2(lat, dec, h);
                let typical = incidence_iqbal(FRAC_PI_2 - alt, az, &s);
                let comp = incidence_jenco(lat, dec, h, &s);
                assert!(
                    (FRAC_PI_2 - typical - comp).abs() < 1e-9,
                    "orientation {} tilt {} H {}: iqbal {} vs jenco {}",
                    orientation, tilt, h, FRAC_PI_2 - typical, comp
                );
            }
        }
    }

    #[test]
    fn test_parse_incidence() {
        assert_eq!("Jenco".parse::<IncidenceAlgorithm>().unwrap(), IncidenceAlgorithm::Jenco);
        assert!("perez".parse::<IncidenceAlgorithm>().is_err());
    }
}
