//! Solar geometry: declination, hour angle, altitude, azimuth, incidence
//!
//! Every quantity is produced for a whole timestamp sequence by one of
//! several closed-form model families, selected through
//! [`PositionAlgorithm`] and [`TimingAlgorithm`]:
//!
//! | family     | declination                  | azimuth               |
//! |------------|------------------------------|-----------------------|
//! | `Noaa`     | Spencer on fractional year   | NOAA, from zenith     |
//! | `Hofierka` | Hofierka (2002) day angle    | atan2 (hour angle)    |
//! | `Iqbal`    | Spencer on day of year       | atan2 (hour angle)    |
//!
//! Azimuth is always returned clockwise from North and tagged
//! [`AzimuthOrigin::North`].

pub mod altitude;
pub mod azimuth;
pub mod declination;
pub mod incidence;
pub mod timing;

pub use incidence::{solar_incidence, IncidenceAlgorithm, IncidenceParams, SolarIncidence, NO_SOLAR_INCIDENCE};
pub use timing::TimingAlgorithm;

use chrono_tz::Tz;
use pvirr_core::constants::{ECCENTRICITY_CORRECTION_FACTOR, MAX_DECLINATION, PERIGEE_OFFSET};
use pvirr_core::{
    Algorithm, AngleSeries, AzimuthOrigin, AzimuthSeries, Error, Location, Result, TimeSeries, Timestamps,
};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

use crate::cache::{KeyBuilder, MemoCache};
use crate::maybe_rayon::*;

/// Solar position model family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PositionAlgorithm {
    #[default]
    Noaa,
    Hofierka,
    Iqbal,
}

impl PositionAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            PositionAlgorithm::Noaa => "NOAA",
            PositionAlgorithm::Hofierka => "Hofierka",
            PositionAlgorithm::Iqbal => "Iqbal",
        }
    }
}

impl fmt::Display for PositionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PositionAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "noaa" => Ok(PositionAlgorithm::Noaa),
            "hofierka" | "jenco" => Ok(PositionAlgorithm::Hofierka),
            "iqbal" => Ok(PositionAlgorithm::Iqbal),
            _ => Err(Error::invalid(
                "position_algorithm",
                s,
                "expected noaa, hofierka or iqbal",
            )),
        }
    }
}

/// Earth orbit eccentricity correction used in the day-angle terms
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrbitalParams {
    /// Perigee phase offset φ, radians
    pub perigee_offset: f64,
    /// Eccentricity amplitude e
    pub eccentricity_amplitude: f64,
}

impl Default for OrbitalParams {
    fn default() -> Self {
        Self {
            perigee_offset: PERIGEE_OFFSET,
            eccentricity_amplitude: ECCENTRICITY_CORRECTION_FACTOR,
        }
    }
}

/// Parameters for the solar position computation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarPositionParams {
    pub position_algorithm: PositionAlgorithm,
    pub timing_algorithm: TimingAlgorithm,
    /// Add the NOAA refraction correction to the altitude
    pub refraction: bool,
    pub orbit: OrbitalParams,
}

impl Default for SolarPositionParams {
    fn default() -> Self {
        Self {
            position_algorithm: PositionAlgorithm::Noaa,
            timing_algorithm: TimingAlgorithm::Noaa,
            refraction: true,
            orbit: OrbitalParams::default(),
        }
    }
}

/// Input of a solar position computation
#[derive(Debug, Clone)]
pub struct SolarPositionInput {
    pub location: Location,
    pub timestamps: Timestamps,
    pub timezone: Tz,
}

/// Solar geometry for one location over a timestamp sequence.
///
/// Angles are radians. Out-of-range samples are kept as computed and
/// listed by index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarPositionResult {
    pub declination: AngleSeries,
    pub hour_angle: AngleSeries,
    pub altitude: AngleSeries,
    pub azimuth: AzimuthSeries,
    pub position_algorithm: PositionAlgorithm,
    pub timing_algorithm: TimingAlgorithm,
    pub refracted: bool,
    /// Indices with |declination| above the axial-tilt bound
    pub declination_out_of_range: Vec<usize>,
    /// Indices with altitude outside [-π/2, π/2]
    pub altitude_out_of_range: Vec<usize>,
}

impl SolarPositionResult {
    pub fn len(&self) -> usize {
        self.altitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.altitude.is_empty()
    }

    /// Solar zenith `π/2 − altitude`
    pub fn zenith(&self) -> TimeSeries<f64> {
        self.altitude.radians().map(|h| FRAC_PI_2 - h)
    }
}

/// Solar position model
pub struct SolarPosition;

impl Algorithm for SolarPosition {
    type Input = SolarPositionInput;
    type Output = SolarPositionResult;
    type Params = SolarPositionParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "SolarPosition"
    }

    fn description(&self) -> &'static str {
        "Solar declination, hour angle, altitude and azimuth for a timestamp sequence"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        solar_position(&input.location, &input.timestamps, input.timezone, &params)
    }
}

/// Compute solar geometry for every timestamp.
///
/// # Errors
/// [`Error::EmptySeries`] if `timestamps` is empty.
pub fn solar_position(
    location: &Location,
    timestamps: &Timestamps,
    timezone: Tz,
    params: &SolarPositionParams,
) -> Result<SolarPositionResult> {
    timestamps.ensure_not_empty()?;
    let lat = location.latitude;
    let lon = location.longitude;
    let instants = timestamps.as_slice();
    let hour_angle = timing::hour_angle_series(timestamps, lon, timezone, params.timing_algorithm);
    let hour_angles = hour_angle.data();

    // (declination, altitude, azimuth) per timestamp
    let samples: Vec<(f64, f64, f64)> = (0..instants.len())
        .into_par_iter()
        .map(|i| {
            let t = &instants[i];
            let ha = hour_angles[i];
            let dec = match params.position_algorithm {
                PositionAlgorithm::Noaa => declination::declination_noaa(t),
                PositionAlgorithm::Hofierka => {
                    declination::declination_hofierka(declination::day_angle(t), &params.orbit)
                }
                PositionAlgorithm::Iqbal => declination::declination_iqbal(t),
            };
            let geometric = altitude::solar_altitude(lat, dec, ha);
            let az = match params.position_algorithm {
                PositionAlgorithm::Noaa => {
                    azimuth::solar_azimuth_noaa(lat, dec, ha, FRAC_PI_2 - geometric)
                }
                PositionAlgorithm::Hofierka | PositionAlgorithm::Iqbal => {
                    azimuth::solar_azimuth_atan2(lat, dec, ha)
                }
            };
            let alt = if params.refraction {
                altitude::apparent_altitude(geometric)
            } else {
                geometric
            };
            (dec, alt, az)
        })
        .collect();

    let declination = TimeSeries::from_vec(samples.iter().map(|s| s.0).collect());
    let altitude = TimeSeries::from_vec(samples.iter().map(|s| s.1).collect());
    let azimuth = TimeSeries::from_vec(samples.iter().map(|s| s.2).collect());

    let declination_out_of_range = declination.indices_outside(-MAX_DECLINATION, MAX_DECLINATION);
    if !declination_out_of_range.is_empty() {
        warn!(
            count = declination_out_of_range.len(),
            algorithm = params.position_algorithm.name(),
            "solar declination outside the expected range"
        );
    }
    let altitude_out_of_range = altitude.indices_outside(-FRAC_PI_2, FRAC_PI_2);
    if !altitude_out_of_range.is_empty() {
        warn!(
            count = altitude_out_of_range.len(),
            "solar altitude outside [-pi/2, pi/2]"
        );
    }

    Ok(SolarPositionResult {
        declination: AngleSeries::from_radians(declination),
        hour_angle: AngleSeries::from_radians(hour_angle),
        altitude: AngleSeries::from_radians(altitude),
        azimuth: AzimuthSeries::new(azimuth, AzimuthOrigin::North),
        position_algorithm: params.position_algorithm,
        timing_algorithm: params.timing_algorithm,
        refracted: params.refraction,
        declination_out_of_range,
        altitude_out_of_range,
    })
}

/// [`solar_position`] through a memoization cache.
pub fn solar_position_cached(
    cache: &MemoCache<SolarPositionResult>,
    location: &Location,
    timestamps: &Timestamps,
    timezone: Tz,
    params: &SolarPositionParams,
) -> Result<SolarPositionResult> {
    let key = KeyBuilder::new("solar_position")
        .f64(location.longitude)
        .f64(location.latitude)
        .timestamps(timestamps)
        .str(timezone.name())
        .str(params.position_algorithm.name())
        .str(params.timing_algorithm.name())
        .bool(params.refraction)
        .f64(params.orbit.perigee_offset)
        .f64(params.orbit.eccentricity_amplitude)
        .finish();
    cache.get_or_compute(key, || solar_position(location, timestamps, timezone, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::f64::consts::PI;

    fn rome() -> Location {
        Location::from_degrees(12.496, 41.903, 20.0).unwrap()
    }

    fn june_day() -> Timestamps {
        Timestamps::hourly(Utc.with_ymd_and_hms(2024, 6, 21, 0, 0, 0).unwrap(), 24)
    }

    #[test]
    fn test_rome_summer_solstice() {
        for algorithm in [PositionAlgorithm::Noaa, PositionAlgorithm::Hofierka, PositionAlgorithm::Iqbal] {
            let params = SolarPositionParams {
                position_algorithm: algorithm,
                refraction: false,
                ..Default::default()
            };
            let r = solar_position(&rome(), &june_day(), chrono_tz::UTC, &params).unwrap();
            assert_eq!(r.len(), 24);
            assert_eq!(r.azimuth.origin(), AzimuthOrigin::North);

            let alt = r.altitude.degrees();
            // midnight below horizon, 11 UTC near the daily maximum of ~71.5°
            assert!(alt.get(0).unwrap() < 0.0, "{}: midnight altitude {}", algorithm, alt.get(0).unwrap());
            let noon = alt.get(11).unwrap();
            assert!((noon - 71.3).abs() < 1.5, "{}: 11 UTC altitude {}", algorithm, noon);

            let az = r.azimuth.radians();
            assert!(az.get(7).unwrap() < PI, "{}: morning azimuth should be east", algorithm);
            assert!(az.get(15).unwrap() > PI, "{}: afternoon azimuth should be west", algorithm);
            assert!(r.declination_out_of_range.is_empty());
            assert!(r.altitude_out_of_range.is_empty());
        }
    }

    #[test]
    fn test_refraction_raises_altitude() {
        let plain = solar_position(&rome(), &june_day(), chrono_tz::UTC, &SolarPositionParams {
            refraction: false,
            ..Default::default()
        })
        .unwrap();
        let refracted = solar_position(&rome(), &june_day(), chrono_tz::UTC, &SolarPositionParams::default()).unwrap();
        assert!(refracted.refracted);
        for i in 5..18 {
            assert!(
                refracted.altitude.values().get(i).unwrap() >= plain.altitude.values().get(i).unwrap(),
                "refraction lowered altitude at {}",
                i
            );
        }
    }

    #[test]
    fn test_empty_timestamps_rejected() {
        let ts = Timestamps::new(vec![]).unwrap();
        let err = solar_position(&rome(), &ts, chrono_tz::UTC, &SolarPositionParams::default()).unwrap_err();
        assert_eq!(err, Error::EmptySeries { name: "timestamps" });
    }

    #[test]
    fn test_cached_is_identical() {
        let cache = MemoCache::new(4);
        let params = SolarPositionParams::default();
        let a = solar_position_cached(&cache, &rome(), &june_day(), chrono_tz::UTC, &params).unwrap();
        let b = solar_position_cached(&cache, &rome(), &june_day(), chrono_tz::UTC, &params).unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(a, solar_position(&rome(), &june_day(), chrono_tz::UTC, &params).unwrap());
    }

    #[test]
    fn test_algorithm_trait() {
        let input = SolarPositionInput {
            location: rome(),
            timestamps: june_day(),
            timezone: chrono_tz::Europe::Rome,
        };
        let r = SolarPosition.execute_default(input).unwrap();
        assert_eq!(r.position_algorithm, PositionAlgorithm::Noaa);
        assert_eq!(SolarPosition.name(), "SolarPosition");
    }

    #[test]
    fn test_display_timezone_does_not_move_the_sun() {
        let tokyo = Location::from_degrees(139.7, 35.7, 40.0).unwrap();
        let params = SolarPositionParams::default();
        let utc = solar_position(&tokyo, &june_day(), chrono_tz::UTC, &params).unwrap();
        let local = solar_position(&tokyo, &june_day(), chrono_tz::Asia::Tokyo, &params).unwrap();
        for i in 0..utc.len() {
            let (a, b) = (utc.hour_angle.values().get(i).unwrap(), local.hour_angle.values().get(i).unwrap());
            assert!((a - b).abs() < 1e-9, "hour angle at {}: {} vs {}", i, a, b);
            let (a, b) = (utc.altitude.values().get(i).unwrap(), local.altitude.values().get(i).unwrap());
            assert!((a - b).abs() < 1e-9, "altitude at {}: {} vs {}", i, a, b);
        }
    }
}
