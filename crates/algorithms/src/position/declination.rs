//! Solar declination
//!
//! - Hofierka (2002): `δ = asin(0.3978·sin(j′ − 1.4 + e·sin(j′ − φ)))`, with
//!   the day angle `j′ = 2π·n/N`, eccentricity amplitude `e` and perigee
//!   phase offset `φ`.
//! - Spencer (1971) Fourier series, evaluated either on the day of year
//!   (as in Iqbal 1983) or on the NOAA fractional year.

use chrono::{DateTime, Datelike, Utc};
use pvirr_core::series::day_of_year;
use std::f64::consts::PI;

use super::timing::fractional_year;
use super::OrbitalParams;

/// Day angle `j′ = 2π·n/N`, radians.
pub fn day_angle(instant: &DateTime<Utc>) -> f64 {
    let (doy, days) = day_of_year(instant);
    2.0 * PI * doy as f64 / days as f64
}

/// Hofierka declination for a day angle.
pub fn declination_hofierka(day_angle: f64, orbit: &OrbitalParams) -> f64 {
    let arg = day_angle - 1.4
        + orbit.eccentricity_amplitude * (day_angle - orbit.perigee_offset).sin();
    (0.3978 * arg.sin()).asin()
}

/// Spencer's Fourier series for a year angle γ.
pub fn declination_spencer(gamma: f64) -> f64 {
    0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin()
}

/// Spencer declination on the NOAA fractional year (hour-resolved).
pub fn declination_noaa(instant: &DateTime<Utc>) -> f64 {
    declination_spencer(fractional_year(instant))
}

/// Spencer declination on the day of year, `Γ = 2π(n − 1)/N` (Iqbal 1983).
pub fn declination_iqbal(instant: &DateTime<Utc>) -> f64 {
    let (_, days) = day_of_year(instant);
    let gamma = 2.0 * PI * (instant.ordinal() as f64 - 1.0) / days as f64;
    declination_spencer(gamma)
}
