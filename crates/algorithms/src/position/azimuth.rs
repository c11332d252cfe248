//! Solar azimuth
//!
//! Both variants return the azimuth clockwise from North in `[0, 2π)`.

use pvirr_core::angle::wrap_two_pi;
use std::f64::consts::PI;

/// NOAA azimuth from the solar zenith angle.
pub fn solar_azimuth_noaa(latitude: f64, declination: f64, hour_angle: f64, zenith: f64) -> f64 {
    let denominator = latitude.cos() * zenith.sin();
    let ratio = if denominator.abs() < 1e-12 {
        1.0
    } else {
        ((latitude.sin() * zenith.cos() - declination.sin()) / denominator).clamp(-1.0, 1.0)
    };
    let a = ratio.acos();
    if hour_angle > 0.0 {
        wrap_two_pi(a + PI)
    } else {
        wrap_two_pi(3.0 * PI - a)
    }
}

/// Azimuth from hour angle and declination via `atan2`, no zenith needed.
///
/// The south-referenced form `atan2(sin H, cos H·sin φ − tan δ·cos φ)` is
/// shifted by π to North.
pub fn solar_azimuth_atan2(latitude: f64, declination: f64, hour_angle: f64) -> f64 {
    let from_south = hour_angle
        .sin()
        .atan2(hour_angle.cos() * latitude.sin() - declination.tan() * latitude.cos());
    wrap_two_pi(from_south + PI)
}
