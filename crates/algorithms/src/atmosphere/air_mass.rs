//! Optical air mass and Rayleigh optical thickness (Kasten, Hofierka 2002)

use pvirr_core::constants::ATMOSPHERE_SCALE_HEIGHT;
use pvirr_core::TimeSeries;

/// Pressure ratio `p/p0 = exp(−z/8434.5)` for an elevation in metres.
pub fn elevation_correction(elevation: f64) -> f64 {
    (-elevation / ATMOSPHERE_SCALE_HEIGHT).exp()
}

/// Solar altitude corrected for refraction, radians in and out.
///
/// The correction term is a rational function of the altitude in degrees
/// and yields radians.
pub fn refracted_altitude(altitude: f64) -> f64 {
    let h = altitude.to_degrees();
    let correction = 0.061359 * (0.1594 + 1.123 * h + 0.065656 * h * h)
        / (1.0 + 28.9344 * h + 277.3971 * h * h);
    altitude + correction
}

/// Kasten's optical air mass for a refracted altitude (radians).
pub fn optical_air_mass(refracted_altitude: f64, elevation_correction: f64) -> f64 {
    let h_deg = refracted_altitude.to_degrees();
    elevation_correction / (refracted_altitude.sin() + 0.50572 * (h_deg + 6.07995).powf(-1.6364))
}

/// Rayleigh optical thickness δR(m).
pub fn rayleigh_optical_thickness(m: f64) -> f64 {
    if m <= 20.0 {
        1.0 / (6.6296 + 1.7513 * m - 0.1202 * m.powi(2) + 0.0065 * m.powi(3) - 0.00013 * m.powi(4))
    } else {
        1.0 / (10.4 + 0.718 * m)
    }
}

/// Optical air mass per timestamp.
///
/// Infinite where the geometric altitude is at or below 0: there is no beam
/// to attenuate.
pub fn air_mass_series(altitude: &TimeSeries<f64>, elevation: f64) -> TimeSeries<f64> {
    let correction = elevation_correction(elevation);
    altitude.map(|h| {
        if h > 0.0 {
            optical_air_mass(refracted_altitude(h), correction)
        } else {
            f64::INFINITY
        }
    })
}
