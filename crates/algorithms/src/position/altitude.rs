//! Solar altitude and atmospheric refraction
//!
//! `sin h = cos φ·cos δ·cos H + sin φ·sin δ`. The optional refraction
//! adjustment follows the NOAA piecewise approximation and is skipped above
//! 85° where it is negligible.

/// Geometric solar altitude, radians.
pub fn solar_altitude(latitude: f64, declination: f64, hour_angle: f64) -> f64 {
    let sin_h = latitude.cos() * declination.cos() * hour_angle.cos()
        + latitude.sin() * declination.sin();
    sin_h.clamp(-1.0, 1.0).asin()
}

/// Refraction correction to add to a geometric altitude, radians.
pub fn refraction_correction(altitude: f64) -> f64 {
    let h = altitude.to_degrees();
    if h > 85.0 {
        return 0.0;
    }
    let t = altitude.tan();
    let arcsec = if h > 5.0 {
        58.1 / t - 0.07 / t.powi(3) + 0.000086 / t.powi(5)
    } else if h > -0.575 {
        1735.0 + h * (-518.2 + h * (103.4 + h * (-12.79 + h * 0.711)))
    } else {
        -20.774 / t
    };
    (arcsec / 3600.0).to_radians()
}

/// Altitude with the refraction correction applied.
pub fn apparent_altitude(altitude: f64) -> f64 {
    altitude + refraction_correction(altitude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_altitude_noon_equator_equinox() {
        assert_relative_eq!(solar_altitude(0.0, 0.0, 0.0), FRAC_PI_2, epsilon = 1e-9);
        assert_relative_eq!(solar_altitude(0.0, 0.0, FRAC_PI_2), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_altitude_symmetric_in_hour_angle() {
        let lat = 41.9_f64.to_radians();
        let dec = 0.4;
        assert_relative_eq!(
            solar_altitude(lat, dec, -1.0),
            solar_altitude(lat, dec, 1.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_refraction_at_horizon() {
        // about 29 arcminutes at the geometric horizon
        let r = refraction_correction(0.0).to_degrees() * 60.0;
        assert!((r - 28.9).abs() < 0.5, "horizon refraction: {} arcmin", r);
        assert_eq!(refraction_correction(86f64.to_radians()), 0.0);
        assert!(refraction_correction(30f64.to_radians()) > 0.0);
        assert!(apparent_altitude(0.1) > 0.1);
    }
}
