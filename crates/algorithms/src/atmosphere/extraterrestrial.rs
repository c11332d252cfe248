//! Irradiance at the top of the atmosphere

use chrono::{DateTime, Utc};
use pvirr_core::constants::{EXTRATERRESTRIAL_NORMAL_MAX, EXTRATERRESTRIAL_NORMAL_MIN};
use pvirr_core::{Result, TimeSeries, Timestamps};
use tracing::warn;

use super::AtmosphereParams;
use crate::irradiance::component::{ComponentKind, IrradianceComponent};
use crate::position::declination::day_angle;
use crate::position::OrbitalParams;

pub(crate) const MODEL: &str = "Hofierka 2002";

/// `G0 = I0·(1 + e·cos(j′ − φ))` for one instant.
pub fn extraterrestrial_normal_at(instant: &DateTime<Utc>, solar_constant: f64, orbit: &OrbitalParams) -> f64 {
    let j = day_angle(instant);
    solar_constant * (1.0 + orbit.eccentricity_amplitude * (j - orbit.perigee_offset).cos())
}

/// Extraterrestrial normal irradiance for every timestamp.
///
/// Values outside the annual range [1315, 1407] W·m⁻² only raise a warning.
pub fn extraterrestrial_normal(timestamps: &Timestamps, params: &AtmosphereParams) -> IrradianceComponent {
    let value: TimeSeries<f64> = timestamps
        .iter()
        .map(|t| extraterrestrial_normal_at(t, params.solar_constant, &params.orbit))
        .collect::<Vec<_>>()
        .into();
    let unusual = value.indices_outside(EXTRATERRESTRIAL_NORMAL_MIN, EXTRATERRESTRIAL_NORMAL_MAX);
    if !unusual.is_empty() {
        warn!(
            count = unusual.len(),
            solar_constant = params.solar_constant,
            "extraterrestrial normal irradiance outside [1315, 1407] W/m2"
        );
    }
    IrradianceComponent::new(ComponentKind::ExtraterrestrialNormal, MODEL, value).checked(&params.limits)
}

/// `G0h = G0·sin h`, zero where the sun is at or below the horizon.
///
/// # Errors
/// [`pvirr_core::Error::LengthMismatch`] if the series are not aligned.
pub fn extraterrestrial_horizontal(
    normal: &IrradianceComponent,
    altitude: &TimeSeries<f64>,
) -> Result<IrradianceComponent> {
    let value = normal
        .value
        .zip_map(altitude, |g0, h| if h > 0.0 { g0 * h.sin() } else { 0.0 })?;
    Ok(
        IrradianceComponent::new(ComponentKind::ExtraterrestrialHorizontal, MODEL, value)
            .with_parents(vec![normal.clone()]),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    #[test]
    fn test_annual_range() {
        let params = AtmosphereParams::default();
        let start = Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap();
        let ts = Timestamps::regular(start, chrono::Duration::days(1), 365).unwrap();
        let g0 = extraterrestrial_normal(&ts, &params);
        let (lo, hi) = (g0.value.min().unwrap(), g0.value.max().unwrap());
        assert!(lo > 1310.0 && hi < 1410.0, "range [{}, {}]", lo, hi);
        // perihelion in early January
        assert!(g0.value.get(2).unwrap() > g0.value.get(182).unwrap());
        assert!(g0.out_of_range.is_empty());
    }

    #[test]
    fn test_horizontal_projection() {
        let normal = IrradianceComponent::new(
            ComponentKind::ExtraterrestrialNormal,
            MODEL,
            TimeSeries::from_vec(vec![1360.0, 1360.0, 1360.0]),
        );
        let alt = TimeSeries::from_vec(vec![-0.2, 0.0, std::f64::consts::FRAC_PI_6]);
        let h = extraterrestrial_horizontal(&normal, &alt).unwrap();
        assert_eq!(h.value.get(0).unwrap(), 0.0);
        assert_eq!(h.value.get(1).unwrap(), 0.0);
        assert_relative_eq!(h.value.get(2).unwrap(), 680.0, epsilon = 1e-9);
        assert!(h.ancestor(ComponentKind::ExtraterrestrialNormal).is_some());
    }
}
