//! Clear-sky beam irradiance

use pvirr_core::{Result, TimeSeries};

use super::air_mass::rayleigh_optical_thickness;
use super::AtmosphereParams;
use crate::irradiance::component::{ComponentKind, IrradianceComponent};

const MODEL: &str = "Hofierka 2002";

/// Linke turbidity scaled into the beam exponent, `−0.8662·TLK`
pub fn corrected_linke_turbidity(linke: f64) -> f64 {
    -0.8662 * linke
}

/// `B0c = G0·exp(−0.8662·TLK·m·δR(m))` for one sample.
///
/// Zero when the air mass is not finite (sun at or below the horizon).
pub fn direct_normal_value(extraterrestrial_normal: f64, linke: f64, air_mass: f64) -> f64 {
    if !air_mass.is_finite() {
        return 0.0;
    }
    let exponent = corrected_linke_turbidity(linke) * air_mass * rayleigh_optical_thickness(air_mass);
    extraterrestrial_normal * exponent.exp()
}

/// Clear-sky direct normal irradiance.
///
/// # Errors
/// [`pvirr_core::Error::LengthMismatch`] if the series are not aligned with
/// the extraterrestrial irradiance.
pub fn clear_sky_direct_normal(
    extraterrestrial_normal: &IrradianceComponent,
    linke: &TimeSeries<f64>,
    air_mass: &TimeSeries<f64>,
    params: &AtmosphereParams,
) -> Result<IrradianceComponent> {
    let n = extraterrestrial_normal.len();
    linke.ensure_len("linke turbidity", n)?;
    air_mass.ensure_len("air mass", n)?;
    let (g0, tl, m) = (extraterrestrial_normal.value.data(), linke.data(), air_mass.data());
    let value: TimeSeries<f64> = (0..n).map(|i| direct_normal_value(g0[i], tl[i], m[i])).collect::<Vec<_>>().into();
    Ok(IrradianceComponent::new(ComponentKind::DirectNormal, MODEL, value)
        .checked(&params.limits)
        .with_parents(vec![extraterrestrial_normal.clone()]))
}

/// `Bh = B0c·sin h` where the sun is above the horizon and the surface is not shaded.
pub fn direct_horizontal(
    direct_normal: &IrradianceComponent,
    altitude: &TimeSeries<f64>,
    in_shade: &TimeSeries<bool>,
    params: &AtmosphereParams,
) -> Result<IrradianceComponent> {
    let n = direct_normal.len();
    altitude.ensure_len("solar altitude", n)?;
    in_shade.ensure_len("in_shade", n)?;
    let (b0c, alt, shade) = (direct_normal.value.data(), altitude.data(), in_shade.data());
    let value: TimeSeries<f64> = (0..n)
        .map(|i| {
            if alt[i] > 0.0 && !shade[i] {
                b0c[i] * alt[i].sin()
            } else {
                0.0
            }
        })
        .collect::<Vec<_>>()
        .into();
    Ok(IrradianceComponent::new(ComponentKind::DirectHorizontal, direct_normal.model, value)
        .checked(&params.limits)
        .with_parents(vec![direct_normal.clone()]))
}

/// `B0c = Bh / sin h` where the sun is above the horizon, else 0.
pub fn direct_normal_from_horizontal(
    direct_horizontal: &IrradianceComponent,
    altitude: &TimeSeries<f64>,
    params: &AtmosphereParams,
) -> Result<IrradianceComponent> {
    let value = direct_horizontal
        .value
        .zip_map(altitude, |bh, h| if h > 0.0 { bh / h.sin() } else { 0.0 })?;
    Ok(IrradianceComponent::new(ComponentKind::DirectNormal, "from horizontal", value)
        .checked(&params.limits)
        .with_parents(vec![direct_horizontal.clone()]))
}
