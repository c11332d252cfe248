//! Clear-sky diffuse horizontal irradiance (Hofierka 2002)

use pvirr_core::constants::MIN_DIFFUSE_TRANSMISSION;
use pvirr_core::{Error, Result, TimeSeries};

use super::AtmosphereParams;
use crate::irradiance::component::{ComponentKind, IrradianceComponent};

const MODEL: &str = "Hofierka 2002";

/// Diffuse transmission at zenith `Tn(TLK)`, floored to stay positive.
pub fn diffuse_transmission(linke: f64) -> f64 {
    (-0.015843 + 0.030543 * linke + 0.0003797 * linke * linke).max(MIN_DIFFUSE_TRANSMISSION)
}

/// Coefficients `(a1, a2, a3)` of the diffuse solar-altitude function.
///
/// `a1` is raised to `0.0022/Tn` whenever `a1′·Tn < 0.0022`.
pub fn diffuse_altitude_coefficients(linke: f64, transmission: f64) -> (f64, f64, f64) {
    let a1_prime = 0.26463 - 0.061581 * linke + 0.0031408 * linke * linke;
    let a1 = if a1_prime * transmission < 0.0022 {
        (0.0022 / transmission).max(a1_prime)
    } else {
        a1_prime
    };
    let a2 = 2.04020 + 0.018945 * linke - 0.011161 * linke * linke;
    let a3 = -1.3025 + 0.039231 * linke + 0.0085079 * linke * linke;
    (a1, a2, a3)
}

/// Diffuse solar-altitude function `Fd(h) = a1 + a2·sin h + a3·sin² h`.
pub fn diffuse_altitude_function(altitude: f64, linke: f64, transmission: f64) -> f64 {
    let (a1, a2, a3) = diffuse_altitude_coefficients(linke, transmission);
    let s = altitude.sin();
    a1 + a2 * s + a3 * s * s
}

/// `Dh = G0·Tn·Fd(h)` for one sample; 0 below the horizon and never negative.
pub fn diffuse_horizontal_value(extraterrestrial_normal: f64, linke: f64, altitude: f64) -> f64 {
    if altitude < 0.0 {
        return 0.0;
    }
    let tn = diffuse_transmission(linke);
    (extraterrestrial_normal * tn * diffuse_altitude_function(altitude, linke, tn)).max(0.0)
}

/// Clear-sky diffuse horizontal irradiance.
pub fn clear_sky_diffuse_horizontal(
    extraterrestrial_normal: &IrradianceComponent,
    linke: &TimeSeries<f64>,
    altitude: &TimeSeries<f64>,
    params: &AtmosphereParams,
) -> Result<IrradianceComponent> {
    let n = extraterrestrial_normal.len();
    linke.ensure_len("linke turbidity", n)?;
    altitude.ensure_len("solar altitude", n)?;
    let (g0, tl, alt) = (extraterrestrial_normal.value.data(), linke.data(), altitude.data());
    let value: TimeSeries<f64> = (0..n)
        .map(|i| diffuse_horizontal_value(g0[i], tl[i], alt[i]))
        .collect::<Vec<_>>()
        .into();
    Ok(IrradianceComponent::new(ComponentKind::DiffuseHorizontal, MODEL, value)
        .checked(&params.limits)
        .with_parents(vec![extraterrestrial_normal.clone()]))
}

/// Diffuse horizontal as `global − direct` from caller-supplied series.
///
/// # Errors
/// [`Error::LengthMismatch`] if the series differ in length.
pub fn diffuse_horizontal_from_external(
    global_horizontal: &IrradianceComponent,
    direct_horizontal: &IrradianceComponent,
    params: &AtmosphereParams,
) -> Result<IrradianceComponent> {
    if global_horizontal.len() != direct_horizontal.len() {
        return Err(Error::LengthMismatch {
            name: "direct horizontal",
            expected: global_horizontal.len(),
            actual: direct_horizontal.len(),
        });
    }
    let value = global_horizontal.value.sub(&direct_horizontal.value)?;
    Ok(IrradianceComponent::new(ComponentKind::DiffuseHorizontal, "global minus direct", value)
        .checked(&params.limits)
        .with_parents(vec![global_horizontal.clone(), direct_horizontal.clone()]))
}
