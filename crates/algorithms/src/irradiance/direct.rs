//! Direct (beam) irradiance on the inclined surface

use pvirr_core::{IncidenceSeries, Result, TimeSeries};

use super::component::{ComponentKind, IrradianceComponent};
use crate::maybe_rayon::series_from_fn;
use crate::shading::SunHorizonPosition;

/// `Bh·sin(δexp)/sin h` for one sample.
///
/// Zero unless the sun is above the low-angle band, the complementary
/// incidence is positive and the surface is not shaded.
pub fn direct_inclined_value(
    direct_horizontal: f64,
    altitude: f64,
    complementary_incidence: f64,
    in_shade: bool,
    position: SunHorizonPosition,
) -> f64 {
    let lit = position == SunHorizonPosition::Above
        && altitude > 0.0
        && complementary_incidence > 0.0
        && !in_shade;
    if lit {
        direct_horizontal * complementary_incidence.sin() / altitude.sin()
    } else {
        0.0
    }
}

/// Direct inclined irradiance before reflectivity loss.
///
/// # Errors
/// [`pvirr_core::Error::LengthMismatch`] if the series are not aligned.
pub fn direct_inclined(
    direct_horizontal: &IrradianceComponent,
    altitude: &TimeSeries<f64>,
    incidence: &IncidenceSeries,
    in_shade: &TimeSeries<bool>,
    sun_horizon: &TimeSeries<SunHorizonPosition>,
) -> Result<IrradianceComponent> {
    let n = direct_horizontal.len();
    altitude.ensure_len("solar altitude", n)?;
    incidence.radians().ensure_len("incidence", n)?;
    in_shade.ensure_len("in_shade", n)?;
    sun_horizon.ensure_len("sun-horizon position", n)?;

    let complementary = incidence.to_complementary();
    let (bh, alt, comp) = (direct_horizontal.value.data(), altitude.data(), complementary.radians().data());
    let (shade, pos) = (in_shade.data(), sun_horizon.data());
    let value = series_from_fn(n, |i| direct_inclined_value(bh[i], alt[i], comp[i], shade[i], pos[i]));
    Ok(IrradianceComponent::new(ComponentKind::DirectInclined, "Hofierka 2002", value)
        .with_parents(vec![direct_horizontal.clone()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pvirr_core::IncidenceDefinition;

    #[test]
    fn test_value_regimes() {
        use SunHorizonPosition::*;
        let v = direct_inclined_value(600.0, 0.8, 1.0, false, Above);
        assert_relative_eq!(v, 600.0 * 1.0f64.sin() / 0.8f64.sin());
        assert_eq!(direct_inclined_value(600.0, 0.8, 1.0, true, Above), 0.0);
        assert_eq!(direct_inclined_value(600.0, 0.8, 0.0, false, Above), 0.0);
        assert_eq!(direct_inclined_value(5.0, 0.02, 0.3, false, LowAngle), 0.0);
        assert_eq!(direct_inclined_value(0.0, -0.2, 0.0, true, Below), 0.0);
    }

    #[test]
    fn test_surface_facing_sun_gains() {
        // sun at 40°, surface normal pointing at it: δexp = 90°
        let bh = IrradianceComponent::new(
            ComponentKind::DirectHorizontal,
            "test",
            TimeSeries::from_vec(vec![800.0 * 40f64.to_radians().sin()]),
        );
        let inc = IncidenceSeries::new(TimeSeries::from_vec(vec![0.0]), IncidenceDefinition::Typical);
        let r = direct_inclined(
            &bh,
            &TimeSeries::from_vec(vec![40f64.to_radians()]),
            &inc,
            &TimeSeries::from_vec(vec![false]),
            &TimeSeries::from_vec(vec![SunHorizonPosition::Above]),
        )
        .unwrap();
        assert_relative_eq!(r.value.get(0).unwrap(), 800.0, epsilon = 1e-9);
        assert!(r.ancestor(ComponentKind::DirectHorizontal).is_some());
    }
}
