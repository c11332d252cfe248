//! Ground-reflected irradiance on the inclined surface

use pvirr_core::{Error, Result, SurfaceGeometry, TimeSeries};

use super::component::{ComponentKind, IrradianceComponent};
use crate::shading::SunHorizonPosition;

/// `albedo·Gh·(1 − cos β)/2`, with the ground-view fraction precomputed.
pub fn ground_reflected_value(albedo: f64, global_horizontal: f64, ground_view_fraction: f64) -> f64 {
    albedo * global_horizontal * ground_view_fraction
}

/// Ground-reflected inclined irradiance before reflectivity loss.
///
/// Zero below the horizon and on surfaces no steeper than `flat_tilt_threshold`.
///
/// # Errors
/// [`Error::InvalidParameter`] for an albedo outside [0, 1],
/// [`Error::LengthMismatch`] if the series are not aligned.
pub fn ground_reflected(
    global_horizontal: &IrradianceComponent,
    sun_horizon: &TimeSeries<SunHorizonPosition>,
    surface: &SurfaceGeometry,
    albedo: f64,
    flat_tilt_threshold: f64,
) -> Result<IrradianceComponent> {
    if !(0.0..=1.0).contains(&albedo) {
        return Err(Error::invalid("albedo", albedo, "must be within [0, 1]"));
    }
    let fraction = surface.ground_view_fraction(flat_tilt_threshold);
    let value = global_horizontal.value.zip_map(sun_horizon, |gh, pos| {
        if pos == SunHorizonPosition::Below {
            0.0
        } else {
            ground_reflected_value(albedo, gh, fraction)
        }
    })?;
    Ok(IrradianceComponent::new(ComponentKind::GroundReflectedInclined, "isotropic ground", value)
        .with_parents(vec![global_horizontal.clone()]))
}
