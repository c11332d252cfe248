//! Global inclined irradiance composition
//!
//! For every timestamp the sun-horizon position and the shading state pick
//! the closed-form expression of each component:
//!
//! | sun-horizon | direct        | diffuse                        | ground reflected |
//! |-------------|---------------|--------------------------------|------------------|
//! | below       | 0             | 0                              | 0                |
//! | low angle   | 0             | by shading state               | computed         |
//! | above       | where lit     | by shading state               | computed         |
//!
//! Each component is corrected for angular reflectivity on its own; the
//! global value is their sum, and the global value before reflectivity is
//! the sum of the three values before reflectivity.

pub mod component;
pub mod diffuse;
pub mod direct;
pub mod ground;
mod summary;

pub use component::{ComponentKind, IrradianceComponent, IrradianceSource, PhysicalLimits, ReflectivityApplied};
pub use diffuse::{diffuse_inclined, kb_series, DiffuseInclinedInput, DiffuseInclinedParams};
pub use direct::direct_inclined;
pub use ground::ground_reflected;
pub use summary::{ComponentSummary, IrradianceSummary};

use chrono_tz::Tz;
use pvirr_core::constants::{
    ALBEDO_DEFAULT, CACHE_CAPACITY_DEFAULT, FLAT_SURFACE_TILT_THRESHOLD, LINKE_TURBIDITY_DEFAULT,
    LOW_ANGLE_THRESHOLD, SUNLIT_ALTITUDE_THRESHOLD, TERM_N_IN_SHADE,
};
use pvirr_core::{
    Algorithm, AzimuthOrigin, Error, IncidenceDefinition, IncidenceSeries, Location, Result, SurfaceGeometry,
    TimeSeries, Timestamps,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::atmosphere::{
    self, clear_sky, clear_sky_cached, AtmosphereParams, ClearSkyInput, ClearSkyIrradiance,
};
use crate::cache::{CacheStats, MemoCache};
use crate::position::{
    solar_incidence, solar_position, solar_position_cached, IncidenceAlgorithm, IncidenceParams, PositionAlgorithm,
    SolarIncidence, SolarPositionParams, SolarPositionResult, TimingAlgorithm,
};
use crate::reflectivity::{apply_reflectivity, ReflectivityKind, ReflectivityParams};
use crate::shading::{
    shading_states, state_counts, sun_horizon_positions, surface_in_shade, surface_in_shade_cached, HorizonProfile,
    ShadingAlgorithm, ShadingResult, ShadingState, SunHorizonPosition,
};

// ---------------------------------------------------------------------------
// Parameters and input
// ---------------------------------------------------------------------------

/// Parameters of the irradiance composer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrradianceParams {
    pub position: SolarPositionParams,
    pub incidence: IncidenceParams,
    pub atmosphere: AtmosphereParams,
    pub reflectivity: ReflectivityParams,
    /// Ground albedo, [0, 1]
    pub albedo: f64,
    /// Apply the angular reflectivity loss
    pub apply_reflectivity: bool,
    /// Use the horizon profile when one is given (flat terrain otherwise)
    pub apply_shading: bool,
    /// Altitude (radians) below which the sun is low on the horizon
    pub low_angle_threshold: f64,
    /// Altitude (radians) from which an unshaded surface is sunlit
    pub sunlit_threshold: f64,
    /// Tilt (radians) at or below which the surface counts as horizontal
    pub flat_tilt_threshold: f64,
    /// Muneer N-term for shaded timestamps
    pub in_shade_n_term: f64,
}

impl Default for IrradianceParams {
    fn default() -> Self {
        Self {
            position: SolarPositionParams::default(),
            incidence: IncidenceParams::default(),
            atmosphere: AtmosphereParams::default(),
            reflectivity: ReflectivityParams::default(),
            albedo: ALBEDO_DEFAULT,
            apply_reflectivity: true,
            apply_shading: true,
            low_angle_threshold: LOW_ANGLE_THRESHOLD,
            sunlit_threshold: SUNLIT_ALTITUDE_THRESHOLD,
            flat_tilt_threshold: FLAT_SURFACE_TILT_THRESHOLD,
            in_shade_n_term: TERM_N_IN_SHADE,
        }
    }
}

impl IrradianceParams {
    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.albedo) {
            return Err(Error::invalid("albedo", self.albedo, "must be within [0, 1]"));
        }
        if !(self.low_angle_threshold >= 0.0) {
            return Err(Error::invalid(
                "low_angle_threshold",
                self.low_angle_threshold,
                "must be non-negative",
            ));
        }
        if !(self.sunlit_threshold > 0.0) {
            return Err(Error::invalid("sunlit_threshold", self.sunlit_threshold, "must be positive"));
        }
        if !(self.flat_tilt_threshold >= 0.0) {
            return Err(Error::invalid(
                "flat_tilt_threshold",
                self.flat_tilt_threshold,
                "must be non-negative",
            ));
        }
        Ok(())
    }
}

/// Input of the irradiance composer
#[derive(Debug, Clone)]
pub struct IrradianceInput {
    pub location: Location,
    pub surface: SurfaceGeometry,
    pub timestamps: Timestamps,
    /// Zone whose offset drives the solar time
    pub timezone: Tz,
    /// Linke turbidity per timestamp; the default constant when absent
    pub linke_turbidity: Option<TimeSeries<f64>>,
    /// Measured global horizontal irradiance, W·m⁻²
    pub global_horizontal: Option<TimeSeries<f64>>,
    /// Measured direct horizontal irradiance, W·m⁻²
    pub direct_horizontal: Option<TimeSeries<f64>>,
    pub horizon: Option<HorizonProfile>,
}

impl IrradianceInput {
    pub fn new(location: Location, surface: SurfaceGeometry, timestamps: Timestamps, timezone: Tz) -> Self {
        Self {
            location,
            surface,
            timestamps,
            timezone,
            linke_turbidity: None,
            global_horizontal: None,
            direct_horizontal: None,
            horizon: None,
        }
    }

    pub fn with_linke_turbidity(mut self, linke: TimeSeries<f64>) -> Self {
        self.linke_turbidity = Some(linke);
        self
    }

    /// Same Linke turbidity for every timestamp
    pub fn with_constant_linke_turbidity(self, value: f64) -> Self {
        let n = self.timestamps.len();
        self.with_linke_turbidity(atmosphere::constant_linke(n, value))
    }

    /// Use measured horizontal irradiance instead of the clear-sky model
    pub fn with_external_horizontal(mut self, global: TimeSeries<f64>, direct: TimeSeries<f64>) -> Self {
        self.global_horizontal = Some(global);
        self.direct_horizontal = Some(direct);
        self
    }

    pub fn with_horizon(mut self, horizon: HorizonProfile) -> Self {
        self.horizon = Some(horizon);
        self
    }
}

/// Resolved source of the horizontal irradiance
#[derive(Debug, Clone, PartialEq)]
pub enum HorizontalInputs {
    ClearSky { linke: TimeSeries<f64> },
    External { global: TimeSeries<f64>, direct: TimeSeries<f64> },
}

impl HorizontalInputs {
    /// Decide between the clear-sky model and measured series.
    ///
    /// # Errors
    /// - [`Error::MissingInput`] when only one of the measured pair is given
    /// - [`Error::ConflictingInputs`] when a Linke turbidity series comes with
    ///   measured irradiance, which would leave it unused
    /// - [`Error::LengthMismatch`] / [`Error::InvalidParameter`] for malformed series
    pub fn resolve(
        n: usize,
        linke: Option<&TimeSeries<f64>>,
        global: Option<&TimeSeries<f64>>,
        direct: Option<&TimeSeries<f64>>,
    ) -> Result<Self> {
        match (global, direct) {
            (Some(global), Some(direct)) => {
                if linke.is_some() {
                    return Err(Error::ConflictingInputs(
                        "linke turbidity is only used by the clear-sky model, not with measured horizontal irradiance"
                            .into(),
                    ));
                }
                global.ensure_len("global horizontal", n)?;
                direct.ensure_len("direct horizontal", n)?;
                Ok(HorizontalInputs::External {
                    global: global.clone(),
                    direct: direct.clone(),
                })
            }
            (Some(_), None) => Err(Error::MissingInput(
                "direct horizontal irradiance is required alongside global horizontal irradiance".into(),
            )),
            (None, Some(_)) => Err(Error::MissingInput(
                "global horizontal irradiance is required alongside direct horizontal irradiance".into(),
            )),
            (None, None) => {
                let linke = match linke {
                    Some(l) => l.clone(),
                    None => atmosphere::constant_linke(n, LINKE_TURBIDITY_DEFAULT),
                };
                atmosphere::validate_linke(&linke, n)?;
                Ok(HorizontalInputs::ClearSky { linke })
            }
        }
    }

    pub fn source(&self) -> IrradianceSource {
        match self {
            HorizontalInputs::ClearSky { .. } => IrradianceSource::ClearSky,
            HorizontalInputs::External { .. } => IrradianceSource::External,
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Horizontal and extraterrestrial irradiance feeding the inclined components
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizontalIrradiance {
    pub source: IrradianceSource,
    pub extraterrestrial_normal: IrradianceComponent,
    pub extraterrestrial_horizontal: IrradianceComponent,
    pub direct_normal: IrradianceComponent,
    pub direct_horizontal: IrradianceComponent,
    pub diffuse_horizontal: IrradianceComponent,
    pub global_horizontal: IrradianceComponent,
}

/// Everything needed to reproduce a result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrradianceMetadata {
    pub location: Location,
    pub surface: SurfaceGeometry,
    pub timezone: String,
    pub position_algorithm: PositionAlgorithm,
    pub timing_algorithm: TimingAlgorithm,
    pub refracted: bool,
    pub incidence_algorithm: IncidenceAlgorithm,
    pub incidence_definition: IncidenceDefinition,
    pub shading_algorithm: ShadingAlgorithm,
    pub diffuse_model: &'static str,
    pub source: IrradianceSource,
    pub albedo: f64,
    pub ground_view_fraction: f64,
    pub flat_surface: bool,
    pub reflectivity_applied: bool,
    pub solar_constant: f64,
}

/// Global irradiance on the inclined surface and its full provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalInclinedIrradiance {
    pub timestamps: Timestamps,
    pub global: IrradianceComponent,
    pub direct: IrradianceComponent,
    pub diffuse: IrradianceComponent,
    pub ground_reflected: IrradianceComponent,
    pub horizontal: HorizontalIrradiance,
    /// Direct to extraterrestrial horizontal irradiance ratio
    pub kb: TimeSeries<f64>,
    pub position: SolarPositionResult,
    pub incidence: SolarIncidence,
    pub shading: ShadingResult,
    pub sun_horizon: TimeSeries<SunHorizonPosition>,
    pub shading_states: TimeSeries<ShadingState>,
    pub metadata: IrradianceMetadata,
}

impl GlobalInclinedIrradiance {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn ground_view_fraction(&self) -> f64 {
        self.metadata.ground_view_fraction
    }

    /// Sum, mean and extremes per component plus regime counts
    ///
    /// # Errors
    /// [`Error::LengthMismatch`] if the global reflectivity record does not
    /// align with its value.
    pub fn summary(&self) -> Result<IrradianceSummary> {
        summary::summarize(self)
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Memoization caches used by [`IrradianceEngine`]
pub struct IrradianceCaches {
    pub position: MemoCache<SolarPositionResult>,
    pub shading: MemoCache<ShadingResult>,
    pub clear_sky: MemoCache<ClearSkyIrradiance>,
}

impl IrradianceCaches {
    pub fn new(capacity: usize) -> Self {
        Self {
            position: MemoCache::new(capacity),
            shading: MemoCache::new(capacity),
            clear_sky: MemoCache::new(capacity),
        }
    }

    /// Drop every cached entry
    pub fn clear(&self) {
        self.position.clear();
        self.shading.clear();
        self.clear_sky.clear();
    }

    /// Counters per cache
    pub fn stats(&self) -> [(&'static str, CacheStats); 3] {
        [
            ("solar_position", self.position.stats()),
            ("shading", self.shading.stats()),
            ("clear_sky", self.clear_sky.stats()),
        ]
    }
}

impl Default for IrradianceCaches {
    fn default() -> Self {
        Self::new(CACHE_CAPACITY_DEFAULT)
    }
}

/// Compose the global inclined irradiance without memoization.
///
/// # Errors
/// Validation errors for empty or misaligned series, malformed parameters
/// and incomplete measured irradiance; see [`HorizontalInputs::resolve`].
pub fn global_inclined_irradiance(
    input: &IrradianceInput,
    params: &IrradianceParams,
) -> Result<GlobalInclinedIrradiance> {
    compose(input, params, None)
}

fn compose(
    input: &IrradianceInput,
    params: &IrradianceParams,
    caches: Option<&IrradianceCaches>,
) -> Result<GlobalInclinedIrradiance> {
    let timestamps = &input.timestamps;
    timestamps.ensure_not_empty()?;
    params.validate()?;
    let n = timestamps.len();
    let horizontal_inputs = HorizontalInputs::resolve(
        n,
        input.linke_turbidity.as_ref(),
        input.global_horizontal.as_ref(),
        input.direct_horizontal.as_ref(),
    )?;

    let position = match caches {
        Some(c) => solar_position_cached(&c.position, &input.location, timestamps, input.timezone, &params.position),
        None => solar_position(&input.location, timestamps, input.timezone, &params.position),
    }?;
    let altitude = position.altitude.radians();
    let azimuth = position.azimuth.radians_from(AzimuthOrigin::North);
    let incidence = solar_incidence(&position, &input.location, &input.surface, params.incidence)?;

    let horizon = input.horizon.as_ref().filter(|_| params.apply_shading);
    let shading = match caches {
        Some(c) => surface_in_shade_cached(&c.shading, &position.altitude, &position.azimuth, horizon),
        None => surface_in_shade(&position.altitude, &position.azimuth, horizon),
    }?;
    let sun_horizon = sun_horizon_positions(&altitude, params.low_angle_threshold);
    let states = shading_states(&altitude, &shading.in_shade, &incidence.angle, params.sunlit_threshold)?;
    let [(_, in_shade), (_, sunlit), (_, potentially_sunlit)] = state_counts(&states);
    debug!(
        below = sun_horizon.count(|p| *p == SunHorizonPosition::Below),
        low_angle = sun_horizon.count(|p| *p == SunHorizonPosition::LowAngle),
        above = sun_horizon.count(|p| *p == SunHorizonPosition::Above),
        in_shade,
        sunlit,
        potentially_sunlit,
        "irradiance regimes"
    );

    let horizontal = match &horizontal_inputs {
        HorizontalInputs::ClearSky { .. } => clear_sky_horizontal(
            &horizontal_inputs,
            input,
            &altitude,
            &shading.in_shade,
            &params.atmosphere,
            caches.map(|c| &c.clear_sky),
        )?,
        HorizontalInputs::External { global, direct } => {
            external_horizontal(global, direct, timestamps, &altitude, &params.atmosphere)?
        }
    };

    let kb = kb_series(&horizontal.direct_horizontal, &horizontal.extraterrestrial_horizontal)?;
    let direct = direct_inclined(
        &horizontal.direct_horizontal,
        &altitude,
        &incidence.angle,
        &shading.in_shade,
        &sun_horizon,
    )?;
    let diffuse = diffuse_inclined(
        &DiffuseInclinedInput {
            diffuse_horizontal: &horizontal.diffuse_horizontal,
            kb: &kb,
            altitude: &altitude,
            azimuth: &azimuth,
            incidence: &incidence.angle,
            states: &states,
            sun_horizon: &sun_horizon,
        },
        &input.surface,
        &DiffuseInclinedParams {
            flat_tilt_threshold: params.flat_tilt_threshold,
            in_shade_n_term: params.in_shade_n_term,
        },
    )?;
    let ground = ground_reflected(
        &horizontal.global_horizontal,
        &sun_horizon,
        &input.surface,
        params.albedo,
        params.flat_tilt_threshold,
    )?;

    let limits = params.atmosphere.limits;
    let (direct, diffuse, ground) = (direct.checked(&limits), diffuse.checked(&limits), ground.checked(&limits));
    let (direct, diffuse, ground) = if params.apply_reflectivity {
        let tilt = input.surface.tilt;
        let r = &params.reflectivity;
        (
            reflect(direct, ReflectivityKind::Direct, &incidence.angle, tilt, r)?,
            reflect(diffuse, ReflectivityKind::DiffuseSky, &incidence.angle, tilt, r)?,
            reflect(ground, ReflectivityKind::GroundReflected, &incidence.angle, tilt, r)?,
        )
    } else {
        (direct, diffuse, ground)
    };
    let global = sum_components(&direct, &diffuse, &ground, params.apply_reflectivity, &limits)?;

    let ground_view_fraction = input.surface.ground_view_fraction(params.flat_tilt_threshold);
    let metadata = IrradianceMetadata {
        location: input.location,
        surface: input.surface,
        timezone: input.timezone.name().to_string(),
        position_algorithm: position.position_algorithm,
        timing_algorithm: position.timing_algorithm,
        refracted: position.refracted,
        incidence_algorithm: incidence.algorithm,
        incidence_definition: incidence.angle.definition(),
        shading_algorithm: shading.algorithm,
        diffuse_model: diffuse::MODEL,
        source: horizontal.source,
        albedo: params.albedo,
        ground_view_fraction,
        flat_surface: input.surface.is_flat(params.flat_tilt_threshold),
        reflectivity_applied: params.apply_reflectivity,
        solar_constant: params.atmosphere.solar_constant,
    };
    info!(
        timestamps = n,
        source = ?metadata.source,
        global_sum = global.value.sum(),
        "composed global inclined irradiance"
    );

    Ok(GlobalInclinedIrradiance {
        timestamps: timestamps.clone(),
        global,
        direct,
        diffuse,
        ground_reflected: ground,
        horizontal,
        kb,
        position,
        incidence,
        shading,
        sun_horizon,
        shading_states: states,
        metadata,
    })
}

/// Clear-sky horizontal components. Only reachable without measured irradiance.
fn clear_sky_horizontal(
    horizontal: &HorizontalInputs,
    input: &IrradianceInput,
    altitude: &TimeSeries<f64>,
    in_shade: &TimeSeries<bool>,
    params: &AtmosphereParams,
    cache: Option<&MemoCache<ClearSkyIrradiance>>,
) -> Result<HorizontalIrradiance> {
    let linke = match horizontal {
        HorizontalInputs::ClearSky { linke } => linke,
        HorizontalInputs::External { .. } => {
            return Err(Error::Unreachable(
                "measured horizontal irradiance reached the clear-sky model".into(),
            ))
        }
    };
    let clear_input = ClearSkyInput {
        timestamps: input.timestamps.clone(),
        elevation: input.location.elevation,
        altitude: altitude.clone(),
        in_shade: in_shade.clone(),
        linke: linke.clone(),
    };
    let sky = match cache {
        Some(c) => clear_sky_cached(c, &clear_input, params),
        None => clear_sky(&clear_input, params),
    }?;
    let global_value = sky.direct_horizontal.value.add(&sky.diffuse_horizontal.value)?;
    let global_horizontal = IrradianceComponent::new(ComponentKind::GlobalHorizontal, "direct plus diffuse", global_value)
        .checked(&params.limits)
        .with_parents(vec![sky.direct_horizontal.clone(), sky.diffuse_horizontal.clone()]);
    Ok(HorizontalIrradiance {
        source: IrradianceSource::ClearSky,
        extraterrestrial_normal: sky.extraterrestrial_normal,
        extraterrestrial_horizontal: sky.extraterrestrial_horizontal,
        direct_normal: sky.direct_normal,
        direct_horizontal: sky.direct_horizontal,
        diffuse_horizontal: sky.diffuse_horizontal,
        global_horizontal,
    })
}

/// Horizontal components from measured global and direct irradiance.
fn external_horizontal(
    global: &TimeSeries<f64>,
    direct: &TimeSeries<f64>,
    timestamps: &Timestamps,
    altitude: &TimeSeries<f64>,
    params: &AtmosphereParams,
) -> Result<HorizontalIrradiance> {
    let g0 = atmosphere::extraterrestrial_normal(timestamps, params);
    let g0h = atmosphere::extraterrestrial_horizontal(&g0, altitude)?;
    let global_horizontal =
        IrradianceComponent::external(ComponentKind::GlobalHorizontal, global.clone()).checked(&params.limits);
    let direct_horizontal =
        IrradianceComponent::external(ComponentKind::DirectHorizontal, direct.clone()).checked(&params.limits);
    let diffuse_horizontal = atmosphere::diffuse_horizontal_from_external(&global_horizontal, &direct_horizontal, params)?;
    let direct_normal = atmosphere::direct_normal_from_horizontal(&direct_horizontal, altitude, params)?;
    Ok(HorizontalIrradiance {
        source: IrradianceSource::External,
        extraterrestrial_normal: g0,
        extraterrestrial_horizontal: g0h,
        direct_normal,
        direct_horizontal,
        diffuse_horizontal,
        global_horizontal,
    })
}

/// Replace a component's value by its reflectivity-corrected value.
fn reflect(
    component: IrradianceComponent,
    kind: ReflectivityKind,
    incidence: &IncidenceSeries,
    tilt: f64,
    params: &ReflectivityParams,
) -> Result<IrradianceComponent> {
    let outcome = apply_reflectivity(kind, incidence, tilt, &component.value, params)?;
    Ok(IrradianceComponent {
        value: outcome.corrected,
        ..component
    }
    .with_reflectivity(ReflectivityApplied {
        factor: outcome.factor,
        before: outcome.before,
    }))
}

/// Global inclined irradiance as the sum of the three components.
///
/// The value before reflectivity is the sum of the components' values
/// before reflectivity; the effective factor is `global / before`.
fn sum_components(
    direct: &IrradianceComponent,
    diffuse: &IrradianceComponent,
    ground: &IrradianceComponent,
    reflectivity_applied: bool,
    limits: &PhysicalLimits,
) -> Result<IrradianceComponent> {
    let value = direct.value.add(&diffuse.value)?.add(&ground.value)?;
    // clipping the sum would break conservation, flag only
    let flag_only = PhysicalLimits { clip: false, ..*limits };
    let mut global = IrradianceComponent::new(ComponentKind::GlobalInclined, "sum of components", value)
        .checked(&flag_only);
    if reflectivity_applied {
        let before = direct
            .before_reflectivity()
            .add(&diffuse.before_reflectivity())?
            .add(&ground.before_reflectivity())?;
        let factor = global.value.zip_map(&before, |v, b| if b != 0.0 { v / b } else { 0.0 })?;
        global = global.with_reflectivity(ReflectivityApplied { factor, before });
    }
    Ok(global.with_parents(vec![direct.clone(), diffuse.clone(), ground.clone()]))
}

/// Irradiance composer holding its own memoization caches.
///
/// Caches sit behind an `Arc`, so engines can share them across threads.
pub struct IrradianceEngine {
    params: IrradianceParams,
    caches: Arc<IrradianceCaches>,
}

impl IrradianceEngine {
    pub fn new(params: IrradianceParams) -> Self {
        Self::with_caches(params, Arc::new(IrradianceCaches::default()))
    }

    pub fn with_caches(params: IrradianceParams, caches: Arc<IrradianceCaches>) -> Self {
        Self { params, caches }
    }

    pub fn params(&self) -> &IrradianceParams {
        &self.params
    }

    pub fn caches(&self) -> &Arc<IrradianceCaches> {
        &self.caches
    }

    /// Compose the global inclined irradiance, reusing cached sub-results.
    pub fn compute(&self, input: &IrradianceInput) -> Result<GlobalInclinedIrradiance> {
        compose(input, &self.params, Some(&self.caches))
    }

    /// Drop every cached sub-result
    pub fn clear_cache(&self) {
        self.caches.clear();
    }
}

impl Default for IrradianceEngine {
    fn default() -> Self {
        Self::new(IrradianceParams::default())
    }
}

/// Stateless irradiance composer
pub struct IrradianceComposer;

impl Algorithm for IrradianceComposer {
    type Input = IrradianceInput;
    type Output = GlobalInclinedIrradiance;
    type Params = IrradianceParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "GlobalInclinedIrradiance"
    }

    fn description(&self) -> &'static str {
        "Direct, diffuse and ground-reflected irradiance on a tilted surface"
    }

    fn execute(&self, input: Self::Input, params: Self::Params) -> Result<Self::Output> {
        global_inclined_irradiance(&input, &params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{TimeZone, Utc};

    fn rome_input(tilt_deg: f64) -> IrradianceInput {
        IrradianceInput::new(
            Location::from_degrees(12.496, 41.903, 20.0).unwrap(),
            SurfaceGeometry::from_degrees(180.0, tilt_deg).unwrap(),
            Timestamps::hourly(Utc.with_ymd_and_hms(2024, 6, 21, 0, 0, 0).unwrap(), 24),
            chrono_tz::UTC,
        )
    }

    #[test]
    fn test_resolve_horizontal_inputs() {
        let s = TimeSeries::from_vec(vec![1.0, 2.0]);
        assert!(matches!(
            HorizontalInputs::resolve(2, None, Some(&s), None),
            Err(Error::MissingInput(_))
        ));
        assert!(matches!(
            HorizontalInputs::resolve(2, None, None, Some(&s)),
            Err(Error::MissingInput(_))
        ));
        assert!(matches!(
            HorizontalInputs::resolve(2, Some(&s), Some(&s), Some(&s)),
            Err(Error::ConflictingInputs(_))
        ));
        let r = HorizontalInputs::resolve(2, None, Some(&s), Some(&s)).unwrap();
        assert_eq!(r.source(), IrradianceSource::External);
        let r = HorizontalInputs::resolve(2, None, None, None).unwrap();
        assert_eq!(
            r,
            HorizontalInputs::ClearSky {
                linke: TimeSeries::filled(2, LINKE_TURBIDITY_DEFAULT)
            }
        );
    }

    #[test]
    fn test_external_series_never_reach_clear_sky() {
        let input = rome_input(30.0);
        let horizontal = HorizontalInputs::External {
            global: TimeSeries::zeros(24),
            direct: TimeSeries::zeros(24),
        };
        let err = clear_sky_horizontal(
            &horizontal,
            &input,
            &TimeSeries::zeros(24),
            &TimeSeries::filled(24, false),
            &AtmosphereParams::default(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Unreachable(_)));
    }

    #[test]
    fn test_conservation_and_reflectivity() {
        let input = rome_input(30.0).with_constant_linke_turbidity(3.0);
        let r = global_inclined_irradiance(&input, &IrradianceParams::default()).unwrap();
        let before = r.global.before_reflectivity();
        for i in 0..r.len() {
            let sum = r.direct.value.get(i).unwrap() + r.diffuse.value.get(i).unwrap()
                + r.ground_reflected.value.get(i).unwrap();
            assert_relative_eq!(r.global.value.get(i).unwrap(), sum, epsilon = 1e-9);
            let before_sum = r.direct.before_reflectivity().get(i).unwrap()
                + r.diffuse.before_reflectivity().get(i).unwrap()
                + r.ground_reflected.before_reflectivity().get(i).unwrap();
            assert_relative_eq!(before.get(i).unwrap(), before_sum, epsilon = 1e-9);
            assert!(before.get(i).unwrap() >= r.global.value.get(i).unwrap() - 1e-9);
        }
        assert!(r.metadata.reflectivity_applied);
        assert_eq!(r.metadata.source, IrradianceSource::ClearSky);
    }

    #[test]
    fn test_without_reflectivity() {
        let input = rome_input(30.0);
        let params = IrradianceParams {
            apply_reflectivity: false,
            ..Default::default()
        };
        let r = global_inclined_irradiance(&input, &params).unwrap();
        assert!(r.global.reflectivity.is_none());
        assert_eq!(r.global.before_reflectivity(), r.global.value);
    }

    #[test]
    fn test_low_angle_has_no_direct() {
        let r = global_inclined_irradiance(&rome_input(30.0), &IrradianceParams::default()).unwrap();
        for i in 0..r.len() {
            if r.sun_horizon.get(i).unwrap() != SunHorizonPosition::Above {
                assert_eq!(r.direct.value.get(i).unwrap(), 0.0, "direct at {}", i);
            }
        }
    }

    #[test]
    fn test_invalid_albedo_rejected() {
        let params = IrradianceParams {
            albedo: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            global_inclined_irradiance(&rome_input(30.0), &params),
            Err(Error::InvalidParameter { name: "albedo", .. })
        ));
    }

    #[test]
    fn test_engine_cache_and_clear() {
        let engine = IrradianceEngine::default();
        let input = rome_input(30.0);
        let a = engine.compute(&input).unwrap();
        let b = engine.compute(&input).unwrap();
        assert_eq!(a.global.value, b.global.value);
        let [(_, pos), _, _] = engine.caches().stats();
        assert_eq!((pos.hits, pos.misses), (1, 1));
        engine.clear_cache();
        assert!(engine.caches().position.is_empty());
        assert!(engine.caches().clear_sky.is_empty());
    }

    #[test]
    fn test_algorithm_trait() {
        let r = IrradianceComposer.execute_default(rome_input(30.0)).unwrap();
        assert_eq!(r.len(), 24);
        assert_eq!(IrradianceComposer.name(), "GlobalInclinedIrradiance");
    }
}
