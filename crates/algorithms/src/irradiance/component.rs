//! Irradiance component series with provenance

use pvirr_core::constants::{LOWER_PHYSICALLY_POSSIBLE_LIMIT, UPPER_PHYSICALLY_POSSIBLE_LIMIT};
use pvirr_core::{Result, TimeSeries};
use serde::Serialize;
use std::fmt;
use tracing::warn;

/// Physical quantity carried by an [`IrradianceComponent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComponentKind {
    ExtraterrestrialNormal,
    ExtraterrestrialHorizontal,
    DirectNormal,
    DirectHorizontal,
    DiffuseHorizontal,
    GlobalHorizontal,
    DirectInclined,
    DiffuseInclined,
    GroundReflectedInclined,
    GlobalInclined,
}

impl ComponentKind {
    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::ExtraterrestrialNormal => "extraterrestrial normal",
            ComponentKind::ExtraterrestrialHorizontal => "extraterrestrial horizontal",
            ComponentKind::DirectNormal => "direct normal",
            ComponentKind::DirectHorizontal => "direct horizontal",
            ComponentKind::DiffuseHorizontal => "diffuse horizontal",
            ComponentKind::GlobalHorizontal => "global horizontal",
            ComponentKind::DirectInclined => "direct inclined",
            ComponentKind::DiffuseInclined => "diffuse inclined",
            ComponentKind::GroundReflectedInclined => "ground-reflected inclined",
            ComponentKind::GlobalInclined => "global inclined",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a series was modelled or handed in by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum IrradianceSource {
    #[default]
    ClearSky,
    External,
}

/// Plausibility bounds for irradiance values (W·m⁻²)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhysicalLimits {
    pub lower: f64,
    pub upper: f64,
    /// Clip out-of-range values to the bounds instead of passing them through
    pub clip: bool,
}

impl Default for PhysicalLimits {
    fn default() -> Self {
        Self {
            lower: LOWER_PHYSICALLY_POSSIBLE_LIMIT,
            upper: UPPER_PHYSICALLY_POSSIBLE_LIMIT,
            clip: false,
        }
    }
}

/// Angular reflectivity loss applied to a component
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReflectivityApplied {
    pub factor: TimeSeries<f64>,
    /// Value before the loss, `value / factor` (0 where the factor is 0)
    pub before: TimeSeries<f64>,
}

/// One irradiance series (W·m⁻²) and what it was derived from.
///
/// Parents are held by value, so a component is a self-contained
/// provenance tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrradianceComponent {
    pub kind: ComponentKind,
    /// Model that produced the values
    pub model: &'static str,
    pub source: IrradianceSource,
    pub value: TimeSeries<f64>,
    pub reflectivity: Option<ReflectivityApplied>,
    /// Indices outside the physical limits
    pub out_of_range: Vec<usize>,
    pub derived_from: Vec<IrradianceComponent>,
}

impl IrradianceComponent {
    pub fn new(kind: ComponentKind, model: &'static str, value: TimeSeries<f64>) -> Self {
        Self {
            kind,
            model,
            source: IrradianceSource::ClearSky,
            value,
            reflectivity: None,
            out_of_range: Vec::new(),
            derived_from: Vec::new(),
        }
    }

    /// Series supplied by the caller
    pub fn external(kind: ComponentKind, value: TimeSeries<f64>) -> Self {
        Self {
            source: IrradianceSource::External,
            ..Self::new(kind, "external", value)
        }
    }

    /// Attach the components this one was derived from. Anything derived
    /// from a caller-supplied series is itself external.
    pub fn with_parents(mut self, parents: Vec<IrradianceComponent>) -> Self {
        if parents.iter().any(|p| p.source == IrradianceSource::External) {
            self.source = IrradianceSource::External;
        }
        self.derived_from = parents;
        self
    }

    pub fn with_reflectivity(mut self, reflectivity: ReflectivityApplied) -> Self {
        self.reflectivity = Some(reflectivity);
        self
    }

    /// Record (and optionally clip) values outside `limits`, warning once.
    pub fn checked(mut self, limits: &PhysicalLimits) -> Self {
        self.out_of_range = self.value.indices_outside(limits.lower, limits.upper);
        if !self.out_of_range.is_empty() {
            warn!(
                component = self.kind.name(),
                count = self.out_of_range.len(),
                lower = limits.lower,
                upper = limits.upper,
                clipped = limits.clip,
                "irradiance outside physically possible limits"
            );
            if limits.clip {
                self.value = self.value.clip(limits.lower, limits.upper);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Value before reflectivity loss; the value itself if none was applied
    pub fn before_reflectivity(&self) -> TimeSeries<f64> {
        match &self.reflectivity {
            Some(r) => r.before.clone(),
            None => self.value.clone(),
        }
    }

    /// Reflectivity factor per timestamp; 1 if none was applied
    pub fn reflectivity_factor(&self) -> TimeSeries<f64> {
        match &self.reflectivity {
            Some(r) => r.factor.clone(),
            None => TimeSeries::filled(self.len(), 1.0),
        }
    }

    /// Irradiance lost to reflectivity, `before − value`
    pub fn reflectivity_loss(&self) -> Result<TimeSeries<f64>> {
        match &self.reflectivity {
            Some(r) => crate::reflectivity::reflectivity_loss(&r.before, &self.value),
            None => Ok(TimeSeries::zeros(self.len())),
        }
    }

    /// Loss as a percentage of the value before reflectivity
    pub fn reflectivity_loss_percentage(&self) -> Result<TimeSeries<f64>> {
        match &self.reflectivity {
            Some(r) => crate::reflectivity::reflectivity_loss_percentage(&r.before, &self.value),
            None => Ok(TimeSeries::zeros(self.len())),
        }
    }

    /// First ancestor (depth first) of the given kind
    pub fn ancestor(&self, kind: ComponentKind) -> Option<&IrradianceComponent> {
        self.derived_from.iter().find_map(|p| {
            if p.kind == kind {
                Some(p)
            } else {
                p.ancestor(kind)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_flags_without_clipping() {
        let c = IrradianceComponent::new(
            ComponentKind::DirectNormal,
            "test",
            TimeSeries::from_vec(vec![-10.0, 500.0, 2500.0]),
        )
        .checked(&PhysicalLimits::default());
        assert_eq!(c.out_of_range, vec![0, 2]);
        assert_eq!(c.value.to_vec(), vec![-10.0, 500.0, 2500.0], "values must pass through");
    }

    #[test]
    fn test_checked_clips_on_request() {
        let limits = PhysicalLimits {
            clip: true,
            ..Default::default()
        };
        let c = IrradianceComponent::new(
            ComponentKind::DirectNormal,
            "test",
            TimeSeries::from_vec(vec![-10.0, 500.0, 2500.0]),
        )
        .checked(&limits);
        assert_eq!(c.out_of_range, vec![0, 2]);
        assert_eq!(c.value.to_vec(), vec![-4.0, 500.0, 2000.0]);
    }

    #[test]
    fn test_defaults_without_reflectivity() {
        let c = IrradianceComponent::external(
            ComponentKind::GlobalHorizontal,
            TimeSeries::from_vec(vec![100.0, 0.0]),
        );
        assert_eq!(c.source, IrradianceSource::External);
        assert_eq!(c.before_reflectivity(), c.value);
        assert_eq!(c.reflectivity_factor().to_vec(), vec![1.0, 1.0]);
        assert_eq!(c.reflectivity_loss().unwrap().to_vec(), vec![0.0, 0.0]);
        assert_eq!(c.reflectivity_loss_percentage().unwrap().to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_loss_with_corrupted_reflectivity_errors() {
        let c = IrradianceComponent::new(ComponentKind::DirectInclined, "test", TimeSeries::from_vec(vec![90.0, 45.0]))
            .with_reflectivity(ReflectivityApplied {
                factor: TimeSeries::from_vec(vec![0.9]),
                before: TimeSeries::from_vec(vec![100.0]),
            });
        assert!(matches!(c.reflectivity_loss(), Err(pvirr_core::Error::LengthMismatch { .. })));
        assert!(c.reflectivity_loss_percentage().is_err());
    }

    #[test]
    fn test_ancestor_lookup() {
        let g0 = IrradianceComponent::new(
            ComponentKind::ExtraterrestrialNormal,
            "test",
            TimeSeries::from_vec(vec![1361.0]),
        );
        let bn = IrradianceComponent::new(ComponentKind::DirectNormal, "test", TimeSeries::from_vec(vec![900.0]))
            .with_parents(vec![g0]);
        let bh = IrradianceComponent::new(ComponentKind::DirectHorizontal, "test", TimeSeries::from_vec(vec![600.0]))
            .with_parents(vec![bn]);
        assert!(bh.ancestor(ComponentKind::ExtraterrestrialNormal).is_some());
        assert!(bh.ancestor(ComponentKind::DiffuseHorizontal).is_none());
        assert_eq!(bh.source, IrradianceSource::ClearSky);
    }

    #[test]
    fn test_external_source_propagates_to_derived() {
        let gh = IrradianceComponent::external(ComponentKind::GlobalHorizontal, TimeSeries::from_vec(vec![500.0]));
        let g0 = IrradianceComponent::new(
            ComponentKind::ExtraterrestrialNormal,
            "test",
            TimeSeries::from_vec(vec![1361.0]),
        );
        let mixed = IrradianceComponent::new(ComponentKind::DiffuseHorizontal, "test", TimeSeries::from_vec(vec![200.0]))
            .with_parents(vec![g0.clone(), gh]);
        assert_eq!(mixed.source, IrradianceSource::External);

        let inclined = IrradianceComponent::new(ComponentKind::DiffuseInclined, "test", TimeSeries::from_vec(vec![190.0]))
            .with_parents(vec![mixed]);
        assert_eq!(inclined.source, IrradianceSource::External);

        let modelled = IrradianceComponent::new(ComponentKind::DirectNormal, "test", TimeSeries::from_vec(vec![900.0]))
            .with_parents(vec![g0]);
        assert_eq!(modelled.source, IrradianceSource::ClearSky);
    }
}
