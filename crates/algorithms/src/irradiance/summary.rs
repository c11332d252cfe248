//! Aggregate statistics over a composed result

use pvirr_core::{Result, TimeSeries};
use serde::Serialize;

use super::GlobalInclinedIrradiance;
use crate::shading::{state_counts, ShadingState, SunHorizonPosition};

/// Sum, mean and extremes of one series (NaN values ignored)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComponentSummary {
    pub sum: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl ComponentSummary {
    pub fn of(series: &TimeSeries<f64>) -> Self {
        Self {
            sum: series.sum(),
            mean: series.mean(),
            min: series.min().unwrap_or(f64::NAN),
            max: series.max().unwrap_or(f64::NAN),
        }
    }
}

/// Summary of a [`GlobalInclinedIrradiance`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrradianceSummary {
    pub timestamps: usize,
    pub global: ComponentSummary,
    pub direct: ComponentSummary,
    pub diffuse: ComponentSummary,
    pub ground_reflected: ComponentSummary,
    pub global_before_reflectivity: ComponentSummary,
    pub reflectivity_loss: ComponentSummary,
    /// Total loss relative to the total before reflectivity, percent
    pub reflectivity_loss_percentage: f64,
    pub below_horizon: usize,
    pub low_angle: usize,
    pub above_horizon: usize,
    pub in_shade: usize,
    pub sunlit: usize,
    pub potentially_sunlit: usize,
    /// Out-of-range samples over the inclined components
    pub out_of_range: usize,
}

pub(super) fn summarize(r: &GlobalInclinedIrradiance) -> Result<IrradianceSummary> {
    let before = r.global.before_reflectivity();
    let loss = r.global.reflectivity_loss()?;
    let total_before = before.sum();
    let position_count = |p: SunHorizonPosition| r.sun_horizon.count(|s| *s == p);
    let counts = state_counts(&r.shading_states);
    let state_count = |state: ShadingState| {
        counts
            .iter()
            .find(|(s, _)| *s == state)
            .map_or(0, |(_, c)| *c)
    };
    Ok(IrradianceSummary {
        timestamps: r.len(),
        global: ComponentSummary::of(&r.global.value),
        direct: ComponentSummary::of(&r.direct.value),
        diffuse: ComponentSummary::of(&r.diffuse.value),
        ground_reflected: ComponentSummary::of(&r.ground_reflected.value),
        global_before_reflectivity: ComponentSummary::of(&before),
        reflectivity_loss_percentage: if total_before != 0.0 {
            100.0 * loss.sum() / total_before
        } else {
            0.0
        },
        reflectivity_loss: ComponentSummary::of(&loss),
        below_horizon: position_count(SunHorizonPosition::Below),
        low_angle: position_count(SunHorizonPosition::LowAngle),
        above_horizon: position_count(SunHorizonPosition::Above),
        in_shade: state_count(ShadingState::InShade),
        sunlit: state_count(ShadingState::Sunlit),
        potentially_sunlit: state_count(ShadingState::PotentiallySunlit),
        out_of_range: [&r.direct, &r.diffuse, &r.ground_reflected, &r.global]
            .iter()
            .map(|c| c.out_of_range.len())
            .sum(),
    })
}
