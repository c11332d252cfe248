//! Shading state of a tilted surface
//!
//! Used only to pick the diffuse sky-irradiance regime. Rules are evaluated
//! in order, first match wins:
//!
//! 1. `InShade`: shaded by the horizon, sun at or below the horizon, or sun
//!    behind the surface plane (complementary incidence ≤ 0)
//! 2. `Sunlit`: altitude ≥ sunlit threshold (≈ 0.1 rad)
//! 3. `PotentiallySunlit`: 0 < altitude < sunlit threshold
//!
//! Together the rules cover every finite altitude; NaN input stays `Unset`.

use pvirr_core::{IncidenceSeries, Result, SeriesElement, TimeSeries};
use serde::Serialize;
use std::fmt;

/// Diffuse regime of one timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ShadingState {
    #[default]
    Unset,
    InShade,
    Sunlit,
    PotentiallySunlit,
}

impl SeriesElement for ShadingState {
    fn is_missing(&self) -> bool {
        *self == ShadingState::Unset
    }
}

impl fmt::Display for ShadingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShadingState::Unset => "unset",
            ShadingState::InShade => "in_shade",
            ShadingState::Sunlit => "sunlit",
            ShadingState::PotentiallySunlit => "potentially_sunlit",
        };
        f.write_str(s)
    }
}

/// Inputs of the rule predicates for one timestamp
#[derive(Debug, Clone, Copy)]
struct Sample {
    altitude: f64,
    in_shade: bool,
    complementary_incidence: f64,
    sunlit_threshold: f64,
}

type Rule = (ShadingState, fn(&Sample) -> bool);

fn is_in_shade(s: &Sample) -> bool {
    s.in_shade || s.altitude <= 0.0 || s.complementary_incidence <= 0.0
}

fn is_sunlit(s: &Sample) -> bool {
    s.altitude >= s.sunlit_threshold
}

fn is_potentially_sunlit(s: &Sample) -> bool {
    s.altitude > 0.0 && s.altitude < s.sunlit_threshold
}

const RULES: [Rule; 3] = [
    (ShadingState::InShade, is_in_shade),
    (ShadingState::Sunlit, is_sunlit),
    (ShadingState::PotentiallySunlit, is_potentially_sunlit),
];

/// Shading state for one timestamp.
pub fn classify_shading_state(
    altitude: f64,
    in_shade: bool,
    complementary_incidence: f64,
    sunlit_threshold: f64,
) -> ShadingState {
    let sample = Sample {
        altitude,
        in_shade,
        complementary_incidence,
        sunlit_threshold,
    };
    RULES
        .iter()
        .find(|(_, pred)| pred(&sample))
        .map(|(state, _)| *state)
        .unwrap_or_default()
}

/// Shading state for every timestamp.
pub fn shading_states(
    altitude: &TimeSeries<f64>,
    in_shade: &TimeSeries<bool>,
    incidence: &IncidenceSeries,
    sunlit_threshold: f64,
) -> Result<TimeSeries<ShadingState>> {
    let n = altitude.len();
    in_shade.ensure_len("in_shade", n)?;
    incidence.radians().ensure_len("incidence", n)?;
    let complementary = incidence.to_complementary();
    let comp = complementary.radians().data();
    let alt = altitude.data();
    let shade = in_shade.data();
    Ok(TimeSeries::from_vec(
        (0..n)
            .map(|i| classify_shading_state(alt[i], shade[i], comp[i], sunlit_threshold))
            .collect(),
    ))
}

/// Number of timestamps per state, in rule order
pub fn state_counts(states: &TimeSeries<ShadingState>) -> [(ShadingState, usize); 3] {
    RULES.map(|(state, _)| (state, states.count(|s| *s == state)))
}
