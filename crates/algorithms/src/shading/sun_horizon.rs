//! Position of the sun relative to the horizon
//!
//! Each timestamp gets exactly one tag. Rules are evaluated in order and
//! only touch timestamps that no earlier rule has tagged:
//!
//! 1. `Below`:    altitude < 0
//! 2. `LowAngle`: 0 ≤ altitude < low-angle threshold
//! 3. `Above`:    altitude > 0
//!
//! An altitude of exactly 0 is therefore `LowAngle`. Only a NaN altitude
//! stays `Unset`.

use pvirr_core::{SeriesElement, TimeSeries};
use serde::Serialize;
use std::fmt;

/// Sun-horizon regime of one timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SunHorizonPosition {
    #[default]
    Unset,
    Below,
    LowAngle,
    Above,
}

impl SeriesElement for SunHorizonPosition {
    fn is_missing(&self) -> bool {
        *self == SunHorizonPosition::Unset
    }
}

impl fmt::Display for SunHorizonPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SunHorizonPosition::Unset => "unset",
            SunHorizonPosition::Below => "below",
            SunHorizonPosition::LowAngle => "low_angle",
            SunHorizonPosition::Above => "above",
        };
        f.write_str(s)
    }
}

type Rule = (SunHorizonPosition, fn(f64, f64) -> bool);

fn is_below(h: f64, _low: f64) -> bool {
    h < 0.0
}

fn is_low_angle(h: f64, low: f64) -> bool {
    (0.0..low).contains(&h)
}

fn is_above(h: f64, _low: f64) -> bool {
    h > 0.0
}

const RULES: [Rule; 3] = [
    (SunHorizonPosition::Below, is_below),
    (SunHorizonPosition::LowAngle, is_low_angle),
    (SunHorizonPosition::Above, is_above),
];

/// Tag for one altitude (radians).
pub fn classify_sun_horizon(altitude: f64, low_angle_threshold: f64) -> SunHorizonPosition {
    RULES
        .iter()
        .find(|(_, pred)| pred(altitude, low_angle_threshold))
        .map(|(tag, _)| *tag)
        .unwrap_or_default()
}

/// Tag every timestamp.
pub fn sun_horizon_positions(altitude: &TimeSeries<f64>, low_angle_threshold: f64) -> TimeSeries<SunHorizonPosition> {
    altitude.map(|h| classify_sun_horizon(h, low_angle_threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pvirr_core::constants::LOW_ANGLE_THRESHOLD;

    #[test]
    fn test_partition() {
        let alt = TimeSeries::from_vec(vec![-0.5, -1e-9, 0.0, 0.02, 0.04, 0.3, 1.5]);
        let tags = sun_horizon_positions(&alt, LOW_ANGLE_THRESHOLD);
        use SunHorizonPosition::*;
        assert_eq!(tags.to_vec(), vec![Below, Below, LowAngle, LowAngle, Above, Above, Above]);
        assert_eq!(tags.missing_count(), 0);
    }

    #[test]
    fn test_nan_stays_unset() {
        assert_eq!(classify_sun_horizon(f64::NAN, 0.04), SunHorizonPosition::Unset);
    }
}
