//! Angular quantities with explicit unit, azimuth origin and incidence definition
//!
//! Engine-internal angles are radians. The wrappers here carry the tags
//! that make a convention change explicit: converting between north- and
//! south-referenced azimuth, or between the typical and complementary
//! incidence angle, always goes through a method that retags the result.

use crate::error::{Error, Result};
use crate::series::TimeSeries;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;

/// Unit of an angular series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AngleUnit::Radians => write!(f, "radians"),
            AngleUnit::Degrees => write!(f, "degrees"),
        }
    }
}

/// Reference direction for azimuth values (both measured clockwise)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AzimuthOrigin {
    /// 0 = North, π/2 = East
    #[default]
    North,
    /// 0 = South, π/2 = West (astronomers' convention)
    South,
}

/// Which angle an incidence value measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum IncidenceDefinition {
    /// Between sun-vector and surface normal
    #[default]
    Typical,
    /// Between sun-vector and surface plane, `π/2 − typical`
    Complementary,
}

impl fmt::Display for IncidenceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncidenceDefinition::Typical => write!(f, "sun-to-surface-normal"),
            IncidenceDefinition::Complementary => write!(f, "sun-to-surface-plane"),
        }
    }
}

/// Wrap an angle into `[0, 2π)`.
pub fn wrap_two_pi(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Wrap an angle into `[-π, π)`.
pub fn wrap_pi(angle: f64) -> f64 {
    wrap_two_pi(angle + PI) - PI
}

// ---------------------------------------------------------------------------
// AngleSeries
// ---------------------------------------------------------------------------

/// A time series of angles with its unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AngleSeries {
    values: TimeSeries<f64>,
    unit: AngleUnit,
}

impl AngleSeries {
    pub fn new(values: TimeSeries<f64>, unit: AngleUnit) -> Self {
        Self { values, unit }
    }

    pub fn from_radians(values: TimeSeries<f64>) -> Self {
        Self::new(values, AngleUnit::Radians)
    }

    pub fn from_degrees(values: TimeSeries<f64>) -> Self {
        Self::new(values, AngleUnit::Degrees)
    }

    pub fn unit(&self) -> AngleUnit {
        self.unit
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values in the stored unit
    pub fn values(&self) -> &TimeSeries<f64> {
        &self.values
    }

    /// Values converted to `unit`
    pub fn in_unit(&self, unit: AngleUnit) -> TimeSeries<f64> {
        match (self.unit, unit) {
            (AngleUnit::Radians, AngleUnit::Degrees) => self.values.to_degrees(),
            (AngleUnit::Degrees, AngleUnit::Radians) => self.values.to_radians(),
            _ => self.values.clone(),
        }
    }

    /// Values in radians
    pub fn radians(&self) -> TimeSeries<f64> {
        self.in_unit(AngleUnit::Radians)
    }

    /// Values in degrees
    pub fn degrees(&self) -> TimeSeries<f64> {
        self.in_unit(AngleUnit::Degrees)
    }

    /// Same angles retagged in `unit`
    pub fn to_unit(&self, unit: AngleUnit) -> AngleSeries {
        AngleSeries::new(self.in_unit(unit), unit)
    }
}

// ---------------------------------------------------------------------------
// AzimuthSeries
// ---------------------------------------------------------------------------

/// Solar azimuth in radians, tagged with its origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AzimuthSeries {
    radians: TimeSeries<f64>,
    origin: AzimuthOrigin,
}

impl AzimuthSeries {
    /// Wrap azimuth values (radians), normalising them into `[0, 2π)`.
    pub fn new(radians: TimeSeries<f64>, origin: AzimuthOrigin) -> Self {
        Self {
            radians: radians.map(wrap_two_pi),
            origin,
        }
    }

    pub fn origin(&self) -> AzimuthOrigin {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.radians.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radians.is_empty()
    }

    /// Raw values in radians, relative to [`Self::origin`]
    pub fn radians(&self) -> &TimeSeries<f64> {
        &self.radians
    }

    /// Convert to another origin: a ±π shift followed by a wrap into `[0, 2π)`.
    pub fn to_origin(&self, origin: AzimuthOrigin) -> AzimuthSeries {
        if origin == self.origin {
            return self.clone();
        }
        let shift = match origin {
            AzimuthOrigin::South => -PI,
            AzimuthOrigin::North => PI,
        };
        AzimuthSeries::new(self.radians.map(|a| a + shift), origin)
    }

    /// Values relative to `origin`, converting if needed
    pub fn radians_from(&self, origin: AzimuthOrigin) -> TimeSeries<f64> {
        self.to_origin(origin).radians
    }
}

// ---------------------------------------------------------------------------
// IncidenceSeries
// ---------------------------------------------------------------------------

/// Solar incidence angle in radians, tagged with its definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncidenceSeries {
    radians: TimeSeries<f64>,
    definition: IncidenceDefinition,
}

impl IncidenceSeries {
    pub fn new(radians: TimeSeries<f64>, definition: IncidenceDefinition) -> Self {
        Self {
            radians,
            definition,
        }
    }

    pub fn definition(&self) -> IncidenceDefinition {
        self.definition
    }

    pub fn len(&self) -> usize {
        self.radians.len()
    }

    pub fn is_empty(&self) -> bool {
        self.radians.is_empty()
    }

    /// Retag as `definition`, applying `π/2 − angle` when it differs.
    pub fn to_definition(&self, definition: IncidenceDefinition) -> IncidenceSeries {
        if definition == self.definition {
            return self.clone();
        }
        IncidenceSeries::new(self.radians.map(|a| FRAC_PI_2 - a), definition)
    }

    pub fn to_typical(&self) -> IncidenceSeries {
        self.to_definition(IncidenceDefinition::Typical)
    }

    pub fn to_complementary(&self) -> IncidenceSeries {
        self.to_definition(IncidenceDefinition::Complementary)
    }

    /// Radian values, only if they already follow `definition`.
    ///
    /// Boundary check for code that relies on one convention.
    pub fn radians_as(&self, definition: IncidenceDefinition) -> Result<&TimeSeries<f64>> {
        if definition != self.definition {
            return Err(Error::invalid(
                "incidence definition",
                self.definition,
                format!("expected {}", definition),
            ));
        }
        Ok(&self.radians)
    }

    /// Raw radian values in the stored definition
    pub fn radians(&self) -> &TimeSeries<f64> {
        &self.radians
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wrap() {
        assert_relative_eq!(wrap_two_pi(-PI / 2.0), 3.0 * PI / 2.0);
        assert_relative_eq!(wrap_two_pi(5.0 * PI), PI, epsilon = 1e-12);
        assert_eq!(wrap_two_pi(-1e-18), 0.0);
        assert_relative_eq!(wrap_pi(3.0 * PI / 2.0), -PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_azimuth_origin_roundtrip() {
        let north = AzimuthSeries::new(
            TimeSeries::from_vec(vec![0.0, PI / 2.0, PI, 3.0 * PI / 2.0]),
            AzimuthOrigin::North,
        );
        let south = north.to_origin(AzimuthOrigin::South);
        assert_eq!(south.origin(), AzimuthOrigin::South);
        let expected = [PI, 3.0 * PI / 2.0, 0.0, PI / 2.0];
        for (a, e) in south.radians().iter().zip(expected.iter()) {
            assert_relative_eq!(*a, *e, epsilon = 1e-12);
        }
        let back = south.to_origin(AzimuthOrigin::North);
        for (a, e) in back.radians().iter().zip(north.radians().iter()) {
            assert_relative_eq!(*a, *e, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_incidence_definition_conversion() {
        let typical = IncidenceSeries::new(
            TimeSeries::from_vec(vec![0.0, PI / 6.0]),
            IncidenceDefinition::Typical,
        );
        let comp = typical.to_complementary();
        assert_eq!(comp.definition(), IncidenceDefinition::Complementary);
        assert_relative_eq!(comp.radians().get(0).unwrap(), FRAC_PI_2);
        assert_relative_eq!(comp.radians().get(1).unwrap(), PI / 3.0, epsilon = 1e-12);

        assert!(comp.radians_as(IncidenceDefinition::Typical).is_err());
        assert!(comp.radians_as(IncidenceDefinition::Complementary).is_ok());
    }

    #[test]
    fn test_angle_units() {
        let a = AngleSeries::from_degrees(TimeSeries::from_vec(vec![180.0]));
        assert_relative_eq!(a.radians().get(0).unwrap(), PI);
        assert_eq!(a.to_unit(AngleUnit::Radians).unit(), AngleUnit::Radians);
    }
}
