//! Location and surface geometry

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Site location. Angles in radians, elevation in metres above sea level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// Longitude in [-π, π], east positive
    pub longitude: f64,
    /// Latitude in [-π/2, π/2], north positive
    pub latitude: f64,
    /// Elevation, m
    pub elevation: f64,
}

impl Location {
    /// Validated constructor
    pub fn new(longitude: f64, latitude: f64, elevation: f64) -> Result<Self> {
        if !(-PI..=PI).contains(&longitude) {
            return Err(Error::invalid("longitude", longitude, "outside [-pi, pi] radians"));
        }
        if !(-FRAC_PI_2..=FRAC_PI_2).contains(&latitude) {
            return Err(Error::invalid("latitude", latitude, "outside [-pi/2, pi/2] radians"));
        }
        if !elevation.is_finite() {
            return Err(Error::invalid("elevation", elevation, "must be finite"));
        }
        Ok(Self {
            longitude,
            latitude,
            elevation,
        })
    }

    /// Constructor from degrees
    pub fn from_degrees(longitude: f64, latitude: f64, elevation: f64) -> Result<Self> {
        Self::new(longitude.to_radians(), latitude.to_radians(), elevation)
    }
}

/// Orientation and tilt of a PV surface, radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGeometry {
    /// Azimuth of the surface normal projection, clockwise from North (South = π)
    pub orientation: f64,
    /// Inclination from the horizontal, [0, π]
    pub tilt: f64,
}

impl Default for SurfaceGeometry {
    fn default() -> Self {
        Self {
            orientation: PI,
            tilt: 0.0,
        }
    }
}

impl SurfaceGeometry {
    /// Validated constructor
    pub fn new(orientation: f64, tilt: f64) -> Result<Self> {
        if !(0.0..=TAU).contains(&orientation) {
            return Err(Error::invalid("surface_orientation", orientation, "outside [0, 2pi] radians"));
        }
        if !(0.0..=PI).contains(&tilt) {
            return Err(Error::invalid("surface_tilt", tilt, "outside [0, pi] radians"));
        }
        Ok(Self { orientation, tilt })
    }

    /// Constructor from degrees
    pub fn from_degrees(orientation: f64, tilt: f64) -> Result<Self> {
        Self::new(orientation.to_radians(), tilt.to_radians())
    }

    /// Orientation measured clockwise from South
    pub fn orientation_from_south(&self) -> f64 {
        crate::angle::wrap_two_pi(self.orientation - PI)
    }

    /// Whether the tilt is at or below `threshold`
    pub fn is_flat(&self, threshold: f64) -> bool {
        self.tilt <= threshold
    }

    /// Fraction of the ground seen by the surface, `(1 - cos β) / 2`,
    /// or 0 for a surface no steeper than `flat_threshold`.
    pub fn ground_view_fraction(&self, flat_threshold: f64) -> f64 {
        if self.is_flat(flat_threshold) {
            0.0
        } else {
            (1.0 - self.tilt.cos()) / 2.0
        }
    }
}
