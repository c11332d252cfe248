//! # pvirr Core
//!
//! Core types and traits for the pvirr irradiance engine.
//!
//! This crate provides:
//! - `TimeSeries<T>` and `Timestamps`: aligned, temporally ordered series
//! - `AngleSeries`, `AzimuthSeries`, `IncidenceSeries`: angles tagged with
//!   unit, azimuth origin or incidence definition
//! - `Location` and `SurfaceGeometry`
//! - Physical constants and model defaults
//! - The error taxonomy and the `Algorithm` trait

pub mod angle;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod series;

pub use angle::{AngleSeries, AngleUnit, AzimuthOrigin, AzimuthSeries, IncidenceDefinition, IncidenceSeries};
pub use error::{Error, Result};
pub use geometry::{Location, SurfaceGeometry};
pub use series::{SeriesElement, TimeSeries, Timestamps};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::angle::{
        AngleSeries, AngleUnit, AzimuthOrigin, AzimuthSeries, IncidenceDefinition, IncidenceSeries,
    };
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{Location, SurfaceGeometry};
    pub use crate::series::{SeriesElement, TimeSeries, Timestamps};
    pub use crate::Algorithm;
}

/// Core trait for the engine's models.
///
/// Models are pure functions of their input and parameters; the only state
/// a model may hold is a memoization cache.
pub trait Algorithm {
    /// Input type for the model
    type Input;
    /// Output type for the model
    type Output;
    /// Parameters controlling model behavior
    type Params: Default;
    /// Error type for model execution
    type Error: std::error::Error;

    /// Returns the model name
    fn name(&self) -> &'static str;

    /// Returns a description of what the model computes
    fn description(&self) -> &'static str;

    /// Execute the model
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
