//! # pvirr Algorithms
//!
//! Irradiance composition and shading classification for tilted PV surfaces.
//!
//! ## Available Model Categories
//!
//! - **position**: Solar declination, hour angle, altitude, azimuth and incidence
//! - **shading**: Horizon shading, sun-horizon positions and shading states
//! - **atmosphere**: Extraterrestrial and clear-sky horizontal irradiance
//! - **reflectivity**: Angular reflectivity loss (Martin & Ruiz 2005)
//! - **irradiance**: Direct, diffuse and ground-reflected inclined irradiance
//! - **cache**: LRU memoization of the pure sub-computations

pub mod atmosphere;
pub mod cache;
pub mod irradiance;
pub(crate) mod maybe_rayon;
pub mod position;
pub mod reflectivity;
pub mod shading;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::atmosphere::{clear_sky, AtmosphereParams, ClearSkyInput, ClearSkyIrradiance, ClearSkyModel};
    pub use crate::cache::{CacheKey, CacheStats, KeyBuilder, MemoCache};
    pub use crate::irradiance::{
        global_inclined_irradiance, ComponentKind, GlobalInclinedIrradiance, IrradianceCaches, IrradianceComponent,
        IrradianceComposer, IrradianceEngine, IrradianceInput, IrradianceParams, IrradianceSource, IrradianceSummary,
        PhysicalLimits,
    };
    pub use crate::position::{
        solar_incidence, solar_position, IncidenceAlgorithm, IncidenceParams, PositionAlgorithm, SolarIncidence,
        SolarPosition, SolarPositionParams, SolarPositionResult, TimingAlgorithm,
    };
    pub use crate::reflectivity::{apply_reflectivity, ReflectivityCorrector, ReflectivityKind, ReflectivityParams};
    pub use crate::shading::{
        shading_states, sun_horizon_positions, surface_in_shade, HorizonProfile, ShadingAlgorithm, ShadingClassifier,
        ShadingResult, ShadingState, SunHorizonPosition,
    };
    pub use pvirr_core::prelude::*;
}
