//! End-to-end scenarios for the irradiance composer.
//!
//! The reference site is Rome (12.496°E, 41.903°N, 20 m) over the June
//! solstice, 24 hourly UTC timestamps, with a 30° south-facing surface.

use approx::assert_relative_eq;
use chrono::{TimeZone, Utc};
use pvirr_algorithms::irradiance::{
    global_inclined_irradiance, IrradianceEngine, IrradianceInput, IrradianceParams, IrradianceSource,
};
use pvirr_algorithms::shading::{HorizonProfile, ShadingAlgorithm, ShadingState, SunHorizonPosition};
use pvirr_core::{Error, Location, SurfaceGeometry, TimeSeries, Timestamps};

fn rome() -> Location {
    Location::from_degrees(12.496, 41.903, 20.0).unwrap()
}

fn solstice() -> Timestamps {
    Timestamps::hourly(Utc.with_ymd_and_hms(2024, 6, 21, 0, 0, 0).unwrap(), 24)
}

fn input(tilt_deg: f64) -> IrradianceInput {
    IrradianceInput::new(
        rome(),
        SurfaceGeometry::from_degrees(180.0, tilt_deg).unwrap(),
        solstice(),
        chrono_tz::UTC,
    )
    .with_constant_linke_turbidity(3.0)
}

fn no_reflectivity() -> IrradianceParams {
    IrradianceParams {
        apply_reflectivity: false,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Clear-sky day
// ---------------------------------------------------------------------------

#[test]
fn rome_solstice_clear_sky() {
    let r = global_inclined_irradiance(&input(30.0), &IrradianceParams::default()).unwrap();

    assert_eq!(r.len(), 24);
    assert_eq!(r.metadata.source, IrradianceSource::ClearSky);
    assert_relative_eq!(r.ground_view_fraction(), 0.0669872981, epsilon = 1e-9);
    assert!(!r.metadata.flat_surface);

    let altitude = r.position.altitude.radians();
    for i in 0..r.len() {
        let g = r.global.value.get(i).unwrap();
        assert!(g >= 0.0, "negative global irradiance {} at {}", g, i);
        if altitude.get(i).unwrap() < 0.0 {
            assert_eq!(g, 0.0, "irradiance at night, hour {}", i);
            assert_eq!(r.sun_horizon.get(i).unwrap(), SunHorizonPosition::Below);
        }
    }

    // around solar noon the surface faces the sun almost normally
    let noon = r.global.value.get(11).unwrap();
    assert!(noon > 800.0 && noon < 1300.0, "noon global {}", noon);
    assert!(r.direct.value.get(11).unwrap() > r.diffuse.value.get(11).unwrap());
    assert!(r.ground_reflected.value.get(11).unwrap() > 0.0);
}

#[test]
fn components_sum_to_global() {
    let r = global_inclined_irradiance(&input(30.0), &IrradianceParams::default()).unwrap();
    let before = r.global.before_reflectivity();
    for i in 0..r.len() {
        let parts = r.direct.value.get(i).unwrap()
            + r.diffuse.value.get(i).unwrap()
            + r.ground_reflected.value.get(i).unwrap();
        assert_relative_eq!(r.global.value.get(i).unwrap(), parts, epsilon = 1e-9);

        let parts_before = r.direct.before_reflectivity().get(i).unwrap()
            + r.diffuse.before_reflectivity().get(i).unwrap()
            + r.ground_reflected.before_reflectivity().get(i).unwrap();
        assert_relative_eq!(before.get(i).unwrap(), parts_before, epsilon = 1e-9);
    }

    let summary = r.summary().unwrap();
    assert!(summary.reflectivity_loss.sum > 0.0);
    assert!(summary.reflectivity_loss_percentage > 0.0 && summary.reflectivity_loss_percentage < 10.0);
}

#[test]
fn near_flat_surface_sees_no_ground() {
    let params = IrradianceParams {
        flat_tilt_threshold: 1f64.to_radians(),
        ..no_reflectivity()
    };
    let r = global_inclined_irradiance(&input(0.1), &params).unwrap();
    assert!(r.metadata.flat_surface);
    assert_eq!(r.ground_view_fraction(), 0.0);
    assert!(r.ground_reflected.value.iter().all(|&v| v == 0.0));

    // a flat surface takes the horizontal diffuse irradiance as is
    for i in 0..r.len() {
        if r.sun_horizon.get(i).unwrap() != SunHorizonPosition::Below {
            assert_relative_eq!(
                r.diffuse.value.get(i).unwrap(),
                r.horizontal.diffuse_horizontal.value.get(i).unwrap(),
                epsilon = 1e-9
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

#[test]
fn every_timestamp_is_classified_once() {
    let r = global_inclined_irradiance(&input(30.0), &IrradianceParams::default()).unwrap();
    assert!(r.sun_horizon.iter().all(|p| *p != SunHorizonPosition::Unset));
    assert!(r.shading_states.iter().all(|s| *s != ShadingState::Unset));

    let s = r.summary().unwrap();
    assert_eq!(s.below_horizon + s.low_angle + s.above_horizon, 24);
    assert_eq!(s.in_shade + s.sunlit + s.potentially_sunlit, 24);
    assert!(s.sunlit > 0 && s.in_shade > 0);
}

#[test]
fn direct_only_when_sun_above_horizon() {
    let r = global_inclined_irradiance(&input(30.0), &IrradianceParams::default()).unwrap();
    for i in 0..r.len() {
        let position = r.sun_horizon.get(i).unwrap();
        let in_shade = r.shading.in_shade.get(i).unwrap();
        if position != SunHorizonPosition::Above || in_shade {
            assert_eq!(r.direct.value.get(i).unwrap(), 0.0, "direct at hour {}", i);
        }
    }
}

#[test]
fn horizon_profile_shades_low_sun() {
    let horizon = HorizonProfile::uniform(vec![30f64.to_radians(); 8]).unwrap();
    let open = global_inclined_irradiance(&input(30.0), &IrradianceParams::default()).unwrap();
    let hilly = global_inclined_irradiance(&input(30.0).with_horizon(horizon.clone()), &IrradianceParams::default())
        .unwrap();

    assert_eq!(open.shading.algorithm, ShadingAlgorithm::Flat);
    assert_eq!(hilly.shading.algorithm, ShadingAlgorithm::HorizonInterpolation);
    assert!(hilly.shading.shaded_count() > open.shading.shaded_count());

    let altitude = hilly.position.altitude.radians();
    for i in 0..hilly.len() {
        let h = altitude.get(i).unwrap();
        if h > 0.0 && h < 30f64.to_radians() {
            assert!(hilly.shading.in_shade.get(i).unwrap(), "hour {} should be shaded", i);
            assert_eq!(hilly.shading_states.get(i).unwrap(), ShadingState::InShade);
            assert_eq!(hilly.direct.value.get(i).unwrap(), 0.0);
        }
    }
    assert!(hilly.global.value.sum() < open.global.value.sum());

    // switching shading off falls back to flat terrain
    let params = IrradianceParams {
        apply_shading: false,
        ..Default::default()
    };
    let flat = global_inclined_irradiance(&input(30.0).with_horizon(horizon), &params).unwrap();
    assert_eq!(flat.shading.algorithm, ShadingAlgorithm::Flat);
    assert_eq!(flat.global.value, open.global.value);
}

// ---------------------------------------------------------------------------
// Reflectivity
// ---------------------------------------------------------------------------

#[test]
fn reflectivity_is_reversible() {
    let corrected = global_inclined_irradiance(&input(30.0), &IrradianceParams::default()).unwrap();
    let plain = global_inclined_irradiance(&input(30.0), &no_reflectivity()).unwrap();

    for (with, without) in [
        (&corrected.direct, &plain.direct),
        (&corrected.diffuse, &plain.diffuse),
        (&corrected.ground_reflected, &plain.ground_reflected),
        (&corrected.global, &plain.global),
    ] {
        let before = with.before_reflectivity();
        for i in 0..corrected.len() {
            assert_relative_eq!(before.get(i).unwrap(), without.value.get(i).unwrap(), epsilon = 1e-6);
            assert!(with.value.get(i).unwrap() <= without.value.get(i).unwrap() + 1e-9);
        }
    }
}

// ---------------------------------------------------------------------------
// Memoization
// ---------------------------------------------------------------------------

#[test]
fn engine_results_do_not_depend_on_cache() {
    let engine = IrradianceEngine::new(IrradianceParams::default());
    let first = engine.compute(&input(30.0)).unwrap();
    let second = engine.compute(&input(30.0)).unwrap();
    let uncached = global_inclined_irradiance(&input(30.0), &IrradianceParams::default()).unwrap();

    assert_eq!(first.global, second.global);
    assert_eq!(first.horizontal, second.horizontal);
    assert_eq!(first.global, uncached.global);
    assert_eq!(first.shading_states, uncached.shading_states);

    for (name, stats) in engine.caches().stats() {
        assert_eq!((stats.hits, stats.misses), (1, 1), "cache {}", name);
    }

    // a different surface reuses position, shading and clear-sky results
    engine.compute(&input(45.0)).unwrap();
    for (name, stats) in engine.caches().stats() {
        assert_eq!(stats.hits, 2, "cache {}", name);
    }
}

// ---------------------------------------------------------------------------
// Measured horizontal irradiance
// ---------------------------------------------------------------------------

/// Clear-sky horizontal irradiance, reused as if it had been measured
fn measured() -> (TimeSeries<f64>, TimeSeries<f64>) {
    let clear = global_inclined_irradiance(&input(30.0), &IrradianceParams::default()).unwrap();
    (
        clear.horizontal.global_horizontal.value.clone(),
        clear.horizontal.direct_horizontal.value.clone(),
    )
}

#[test]
fn measured_irradiance_must_come_in_pairs() {
    let (global, _) = measured();
    let mut partial = input(30.0);
    partial.linke_turbidity = None;
    partial.global_horizontal = Some(global);
    let err = global_inclined_irradiance(&partial, &IrradianceParams::default()).unwrap_err();
    assert!(matches!(err, Error::MissingInput(_)));
}

#[test]
fn measured_irradiance_conflicts_with_linke() {
    let (global, direct) = measured();
    let conflicting = input(30.0).with_external_horizontal(global, direct);
    let err = global_inclined_irradiance(&conflicting, &IrradianceParams::default()).unwrap_err();
    assert!(matches!(err, Error::ConflictingInputs(_)));
}

#[test]
fn measured_clear_sky_reproduces_model() {
    let (global, direct) = measured();
    let clear = global_inclined_irradiance(&input(30.0), &IrradianceParams::default()).unwrap();

    let mut external = input(30.0).with_external_horizontal(global, direct);
    external.linke_turbidity = None;
    let r = global_inclined_irradiance(&external, &IrradianceParams::default()).unwrap();

    assert_eq!(r.metadata.source, IrradianceSource::External);
    assert_eq!(r.horizontal.global_horizontal.model, "external");
    assert_eq!(clear.global.source, IrradianceSource::ClearSky);

    // everything derived from the measured series carries their provenance
    for component in [
        &r.horizontal.global_horizontal,
        &r.horizontal.direct_horizontal,
        &r.horizontal.diffuse_horizontal,
        &r.horizontal.direct_normal,
        &r.direct,
        &r.diffuse,
        &r.ground_reflected,
        &r.global,
    ] {
        assert_eq!(component.source, IrradianceSource::External, "{}", component.kind);
    }
    assert_eq!(r.horizontal.extraterrestrial_normal.source, IrradianceSource::ClearSky);
    for i in 0..r.len() {
        assert_relative_eq!(
            r.global.value.get(i).unwrap(),
            clear.global.value.get(i).unwrap(),
            epsilon = 1e-6
        );
    }
}

#[test]
fn misaligned_measured_series_rejected() {
    let mut external = IrradianceInput::new(
        rome(),
        SurfaceGeometry::from_degrees(180.0, 30.0).unwrap(),
        solstice(),
        chrono_tz::UTC,
    );
    external = external.with_external_horizontal(TimeSeries::zeros(24), TimeSeries::zeros(23));
    let err = global_inclined_irradiance(&external, &IrradianceParams::default()).unwrap_err();
    assert!(matches!(err, Error::LengthMismatch { .. }));
}

#[test]
fn empty_timestamps_rejected() {
    let empty = IrradianceInput::new(
        rome(),
        SurfaceGeometry::default(),
        Timestamps::new(vec![]).unwrap(),
        chrono_tz::UTC,
    );
    let err = global_inclined_irradiance(&empty, &IrradianceParams::default()).unwrap_err();
    assert!(matches!(err, Error::EmptySeries { .. }));
}
