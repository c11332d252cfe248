//! Solar time and hour angle
//!
//! True solar time is local clock time corrected by the time offset
//! `4·λ − tz + EoT` (minutes, λ in degrees east). The hour angle follows as
//! `(TST − 720)·π/720`, zero at solar noon and positive in the afternoon.
//! The equation of time is evaluated on the UTC instant, so the display
//! zone only shifts the clock and cancels in the offset.
//!
//! Equation of time variants:
//! - NOAA: Fourier series on the fractional year (Spencer 1971, as published
//!   in the NOAA General Solar Position Calculations).
//! - Milne (1921): `9.87 sin 2B − 7.53 cos B − 1.5 sin B`, `B = 360/365·(n − 81)`°.

use chrono::{DateTime, Datelike, Offset, Timelike, Utc};
use chrono_tz::Tz;
use pvirr_core::angle::wrap_pi;
use pvirr_core::series::days_in_year;
use pvirr_core::{TimeSeries, Timestamps};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::maybe_rayon::series_from_fn;

/// Equation-of-time model used to derive solar time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimingAlgorithm {
    #[default]
    Noaa,
    Milne1921,
}

impl TimingAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            TimingAlgorithm::Noaa => "NOAA",
            TimingAlgorithm::Milne1921 => "Milne1921",
        }
    }
}

impl fmt::Display for TimingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimingAlgorithm {
    type Err = pvirr_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "noaa" => Ok(TimingAlgorithm::Noaa),
            "milne" | "milne1921" => Ok(TimingAlgorithm::Milne1921),
            _ => Err(pvirr_core::Error::invalid("timing_algorithm", s, "expected noaa or milne1921")),
        }
    }
}

/// Fractional year γ in radians for a UTC instant.
pub fn fractional_year(instant: &DateTime<Utc>) -> f64 {
    let days = days_in_year(instant.year()) as f64;
    let hour = instant.hour() as f64;
    2.0 * PI / days * (instant.ordinal() as f64 - 1.0 + (hour - 12.0) / 24.0)
}

/// NOAA equation of time, minutes.
pub fn equation_of_time_noaa(gamma: f64) -> f64 {
    229.18
        * (0.000075 + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin())
}

/// Milne (1921) equation of time, minutes.
pub fn equation_of_time_milne(day_of_year: u32) -> f64 {
    let b = (360.0 / 365.0 * (day_of_year as f64 - 81.0)).to_radians();
    9.87 * (2.0 * b).sin() - 7.53 * b.cos() - 1.5 * b.sin()
}

/// Equation of time for a UTC instant, minutes.
pub fn equation_of_time(instant: &DateTime<Utc>, algorithm: TimingAlgorithm) -> f64 {
    match algorithm {
        TimingAlgorithm::Noaa => equation_of_time_noaa(fractional_year(instant)),
        TimingAlgorithm::Milne1921 => equation_of_time_milne(instant.ordinal()),
    }
}

/// Time offset in minutes: `4·λ° − tz_offset + EoT`.
pub fn time_offset(longitude: f64, timezone_offset_minutes: f64, equation_of_time: f64) -> f64 {
    4.0 * longitude.to_degrees() - timezone_offset_minutes + equation_of_time
}

/// True solar time, minutes after local midnight (may leave `[0, 1440)`).
pub fn true_solar_time(instant: &DateTime<Utc>, longitude: f64, timezone: Tz, algorithm: TimingAlgorithm) -> f64 {
    let local = instant.with_timezone(&timezone);
    let tz_minutes = local.offset().fix().local_minus_utc() as f64 / 60.0;
    let clock = local.hour() as f64 * 60.0
        + local.minute() as f64
        + local.second() as f64 / 60.0
        + local.nanosecond() as f64 / 6e10;
    let eot = equation_of_time(instant, algorithm);
    clock + time_offset(longitude, tz_minutes, eot)
}

/// Solar hour angle in `[-π, π)`, radians.
pub fn hour_angle(instant: &DateTime<Utc>, longitude: f64, timezone: Tz, algorithm: TimingAlgorithm) -> f64 {
    let tst = true_solar_time(instant, longitude, timezone, algorithm);
    wrap_pi((tst - 720.0) * PI / 720.0)
}

/// Hour angle for every timestamp.
pub fn hour_angle_series(
    timestamps: &Timestamps,
    longitude: f64,
    timezone: Tz,
    algorithm: TimingAlgorithm,
) -> TimeSeries<f64> {
    let instants = timestamps.as_slice();
    series_from_fn(instants.len(), |i| hour_angle(&instants[i], longitude, timezone, algorithm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::TimeZone;

    #[test]
    fn test_equation_of_time_magnitude() {
        // early November maximum, roughly +16 minutes
        let nov = Utc.with_ymd_and_hms(2024, 11, 3, 12, 0, 0).unwrap();
        let eot = equation_of_time(&nov, TimingAlgorithm::Noaa);
        assert!(eot > 15.0 && eot < 17.5, "NOAA EoT on Nov 3: {}", eot);
        let milne = equation_of_time(&nov, TimingAlgorithm::Milne1921);
        assert!(milne > 15.0 && milne < 17.5, "Milne EoT on Nov 3: {}", milne);

        // mid February minimum, roughly -14 minutes
        let feb = Utc.with_ymd_and_hms(2024, 2, 12, 12, 0, 0).unwrap();
        let eot = equation_of_time(&feb, TimingAlgorithm::Noaa);
        assert!(eot < -13.0 && eot > -15.5, "NOAA EoT on Feb 12: {}", eot);
    }

    #[test]
    fn test_hour_angle_timezone_invariant() {
        let t = Utc.with_ymd_and_hms(2024, 6, 21, 10, 30, 0).unwrap();
        let lon = 12.496_f64.to_radians();
        let utc = hour_angle(&t, lon, chrono_tz::UTC, TimingAlgorithm::Noaa);
        let rome = hour_angle(&t, lon, chrono_tz::Europe::Rome, TimingAlgorithm::Noaa);
        assert_relative_eq!(utc, rome, epsilon = 1e-12);
    }

    #[test]
    fn test_hour_angle_near_noon() {
        // Greenwich at 12:00 UTC: hour angle equals EoT expressed as an angle
        let t = Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();
        let h = hour_angle(&t, 0.0, chrono_tz::UTC, TimingAlgorithm::Noaa);
        let eot = equation_of_time(&t, TimingAlgorithm::Noaa);
        assert_relative_eq!(h, eot * PI / 720.0, epsilon = 1e-12);

        // 15° east reaches the same hour angle one hour earlier
        let t_east = Utc.with_ymd_and_hms(2024, 6, 21, 11, 0, 0).unwrap();
        let h_east = hour_angle(&t_east, 15f64.to_radians(), chrono_tz::UTC, TimingAlgorithm::Noaa);
        assert_relative_eq!(h, h_east, epsilon = 1e-3);
    }

    #[test]
    fn test_hour_angle_range() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let ts = Timestamps::hourly(start, 48);
        let series = hour_angle_series(&ts, 3.0, chrono_tz::UTC, TimingAlgorithm::Milne1921);
        assert!(series.iter().all(|&h| (-PI..PI).contains(&h)));
    }

    #[test]
    fn test_parse_timing() {
        assert_eq!("NOAA".parse::<TimingAlgorithm>().unwrap(), TimingAlgorithm::Noaa);
        assert_eq!("milne".parse::<TimingAlgorithm>().unwrap(), TimingAlgorithm::Milne1921);
        assert!("sundial".parse::<TimingAlgorithm>().is_err());
    }
}
