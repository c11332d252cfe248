//! Ordered timestamp sequence shared by every series in one computation

use crate::error::{Error, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDateTime, Utc};
use serde::Serialize;

/// Non-decreasing sequence of UTC instants.
///
/// Every [`TimeSeries`](super::TimeSeries) taking part in one computation is
/// aligned index-for-index with one `Timestamps` value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Timestamps {
    inner: Vec<DateTime<Utc>>,
}

impl Timestamps {
    /// Wrap an ordered sequence. Fails if any instant precedes its predecessor.
    pub fn new(inner: Vec<DateTime<Utc>>) -> Result<Self> {
        if let Some(i) = inner.windows(2).position(|w| w[1] < w[0]) {
            return Err(Error::invalid(
                "timestamps",
                inner[i + 1],
                format!("earlier than preceding timestamp {}", inner[i]),
            ));
        }
        Ok(Self { inner })
    }

    /// `count` instants starting at `start`, `step` apart.
    pub fn regular(start: DateTime<Utc>, step: Duration, count: usize) -> Result<Self> {
        if step < Duration::zero() {
            return Err(Error::invalid("step", step, "must not be negative"));
        }
        let inner = (0..count)
            .map(|i| start + step * i as i32)
            .collect();
        Ok(Self { inner })
    }

    /// Hourly instants starting at `start`.
    pub fn hourly(start: DateTime<Utc>, count: usize) -> Self {
        Self {
            inner: (0..count)
                .map(|i| start + Duration::hours(i as i64))
                .collect(),
        }
    }

    /// Parse RFC 3339 strings, or naive `YYYY-MM-DDTHH:MM:SS` values taken as UTC.
    pub fn parse<S: AsRef<str>>(values: &[S]) -> Result<Self> {
        let inner = values
            .iter()
            .map(|s| parse_instant(s.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(inner)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DateTime<Utc>> + '_ {
        self.inner.iter()
    }

    pub fn as_slice(&self) -> &[DateTime<Utc>] {
        &self.inner
    }

    pub fn first(&self) -> Option<&DateTime<Utc>> {
        self.inner.first()
    }

    pub fn last(&self) -> Option<&DateTime<Utc>> {
        self.inner.last()
    }

    /// Fail with [`Error::EmptySeries`] if there are no instants.
    pub fn ensure_not_empty(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::EmptySeries { name: "timestamps" });
        }
        Ok(())
    }
}

/// Number of days in `year` (Gregorian).
pub fn days_in_year(year: i32) -> u32 {
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    if leap {
        366
    } else {
        365
    }
}

/// Day of year (1-based) and days in that year.
pub fn day_of_year<T: Datelike>(t: &T) -> (u32, u32) {
    (t.ordinal(), days_in_year(t.year()))
}

fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .map(|naive| naive.and_utc())
        .map_err(|e| Error::invalid("timestamp", s, e.to_string()))
}
