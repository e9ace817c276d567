//! Date range and night count.

use crate::error::BookingError;
use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of nights between arrival and departure
///
/// # Errors
///
/// Returns [`BookingError::InvalidRange`] if `end` is not strictly after `start`.
pub fn nights(start: NaiveDate, end: NaiveDate) -> Result<u32, BookingError> {
    let days = (end - start).num_days();
    if days < 1 {
        return Err(BookingError::InvalidRange { start, end });
    }
    u32::try_from(days).map_err(|_| BookingError::InvalidRange { start, end })
}

/// Stay from arrival (inclusive) to departure (exclusive)
///
/// Always holds `end > start`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RangeBounds")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RangeBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RangeBounds> for DateRange {
    type Error = BookingError;

    fn try_from(bounds: RangeBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.start, bounds.end)
    }
}

impl DateRange {
    /// Creates a range
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidRange`] if `end <= start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, BookingError> {
        nights(start, end)?;
        Ok(Self { start, end })
    }

    /// Creates a range from the two date inputs of the search form
    ///
    /// # Errors
    ///
    /// - [`BookingError::MissingDate`] if either bound is absent
    /// - [`BookingError::InvalidRange`] if `end <= start`
    pub fn from_bounds(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Self, BookingError> {
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end),
            _ => Err(BookingError::MissingDate),
        }
    }

    /// Creates a range from timestamps, ignoring the time of day
    ///
    /// # Errors
    ///
    /// Returns [`BookingError::InvalidRange`] if the departure day is not after
    /// the arrival day.
    pub fn from_timestamps<Tz: TimeZone>(
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
    ) -> Result<Self, BookingError> {
        Self::new(start.date_naive(), end.date_naive())
    }

    /// Arrival date
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Departure date
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of nights, at least 1
    #[must_use]
    pub fn nights(&self) -> u32 {
        nights(self.start, self.end).unwrap_or(1)
    }

    /// Whether two stays share at least one night
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start, self.end)
    }
}
