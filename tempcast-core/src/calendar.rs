//! Calendar keys used to line up the same hour of the year across historical years.
//!
//! A request timestamp such as `2031-07-14 15:42` is reduced to a [`TargetTime`]:
//! the year to extrapolate to, and the [`CalendarHour`] `07-14 15:00:00` that
//! selects matching records in every historical year.

use crate::errors::{TempcastError, TempcastResult};
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Accepted format for request timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format of the string keys found in dataset files
pub const DATASET_KEY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A (month, day, hour) triple, normalised to the top of the hour
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalendarHour {
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

impl CalendarHour {
    pub fn new(month: u32, day: u32, hour: u32) -> Self {
        Self { month, day, hour }
    }

    /// Key for this calendar hour in a given year
    pub fn in_year(self, year: i32) -> HistoricalKey {
        HistoricalKey::new(year, self)
    }

    fn from_datetime(datetime: &NaiveDateTime) -> Self {
        Self::new(datetime.month(), datetime.day(), datetime.hour())
    }
}

impl fmt::Display for CalendarHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02} {:02}:00:00", self.month, self.day, self.hour)
    }
}

/// Lookup key into the historical dataset
///
/// Keys are typed rather than composed from strings. The string form
/// (`YYYY-MM-DD HH:00:00`) only exists at the dataset-file boundary, see
/// [`HistoricalKey::from_str`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HistoricalKey {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

impl HistoricalKey {
    pub fn new(year: i32, calendar_hour: CalendarHour) -> Self {
        Self {
            year,
            month: calendar_hour.month,
            day: calendar_hour.day,
            hour: calendar_hour.hour,
        }
    }

    pub fn calendar_hour(&self) -> CalendarHour {
        CalendarHour::new(self.month, self.day, self.hour)
    }
}

impl fmt::Display for HistoricalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{}", self.year, self.calendar_hour())
    }
}

impl FromStr for HistoricalKey {
    type Err = TempcastError;

    fn from_str(s: &str) -> TempcastResult<Self> {
        let datetime = NaiveDateTime::parse_from_str(s.trim(), DATASET_KEY_FORMAT)
            .map_err(|_| TempcastError::MalformedDatasetKey(s.to_string()))?;
        if datetime.minute() != 0 || datetime.second() != 0 {
            return Err(TempcastError::MalformedDatasetKey(s.to_string()));
        }
        Ok(Self::new(
            datetime.year(),
            CalendarHour::from_datetime(&datetime),
        ))
    }
}

/// The year and calendar hour a forecast is requested for
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TargetTime {
    pub year: i32,
    pub calendar_hour: CalendarHour,
}

impl TargetTime {
    /// Parse a `YYYY-MM-DD HH:MM` timestamp. Minutes are dropped.
    pub fn parse(timestamp: &str) -> TempcastResult<Self> {
        let datetime = NaiveDateTime::parse_from_str(timestamp.trim(), TIMESTAMP_FORMAT)
            .map_err(|_| TempcastError::MalformedTimestamp(timestamp.to_string()))?;
        Ok(Self {
            year: datetime.year(),
            calendar_hour: CalendarHour::from_datetime(&datetime),
        })
    }
}

impl FromStr for TargetTime {
    type Err = TempcastError;

    fn from_str(s: &str) -> TempcastResult<Self> {
        Self::parse(s)
    }
}
