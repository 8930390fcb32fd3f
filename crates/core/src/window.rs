//! Date windows for the dashboard's period selector.
//!
//! A `Week` is the rolling seven days ending at the reference date unless the
//! ISO policy is chosen explicitly; a `Month` is the reference date's calendar
//! month. Every window is a whole number of calendar days with `start <= end`.

use std::{fmt, str::FromStr};

use serde::Serialize;
use time::{macros::format_description, Date, Duration};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("invalid date '{input}': expected YYYY-MM-DD ({reason})")]
    InvalidDate { input: String, reason: String },
    #[error("invalid period '{0}': expected Week or Month")]
    InvalidPeriod(String),
    #[error("invalid week policy '{0}': expected rolling or iso_week")]
    InvalidWeekPolicy(String),
    #[error("window around {0} falls outside the supported calendar")]
    OutOfRange(Date),
    #[error("window start {start} is after end {end}")]
    Inverted { start: Date, end: Date },
}

/// Parsed case-insensitively from query strings; displayed as `Week` / `Month`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Week,
    Month,
}

impl FromStr for Period {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            _ => Err(WindowError::InvalidPeriod(s.to_owned())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Week => write!(f, "Week"),
            Period::Month => write!(f, "Month"),
        }
    }
}

/// How a `Week` period is laid out on the calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WeekPolicy {
    /// Seven days ending at the reference date, so the reference is always the last point.
    #[default]
    Rolling,
    /// Monday through Sunday of the ISO week containing the reference date.
    IsoWeek,
}

impl FromStr for WeekPolicy {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "rolling" => Ok(WeekPolicy::Rolling),
            "iso_week" | "iso" => Ok(WeekPolicy::IsoWeek),
            _ => Err(WindowError::InvalidWeekPolicy(s.to_owned())),
        }
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Window {
    #[serde(with = "iso_date")]
    start: Date,
    #[serde(with = "iso_date")]
    end: Date,
}

impl Window {
    pub fn new(start: Date, end: Date) -> Result<Self, WindowError> {
        if start > end {
            return Err(WindowError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    /// Number of calendar days covered, counting both ends.
    pub fn len(&self) -> usize {
        ((self.end - self.start).whole_days() + 1) as usize
    }

    /// Always false; a window covers at least one day.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> Days {
        Days {
            next: Some(self.start),
            end: self.end,
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

/// Iterator over every day of a [`Window`], ascending.
#[derive(Debug, Clone)]
pub struct Days {
    next: Option<Date>,
    end: Date,
}

impl Iterator for Days {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        let current = self.next.filter(|day| *day <= self.end)?;
        self.next = current.next_day();
        Some(current)
    }
}

/// Resolve the window for `period` using the rolling week policy.
pub fn resolve_window(reference: Date, period: Period) -> Result<Window, WindowError> {
    resolve_window_with(reference, period, WeekPolicy::Rolling)
}

pub fn resolve_window_with(
    reference: Date,
    period: Period,
    policy: WeekPolicy,
) -> Result<Window, WindowError> {
    match (period, policy) {
        (Period::Week, WeekPolicy::Rolling) => {
            let start = reference
                .checked_sub(Duration::days(6))
                .ok_or(WindowError::OutOfRange(reference))?;
            Window::new(start, reference)
        }
        (Period::Week, WeekPolicy::IsoWeek) => {
            let offset = reference.weekday().number_days_from_monday();
            let start = reference
                .checked_sub(Duration::days(offset.into()))
                .ok_or(WindowError::OutOfRange(reference))?;
            let end = start
                .checked_add(Duration::days(6))
                .ok_or(WindowError::OutOfRange(reference))?;
            Window::new(start, end)
        }
        (Period::Month, _) => {
            let start = reference
                .replace_day(1)
                .map_err(|_| WindowError::OutOfRange(reference))?;
            Window::new(start, last_day_of_month(reference))
        }
    }
}

fn last_day_of_month(date: Date) -> Date {
    let mut last = date;
    while let Some(next) = last.next_day().filter(|d| d.month() == date.month()) {
        last = next;
    }
    last
}

/// Parse a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(input: &str) -> Result<Date, WindowError> {
    Date::parse(input.trim(), format_description!("[year]-[month]-[day]")).map_err(|e| {
        WindowError::InvalidDate {
            input: input.to_owned(),
            reason: e.to_string(),
        }
    })
}

/// Serde adapter for `YYYY-MM-DD` dates.
pub mod iso_date {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use time::Date;

    pub fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(date)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw).map_err(de::Error::custom)
    }
}
