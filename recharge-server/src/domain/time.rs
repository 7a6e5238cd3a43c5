//! Wall-clock times for trip plans.
//!
//! Plans exchange times as "HH:MM" strings without a date. A trip may run
//! past midnight, so comparisons between a plan's clock time and the
//! simulated elapsed time are made on the 24-hour circle.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minutes in a day.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day with minute precision.
///
/// # Examples
///
/// ```
/// use recharge_server::domain::ClockTime;
///
/// let t = ClockTime::parse_hhmm("6:30").unwrap();
/// assert_eq!(t.to_string(), "06:30");
/// assert_eq!(t.minutes_of_day(), 390);
///
/// assert!(ClockTime::parse_hhmm("24:00").is_err());
/// assert!(ClockTime::parse_hhmm("0630").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Parse "HH:MM" (or "H:MM") in 24-hour format.
    pub fn parse_hhmm(s: &str) -> Result<Self, TimeError> {
        let s = s.trim();
        let (hour, minute) = s
            .split_once(':')
            .ok_or_else(|| TimeError::new("expected HH:MM format"))?;

        let hour = match hour.len() {
            1 | 2 => parse_digits(hour).ok_or_else(|| TimeError::new("invalid hour digits"))?,
            _ => return Err(TimeError::new("expected HH:MM format")),
        };
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }

        if minute.len() != 2 {
            return Err(TimeError::new("expected two minute digits"));
        }
        let minute = parse_digits(minute).ok_or_else(|| TimeError::new("invalid minute digits"))?;
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }

        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| TimeError::new("invalid time"))
    }

    /// Build a clock time from minutes, wrapping around midnight.
    pub fn from_minutes(minutes: i64) -> Self {
        let m = minutes.rem_euclid(MINUTES_PER_DAY) as u32;
        Self(NaiveTime::from_hms_opt(m / 60, m % 60, 0).expect("minute of day in range"))
    }

    /// Minutes since midnight (0..1440).
    pub fn minutes_of_day(&self) -> i64 {
        (self.0.hour() * 60 + self.0.minute()) as i64
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    /// Signed offset in minutes from `elapsed` (minutes since the start-day
    /// midnight, may exceed one day) to this clock time, taking the shortest
    /// way around the clock. The result lies in `-720..=720`.
    ///
    /// ```
    /// use recharge_server::domain::ClockTime;
    ///
    /// let t = ClockTime::parse_hhmm("00:10").unwrap();
    /// // 23:55 on the first day
    /// assert_eq!(t.offset_from(23 * 60 + 55), 15);
    /// let t = ClockTime::parse_hhmm("10:00").unwrap();
    /// assert_eq!(t.offset_from(10 * 60 + 3), -3);
    /// ```
    pub fn offset_from(&self, elapsed: i64) -> i64 {
        let d = (self.minutes_of_day() - elapsed).rem_euclid(MINUTES_PER_DAY);
        if d > MINUTES_PER_DAY / 2 {
            d - MINUTES_PER_DAY
        } else {
            d
        }
    }
}

impl FromStr for ClockTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hhmm(s)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_hhmm(&value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClockTime({:02}:{:02})", self.hour(), self.minute())
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Parse one or two ASCII digits.
fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 2 {
        return None;
    }
    s.bytes()
        .try_fold(0u32, |acc, b| Some(acc * 10 + (b as char).to_digit(10)?))
}
