//! Simulated wall-clock time.
//!
//! [`ClockTime`] counts whole seconds since midnight of the simulated day.
//! Hours carry past 24 instead of wrapping, so late-running trucks keep a
//! totally ordered clock (`23:59:30` plus two minutes is `24:01:30`).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const SECONDS_PER_MINUTE: u32 = 60;
const SECONDS_PER_HOUR: u32 = 3_600;

/// A time of day on the simulated clock, with one-second resolution.
///
/// Clock strings use 24-hour time with two-digit fields. Seconds are
/// optional when parsing and always present when formatting.
///
/// # Examples
/// ```
/// use courier_core::ClockTime;
///
/// # fn main() -> Result<(), courier_core::ClockError> {
/// let start: ClockTime = "08:00".parse()?;
/// let later = start.advance(90);
/// assert_eq!(later.to_string(), "08:01:30");
/// assert!(later.has_reached(start));
/// assert!(!later.is_after("08:01".parse()?));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ClockTime(u32);

/// Errors returned when parsing a [`ClockTime`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    /// The string was not `HH:MM` or `HH:MM:SS` with two-digit fields.
    #[error("invalid clock time {input:?}: expected HH:MM or HH:MM:SS with leading zeroes")]
    InvalidFormat {
        /// The rejected input.
        input: String,
    },
}

impl ClockTime {
    /// The start of the simulated day.
    pub const MIDNIGHT: Self = Self(0);

    /// Build a clock time from its fields.
    ///
    /// Returns `None` when minutes or seconds fall outside `0..60` or the
    /// total overflows.
    #[must_use]
    pub const fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Option<Self> {
        if minutes >= SECONDS_PER_MINUTE || seconds >= SECONDS_PER_MINUTE {
            return None;
        }
        let Some(hour_secs) = hours.checked_mul(SECONDS_PER_HOUR) else {
            return None;
        };
        let Some(with_minutes) = hour_secs.checked_add(minutes * SECONDS_PER_MINUTE) else {
            return None;
        };
        match with_minutes.checked_add(seconds) {
            Some(total) => Some(Self(total)),
            None => None,
        }
    }

    /// Build a clock time from seconds since midnight.
    #[must_use]
    pub const fn from_seconds(seconds: u32) -> Self {
        Self(seconds)
    }

    /// Seconds since midnight.
    #[must_use]
    pub const fn as_seconds(self) -> u32 {
        self.0
    }

    /// Whole minutes since midnight; seconds are truncated.
    #[expect(
        clippy::integer_division,
        reason = "minute granularity deliberately truncates seconds"
    )]
    #[must_use]
    pub const fn whole_minutes(self) -> u32 {
        self.0 / SECONDS_PER_MINUTE
    }

    /// Hour field; may exceed 23 once the clock carries past midnight.
    #[expect(
        clippy::integer_division,
        reason = "field extraction truncates by construction"
    )]
    #[must_use]
    pub const fn hours(self) -> u32 {
        self.0 / SECONDS_PER_HOUR
    }

    /// Minute field in `0..60`.
    #[expect(
        clippy::integer_division,
        clippy::integer_division_remainder_used,
        reason = "field extraction truncates by construction"
    )]
    #[must_use]
    pub const fn minutes(self) -> u32 {
        (self.0 % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE
    }

    /// Second field in `0..60`.
    #[expect(
        clippy::integer_division_remainder_used,
        reason = "field extraction truncates by construction"
    )]
    #[must_use]
    pub const fn seconds(self) -> u32 {
        self.0 % SECONDS_PER_MINUTE
    }

    /// Return the time `seconds` later, carrying into minutes and hours.
    ///
    /// Saturates at the largest representable time instead of wrapping.
    #[must_use]
    pub const fn advance(self, seconds: u32) -> Self {
        Self(self.0.saturating_add(seconds))
    }

    /// Whether `self` is strictly later than `reference` at minute
    /// granularity. Seconds are tracked but not compared.
    #[must_use]
    pub const fn is_after(self, reference: Self) -> bool {
        self.whole_minutes() > reference.whole_minutes()
    }

    /// Whether `self` has reached `reference`, i.e. is at or past it at
    /// minute granularity.
    #[must_use]
    pub const fn has_reached(self, reference: Self) -> bool {
        self.whole_minutes() >= reference.whole_minutes()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hours(),
            self.minutes(),
            self.seconds()
        )
    }
}

fn parse_field(field: &str) -> Option<u32> {
    if field.len() != 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

impl FromStr for ClockTime {
    type Err = ClockError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = || ClockError::InvalidFormat {
            input: input.to_owned(),
        };
        let mut fields = input.trim().split(':');
        let hours = fields.next().and_then(parse_field).ok_or_else(invalid)?;
        let minutes = fields.next().and_then(parse_field).ok_or_else(invalid)?;
        let seconds = match fields.next() {
            Some(field) => parse_field(field).ok_or_else(invalid)?,
            None => 0,
        };
        if fields.next().is_some() {
            return Err(invalid());
        }
        Self::from_hms(hours, minutes, seconds).ok_or_else(invalid)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ClockTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ClockTime {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
