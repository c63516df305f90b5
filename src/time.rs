//! Local-time-of-day arithmetic for GTFS `HH:MM:SS` fields.
//!
//! GTFS allows the hour component to exceed 23 so that a service day's
//! schedule can keep counting past midnight instead of wrapping back to
//! `00:00:00` - a last departure at `25:30:00` is half past one the
//! following morning, still on the same service day as everything else in
//! the feed. `Time` stores seconds-since-midnight-of-the-service-day as a
//! plain `u32` so that arithmetic and ordering stay simple; it makes no
//! attempt to convert to a calendar date or a specific timezone.

use std::fmt;
use std::ops::Sub;

/// A duration in seconds, used for the interval between two `Time`s.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Duration {
    seconds: i64,
}

impl Duration {
    pub fn seconds(seconds: i64) -> Duration {
        Duration { seconds }
    }

    pub fn minutes(minutes: i64) -> Duration {
        Duration {
            seconds: minutes * 60,
        }
    }

    /// Minutes, rounded up - a transfer of 90 seconds is reported to riders
    /// as "2 mins", never "1 min".
    pub fn ceil_minutes(self) -> i64 {
        let minutes = self.seconds / 60;
        if self.seconds % 60 != 0 && self.seconds > 0 {
            minutes + 1
        } else {
            minutes
        }
    }

    pub fn to_secs(self) -> i64 {
        self.seconds
    }

    pub fn is_negative(self) -> bool {
        self.seconds < 0
    }
}

impl std::ops::Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration::seconds(self.seconds + rhs.seconds)
    }
}

impl std::iter::Sum for Duration {
    fn sum<I: Iterator<Item = Duration>>(iter: I) -> Duration {
        iter.fold(Duration::seconds(0), Duration::add)
    }
}

/// A local time-of-day within a GTFS service day. May represent an hour
/// past 23 to denote a time after midnight on the next calendar day but
/// still within the same service day (see module docs).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Time {
    seconds_since_midnight: u32,
}

impl Time {
    pub fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Time {
        Time {
            seconds_since_midnight: (hours * 60 + minutes) * 60 + seconds,
        }
    }

    fn hour(self) -> u32 {
        self.seconds_since_midnight / 3600
    }

    fn minute(self) -> u32 {
        (self.seconds_since_midnight / 60) % 60
    }

    fn second(self) -> u32 {
        self.seconds_since_midnight % 60
    }
}

impl Sub<Time> for Time {
    type Output = Duration;

    /// The `Duration` between two `Time`s on the same service day.
    #[inline(always)]
    fn sub(self, rhs: Self) -> Duration {
        Duration::seconds(self.seconds_since_midnight as i64 - rhs.seconds_since_midnight as i64)
    }
}

impl fmt::Debug for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

/// # String representations
/// ```
/// use bus_router::time::Time;
/// let _: Time = "0:00:00".parse().unwrap();
/// let _: Time = "09:00:00".parse().unwrap();
/// let _: Time = "25:00:00".parse().unwrap();
/// ```
impl std::str::FromStr for Time {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, ':');
        let hh = parts.next().ok_or(TimeParseError::InvalidFormat)?;
        let mm = parts.next().ok_or(TimeParseError::InvalidFormat)?;
        let ss = parts.next().ok_or(TimeParseError::InvalidFormat)?;
        if mm.len() != 2 || ss.len() != 2 || hh.is_empty() {
            return Err(TimeParseError::InvalidFormat);
        }
        let hours: u32 = hh.parse()?;
        let minutes: u32 = mm.parse()?;
        let seconds: u32 = ss.parse()?;
        if seconds > 59 || minutes > 59 {
            return Err(TimeParseError::TooManySecondsOrMinutes);
        }
        Ok(Time {
            seconds_since_midnight: hours * 3600 + minutes * 60 + seconds,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    InvalidFormat,
    TooManySecondsOrMinutes,
    ParseIntError(std::num::ParseIntError),
}

impl From<std::num::ParseIntError> for TimeParseError {
    fn from(err: std::num::ParseIntError) -> TimeParseError {
        TimeParseError::ParseIntError(err)
    }
}

impl fmt::Display for TimeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TimeParseError::*;
        match self {
            InvalidFormat => write!(f, "time should use format eg. 23:59:59"),
            TooManySecondsOrMinutes => write!(f, "maximum minutes or seconds is 59"),
            ParseIntError(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for TimeParseError {}
