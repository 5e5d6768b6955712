use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MINUTES_PER_DAY: u16 = 1440;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    OutOfRange(u32),
    PastMidnight { start: TimeOfDay, minutes: u16 },
    EmptyInterval { start: TimeOfDay, end: TimeOfDay },
    NonInstructionalDay,
    Parse(String),
}

impl fmt::Display for TimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeError::OutOfRange(minutes) => {
                write!(f, "{minutes} minutes is outside the 00:00-23:59 day")
            }
            TimeError::PastMidnight { start, minutes } => {
                write!(f, "{start} plus {minutes} minutes crosses midnight")
            }
            TimeError::EmptyInterval { start, end } => {
                write!(f, "interval start {start} must be before end {end}")
            }
            TimeError::NonInstructionalDay => {
                write!(f, "sunday is not an instructional day")
            }
            TimeError::Parse(input) => write!(f, "cannot parse time value {input:?}"),
        }
    }
}

impl std::error::Error for TimeError {}

/// Minutes since midnight, always within 00:00-23:59.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn from_minutes(minutes: u16) -> Result<Self, TimeError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(TimeError::OutOfRange(u32::from(minutes)));
        }
        Ok(Self(minutes))
    }

    pub fn from_hm(hour: u16, minute: u16) -> Result<Self, TimeError> {
        if hour > 23 || minute > 59 {
            return Err(TimeError::OutOfRange(
                u32::from(hour) * 60 + u32::from(minute),
            ));
        }
        Ok(Self(hour * 60 + minute))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    /// No wraparound: a result past 23:59 is an error, not a next-day time.
    pub fn add_minutes(self, minutes: u16) -> Result<Self, TimeError> {
        let total = u32::from(self.0) + u32::from(minutes);
        if total >= u32::from(MINUTES_PER_DAY) {
            return Err(TimeError::PastMidnight {
                start: self,
                minutes,
            });
        }
        Ok(Self(total as u16))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (hour, minute) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| TimeError::Parse(s.to_string()))?;
        let hour: u16 = hour.parse().map_err(|_| TimeError::Parse(s.to_string()))?;
        let minute: u16 = minute
            .parse()
            .map_err(|_| TimeError::Parse(s.to_string()))?;
        Self::from_hm(hour, minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Half-open interval within one day: `start` inclusive, `end` exclusive.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct TimeInterval {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl TimeInterval {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Result<Self, TimeError> {
        if start >= end {
            return Err(TimeError::EmptyInterval { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn from_hm(
        start_hour: u16,
        start_minute: u16,
        end_hour: u16,
        end_minute: u16,
    ) -> Result<Self, TimeError> {
        Self::new(
            TimeOfDay::from_hm(start_hour, start_minute)?,
            TimeOfDay::from_hm(end_hour, end_minute)?,
        )
    }

    pub fn start(&self) -> TimeOfDay {
        self.start
    }

    pub fn end(&self) -> TimeOfDay {
        self.end
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end.minutes() - self.start.minutes()
    }

    /// Half-open overlap test: intervals that only touch do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, other: &TimeInterval) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Remove `other` from `self`; yields zero, one, or two remainders
    /// (two when `other` is strictly inside `self`).
    pub fn subtract(&self, other: &TimeInterval) -> Vec<TimeInterval> {
        if !self.overlaps(other) {
            return vec![*self];
        }
        let mut remainders = Vec::with_capacity(2);
        if self.start < other.start {
            remainders.push(Self {
                start: self.start,
                end: other.start,
            });
        }
        if other.end < self.end {
            remainders.push(Self {
                start: other.end,
                end: self.end,
            });
        }
        remainders
    }

    /// Coalesce into the minimal sorted set; touching intervals are joined.
    pub fn merge(intervals: &[TimeInterval]) -> Vec<TimeInterval> {
        let mut sorted = intervals.to_vec();
        sorted.sort();
        let mut merged: Vec<TimeInterval> = Vec::with_capacity(sorted.len());
        for interval in sorted {
            match merged.last_mut() {
                Some(last) if interval.start <= last.end => {
                    if interval.end > last.end {
                        last.end = interval.end;
                    }
                }
                _ => merged.push(interval),
            }
        }
        merged
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

impl FromStr for TimeInterval {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| TimeError::Parse(s.to_string()))?;
        Self::new(start.parse()?, end.parse()?)
    }
}

impl TryFrom<String> for TimeInterval {
    type Error = TimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeInterval> for String {
    fn from(value: TimeInterval) -> Self {
        value.to_string()
    }
}
