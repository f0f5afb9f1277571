//! Wall-clock times and time slots within a single day

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Minutes in one day
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A time of day stored as minutes since midnight, written as `HH:MM`.
///
/// Values past midnight (`24:00` and later) are representable so that a slot
/// running to the end of the day has an exclusive end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    pub const MIDNIGHT: Self = Self(0);
    pub const END_OF_DAY: Self = Self(MINUTES_PER_DAY);

    /// Build from hour and minute; `None` when the minute is out of range
    pub fn hm(hour: u32, minute: u32) -> Option<Self> {
        (minute < 60 && hour * 60 + minute <= MINUTES_PER_DAY).then_some(Self(hour * 60 + minute))
    }

    pub fn from_minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn hour(self) -> u32 {
        self.0 / 60
    }

    pub fn minute(self) -> u32 {
        self.0 % 60
    }

    /// Time `minutes` later; `None` when the minute count overflows
    pub fn plus(self, minutes: u32) -> Option<Self> {
        self.0.checked_add(minutes).map(Self)
    }

    /// Absolute distance in minutes
    pub fn distance(self, other: Self) -> u32 {
        self.0.abs_diff(other.0)
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        Self(time.hour() * 60 + time.minute())
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl std::str::FromStr for TimeOfDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "24:00" {
            return Ok(Self::END_OF_DAY);
        }
        NaiveTime::parse_from_str(s, "%H:%M")
            .map(Self::from)
            .map_err(|e| format!("Invalid time of day '{}': {} (expected HH:MM)", s, e))
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Half-open interval `[start, end)` within a day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl TimeSlot {
    /// Create a slot; `None` unless `start < end`
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Option<Self> {
        (start < end).then_some(Self { start, end })
    }

    /// Slot of `duration` minutes beginning at `start`; `None` for a zero
    /// duration or an end past `u32::MAX` minutes
    pub fn starting_at(start: TimeOfDay, duration: u32) -> Option<Self> {
        Self::new(start, start.plus(duration)?)
    }

    pub fn duration(&self) -> u32 {
        self.end.minutes() - self.start.minutes()
    }

    /// Whether two half-open intervals intersect
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The shared part of two slots
    pub fn intersection(&self, other: &TimeSlot) -> Option<TimeSlot> {
        Self::new(self.start.max(other.start), self.end.min(other.end))
    }

    /// Whether `other` lies entirely inside this slot
    pub fn contains(&self, other: &TimeSlot) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl std::fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}
