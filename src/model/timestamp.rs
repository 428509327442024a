use std::fmt;

use serde::{Deserialize, Serialize};

const SECOND_BITS: u32 = 6;
const MINUTE_BITS: u32 = 6;
const HOUR_BITS: u32 = 5;
const MINUTE_SHIFT: u32 = SECOND_BITS;
const HOUR_SHIFT: u32 = SECOND_BITS + MINUTE_BITS;
const DAY_SHIFT: u32 = SECOND_BITS + MINUTE_BITS + HOUR_BITS;

const SECOND_MASK: u32 = (1 << SECOND_BITS) - 1;
const MINUTE_MASK: u32 = (1 << MINUTE_BITS) - 1;
const HOUR_MASK: u32 = (1 << HOUR_BITS) - 1;

pub const SECONDS_PER_MINUTE: u32 = 60;
pub const MINUTES_PER_HOUR: u32 = 60;
pub const HOURS_PER_DAY: u32 = 24;
pub const SECONDS_PER_HOUR: u32 = SECONDS_PER_MINUTE * MINUTES_PER_HOUR;
pub const SECONDS_PER_DAY: u32 = SECONDS_PER_HOUR * HOURS_PER_DAY;

/// Compact simulation timestamp encoding day/hour/minute/second in a single `u32`.
///
/// Bit layout: `[day:15][hour:5][minute:6][second:6]`
/// - bits 17-31: day since simulation epoch (0–32,767)
/// - bits 12-16: hour (0–23)
/// - bits 6-11:  minute (0–59)
/// - bits 0-5:   second (0–59)
///
/// Natural `u32` ordering equals chronological ordering. Second resolution
/// is needed because travel durations arrive in seconds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "TimestampRepr", from = "TimestampRepr")]
pub struct SimTimestamp(u32);

#[derive(Serialize, Deserialize)]
struct TimestampRepr {
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
}

impl From<SimTimestamp> for TimestampRepr {
    fn from(ts: SimTimestamp) -> Self {
        TimestampRepr {
            day: ts.day(),
            hour: ts.hour(),
            minute: ts.minute(),
            second: ts.second(),
        }
    }
}

impl From<TimestampRepr> for SimTimestamp {
    fn from(repr: TimestampRepr) -> Self {
        SimTimestamp::new(repr.day, repr.hour, repr.minute, repr.second)
    }
}

impl SimTimestamp {
    /// Create a timestamp from day-since-epoch, hour (0–23), minute and second (0–59).
    pub fn new(day: u32, hour: u32, minute: u32, second: u32) -> Self {
        assert!(day < (1 << 15), "day out of range: {day}");
        assert!(hour < HOURS_PER_DAY, "hour out of range: {hour}");
        assert!(minute < MINUTES_PER_HOUR, "minute out of range: {minute}");
        assert!(second < SECONDS_PER_MINUTE, "second out of range: {second}");
        Self((day << DAY_SHIFT) | (hour << HOUR_SHIFT) | (minute << MINUTE_SHIFT) | second)
    }

    /// Create a timestamp for midnight of the given day.
    pub fn from_day(day: u32) -> Self {
        Self::new(day, 0, 0, 0)
    }

    /// Create a timestamp from a raw packed `u32`.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn day(self) -> u32 {
        self.0 >> DAY_SHIFT
    }

    pub fn hour(self) -> u32 {
        (self.0 >> HOUR_SHIFT) & HOUR_MASK
    }

    pub fn minute(self) -> u32 {
        (self.0 >> MINUTE_SHIFT) & MINUTE_MASK
    }

    pub fn second(self) -> u32 {
        self.0 & SECOND_MASK
    }

    /// Total seconds since the simulation epoch.
    pub fn total_seconds(self) -> u64 {
        self.day() as u64 * SECONDS_PER_DAY as u64
            + self.hour() as u64 * SECONDS_PER_HOUR as u64
            + self.minute() as u64 * SECONDS_PER_MINUTE as u64
            + self.second() as u64
    }

    /// Build a timestamp from total seconds since the epoch.
    pub fn from_total_seconds(total: u64) -> Self {
        let day = (total / SECONDS_PER_DAY as u64) as u32;
        let rem = (total % SECONDS_PER_DAY as u64) as u32;
        Self::new(
            day,
            rem / SECONDS_PER_HOUR,
            (rem % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE,
            rem % SECONDS_PER_MINUTE,
        )
    }

    /// Timestamp `seconds` later. Carries across minute/hour/day boundaries.
    pub fn plus_seconds(self, seconds: u32) -> Self {
        Self::from_total_seconds(self.total_seconds() + seconds as u64)
    }

    pub fn plus_minutes(self, minutes: u32) -> Self {
        self.plus_seconds(minutes * SECONDS_PER_MINUTE)
    }

    pub fn plus_days(self, days: u32) -> Self {
        self.plus_seconds(days * SECONDS_PER_DAY)
    }

    /// Whole seconds from `self` to `later` (0 if `later` is earlier).
    pub fn seconds_until(self, later: SimTimestamp) -> u64 {
        later.total_seconds().saturating_sub(self.total_seconds())
    }

    /// Return the raw packed `u32` value.
    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl Default for SimTimestamp {
    fn default() -> Self {
        Self::from_day(0)
    }
}

impl fmt::Display for SimTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "D{}.{:02}:{:02}:{:02}",
            self.day(),
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_round_trip() {
        let ts = SimTimestamp::new(125, 18, 42, 7);
        assert_eq!(ts.day(), 125);
        assert_eq!(ts.hour(), 18);
        assert_eq!(ts.minute(), 42);
        assert_eq!(ts.second(), 7);
    }

    #[test]
    fn from_day_defaults() {
        let ts = SimTimestamp::from_day(500);
        assert_eq!(ts.day(), 500);
        assert_eq!(ts.hour(), 0);
        assert_eq!(ts.minute(), 0);
        assert_eq!(ts.second(), 0);
    }

    #[test]
    fn from_raw_round_trip() {
        let ts = SimTimestamp::new(42, 23, 59, 59);
        let raw = ts.as_u32();
        assert_eq!(SimTimestamp::from_raw(raw), ts);
    }

    #[test]
    fn chronological_ordering() {
        let a = SimTimestamp::new(100, 0, 0, 0);
        let b = SimTimestamp::new(100, 0, 0, 30);
        let c = SimTimestamp::new(100, 0, 30, 0);
        let d = SimTimestamp::new(100, 12, 0, 0);
        let e = SimTimestamp::new(101, 0, 0, 0);
        assert!(a < b);
        assert!(b < c);
        assert!(c < d);
        assert!(d < e);
    }

    #[test]
    fn plus_seconds_carries() {
        let ts = SimTimestamp::new(3, 23, 59, 30);
        let later = ts.plus_seconds(45);
        assert_eq!(later.day(), 4);
        assert_eq!(later.hour(), 0);
        assert_eq!(later.minute(), 0);
        assert_eq!(later.second(), 15);
    }

    #[test]
    fn plus_minutes_and_days() {
        let ts = SimTimestamp::new(10, 8, 0, 0);
        assert_eq!(ts.plus_minutes(90), SimTimestamp::new(10, 9, 30, 0));
        assert_eq!(ts.plus_days(2), SimTimestamp::new(12, 8, 0, 0));
    }

    #[test]
    fn seconds_until() {
        let a = SimTimestamp::new(1, 0, 0, 0);
        let b = a.plus_seconds(1800);
        assert_eq!(a.seconds_until(b), 1800);
        assert_eq!(b.seconds_until(a), 0);
    }

    #[test]
    fn total_seconds_round_trip() {
        let ts = SimTimestamp::new(77, 13, 5, 59);
        assert_eq!(SimTimestamp::from_total_seconds(ts.total_seconds()), ts);
    }

    #[test]
    fn serde_round_trip() {
        let ts = SimTimestamp::new(125, 4, 30, 8);
        let json = serde_json::to_string(&ts).unwrap();
        let parsed: SimTimestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, parsed);
    }

    #[test]
    fn serde_shape() {
        let ts = SimTimestamp::new(125, 4, 30, 8);
        let value = serde_json::to_value(ts).unwrap();
        assert_eq!(value["day"], 125);
        assert_eq!(value["hour"], 4);
        assert_eq!(value["minute"], 30);
        assert_eq!(value["second"], 8);
    }

    #[test]
    fn display_format() {
        let ts = SimTimestamp::new(125, 4, 5, 6);
        assert_eq!(ts.to_string(), "D125.04:05:06");
    }

    #[test]
    fn boundary_values() {
        // Max day: 2^15 - 1 = 32767
        let ts = SimTimestamp::new(32_767, 23, 59, 59);
        assert_eq!(ts.day(), 32_767);
        assert_eq!(ts.hour(), 23);
    }
}
