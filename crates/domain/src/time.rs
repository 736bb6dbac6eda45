use chrono::{prelude::*, LocalResult};
use chrono_tz::Tz;
use serde::{de::Visitor, Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// A wall clock time at minute granularity, e.g. `07:30`.
///
/// Seconds are deliberately not part of the type so that evaluating
/// a schedule a few seconds late still matches the same minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimeOfDay {
    hours: u32,
    minutes: u32,
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidTimeOfDay {
    #[error("Time of day: `{0}` is not on the HH:MM format")]
    Malformed(String),
    #[error("Time of day: `{0}` is out of range")]
    OutOfRange(String),
}

impl TimeOfDay {
    pub fn new(hours: u32, minutes: u32) -> Result<Self, InvalidTimeOfDay> {
        if hours > 23 || minutes > 59 {
            return Err(InvalidTimeOfDay::OutOfRange(format!(
                "{}:{}",
                hours, minutes
            )));
        }
        Ok(Self { hours, minutes })
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    pub fn from_time<T: Timelike>(time: &T) -> Self {
        Self {
            hours: time.hour(),
            minutes: time.minute(),
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = InvalidTimeOfDay;

    /// Accepts `HH:MM` and `HH:MM:SS`, the seconds are ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.trim().split(':').collect::<Vec<_>>();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(InvalidTimeOfDay::Malformed(s.to_string()));
        }
        let hours = parts[0]
            .parse::<u32>()
            .map_err(|_| InvalidTimeOfDay::Malformed(s.to_string()))?;
        let minutes = parts[1]
            .parse::<u32>()
            .map_err(|_| InvalidTimeOfDay::Malformed(s.to_string()))?;
        if parts.len() == 3 && parts[2].parse::<u32>().is_err() {
            return Err(InvalidTimeOfDay::Malformed(s.to_string()));
        }
        Self::new(hours, minutes).map_err(|_| InvalidTimeOfDay::OutOfRange(s.to_string()))
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hours, self.minutes)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct TimeOfDayVisitor;

        impl<'de> Visitor<'de> for TimeOfDayVisitor {
            type Value = TimeOfDay;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("A time of day on the HH:MM format")
            }

            fn visit_str<E>(self, value: &str) -> Result<TimeOfDay, E>
            where
                E: serde::de::Error,
            {
                value.parse::<TimeOfDay>().map_err(E::custom)
            }
        }

        deserializer.deserialize_str(TimeOfDayVisitor)
    }
}

/// A point in time as seen on a wall clock in some timezone.
/// This is what the occurrence evaluation works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalMoment {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub time: TimeOfDay,
}

impl LocalMoment {
    pub fn from_datetime<T: TimeZone>(dt: &DateTime<T>) -> Self {
        let date = dt.date_naive();
        Self {
            date,
            weekday: date.weekday(),
            time: TimeOfDay::from_time(dt),
        }
    }

    /// Converts a unix timestamp in millis to the wall clock of `tz`
    pub fn at(timestamp_millis: i64, tz: &Tz) -> Option<Self> {
        match tz.timestamp_millis_opt(timestamp_millis) {
            LocalResult::Single(dt) => Some(Self::from_datetime(&dt)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_parses_valid_times() {
        let valid = vec![
            ("07:00", 7, 0),
            ("7:05", 7, 5),
            ("23:59", 23, 59),
            ("00:00", 0, 0),
            ("12:30:45", 12, 30),
        ];
        for (input, hours, minutes) in valid {
            let time = input.parse::<TimeOfDay>().expect("Valid time");
            assert_eq!(time.hours(), hours);
            assert_eq!(time.minutes(), minutes);
        }
    }

    #[test]
    fn it_rejects_invalid_times() {
        let invalid = vec!["", "7", "24:00", "12:60", "ab:cd", "12:30:xx", "1:2:3:4"];
        for input in invalid {
            assert!(input.parse::<TimeOfDay>().is_err(), "{} parsed", input);
        }
    }

    #[test]
    fn it_formats_with_leading_zeros() {
        let time = TimeOfDay::new(7, 5).unwrap();
        assert_eq!(time.to_string(), "07:05");
        assert_eq!(serde_json::to_string(&time).unwrap(), "\"07:05\"");
    }

    #[test]
    fn it_computes_local_moment_in_timezone() {
        // Mon Oct 19 2026 05:30:20 UTC
        let ts = Utc
            .with_ymd_and_hms(2026, 10, 19, 5, 30, 20)
            .unwrap()
            .timestamp_millis();

        let utc = LocalMoment::at(ts, &chrono_tz::UTC).unwrap();
        assert_eq!(utc.weekday, Weekday::Mon);
        assert_eq!(utc.time.to_string(), "05:30");

        let kolkata = LocalMoment::at(ts, &chrono_tz::Asia::Kolkata).unwrap();
        assert_eq!(kolkata.date, NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());
        assert_eq!(kolkata.time.to_string(), "11:00");

        let pacific = LocalMoment::at(ts, &chrono_tz::US::Pacific).unwrap();
        assert_eq!(pacific.weekday, Weekday::Sun);
        assert_eq!(pacific.time.to_string(), "22:30");
    }
}
