use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{TimetableError, TimetableResult};

/// A half-open `[start, end)` range of times of day.
///
/// The weekday is not part of the interval; two intervals are only compared
/// once the caller has established they fall on the same day. Construction
/// enforces `start < end`, so an empty or inverted interval cannot exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawInterval")]
pub struct TimeInterval {
    #[serde(rename = "start_time")]
    start: NaiveTime,
    #[serde(rename = "end_time")]
    end: NaiveTime,
}

#[derive(Deserialize)]
struct RawInterval {
    start_time: NaiveTime,
    end_time: NaiveTime,
}

impl TryFrom<RawInterval> for TimeInterval {
    type Error = TimetableError;

    fn try_from(raw: RawInterval) -> Result<Self, Self::Error> {
        TimeInterval::new(raw.start_time, raw.end_time)
    }
}

impl TimeInterval {
    pub fn new(start: NaiveTime, end: NaiveTime) -> TimetableResult<Self> {
        if start >= end {
            return Err(TimetableError::InvalidRange(format!(
                "end time {} must be after start time {}",
                end.format("%H:%M"),
                start.format("%H:%M"),
            )));
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True iff the intervals share at least one instant.
    ///
    /// Touching intervals (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn contains(&self, instant: NaiveTime) -> bool {
        self.start <= instant && instant < self.end
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}
