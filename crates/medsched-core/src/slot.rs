use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Half-open time interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

impl TimeRange {
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).whole_minutes()
    }

    /// Half-open overlap: adjacent ranges (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// An open (or blocked) time range on one practitioner's calendar.
///
/// Slots are ephemeral reservations, not appointments: once consumed by a
/// booking the slot leaves the pool and its range becomes the appointment's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
    #[serde(default)]
    pub blocked: bool,
}

impl Slot {
    pub fn open(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self {
            start,
            end,
            blocked: false,
        }
    }

    pub fn blocked(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self {
            start,
            end,
            blocked: true,
        }
    }

    pub fn range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }

    pub fn overlaps(&self, range: &TimeRange) -> bool {
        self.range().overlaps(range)
    }

    pub fn matches(&self, range: &TimeRange) -> bool {
        self.start == range.start && self.end == range.end
    }
}
