//! Event-time windows for the windowed aggregation mode.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::EventTime;

/// A half-open event-time window `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: EventTime,
    pub end: EventTime,
}

impl TimeWindow {
    pub fn new(start: EventTime, end: EventTime) -> Self {
        Self { start, end }
    }

    /// Return true if `timestamp` falls inside this window.
    pub fn contains(&self, timestamp: EventTime) -> bool {
        timestamp >= self.start && timestamp < self.end
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TimeWindow([{}, {}))", self.start, self.end)
    }
}

/// Fixed-size, non-overlapping event-time windows aligned to multiples
/// of `size`. Each timestamp belongs to exactly one window.
#[derive(Debug, Clone)]
pub struct TumblingWindows {
    size_ms: i64,
    offset_ms: i64,
}

impl TumblingWindows {
    /// Create tumbling windows of the given `size`.
    pub fn of(size: Duration) -> Self {
        Self {
            size_ms: size.as_millis() as i64,
            offset_ms: 0,
        }
    }

    /// Create tumbling windows with a non-zero alignment `offset`.
    pub fn of_with_offset(size: Duration, offset: Duration) -> Self {
        Self {
            size_ms: size.as_millis() as i64,
            offset_ms: offset.as_millis() as i64,
        }
    }

    /// Return the window containing `timestamp`.
    pub fn assign(&self, timestamp: EventTime) -> TimeWindow {
        let start = timestamp - (timestamp - self.offset_ms).rem_euclid(self.size_ms);
        TimeWindow::new(start, start + self.size_ms)
    }
}
