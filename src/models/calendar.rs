//! Time slot and horizon window models.
//!
//! Availability is supplied as absolute closed-open slots. The optimizer
//! works on a finite horizon measured in whole minutes from the booking
//! window start, so every slot is converted to a [`MinuteWindow`] before
//! model construction.
//!
//! # Rounding
//! Minute granularity only. A slot start is rounded up and a slot end is
//! rounded down, so a converted window never claims time the candidate
//! does not actually have.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An absolute time interval [start, end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Interval start (inclusive).
    pub start: DateTime<Utc>,
    /// Interval end (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    /// Creates a new slot.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Creates a slot starting at `start` lasting `minutes`.
    pub fn from_minutes(start: DateTime<Utc>, minutes: i64) -> Self {
        Self::new(start, start + Duration::minutes(minutes))
    }

    /// Length of the slot in whole minutes (truncated).
    #[inline]
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Whether a timestamp falls within this slot.
    #[inline]
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        time >= self.start && time < self.end
    }

    /// Whether `other` lies entirely within this slot.
    pub fn covers(&self, other: &Self) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Whether two slots overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Intersection of two slots, if non-empty.
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (start < end).then(|| Self::new(start, end))
    }

    /// Subtracts `blocked` from this slot, returning the remaining pieces.
    pub fn subtract(&self, blocked: &Self) -> Vec<Self> {
        if !self.overlaps(blocked) {
            return vec![*self];
        }
        let mut pieces = Vec::with_capacity(2);
        if blocked.start > self.start {
            pieces.push(Self::new(self.start, blocked.start));
        }
        if blocked.end < self.end {
            pieces.push(Self::new(blocked.end, self.end));
        }
        pieces
    }

    /// Converts to a horizon-relative window, clipped to `[0, horizon]`.
    ///
    /// Returns `None` if nothing of the slot falls inside the horizon.
    pub fn to_minute_window(&self, origin: DateTime<Utc>, horizon: i64) -> Option<MinuteWindow> {
        let start = ceil_minutes(self.start - origin).max(0);
        let end = floor_minutes(self.end - origin).min(horizon);
        (start < end).then(|| MinuteWindow::new(start, end))
    }
}

/// A horizon-relative interval [start, end) in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinuteWindow {
    /// Start minute (inclusive).
    pub start: i64,
    /// End minute (exclusive).
    pub end: i64,
}

impl MinuteWindow {
    /// Creates a new window.
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Window length in minutes.
    #[inline]
    pub fn length(&self) -> i64 {
        self.end - self.start
    }

    /// Whether `[start, start + size)` fits entirely inside this window.
    #[inline]
    pub fn fits(&self, start: i64, size: i64) -> bool {
        start >= self.start && start + size <= self.end
    }
}

/// Converts a horizon minute back to an absolute timestamp.
pub fn minutes_to_time(origin: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
    origin + Duration::minutes(minutes)
}

/// Sorts and merges overlapping or touching slots.
pub fn merge_slots(mut slots: Vec<TimeSlot>) -> Vec<TimeSlot> {
    slots.retain(|s| s.start < s.end);
    slots.sort_by_key(|s| s.start);

    let mut merged: Vec<TimeSlot> = Vec::with_capacity(slots.len());
    for slot in slots {
        match merged.last_mut() {
            Some(last) if slot.start <= last.end => last.end = last.end.max(slot.end),
            _ => merged.push(slot),
        }
    }
    merged
}

fn floor_minutes(delta: Duration) -> i64 {
    delta.num_seconds().div_euclid(60)
}

fn ceil_minutes(delta: Duration) -> i64 {
    let secs = delta.num_seconds();
    let base = secs.div_euclid(60);
    let sub_minute = secs.rem_euclid(60) != 0 || delta.subsec_nanos() > 0;
    if sub_minute {
        base + 1
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, h, m, 0).unwrap()
    }

    #[test]
    fn test_slot_basics() {
        let s = TimeSlot::new(t(9, 0), t(10, 30));
        assert_eq!(s.duration_minutes(), 90);
        assert!(s.contains(t(9, 0)));
        assert!(!s.contains(t(10, 30)));
        assert!(s.covers(&TimeSlot::new(t(9, 15), t(10, 0))));
        assert!(!s.covers(&TimeSlot::new(t(8, 59), t(10, 0))));
    }

    #[test]
    fn test_slot_overlap_and_intersect() {
        let a = TimeSlot::new(t(9, 0), t(10, 0));
        let b = TimeSlot::new(t(9, 30), t(11, 0));
        let c = TimeSlot::new(t(10, 0), t(11, 0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c)); // touching is not overlapping
        assert_eq!(a.intersect(&b), Some(TimeSlot::new(t(9, 30), t(10, 0))));
        assert_eq!(a.intersect(&c), None);
    }

    #[test]
    fn test_slot_subtract() {
        let day = TimeSlot::new(t(9, 0), t(17, 0));
        let lunch = TimeSlot::new(t(12, 0), t(13, 0));
        assert_eq!(
            day.subtract(&lunch),
            vec![TimeSlot::new(t(9, 0), t(12, 0)), TimeSlot::new(t(13, 0), t(17, 0))]
        );
        // Fully covered
        assert!(lunch.subtract(&day).is_empty());
        // Disjoint
        let evening = TimeSlot::new(t(18, 0), t(19, 0));
        assert_eq!(day.subtract(&evening), vec![day]);
    }

    #[test]
    fn test_to_minute_window_clips() {
        let origin = t(10, 0);
        let slot = TimeSlot::new(t(9, 0), t(12, 0));
        assert_eq!(slot.to_minute_window(origin, 90), Some(MinuteWindow::new(0, 90)));

        let before = TimeSlot::new(t(8, 0), t(9, 0));
        assert_eq!(before.to_minute_window(origin, 90), None);
    }

    #[test]
    fn test_to_minute_window_rounds_inward() {
        let origin = t(10, 0);
        let slot = TimeSlot::new(
            Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 30).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 2, 10, 45, 59).unwrap(),
        );
        assert_eq!(slot.to_minute_window(origin, 120), Some(MinuteWindow::new(1, 45)));
    }

    #[test]
    fn test_minute_window_fits() {
        let w = MinuteWindow::new(10, 70);
        assert_eq!(w.length(), 60);
        assert!(w.fits(10, 60));
        assert!(!w.fits(11, 60));
        assert!(!w.fits(5, 10));
    }

    #[test]
    fn test_merge_slots() {
        let merged = merge_slots(vec![
            TimeSlot::new(t(13, 0), t(14, 0)),
            TimeSlot::new(t(9, 0), t(10, 0)),
            TimeSlot::new(t(10, 0), t(11, 0)),
            TimeSlot::new(t(10, 30), t(10, 45)),
            TimeSlot::new(t(15, 0), t(15, 0)),
        ]);
        assert_eq!(
            merged,
            vec![TimeSlot::new(t(9, 0), t(11, 0)), TimeSlot::new(t(13, 0), t(14, 0))]
        );
    }

    #[test]
    fn test_minutes_to_time() {
        assert_eq!(minutes_to_time(t(9, 0), 75), t(10, 15));
    }
}
