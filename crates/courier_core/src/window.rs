//! Threshold evaluation against a folder's target time.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Whether `target` lies beyond `threshold` minutes from `current`.
///
/// A positive threshold looks into the future: true iff the target is ahead
/// of `current` by more than `threshold`. A zero or negative threshold looks
/// into the past: true iff the target is behind `current` by more than
/// `|threshold|`. The difference keeps sub-minute precision.
pub fn is_outside_minutes(target: NaiveDateTime, current: NaiveDateTime, threshold: i64) -> bool {
    let diff = target - current;
    let limit = TimeDelta::minutes(threshold);
    if threshold > 0 {
        diff > TimeDelta::zero() && diff > limit
    } else {
        diff < TimeDelta::zero() && diff < limit
    }
}

/// Whether `target` lies between `current` and `current + threshold`, inclusive.
pub fn is_within_minutes(target: NaiveDateTime, current: NaiveDateTime, threshold: i64) -> bool {
    let diff = target - current;
    let limit = TimeDelta::minutes(threshold);
    if threshold > 0 {
        TimeDelta::zero() <= diff && diff <= limit
    } else {
        limit <= diff && diff <= TimeDelta::zero()
    }
}

/// Eligibility window around the current time, in minutes.
///
/// `past` is zero or negative, `future` zero or positive.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use courier_core::EligibilityWindow;
///
/// let now = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// let window = EligibilityWindow::symmetric(10);
///
/// assert!(window.is_time_to_publish("2025.03.01-09.05", now + chrono::TimeDelta::minutes(5), now));
/// assert!(!window.is_time_to_publish("2025.03.01-09.11", now + chrono::TimeDelta::minutes(11), now));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityWindow {
    /// Lower bound (minutes, `<= 0`).
    pub past: i64,
    /// Upper bound (minutes, `>= 0`).
    pub future: i64,
}

impl EligibilityWindow {
    /// Window with explicit bounds. Signs are normalised.
    pub fn new(past: i64, future: i64) -> Self {
        Self {
            past: -past.abs(),
            future: future.abs(),
        }
    }

    /// `[-minutes, +minutes]`.
    pub fn symmetric(minutes: i64) -> Self {
        Self::new(minutes, minutes)
    }

    /// `[0, +minutes]`.
    pub fn forward(minutes: i64) -> Self {
        Self::new(0, minutes)
    }

    /// Whether a folder targeting `target` should be dispatched at `now`.
    pub fn is_time_to_publish(&self, folder: &str, target: NaiveDateTime, now: NaiveDateTime) -> bool {
        if is_outside_minutes(target, now, self.past) {
            if self.past != 0 {
                info!(folder, past = self.past, "Scheduled time has passed, skipping");
            }
            return false;
        }
        !is_outside_minutes(target, now, self.future)
    }
}
