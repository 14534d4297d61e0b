//! Time-entry consistency rules.
//!
//! Everything here is pure: callers load the relevant rows, pass `now`
//! explicitly, and get back a [`CoreError`] describing the first rule that
//! failed. The repository layer decides which rows to load and in which
//! order the checks run:
//!
//! 1. referential (task exists) -- repository
//! 2. trackability (start only) -- [`crate::task_status::ensure_trackable`]
//! 3. temporal bounds -- [`validate_bounds`]
//! 4. duration bounds -- [`validate_bounds`]
//! 5. singleton open entry -- [`ensure_no_active_entry`]
//! 6. overlap -- [`ensure_no_overlap`]

use chrono::TimeDelta;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// Tolerated clock skew for timestamps in the future.
pub const CLOCK_SKEW_TOLERANCE_MINUTES: i64 = 5;

/// Entries may not start earlier than this many days ago.
pub const MAX_BACKDATE_DAYS: i64 = 30;

/// Shortest closed entry, in seconds.
pub const MIN_DURATION_SECS: i64 = 60;

/// Longest closed entry, in seconds.
pub const MAX_DURATION_SECS: i64 = 24 * 60 * 60;

/// A stored entry's interval, as far as overlap checks are concerned.
///
/// `end == None` marks an open (running) entry, which extends to infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedInterval {
    pub id: DbId,
    pub start: Timestamp,
    pub end: Option<Timestamp>,
}

impl TrackedInterval {
    /// Whether this interval intersects the half-open interval `[start, end)`.
    ///
    /// Two finite intervals `[s1, e1)` and `[s2, e2)` intersect iff
    /// `s1 < e2 && s2 < e1`; an open side is treated as +infinity.
    pub fn intersects(&self, start: Timestamp, end: Option<Timestamp>) -> bool {
        let starts_before_other_ends = match end {
            Some(end) => self.start < end,
            None => true,
        };
        let other_starts_before_self_ends = match self.end {
            Some(self_end) => start < self_end,
            None => true,
        };
        starts_before_other_ends && other_starts_before_self_ends
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }
}

/// Whole seconds between `start` and `end`, rounded down. Never negative.
pub fn duration_secs(start: Timestamp, end: Timestamp) -> i64 {
    (end - start).num_seconds().max(0)
}

/// Check the temporal window and duration bounds of an interval.
///
/// Rules, in order:
/// - `start <= now + 5 min`
/// - `start >= now - 30 days`
/// - when `end` is set: `end >= start`, `duration <= 24 h`,
///   `duration >= 1 min`, `end <= now + 5 min`
pub fn validate_bounds(
    start: Timestamp,
    end: Option<Timestamp>,
    now: Timestamp,
) -> Result<(), CoreError> {
    let skew = TimeDelta::minutes(CLOCK_SKEW_TOLERANCE_MINUTES);

    if start > now + skew {
        return Err(CoreError::BusinessRule(
            "start time cannot be in the future".to_string(),
        ));
    }

    if start < now - TimeDelta::days(MAX_BACKDATE_DAYS) {
        return Err(CoreError::BusinessRule(format!(
            "start time cannot be more than {MAX_BACKDATE_DAYS} days in the past"
        )));
    }

    let Some(end) = end else {
        return Ok(());
    };

    if end < start {
        return Err(CoreError::BusinessRule(
            "end time cannot be before start time".to_string(),
        ));
    }

    let duration = end - start;
    if duration > TimeDelta::seconds(MAX_DURATION_SECS) {
        return Err(CoreError::BusinessRule(
            "time entry duration cannot exceed 24 hours".to_string(),
        ));
    }
    if duration < TimeDelta::seconds(MIN_DURATION_SECS) {
        return Err(CoreError::BusinessRule(
            "time entry duration must be at least 1 minute".to_string(),
        ));
    }

    if end > now + skew {
        return Err(CoreError::BusinessRule(
            "end time cannot be in the future".to_string(),
        ));
    }

    Ok(())
}

/// Reject opening a second entry while one is already running.
pub fn ensure_no_active_entry(task_id: DbId, active: Option<DbId>) -> Result<(), CoreError> {
    match active {
        Some(_) => Err(CoreError::Conflict(format!(
            "task {task_id} already has an active time entry"
        ))),
        None => Ok(()),
    }
}

/// Check a candidate interval against the task's other entries.
///
/// `exclude_id` skips the entry being updated. Another running entry is a
/// conflict for an open candidate. Every other entry is then tested with
/// [`TrackedInterval::intersects`], with an open side extending to infinity:
/// a running entry that started before a closed candidate ends collides, and
/// an open candidate collides with any entry that ends after it starts.
pub fn ensure_no_overlap(
    start: Timestamp,
    end: Option<Timestamp>,
    existing: &[TrackedInterval],
    exclude_id: Option<DbId>,
) -> Result<(), CoreError> {
    let others = existing
        .iter()
        .filter(|entry| Some(entry.id) != exclude_id);

    if end.is_none() && others.clone().any(|entry| entry.is_open()) {
        return Err(CoreError::Conflict(
            "task already has an active time entry".to_string(),
        ));
    }

    match others.into_iter().find(|entry| entry.intersects(start, end)) {
        Some(entry) => Err(CoreError::BusinessRule(format!(
            "time entry overlaps with existing time entry {} for this task",
            entry.id
        ))),
        None => Ok(()),
    }
}
