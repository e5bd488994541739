//! Shared value types for the triage domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! meaningful values with invariants (the assignee set is non-empty, cutoff
//! windows are ordered) and participate in the classification decision.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::Login;

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly; the underlying representation can change without affecting the
/// domain API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Returns the elapsed time from `earlier` to `self`.
    ///
    /// Negative when `earlier` is in the future relative to `self`.
    pub fn since(self, earlier: Timestamp) -> Duration {
        self.0 - earlier.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

// ---------------------------------------------------------------------------
// Assignees
// ---------------------------------------------------------------------------

/// The set of logins currently assigned to the issue under evaluation.
///
/// The set is non-empty by construction: classification is meaningless for an
/// unassigned issue, so the sweep skips those before building this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssigneeSet(HashSet<Login>);

impl AssigneeSet {
    /// Builds an [`AssigneeSet`], returning `None` if `logins` is empty.
    #[must_use]
    pub fn new(logins: impl IntoIterator<Item = Login>) -> Option<Self> {
        let set: HashSet<Login> = logins.into_iter().collect();
        if set.is_empty() {
            None
        } else {
            Some(Self(set))
        }
    }

    /// Returns `true` if `login` is one of the current assignees.
    pub fn contains(&self, login: &Login) -> bool {
        self.0.contains(login)
    }

    /// Iterates over the assignee logins in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &Login> {
        self.0.iter()
    }

    /// Returns the number of assignees (always at least one).
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

// ---------------------------------------------------------------------------
// Cutoff windows
// ---------------------------------------------------------------------------

/// The recency thresholds that bucket assignee activity.
///
/// Activity within `recent` of now counts as up to date; activity within
/// `stale` still warrants only a reminder; anything older is inactive. Both
/// bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CutoffWindow {
    recent: Duration,
    stale: Duration,
}

impl CutoffWindow {
    /// Creates a [`CutoffWindow`] from day counts.
    ///
    /// Returns `None` unless `0 < recent_days <= stale_days`.
    #[must_use]
    pub fn from_days(recent_days: i64, stale_days: i64) -> Option<Self> {
        if recent_days <= 0 || stale_days < recent_days {
            return None;
        }
        Some(Self {
            recent: Duration::days(recent_days),
            stale: Duration::days(stale_days),
        })
    }

    /// Returns `true` if `at` falls within the recent window of `now`
    /// (inclusive at the boundary).
    pub fn is_recent(self, at: Timestamp, now: Timestamp) -> bool {
        now.since(at) <= self.recent
    }

    /// Returns `true` if `at` falls within the stale window of `now`
    /// (inclusive at the boundary).
    pub fn is_within_stale(self, at: Timestamp, now: Timestamp) -> bool {
        now.since(at) <= self.stale
    }

    /// Returns the recent threshold in whole days.
    pub fn recent_days(self) -> i64 {
        self.recent.num_days()
    }

    /// Returns the stale threshold in whole days.
    pub fn stale_days(self) -> i64 {
        self.stale.num_days()
    }
}

impl Default for CutoffWindow {
    /// The production thresholds: 7 days recent, 14 days stale.
    fn default() -> Self {
        Self {
            recent: Duration::days(7),
            stale: Duration::days(14),
        }
    }
}
