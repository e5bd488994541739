//! Issue timeline events and the activity classifier.
//!
//! [`classify`] is the logical core of BoardSweep: a pure, total function
//! from one issue's event timeline to a [`ClassificationResult`]. It performs
//! no I/O, takes `now` explicitly, and is independent of the order in which
//! events are supplied.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{AssigneeSet, ClassificationResult, CutoffWindow, IssueNumber, Login, Timestamp};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A single recorded activity on an issue.
///
/// Only the three kinds the classifier consults are modeled; the adapter
/// drops everything else (labels, milestones, renames, ...) before events
/// reach the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEvent {
    /// Someone commented on the issue.
    Commented {
        /// Author of the comment.
        actor: Login,
        /// When the comment was created.
        at: Timestamp,
    },
    /// Someone was assigned to the issue.
    Assigned {
        /// The login that was assigned (not the login that performed the
        /// assignment).
        assignee: Login,
        /// When the assignment happened.
        at: Timestamp,
    },
    /// Another issue or pull request mentioned this issue.
    CrossReferenced {
        /// Author of the referencing item.
        actor: Login,
        /// Title and body of the referencing item, searched for closing
        /// keywords naming this issue.
        linked_text: String,
        /// When the reference was created.
        at: Timestamp,
    },
}

impl TimelineEvent {
    /// When the event occurred.
    pub fn at(&self) -> Timestamp {
        match self {
            Self::Commented { at, .. }
            | Self::Assigned { at, .. }
            | Self::CrossReferenced { at, .. } => *at,
        }
    }
}

// ---------------------------------------------------------------------------
// Closing-keyword detection
// ---------------------------------------------------------------------------

// The keyword set GitHub recognises for auto-closing references:
// close/closes/closed, fix/fixes/fixed, resolve/resolves/resolved.
static CLOSING_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:clos(?:e|es|ed)|fix(?:es|ed)?|resolv(?:e|es|ed))\b[\s:]*#(\d+)")
        .expect("closing-reference pattern is valid")
});

/// Returns `true` if `text` contains a closing keyword followed by a
/// reference to `subject` (e.g. `"fixes #42"` for issue 42).
fn names_as_fixed(text: &str, subject: IssueNumber) -> bool {
    CLOSING_REFERENCE
        .captures_iter(text)
        .filter_map(|caps| caps[1].parse::<u64>().ok())
        .any(|number| number == subject.as_u64())
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Classifies one issue's timeline by recency of assignee activity.
///
/// The result does not depend on the order of `events`: the cross-reference
/// check inspects every event, and recency is decided by the latest
/// qualifying timestamp, not by scan position.
///
/// Decision procedure:
///
/// 1. A cross-reference authored by an assignee whose text names `subject`
///    with a closing keyword yields [`ClassificationResult::Updated`]
///    outright, at any age.
/// 2. Otherwise the latest assignee comment and the latest assignment of a
///    current assignee are compared against `window` (boundaries inclusive):
///    a recent comment is `Updated`, a recent assignment without one is
///    [`ClassificationResult::RecentlyAssigned`], either within the stale
///    window is [`ClassificationResult::NeedsUpdate`], and anything older —
///    or no qualifying event at all — is [`ClassificationResult::Inactive`].
///
/// Events by non-assignees never qualify: activity from drive-by commenters
/// does not keep an issue alive.
pub fn classify(
    events: &[TimelineEvent],
    subject: IssueNumber,
    assignees: &AssigneeSet,
    window: CutoffWindow,
    now: Timestamp,
) -> ClassificationResult {
    let fixed_by_assignee = events.iter().any(|event| match event {
        TimelineEvent::CrossReferenced {
            actor, linked_text, ..
        } => assignees.contains(actor) && names_as_fixed(linked_text, subject),
        _ => false,
    });
    if fixed_by_assignee {
        return ClassificationResult::Updated;
    }

    let last_comment = events
        .iter()
        .filter_map(|event| match event {
            TimelineEvent::Commented { actor, at } if assignees.contains(actor) => Some(*at),
            _ => None,
        })
        .max();

    let last_assigned = events
        .iter()
        .filter_map(|event| match event {
            TimelineEvent::Assigned { assignee, at } if assignees.contains(assignee) => Some(*at),
            _ => None,
        })
        .max();

    if last_comment.is_some_and(|at| window.is_recent(at, now)) {
        return ClassificationResult::Updated;
    }
    if last_assigned.is_some_and(|at| window.is_recent(at, now)) {
        return ClassificationResult::RecentlyAssigned;
    }

    let latest_activity = last_comment.max(last_assigned);
    if latest_activity.is_some_and(|at| window.is_within_stale(at, now)) {
        return ClassificationResult::NeedsUpdate;
    }

    ClassificationResult::Inactive
}
