//! Classification outcomes and the label plans derived from them.
//!
//! The classifier produces a [`ClassificationResult`]; which label strings
//! that maps to is policy, not logic, so the mapping lives here at the
//! boundary and is driven by a configurable [`LabelPolicy`]. Downstream, the
//! sweep turns a [`LabelPlan`] into label mutations and an optional comment.

use serde::{Deserialize, Serialize};

use crate::LabelName;

// ---------------------------------------------------------------------------
// Classification result
// ---------------------------------------------------------------------------

/// The recency bucket for one issue's assignee activity.
///
/// Exactly one variant is produced per classification; the label choice is a
/// pure function of the variant (see [`LabelPlan::for_result`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationResult {
    /// An assignee commented recently, or a cross-referenced fix names this
    /// issue. No reminder needed.
    Updated,
    /// The latest qualifying activity is past the recent window but within
    /// the stale window. The assignees are asked for an update.
    NeedsUpdate,
    /// No qualifying activity within the stale window (or none at all).
    Inactive,
    /// An assignee was added within the recent window and has not commented
    /// yet. Exempt from update requests, but deliberately not marked as
    /// updated either.
    RecentlyAssigned,
}

// ---------------------------------------------------------------------------
// Label policy
// ---------------------------------------------------------------------------

/// The label names the sweep manages on the repository.
///
/// These are configuration: repositories may rename them without touching the
/// classifier. [`LabelPolicy::default`] carries the production names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelPolicy {
    /// Applied for [`ClassificationResult::Updated`].
    pub updated: LabelName,
    /// Applied for [`ClassificationResult::NeedsUpdate`].
    pub needs_update: LabelName,
    /// Applied for [`ClassificationResult::Inactive`].
    pub inactive: LabelName,
}

impl Default for LabelPolicy {
    fn default() -> Self {
        Self {
            updated: LabelName::new("Status: Updated").expect("non-empty label"),
            needs_update: LabelName::new("To Update !").expect("non-empty label"),
            inactive: LabelName::new("2 weeks inactive").expect("non-empty label"),
        }
    }
}

impl LabelPolicy {
    /// Returns the label this policy applies for `result`, if any.
    ///
    /// `RecentlyAssigned` maps to no label: such issues only have stale sweep
    /// labels cleared.
    pub fn label_for(&self, result: ClassificationResult) -> Option<&LabelName> {
        match result {
            ClassificationResult::Updated => Some(&self.updated),
            ClassificationResult::NeedsUpdate => Some(&self.needs_update),
            ClassificationResult::Inactive => Some(&self.inactive),
            ClassificationResult::RecentlyAssigned => None,
        }
    }

    /// Iterates over all labels this policy manages.
    pub fn managed(&self) -> impl Iterator<Item = &LabelName> {
        [&self.updated, &self.needs_update, &self.inactive].into_iter()
    }
}

// ---------------------------------------------------------------------------
// Label plan
// ---------------------------------------------------------------------------

/// The reminder comment that accompanies a label change, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentKind {
    /// "Please post an update" reminder for [`ClassificationResult::NeedsUpdate`].
    UpdateRequest,
    /// Inactivity notice for [`ClassificationResult::Inactive`].
    InactivityNotice,
}

/// The concrete mutations one classification implies for one issue.
///
/// A plan is computed against the labels currently on the issue so that
/// re-running the sweep on an already-correct issue yields an empty plan and
/// no duplicate comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPlan {
    /// Label to add, if it is not already applied.
    pub add: Option<LabelName>,
    /// Managed labels currently applied that no longer match the result.
    pub remove: Vec<LabelName>,
    /// Reminder comment to post alongside the label change.
    pub comment: Option<CommentKind>,
}

impl LabelPlan {
    /// Computes the plan for `result` under `policy`, given the labels
    /// `applied` on the issue right now.
    ///
    /// Unmanaged labels are never touched. The comment is suppressed when the
    /// target label is already applied: the reminder was posted when the
    /// label first went on.
    pub fn for_result(
        result: ClassificationResult,
        policy: &LabelPolicy,
        applied: &[LabelName],
    ) -> Self {
        let target = policy.label_for(result);
        let already_applied = target.is_some_and(|label| applied.contains(label));

        let remove = policy
            .managed()
            .filter(|&label| applied.contains(label) && Some(label) != target)
            .cloned()
            .collect();

        let comment = if already_applied {
            None
        } else {
            match result {
                ClassificationResult::NeedsUpdate => Some(CommentKind::UpdateRequest),
                ClassificationResult::Inactive => Some(CommentKind::InactivityNotice),
                ClassificationResult::Updated | ClassificationResult::RecentlyAssigned => None,
            }
        };

        Self {
            add: if already_applied {
                None
            } else {
                target.cloned()
            },
            remove,
            comment,
        }
    }

    /// Returns `true` if the plan changes nothing on the issue.
    pub fn is_empty(&self) -> bool {
        self.add.is_none() && self.remove.is_empty() && self.comment.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> LabelName {
        LabelName::new(s).unwrap()
    }

    #[test]
    fn default_policy_carries_production_names() {
        let policy = LabelPolicy::default();
        assert_eq!(policy.updated.as_str(), "Status: Updated");
        assert_eq!(policy.needs_update.as_str(), "To Update !");
        assert_eq!(policy.inactive.as_str(), "2 weeks inactive");
    }

    #[test]
    fn updated_adds_its_label_and_clears_the_others() {
        let policy = LabelPolicy::default();
        let applied = vec![label("To Update !"), label("bug")];
        let plan = LabelPlan::for_result(ClassificationResult::Updated, &policy, &applied);
        assert_eq!(plan.add, Some(label("Status: Updated")));
        assert_eq!(plan.remove, vec![label("To Update !")]);
        assert_eq!(plan.comment, None);
    }

    #[test]
    fn needs_update_posts_an_update_request() {
        let policy = LabelPolicy::default();
        let plan = LabelPlan::for_result(ClassificationResult::NeedsUpdate, &policy, &[]);
        assert_eq!(plan.add, Some(label("To Update !")));
        assert!(plan.remove.is_empty());
        assert_eq!(plan.comment, Some(CommentKind::UpdateRequest));
    }

    #[test]
    fn inactive_posts_an_inactivity_notice() {
        let policy = LabelPolicy::default();
        let applied = vec![label("Status: Updated")];
        let plan = LabelPlan::for_result(ClassificationResult::Inactive, &policy, &applied);
        assert_eq!(plan.add, Some(label("2 weeks inactive")));
        assert_eq!(plan.remove, vec![label("Status: Updated")]);
        assert_eq!(plan.comment, Some(CommentKind::InactivityNotice));
    }

    #[test]
    fn recently_assigned_only_clears_managed_labels() {
        let policy = LabelPolicy::default();
        let applied = vec![label("2 weeks inactive"), label("enhancement")];
        let plan =
            LabelPlan::for_result(ClassificationResult::RecentlyAssigned, &policy, &applied);
        assert_eq!(plan.add, None);
        assert_eq!(plan.remove, vec![label("2 weeks inactive")]);
        assert_eq!(plan.comment, None);
    }

    #[test]
    fn already_correct_issue_yields_an_empty_plan() {
        let policy = LabelPolicy::default();
        let applied = vec![label("To Update !")];
        let plan = LabelPlan::for_result(ClassificationResult::NeedsUpdate, &policy, &applied);
        assert!(plan.is_empty(), "plan was {plan:?}");
    }

    #[test]
    fn unmanaged_labels_are_never_removed() {
        let policy = LabelPolicy::default();
        let applied = vec![label("bug"), label("P1")];
        let plan = LabelPlan::for_result(ClassificationResult::RecentlyAssigned, &policy, &applied);
        assert!(plan.remove.is_empty());
    }
}
