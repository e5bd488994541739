//! The sweep: one pass over a project column.
//!
//! Drives a [`BoardGateway`] issue by issue: snapshot, timeline, classify,
//! plan, apply. Failures are isolated per issue — a broken timeline or a
//! failed label mutation is logged and counted, and the sweep moves on to the
//! next card.

use tracing::{debug, info, warn};

use crate::{
    classify, AssigneeSet, BoardGateway, ClassificationResult, ColumnId, CommentKind,
    CutoffWindow, GatewayError, IssueNumber, LabelPlan, LabelPolicy, Timestamp,
};

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Counters for one sweep run, logged by the CLI when the run finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Issues classified and (where necessary) relabeled.
    pub processed: usize,
    /// Issues skipped because they have no assignees.
    pub skipped_unassigned: usize,
    /// Issues abandoned after a gateway failure.
    pub failed: usize,
    /// Per-classification totals over the processed issues.
    pub updated: usize,
    /// See [`ClassificationResult::NeedsUpdate`].
    pub needs_update: usize,
    /// See [`ClassificationResult::Inactive`].
    pub inactive: usize,
    /// See [`ClassificationResult::RecentlyAssigned`].
    pub recently_assigned: usize,
}

impl SweepSummary {
    fn tally(&mut self, result: ClassificationResult) {
        self.processed += 1;
        match result {
            ClassificationResult::Updated => self.updated += 1,
            ClassificationResult::NeedsUpdate => self.needs_update += 1,
            ClassificationResult::Inactive => self.inactive += 1,
            ClassificationResult::RecentlyAssigned => self.recently_assigned += 1,
        }
    }

    /// Returns `true` if at least one issue was examined, whatever the
    /// outcome.
    pub fn saw_any_issue(&self) -> bool {
        self.processed + self.skipped_unassigned + self.failed > 0
    }
}

// ---------------------------------------------------------------------------
// Comment rendering
// ---------------------------------------------------------------------------

/// Renders the reminder comment for `kind`, addressed to every assignee.
///
/// Mentions are sorted so the rendered body is deterministic.
pub fn render_comment(kind: CommentKind, assignees: &AssigneeSet, window: CutoffWindow) -> String {
    let mut mentions: Vec<String> = assignees
        .iter()
        .map(|login| format!("@{}", login.as_str()))
        .collect();
    mentions.sort();
    let mentions = mentions.join(" ");

    match kind {
        CommentKind::UpdateRequest => format!(
            "{mentions} this issue is awaiting an update: no assignee activity has been \
             recorded in the last {} days. Please post a progress comment, or unassign \
             yourself if you are no longer working on it.",
            window.recent_days()
        ),
        CommentKind::InactivityNotice => format!(
            "{mentions} there has been no assignee activity here for over {} days, so this \
             issue has been marked inactive. Please post an update, or unassign yourself so \
             the issue can be picked up by someone else.",
            window.stale_days()
        ),
    }
}

// ---------------------------------------------------------------------------
// The sweep itself
// ---------------------------------------------------------------------------

/// Sweeps every issue in `column` once.
///
/// Listing the column is the only fatal failure: without it there is nothing
/// to iterate. Everything after that is per-issue and tolerated.
pub async fn run_sweep<G>(
    gateway: &G,
    column: ColumnId,
    policy: &LabelPolicy,
    window: CutoffWindow,
    now: Timestamp,
) -> Result<SweepSummary, GatewayError>
where
    G: BoardGateway + ?Sized,
{
    let issues = gateway.list_column_issues(column).await?;
    info!(column = %column, count = issues.len(), "sweeping column");

    let mut summary = SweepSummary::default();
    for issue in issues {
        match sweep_issue(gateway, issue, policy, window, now).await {
            Ok(Some(result)) => {
                debug!(issue = %issue, ?result, "issue classified");
                summary.tally(result);
            }
            Ok(None) => {
                debug!(issue = %issue, "no assignees, skipping");
                summary.skipped_unassigned += 1;
            }
            Err(err) => {
                warn!(issue = %issue, error = %err, retry = ?err.retry_policy(), "issue failed, continuing");
                summary.failed += 1;
            }
        }
    }

    info!(
        processed = summary.processed,
        skipped = summary.skipped_unassigned,
        failed = summary.failed,
        "sweep finished"
    );
    Ok(summary)
}

/// Classifies and relabels a single issue.
///
/// Returns `Ok(None)` when the issue has no assignees and was skipped.
async fn sweep_issue<G>(
    gateway: &G,
    issue: IssueNumber,
    policy: &LabelPolicy,
    window: CutoffWindow,
    now: Timestamp,
) -> Result<Option<ClassificationResult>, GatewayError>
where
    G: BoardGateway + ?Sized,
{
    let snapshot = gateway.issue_snapshot(issue).await?;
    let Some(assignees) = AssigneeSet::new(snapshot.assignees) else {
        return Ok(None);
    };

    let events = gateway.timeline(issue).await?;
    let result = classify(&events, issue, &assignees, window, now);

    let plan = LabelPlan::for_result(result, policy, &snapshot.labels);
    if plan.is_empty() {
        return Ok(Some(result));
    }

    let comment = plan
        .comment
        .map(|kind| render_comment(kind, &assignees, window));
    gateway.apply(issue, &plan, comment.as_deref()).await?;
    Ok(Some(result))
}
