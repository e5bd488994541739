//! Port trait the sweep drives and infrastructure implements.
//!
//! The domain defines *what* it needs from the issue tracker; the `github`
//! crate supplies *how*. Pagination, authentication, and wire formats never
//! cross this boundary — the sweep sees issue numbers, domain events, and
//! [`GatewayError`]s.

use async_trait::async_trait;

use crate::{ColumnId, GatewayError, IssueNumber, LabelName, LabelPlan, Login, TimelineEvent};

/// The assignees and labels currently on an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSnapshot {
    /// Current assignees; may be empty, in which case the sweep skips the
    /// issue.
    pub assignees: Vec<Login>,
    /// Labels currently applied, managed and unmanaged alike.
    pub labels: Vec<LabelName>,
}

/// Everything the sweep needs from the project board and issue tracker.
#[async_trait]
pub trait BoardGateway: Send + Sync {
    /// Lists the issues currently in `column`, in board order.
    ///
    /// Cards that do not reference an issue (notes, pull requests) are not
    /// returned.
    async fn list_column_issues(&self, column: ColumnId)
        -> Result<Vec<IssueNumber>, GatewayError>;

    /// Fetches the current assignees and labels of `issue`.
    async fn issue_snapshot(&self, issue: IssueNumber) -> Result<IssueSnapshot, GatewayError>;

    /// Fetches the full event timeline of `issue`, already converted to
    /// domain events. Event kinds the classifier does not consult are
    /// dropped by the implementation.
    async fn timeline(&self, issue: IssueNumber) -> Result<Vec<TimelineEvent>, GatewayError>;

    /// Applies `plan` to `issue`: removes and adds labels, then posts
    /// `comment` if present. Implementations tolerate removing a label that
    /// is already gone.
    async fn apply(
        &self,
        issue: IssueNumber,
        plan: &LabelPlan,
        comment: Option<&str>,
    ) -> Result<(), GatewayError>;
}
