//! Core triage domain for BoardSweep.
//!
//! This crate contains every domain concept used by the sweep: newtype
//! identifiers, shared value types, the timeline classifier, label planning,
//! the port trait infrastructure implements, and cross-cutting error types.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; the `github` crate defines *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype domain identifiers (`IssueNumber`, `Login`, etc.) |
//! | [`types`] | Shared value types (`Timestamp`, `AssigneeSet`, `CutoffWindow`) |
//! | [`timeline`] | Timeline events and the [`classify`] function |
//! | [`classification`] | Classification results and label planning |
//! | [`ports`] | The [`BoardGateway`] trait the adapter implements |
//! | [`sweep`] | One pass over a project column, with per-issue isolation |
//! | [`errors`] | Domain and port-boundary error types, retry policy |

pub mod classification;
pub mod errors;
pub mod identifiers;
pub mod ports;
pub mod sweep;
pub mod timeline;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use classification::{ClassificationResult, CommentKind, LabelPlan, LabelPolicy};
pub use errors::{GatewayError, RetryPolicy, TriageError};
pub use identifiers::{ColumnId, IssueNumber, LabelName, Login, RepositoryId, SweepRunId};
pub use ports::{BoardGateway, IssueSnapshot};
pub use sweep::{render_comment, run_sweep, SweepSummary};
pub use timeline::{classify, TimelineEvent};
pub use types::{AssigneeSet, CutoffWindow, Timestamp};
