//! Wire DTOs for the GitHub REST payloads the adapter consumes, and their
//! conversion into domain types.
//!
//! Timestamps stay as strings in the DTOs and are parsed during conversion,
//! so a malformed value surfaces as [`TriageError::InvalidInput`] naming the
//! offending field instead of an opaque deserialisation failure. Timeline
//! event kinds the classifier does not consult convert to `None` and are
//! dropped.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use triage::{IssueNumber, IssueSnapshot, LabelName, Login, TimelineEvent, Timestamp, TriageError};

// ---------------------------------------------------------------------------
// Shared fragments
// ---------------------------------------------------------------------------

/// A GitHub account reference (`actor`, `assignee`, issue assignees).
#[derive(Debug, Clone, Deserialize)]
pub struct AccountDto {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabelDto {
    pub name: String,
}

fn parse_login(field: &'static str, account: Option<&AccountDto>) -> Result<Login, TriageError> {
    let account =
        account.ok_or_else(|| TriageError::invalid_input(field, "missing account"))?;
    Login::new(account.login.as_str())
        .ok_or_else(|| TriageError::invalid_input(field, "empty login"))
}

fn parse_timestamp(field: &'static str, value: Option<&str>) -> Result<Timestamp, TriageError> {
    let raw = value.ok_or_else(|| TriageError::invalid_input(field, "missing timestamp"))?;
    let parsed: DateTime<Utc> = DateTime::parse_from_rfc3339(raw)
        .map_err(|err| TriageError::invalid_input(field, format!("'{raw}': {err}")))?
        .with_timezone(&Utc);
    Ok(Timestamp::from_utc(parsed))
}

// ---------------------------------------------------------------------------
// Project cards
// ---------------------------------------------------------------------------

/// One card in a project column. Only issue cards carry a `content_url`
/// ending in `/issues/{number}`; notes and pull requests are skipped.
#[derive(Debug, Clone, Deserialize)]
pub struct CardDto {
    #[serde(default)]
    pub content_url: Option<String>,
}

impl CardDto {
    /// Extracts the issue number from the card's `content_url`, if the card
    /// references an issue.
    pub fn issue_number(&self) -> Option<IssueNumber> {
        let url = self.content_url.as_deref()?;
        let (_, tail) = url.rsplit_once("/issues/")?;
        tail.parse::<u64>().ok().map(IssueNumber::new)
    }
}

// ---------------------------------------------------------------------------
// Issues
// ---------------------------------------------------------------------------

/// The slice of an issue payload the sweep needs.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueDto {
    #[serde(default)]
    pub assignees: Vec<AccountDto>,
    #[serde(default)]
    pub labels: Vec<LabelDto>,
}

impl IssueDto {
    /// Converts into an [`IssueSnapshot`], rejecting empty logins or label
    /// names.
    pub fn into_snapshot(self) -> Result<IssueSnapshot, TriageError> {
        let assignees = self
            .assignees
            .iter()
            .map(|account| parse_login("assignees.login", Some(account)))
            .collect::<Result<Vec<_>, _>>()?;
        let labels = self
            .labels
            .into_iter()
            .map(|label| {
                LabelName::new(label.name)
                    .ok_or_else(|| TriageError::invalid_input("labels.name", "empty label name"))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(IssueSnapshot { assignees, labels })
    }
}

// ---------------------------------------------------------------------------
// Timeline events
// ---------------------------------------------------------------------------

/// One entry from the issue timeline API.
///
/// The timeline mixes many event shapes under one `event` discriminator;
/// every field beyond it is optional on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineEventDto {
    pub event: String,
    #[serde(default)]
    pub actor: Option<AccountDto>,
    #[serde(default)]
    pub assignee: Option<AccountDto>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub source: Option<SourceDto>,
}

/// The `source` object of a cross-referenced event: the issue or pull
/// request that made the reference.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDto {
    #[serde(default)]
    pub issue: Option<SourceIssueDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceIssueDto {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl TimelineEventDto {
    /// Converts into a domain [`TimelineEvent`].
    ///
    /// Returns `Ok(None)` for event kinds the classifier ignores. For the
    /// three relevant kinds, missing or malformed identity/timestamp fields
    /// are an [`TriageError::InvalidInput`]: a timeline that cannot be read
    /// reliably must not be classified.
    pub fn into_domain(self) -> Result<Option<TimelineEvent>, TriageError> {
        match self.event.as_str() {
            "commented" => Ok(Some(TimelineEvent::Commented {
                actor: parse_login("actor", self.actor.as_ref())?,
                at: parse_timestamp("created_at", self.created_at.as_deref())?,
            })),
            "assigned" => Ok(Some(TimelineEvent::Assigned {
                assignee: parse_login("assignee", self.assignee.as_ref())?,
                at: parse_timestamp("created_at", self.created_at.as_deref())?,
            })),
            "cross-referenced" => {
                let linked_text = self
                    .source
                    .and_then(|source| source.issue)
                    .map(|issue| {
                        let title = issue.title.unwrap_or_default();
                        let body = issue.body.unwrap_or_default();
                        format!("{title}\n{body}")
                    })
                    .unwrap_or_default();
                Ok(Some(TimelineEvent::CrossReferenced {
                    actor: parse_login("actor", self.actor.as_ref())?,
                    linked_text,
                    at: parse_timestamp("created_at", self.created_at.as_deref())?,
                }))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(json: serde_json::Value) -> TimelineEventDto {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn commented_event_converts() {
        let event = dto(serde_json::json!({
            "event": "commented",
            "actor": { "login": "alice" },
            "created_at": "2024-03-01T12:00:00Z",
        }))
        .into_domain()
        .unwrap()
        .unwrap();
        match event {
            TimelineEvent::Commented { actor, .. } => assert_eq!(actor.as_str(), "alice"),
            other => panic!("expected Commented, got {other:?}"),
        }
    }

    #[test]
    fn assigned_event_uses_the_target_not_the_actor() {
        let event = dto(serde_json::json!({
            "event": "assigned",
            "actor": { "login": "maintainer" },
            "assignee": { "login": "alice" },
            "created_at": "2024-03-01T12:00:00Z",
        }))
        .into_domain()
        .unwrap()
        .unwrap();
        match event {
            TimelineEvent::Assigned { assignee, .. } => assert_eq!(assignee.as_str(), "alice"),
            other => panic!("expected Assigned, got {other:?}"),
        }
    }

    #[test]
    fn cross_referenced_event_joins_title_and_body() {
        let event = dto(serde_json::json!({
            "event": "cross-referenced",
            "actor": { "login": "alice" },
            "created_at": "2024-03-01T12:00:00Z",
            "source": { "issue": { "title": "Fix the widget", "body": "fixes #42" } },
        }))
        .into_domain()
        .unwrap()
        .unwrap();
        match event {
            TimelineEvent::CrossReferenced { linked_text, .. } => {
                assert_eq!(linked_text, "Fix the widget\nfixes #42");
            }
            other => panic!("expected CrossReferenced, got {other:?}"),
        }
    }

    #[test]
    fn irrelevant_event_kinds_are_dropped() {
        let converted = dto(serde_json::json!({ "event": "labeled" }))
            .into_domain()
            .unwrap();
        assert!(converted.is_none());
    }

    #[test]
    fn malformed_timestamp_is_invalid_input() {
        let err = dto(serde_json::json!({
            "event": "commented",
            "actor": { "login": "alice" },
            "created_at": "yesterday",
        }))
        .into_domain()
        .unwrap_err();
        assert!(matches!(err, TriageError::InvalidInput { ref field, .. } if field == "created_at"));
    }

    #[test]
    fn missing_actor_is_invalid_input() {
        let err = dto(serde_json::json!({
            "event": "commented",
            "created_at": "2024-03-01T12:00:00Z",
        }))
        .into_domain()
        .unwrap_err();
        assert!(matches!(err, TriageError::InvalidInput { ref field, .. } if field == "actor"));
    }

    #[test]
    fn cards_yield_issue_numbers_only_for_issue_urls() {
        let issue_card = CardDto {
            content_url: Some("https://api.github.com/repos/o/r/issues/42".to_string()),
        };
        assert_eq!(issue_card.issue_number(), Some(IssueNumber::new(42)));

        let note_card = CardDto { content_url: None };
        assert_eq!(note_card.issue_number(), None);

        let pr_card = CardDto {
            content_url: Some("https://api.github.com/repos/o/r/pulls/7".to_string()),
        };
        assert_eq!(pr_card.issue_number(), None);
    }

    #[test]
    fn issue_snapshot_conversion_keeps_all_labels() {
        let issue: IssueDto = serde_json::from_value(serde_json::json!({
            "assignees": [{ "login": "alice" }, { "login": "bob" }],
            "labels": [{ "name": "bug" }, { "name": "To Update !" }],
        }))
        .unwrap();
        let snapshot = issue.into_snapshot().unwrap();
        assert_eq!(snapshot.assignees.len(), 2);
        assert_eq!(snapshot.labels.len(), 2);
    }
}
