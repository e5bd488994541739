//! The GitHub REST client behind [`triage::BoardGateway`].
//!
//! All API details live here: authentication headers, pagination, retry, and
//! the conversion from wire DTOs to domain types. The domain crate never
//! sees an HTTP status or a JSON body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use triage::{
    BoardGateway, ColumnId, GatewayError, IssueNumber, IssueSnapshot, LabelName, LabelPlan,
    RepositoryId, TimelineEvent,
};

use crate::error::GithubError;
use crate::retry::{send_with_retry, RetryConfig};
use crate::wire::{CardDto, IssueDto, TimelineEventDto};

/// Public REST endpoint; overridable for GitHub Enterprise and tests.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

const PER_PAGE: usize = 100;

/// Construction knobs for [`GithubClient`].
#[derive(Debug, Clone)]
pub struct GithubOptions {
    /// Base URL of the REST API.
    pub api_base: String,
    /// Repository the sweep operates on.
    pub repository: RepositoryId,
    /// Token with `repo` scope; sent as a bearer credential.
    pub token: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Retry behaviour for transient failures.
    pub retry: RetryConfig,
}

impl GithubOptions {
    /// Options with production defaults for `repository` and `token`.
    pub fn new(repository: RepositoryId, token: impl Into<String>) -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            repository,
            token: token.into(),
            request_timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
        }
    }
}

/// GitHub REST adapter implementing [`BoardGateway`].
pub struct GithubClient {
    http: reqwest::Client,
    base: reqwest::Url,
    repository: RepositoryId,
    retry: RetryConfig,
}

impl GithubClient {
    /// Builds the client, validating the base URL and the token header.
    pub fn new(options: GithubOptions) -> Result<Self, GithubError> {
        let base = reqwest::Url::parse(options.api_base.trim_end_matches('/')).map_err(|err| {
            GithubError::Configuration {
                message: format!("invalid api base '{}': {err}", options.api_base),
            }
        })?;
        if base.cannot_be_a_base() {
            return Err(GithubError::Configuration {
                message: format!("api base '{}' cannot carry a path", options.api_base),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("boardsweep"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", options.token.trim()))
            .map_err(|_| GithubError::Configuration {
                message: "token is not a valid header value".to_string(),
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(options.request_timeout)
            .build()
            .map_err(|err| GithubError::Configuration {
                message: format!("failed to build http client: {err}"),
            })?;

        Ok(Self {
            http,
            base,
            repository: options.repository,
            retry: options.retry,
        })
    }

    /// Joins path segments onto the base URL, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> reqwest::Url {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .expect("base validated at construction")
            .pop_if_empty()
            .extend(segments);
        url
    }

    fn issue_url(&self, issue: IssueNumber, tail: &[&str]) -> reqwest::Url {
        let number = issue.to_string();
        let mut segments = vec![
            "repos",
            self.repository.owner(),
            self.repository.name(),
            "issues",
            number.as_str(),
        ];
        segments.extend_from_slice(tail);
        self.url(&segments)
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        build: impl Fn() -> reqwest::RequestBuilder,
    ) -> Result<T, GithubError> {
        let response = send_with_retry(operation, &self.retry, build).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| GithubError::Payload {
                operation,
                message: err.to_string(),
            })
    }

    /// Fetches every page of a list endpoint until a short page arrives.
    async fn paginated<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: reqwest::Url,
    ) -> Result<Vec<T>, GithubError> {
        let mut page = 1_u32;
        let mut rows: Vec<T> = Vec::new();
        loop {
            let chunk: Vec<T> = self
                .request_json(operation, || {
                    self.http.get(url.clone()).query(&[
                        ("per_page", PER_PAGE.to_string()),
                        ("page", page.to_string()),
                    ])
                })
                .await?;
            let chunk_len = chunk.len();
            rows.extend(chunk);
            if chunk_len < PER_PAGE {
                break;
            }
            page = page.saturating_add(1);
        }
        Ok(rows)
    }

    async fn column_issue_numbers(
        &self,
        column: ColumnId,
    ) -> Result<Vec<IssueNumber>, GithubError> {
        let column_id = column.to_string();
        let url = self.url(&["projects", "columns", column_id.as_str(), "cards"]);
        let cards: Vec<CardDto> = self.paginated("list column cards", url).await?;
        let issues: Vec<IssueNumber> =
            cards.iter().filter_map(CardDto::issue_number).collect();
        debug!(column = %column, cards = cards.len(), issues = issues.len(), "listed column");
        Ok(issues)
    }

    async fn fetch_snapshot(&self, issue: IssueNumber) -> Result<IssueSnapshot, GithubError> {
        let url = self.issue_url(issue, &[]);
        let dto: IssueDto = self
            .request_json("fetch issue", || self.http.get(url.clone()))
            .await?;
        Ok(dto.into_snapshot()?)
    }

    async fn fetch_timeline(
        &self,
        issue: IssueNumber,
    ) -> Result<Vec<TimelineEvent>, GithubError> {
        let url = self.issue_url(issue, &["timeline"]);
        let dtos: Vec<TimelineEventDto> = self.paginated("fetch timeline", url).await?;
        let mut events = Vec::new();
        for dto in dtos {
            if let Some(event) = dto.into_domain()? {
                events.push(event);
            }
        }
        Ok(events)
    }

    async fn add_label(&self, issue: IssueNumber, label: &LabelName) -> Result<(), GithubError> {
        let url = self.issue_url(issue, &["labels"]);
        let payload = json!({ "labels": [label.as_str()] });
        let _: serde_json::Value = self
            .request_json("add label", || {
                self.http.post(url.clone()).json(&payload)
            })
            .await?;
        Ok(())
    }

    /// Removes `label`; a 404 means it was already gone and is not an error.
    async fn remove_label(
        &self,
        issue: IssueNumber,
        label: &LabelName,
    ) -> Result<(), GithubError> {
        let url = self.issue_url(issue, &["labels", label.as_str()]);
        match send_with_retry("remove label", &self.retry, || {
            self.http.delete(url.clone())
        })
        .await
        {
            Ok(_) => Ok(()),
            Err(GithubError::Api { status: 404, .. }) => Ok(()),
            Err(err) => Err(err),
        }
    }

    async fn create_comment(&self, issue: IssueNumber, body: &str) -> Result<(), GithubError> {
        let url = self.issue_url(issue, &["comments"]);
        let payload = json!({ "body": body });
        let _: serde_json::Value = self
            .request_json("create comment", || {
                self.http.post(url.clone()).json(&payload)
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl BoardGateway for GithubClient {
    async fn list_column_issues(
        &self,
        column: ColumnId,
    ) -> Result<Vec<IssueNumber>, GatewayError> {
        Ok(self.column_issue_numbers(column).await?)
    }

    async fn issue_snapshot(&self, issue: IssueNumber) -> Result<IssueSnapshot, GatewayError> {
        Ok(self.fetch_snapshot(issue).await?)
    }

    async fn timeline(&self, issue: IssueNumber) -> Result<Vec<TimelineEvent>, GatewayError> {
        Ok(self.fetch_timeline(issue).await?)
    }

    async fn apply(
        &self,
        issue: IssueNumber,
        plan: &LabelPlan,
        comment: Option<&str>,
    ) -> Result<(), GatewayError> {
        for label in &plan.remove {
            self.remove_label(issue, label).await?;
        }
        if let Some(label) = &plan.add {
            self.add_label(issue, label).await?;
        }
        if let Some(body) = comment {
            self.create_comment(issue, body).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod integration_tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use wiremock::matchers::{header, method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use triage::{ClassificationResult, LabelPolicy};

    use super::*;

    async fn client_for(server: &MockServer) -> GithubClient {
        let mut options = GithubOptions::new(
            RepositoryId::parse("octo-org/widgets").unwrap(),
            "test-token",
        );
        options.api_base = server.uri();
        options.retry = RetryConfig {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
        };
        GithubClient::new(options).unwrap()
    }

    fn commented_event() -> serde_json::Value {
        json!({
            "event": "commented",
            "actor": { "login": "alice" },
            "created_at": "2024-03-01T12:00:00Z",
        })
    }

    #[tokio::test]
    async fn lists_issue_cards_and_skips_notes_and_pull_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/projects/columns/5/cards"))
            .and(header("authorization", "Bearer test-token"))
            .and(header("x-github-api-version", "2022-11-28"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "content_url": "https://api.github.com/repos/octo-org/widgets/issues/42" },
                { "note": "just a note" },
                { "content_url": "https://api.github.com/repos/octo-org/widgets/pulls/7" },
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let issues = client.column_issue_numbers(ColumnId::new(5)).await.unwrap();
        assert_eq!(issues, vec![IssueNumber::new(42)]);
    }

    #[tokio::test]
    async fn timeline_pagination_follows_full_pages() {
        let server = MockServer::start().await;
        let full_page: Vec<serde_json::Value> = (0..100).map(|_| commented_event()).collect();

        Mock::given(method("GET"))
            .and(path("/repos/octo-org/widgets/issues/42/timeline"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&full_page))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/octo-org/widgets/issues/42/timeline"))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([
                    { "event": "labeled" },
                    commented_event(),
                ])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let events = client.fetch_timeline(IssueNumber::new(42)).await.unwrap();
        // 100 from page one, one from page two; the "labeled" entry is dropped.
        assert_eq!(events.len(), 101);
    }

    #[tokio::test]
    async fn snapshot_carries_assignees_and_labels() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo-org/widgets/issues/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "number": 42,
                "assignees": [{ "login": "alice" }],
                "labels": [{ "name": "To Update !" }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let snapshot = client.fetch_snapshot(IssueNumber::new(42)).await.unwrap();
        assert_eq!(snapshot.assignees.len(), 1);
        assert_eq!(snapshot.labels[0].as_str(), "To Update !");
    }

    #[tokio::test]
    async fn apply_removes_adds_and_comments() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path_regex(r"^/repos/octo-org/widgets/issues/42/labels/.+$"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/octo-org/widgets/issues/42/labels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/octo-org/widgets/issues/42/comments"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
            .expect(1)
            .mount(&server)
            .await;

        let policy = LabelPolicy::default();
        let plan = LabelPlan::for_result(
            ClassificationResult::Inactive,
            &policy,
            &[policy.updated.clone()],
        );

        let client = client_for(&server).await;
        client
            .apply(IssueNumber::new(42), &plan, Some("@alice please update"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn transient_errors_are_retried() {
        let server = MockServer::start().await;
        let attempt = AtomicU32::new(0);
        Mock::given(method("GET"))
            .and(path("/repos/octo-org/widgets/issues/42/timeline"))
            .respond_with(move |_: &wiremock::Request| {
                if attempt.fetch_add(1, Ordering::SeqCst) == 0 {
                    ResponseTemplate::new(502)
                } else {
                    ResponseTemplate::new(200).set_body_json(json!([commented_event()]))
                }
            })
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let events = client.fetch_timeline(IssueNumber::new(42)).await.unwrap();
        assert_eq!(events.len(), 1);
    }

    #[tokio::test]
    async fn non_retryable_status_surfaces_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo-org/widgets/issues/42"))
            .respond_with(
                ResponseTemplate::new(403).set_body_string("rate limit exceeded"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = client.fetch_snapshot(IssueNumber::new(42)).await.unwrap_err();
        match err {
            GithubError::Api { status, ref body, .. } => {
                assert_eq!(status, 403);
                assert!(body.contains("rate limit"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
