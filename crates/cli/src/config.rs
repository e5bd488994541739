//! Sweep configuration: a TOML file plus the token from the environment.
//!
//! Everything is validated at load time; the sweep never starts with an
//! invalid configuration. The token is deliberately not part of the file so
//! it cannot end up committed alongside it.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use github::RetryConfig;
use triage::{ColumnId, CutoffWindow, LabelName, LabelPolicy, RepositoryId};

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Environment variable overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "BOARDSWEEP_CONFIG";

/// Default config file path, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "boardsweep.toml";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Configuration problems, produced at load time.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML (or has wrongly typed fields).
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        /// Path that was attempted.
        path: String,
        /// Underlying TOML error.
        #[source]
        source: toml::de::Error,
    },

    /// A field parsed but failed validation.
    #[error("invalid config field '{field}': {message}")]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// What was wrong with its value.
        message: String,
    },

    /// The token environment variable is missing or empty.
    #[error("environment variable GITHUB_TOKEN is not set")]
    MissingToken,
}

// ---------------------------------------------------------------------------
// Raw file shape
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    repository: String,
    column_id: u64,
    #[serde(default)]
    api_base: Option<String>,
    #[serde(default)]
    labels: RawLabels,
    #[serde(default)]
    windows: RawWindows,
    #[serde(default)]
    http: RawHttp,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLabels {
    updated: Option<String>,
    needs_update: Option<String>,
    inactive: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWindows {
    recent_days: Option<i64>,
    stale_days: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHttp {
    request_timeout_secs: Option<u64>,
    retry_max_attempts: Option<u32>,
    retry_base_delay_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Validated configuration
// ---------------------------------------------------------------------------

/// Everything one sweep run needs, fully validated.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Repository the board belongs to.
    pub repository: RepositoryId,
    /// Project column whose issues are swept.
    pub column: ColumnId,
    /// REST API base URL.
    pub api_base: String,
    /// The three managed label names.
    pub policy: LabelPolicy,
    /// Recency thresholds.
    pub window: CutoffWindow,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Retry behaviour for transient API failures.
    pub retry: RetryConfig,
}

impl SweepConfig {
    /// Loads and validates the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let raw: RawConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, ConfigError> {
        let repository =
            RepositoryId::parse(&raw.repository).ok_or_else(|| ConfigError::Invalid {
                field: "repository",
                message: format!("'{}' is not an owner/repo slug", raw.repository),
            })?;

        let defaults = LabelPolicy::default();
        let policy = LabelPolicy {
            updated: label_or(raw.labels.updated, defaults.updated, "labels.updated")?,
            needs_update: label_or(
                raw.labels.needs_update,
                defaults.needs_update,
                "labels.needs_update",
            )?,
            inactive: label_or(raw.labels.inactive, defaults.inactive, "labels.inactive")?,
        };

        let recent_days = raw.windows.recent_days.unwrap_or(7);
        let stale_days = raw.windows.stale_days.unwrap_or(14);
        let window =
            CutoffWindow::from_days(recent_days, stale_days).ok_or(ConfigError::Invalid {
                field: "windows",
                message: format!(
                    "recent_days ({recent_days}) must be positive and at most stale_days ({stale_days})"
                ),
            })?;

        let mut retry = RetryConfig::default();
        if let Some(attempts) = raw.http.retry_max_attempts {
            if attempts == 0 {
                return Err(ConfigError::Invalid {
                    field: "http.retry_max_attempts",
                    message: "must be at least 1".to_string(),
                });
            }
            retry.max_attempts = attempts;
        }
        if let Some(ms) = raw.http.retry_base_delay_ms {
            retry.base_delay = Duration::from_millis(ms);
        }

        Ok(Self {
            repository,
            column: ColumnId::new(raw.column_id),
            api_base: raw
                .api_base
                .unwrap_or_else(|| github::DEFAULT_API_BASE.to_string()),
            policy,
            window,
            request_timeout: Duration::from_secs(raw.http.request_timeout_secs.unwrap_or(30)),
            retry,
        })
    }
}

fn label_or(
    value: Option<String>,
    default: LabelName,
    field: &'static str,
) -> Result<LabelName, ConfigError> {
    match value {
        None => Ok(default),
        Some(name) => LabelName::new(name).ok_or(ConfigError::Invalid {
            field,
            message: "label name must not be empty".to_string(),
        }),
    }
}

/// Reads the API token from the environment.
pub fn github_token() -> Result<String, ConfigError> {
    match std::env::var(TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(ConfigError::MissingToken),
    }
}
