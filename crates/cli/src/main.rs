//! BoardSweep CLI entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration** — load `boardsweep.toml` (path overridable via
//!    `BOARDSWEEP_CONFIG`) and validate it; read the token from
//!    `GITHUB_TOKEN`.
//! 2. **Wire observability** — configure `tracing-subscriber` with an
//!    `EnvFilter` (`RUST_LOG`, default `info`); `BOARDSWEEP_LOG_FORMAT=json`
//!    switches to JSON output for scheduled runs.
//! 3. **Construct infrastructure** — build the [`github::GithubClient`] and
//!    inject it into [`triage::run_sweep`].
//! 4. **Run one sweep** — each invocation sweeps the configured column once
//!    under a root span carrying a fresh [`triage::SweepRunId`], then logs
//!    the summary. The process exits non-zero only when every issue failed.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use tracing::{error, info, Instrument};
use tracing_subscriber::EnvFilter;

use config::{github_token, SweepConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH};
use github::{GithubClient, GithubOptions};
use triage::{run_sweep, SweepRunId, SweepSummary, Timestamp};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("BOARDSWEEP_LOG_FORMAT").is_ok_and(|v| v == "json");
    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn config_path() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

async fn run() -> anyhow::Result<SweepSummary> {
    let path = config_path();
    let config = SweepConfig::load(&path)
        .with_context(|| format!("loading configuration from {}", path.display()))?;
    let token = github_token()?;

    let mut options = GithubOptions::new(config.repository.clone(), token);
    options.api_base = config.api_base.clone();
    options.request_timeout = config.request_timeout;
    options.retry = config.retry.clone();
    let client = GithubClient::new(options).context("constructing GitHub client")?;

    let summary = run_sweep(
        &client,
        config.column,
        &config.policy,
        config.window,
        Timestamp::now(),
    )
    .await
    .context("sweeping the project column")?;
    Ok(summary)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let run_id = SweepRunId::new_random();
    let span = tracing::info_span!("sweep_run", run_id = %run_id);
    match run().instrument(span).await {
        Ok(summary) => {
            info!(
                processed = summary.processed,
                skipped = summary.skipped_unassigned,
                failed = summary.failed,
                updated = summary.updated,
                needs_update = summary.needs_update,
                inactive = summary.inactive,
                recently_assigned = summary.recently_assigned,
                "sweep complete"
            );
            // Partial failure is tolerated; a run that examined issues and
            // processed none of them is not.
            if summary.failed > 0 && summary.processed == 0 && summary.skipped_unassigned == 0 {
                error!("every issue in the column failed");
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(err) => {
            error!(error = %format!("{err:#}"), "sweep aborted");
            ExitCode::FAILURE
        }
    }
}
