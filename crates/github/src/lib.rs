//! BoardSweep GitHub infrastructure adapter.
//!
//! Implements the [`triage::BoardGateway`] trait over the GitHub REST API
//! using `reqwest`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. All GitHub
//! API details (authentication, pagination, retry, wire formats) are handled
//! here; the `triage` crate never sees them.

pub mod client;
pub mod error;
pub mod retry;
pub mod wire;

pub use client::{GithubClient, GithubOptions, DEFAULT_API_BASE};
pub use error::GithubError;
pub use retry::RetryConfig;
