//! GitHub integration for h2spec-regression
//!
//! Provides a [`GithubClient`] implementing the checks platform traits from
//! `regression-core`: listing check runs on a ref, creating or updating a
//! check run, and commenting on pull requests.

pub mod client;
pub mod config;
pub mod error;
pub mod types;

pub use client::GithubClient;
pub use config::{GithubConfig, DEFAULT_API_URL};
pub use error::GithubError;

/// Result type for GitHub operations
pub type Result<T> = std::result::Result<T, GithubError>;
