//! GitHub REST API client for the mirroring pipeline repository.
//!
//! All network access in this crate goes through [`GitHubClient`]. Every
//! endpoint the pipeline consumes is wrapped in a typed async call; response
//! shapes are deserialized into explicit structures rather than accessed ad
//! hoc.

mod client;
mod error;
mod types;

pub use client::{GitHubClient, DEFAULT_ALL_RUNS_PAGE_SIZE, DEFAULT_RUNS_PAGE_SIZE};
pub use error::ApiError;
pub use types::{
    ConnectionStatus, CreatedIssue, RepositoryInfo, RunConclusion, RunStatus, WorkflowRun,
    WorkflowRunList,
};
