#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod api;
pub mod config;
pub mod controller;
pub mod images;
pub mod templates;
pub mod util;

pub use api::{
    ApiError, ConnectionStatus, CreatedIssue, GitHubClient, RepositoryInfo, RunConclusion,
    RunStatus, WorkflowRun, WorkflowRunList, DEFAULT_ALL_RUNS_PAGE_SIZE, DEFAULT_RUNS_PAGE_SIZE,
};
pub use config::{
    detect_owner, token_is_well_formed, ConfigError, CredentialStore, Credentials, TokenUpdate,
};
pub use controller::{
    ActionGates, CapabilityTier, Controller, ControllerEvent, NoticeLevel, SettingsError,
    SyncError,
};
pub use images::{parse_image_list, ImageDescriptor, ImageWarning};
pub use templates::{sync_issue_title, TemplateError, TemplateRenderer};
