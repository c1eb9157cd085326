//! API error taxonomy.

use thiserror::Error;

/// Errors surfaced by [`GitHubClient`][super::GitHubClient] calls.
///
/// Status-driven variants are deliberately coarse: the panel distinguishes
/// "re-enter your token" (401) from "back off and retry later" (403) from
/// everything else, which is surfaced verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401: the configured token is invalid or has expired.
    #[error("GitHub token invalid or expired")]
    Auth,

    /// 403: API rate limit hit. Transient; retry is left to the operator.
    #[error("GitHub API rate limit exceeded, retry later")]
    RateLimit,

    /// Any other non-2xx response.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Transport-level failure (offline, DNS, TLS, ...).
    #[error("Network failure: {0}")]
    Network(#[source] reqwest::Error),

    /// A 2xx response whose body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[source] reqwest::Error),

    /// File content that could not be decoded from its transport encoding.
    #[error("Failed to decode file content: {0}")]
    Content(String),

    /// Sync-issue body rendering failed.
    #[error(transparent)]
    Template(#[from] crate::templates::TemplateError),

    /// The HTTP client could not be constructed.
    #[error("Failed to construct HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// A request path did not form a valid URL against the API base.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Returns true for errors the operator can fix by re-entering
    /// credentials.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth)
    }
}
