//! Operator credentials.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the repository hosting the mirroring pipeline. The panel always
/// targets this repository under the configured owner.
pub const REPOSITORY_NAME: &str = "docker_image_pusher";

/// Default run-history poll interval.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Prefix of a classic GitHub personal access token.
const TOKEN_PREFIX: &str = "ghp_";

/// Returns true if the token passes the personal-access-token format check.
#[must_use]
pub fn token_is_well_formed(token: &str) -> bool {
    token.starts_with(TOKEN_PREFIX) && token.len() > TOKEN_PREFIX.len()
}

/// Operator-supplied settings, persisted between sessions.
///
/// Loaded from the [`CredentialStore`][crate::config::CredentialStore] at
/// startup and mutated only through an explicit save action.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Owner of the pipeline repository (user or organization).
    #[serde(default)]
    pub repository_owner: String,

    /// Personal access token. Optional: issue-based sync works without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Seconds between run-history polls. Clamped to at least 1.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            repository_owner: String::new(),
            access_token: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

// The token must never leak into logs or debug dumps.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("repository_owner", &self.repository_owner)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("poll_interval_secs", &self.poll_interval_secs)
            .finish()
    }
}

impl Credentials {
    /// Returns the fixed name of the pipeline repository.
    #[must_use]
    pub fn repository_name(&self) -> &'static str {
        REPOSITORY_NAME
    }

    /// Returns true if a repository owner is known.
    #[must_use]
    pub fn has_owner(&self) -> bool {
        !self.repository_owner.trim().is_empty()
    }

    /// Returns the token when present and well-formed.
    #[must_use]
    pub fn usable_token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .filter(|token| token_is_well_formed(token))
    }
}

/// How a settings save treats the stored access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenUpdate {
    /// Leave the stored token untouched.
    Keep,
    /// Remove the stored token, dropping back to issue-only sync.
    Clear,
    /// Replace the stored token.
    Set(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_format_check() {
        assert!(token_is_well_formed("ghp_abc123"));
        assert!(!token_is_well_formed("ghp_"));
        assert!(!token_is_well_formed("gho_abc123"));
        assert!(!token_is_well_formed(""));
    }

    #[test]
    fn debug_redacts_token() {
        let credentials = Credentials {
            repository_owner: "someone".to_string(),
            access_token: Some("ghp_secret".to_string()),
            poll_interval_secs: 5,
        };

        let rendered = format!("{credentials:?}");
        assert!(!rendered.contains("ghp_secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn default_interval_is_applied() {
        let credentials = Credentials::default();
        assert_eq!(credentials.poll_interval_secs, DEFAULT_POLL_INTERVAL_SECS);
        assert!(!credentials.has_owner());
    }
}
