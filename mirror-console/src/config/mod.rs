//! Credential configuration and persistence.
//!
//! This module handles the operator-supplied settings (repository owner,
//! access token, poll interval), their persistence to a TOML file, and
//! repository-owner auto-detection from a static-hosting hostname.

mod credentials;
mod error;
mod store;

pub use credentials::{
    token_is_well_formed, Credentials, TokenUpdate, DEFAULT_POLL_INTERVAL_SECS, REPOSITORY_NAME,
};
pub use error::ConfigError;
pub use store::CredentialStore;

/// Static-hosting domain the panel is served from when deployed next to the
/// pipeline repository.
const PAGES_DOMAIN: &str = "github.io";

/// Derives the repository owner from a static-hosting hostname.
///
/// A panel deployed at `someone.github.io` belongs to the account `someone`,
/// so the hostname's first label is the owner. Any other hostname yields
/// `None` and the caller falls back to the persisted value.
#[must_use]
pub fn detect_owner(hostname: &str) -> Option<String> {
    let hostname = hostname.trim().trim_end_matches('.');
    let (owner, domain) = hostname.split_once('.')?;
    if domain.eq_ignore_ascii_case(PAGES_DOMAIN) && !owner.is_empty() {
        Some(owner.to_ascii_lowercase())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_owner_from_pages_hostname() {
        assert_eq!(detect_owner("gqy20.github.io"), Some("gqy20".to_string()));
        assert_eq!(detect_owner("Someone.GitHub.IO"), Some("someone".to_string()));
    }

    #[test]
    fn ignores_other_hostnames() {
        assert_eq!(detect_owner("example.com"), None);
        assert_eq!(detect_owner("localhost"), None);
        assert_eq!(detect_owner(""), None);
        assert_eq!(detect_owner(".github.io"), None);
    }
}
