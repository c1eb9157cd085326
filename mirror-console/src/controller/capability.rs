//! Capability tiers derived from credentials.

use crate::config::Credentials;
use std::fmt;

/// Permission level derived from the current credentials.
///
/// Always recomputed from [`Credentials`] via
/// [`from_credentials`][Self::from_credentials]; callers must not cache a
/// tier across a credential mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityTier {
    /// No repository owner known; nothing is possible.
    Unconfigured,

    /// Owner known, no usable token. Sync works through issue creation.
    IssueOnly,

    /// Owner and well-formed token. All actions available.
    FullAccess,
}

impl CapabilityTier {
    /// Computes the tier for the given credentials.
    #[must_use]
    pub fn from_credentials(credentials: &Credentials) -> Self {
        if !credentials.has_owner() {
            return Self::Unconfigured;
        }
        if credentials.usable_token().is_some() {
            Self::FullAccess
        } else {
            Self::IssueOnly
        }
    }

    /// Short identifier for logs and display.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unconfigured => "none",
            Self::IssueOnly => "issue-only",
            Self::FullAccess => "full",
        }
    }
}

impl fmt::Display for CapabilityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which operator actions the current tier enables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionGates {
    /// Submit a sync request by opening a labelled issue.
    pub issue_sync: bool,

    /// Dispatch a workflow directly.
    pub workflow_dispatch: bool,

    /// Fetch run logs.
    pub run_logs: bool,

    /// Browse run history beyond the default snapshot.
    pub full_history: bool,
}

impl ActionGates {
    /// Derives the gates for a tier.
    #[must_use]
    pub fn for_tier(tier: CapabilityTier) -> Self {
        match tier {
            CapabilityTier::Unconfigured => Self {
                issue_sync: false,
                workflow_dispatch: false,
                run_logs: false,
                full_history: false,
            },
            CapabilityTier::IssueOnly => Self {
                issue_sync: true,
                workflow_dispatch: false,
                run_logs: false,
                full_history: false,
            },
            CapabilityTier::FullAccess => Self {
                issue_sync: true,
                workflow_dispatch: true,
                run_logs: true,
                full_history: true,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(owner: &str, token: Option<&str>) -> Credentials {
        Credentials {
            repository_owner: owner.to_string(),
            access_token: token.map(str::to_string),
            poll_interval_secs: 5,
        }
    }

    #[test]
    fn no_owner_is_unconfigured() {
        let tier = CapabilityTier::from_credentials(&credentials("", None));
        assert_eq!(tier, CapabilityTier::Unconfigured);

        let blank = CapabilityTier::from_credentials(&credentials("   ", Some("ghp_x1")));
        assert_eq!(blank, CapabilityTier::Unconfigured);
    }

    #[test]
    fn owner_without_token_is_issue_only() {
        let tier = CapabilityTier::from_credentials(&credentials("someone", None));
        assert_eq!(tier, CapabilityTier::IssueOnly);

        let gates = ActionGates::for_tier(tier);
        assert!(gates.issue_sync);
        assert!(!gates.workflow_dispatch);
        assert!(!gates.run_logs);
        assert!(!gates.full_history);
    }

    #[test]
    fn malformed_token_does_not_grant_full_access() {
        let tier = CapabilityTier::from_credentials(&credentials("someone", Some("not-a-token")));
        assert_eq!(tier, CapabilityTier::IssueOnly);
    }

    #[test]
    fn owner_with_token_is_full_access() {
        let tier = CapabilityTier::from_credentials(&credentials("someone", Some("ghp_abc123")));
        assert_eq!(tier, CapabilityTier::FullAccess);

        let gates = ActionGates::for_tier(tier);
        assert!(gates.issue_sync);
        assert!(gates.workflow_dispatch);
        assert!(gates.run_logs);
        assert!(gates.full_history);
    }

    #[test]
    fn tier_labels() {
        assert_eq!(CapabilityTier::Unconfigured.to_string(), "none");
        assert_eq!(CapabilityTier::IssueOnly.to_string(), "issue-only");
        assert_eq!(CapabilityTier::FullAccess.to_string(), "full");
    }
}
