//! File-backed credential persistence.

use super::{ConfigError, Credentials};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Stores [`Credentials`] in a TOML file.
///
/// The web original kept these values in browser storage; here they live in
/// a small file next to the operator's other tool configuration. A missing
/// file is not an error: it simply yields default credentials.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Creates a store backed by the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads credentials, returning defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file exists but cannot be read or
    /// parsed.
    pub fn load(&self) -> Result<Credentials, ConfigError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No credentials file, using defaults");
                return Ok(Credentials::default());
            }
            Err(e) => {
                return Err(ConfigError::Io {
                    path: self.path.display().to_string(),
                    source: e,
                })
            }
        };

        toml::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: self.path.display().to_string(),
            source: e,
        })
    }

    /// Writes credentials to the backing file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when serialization or the write fails.
    pub fn save(&self, credentials: &Credentials) -> Result<(), ConfigError> {
        let rendered = toml::to_string_pretty(credentials)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                    path: parent.display().to_string(),
                    source: e,
                })?;
            }
        }

        std::fs::write(&self.path, rendered).map_err(|e| ConfigError::Io {
            path: self.path.display().to_string(),
            source: e,
        })?;

        debug!(path = %self.path.display(), "Saved credentials");
        Ok(())
    }

    /// Removes the backing file. Errors other than "not found" are logged
    /// and swallowed; clearing is best-effort.
    pub fn clear(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove credentials file");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let store = CredentialStore::new(temp.path().join("credentials.toml"));

        let credentials = store.load().unwrap();
        assert_eq!(credentials, Credentials::default());
    }

    #[test]
    fn round_trips_credentials() {
        let temp = TempDir::new().unwrap();
        let store = CredentialStore::new(temp.path().join("credentials.toml"));

        let credentials = Credentials {
            repository_owner: "someone".to_string(),
            access_token: Some("ghp_roundtrip".to_string()),
            poll_interval_secs: 15,
        };

        store.save(&credentials).unwrap();
        let reloaded = store.load().unwrap();

        assert_eq!(reloaded, credentials);
    }

    #[test]
    fn creates_missing_parent_directories() {
        let temp = TempDir::new().unwrap();
        let store = CredentialStore::new(temp.path().join("nested/dir/credentials.toml"));

        store.save(&Credentials::default()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn clear_removes_file() {
        let temp = TempDir::new().unwrap();
        let store = CredentialStore::new(temp.path().join("credentials.toml"));

        store.save(&Credentials::default()).unwrap();
        store.clear();
        assert!(!store.path().exists());

        // Clearing again is a no-op.
        store.clear();
    }

    #[test]
    fn rejects_malformed_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("credentials.toml");
        std::fs::write(&path, "repository_owner = [not toml").unwrap();

        let store = CredentialStore::new(path);
        assert!(matches!(store.load(), Err(ConfigError::Parse { .. })));
    }
}
