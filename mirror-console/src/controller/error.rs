//! Controller error types.

use crate::api::ApiError;
use crate::config::ConfigError;
use thiserror::Error;

/// Errors from a settings save.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The owner field was empty.
    #[error("Repository owner must not be empty")]
    MissingOwner,

    /// A newly supplied token failed the format check.
    #[error("Access token must start with 'ghp_'")]
    MalformedToken,

    /// Persisting the credentials failed.
    #[error(transparent)]
    Store(#[from] ConfigError),
}

/// Errors from a sync submission or other gated action.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The current capability tier does not allow the action.
    #[error("{action} is not available at the current capability tier")]
    NotPermitted {
        /// Human-readable action name.
        action: &'static str,
    },

    /// The image list contained no usable lines.
    #[error("No images found in the provided list")]
    EmptyImageList,

    /// The underlying API call failed.
    #[error(transparent)]
    Api(#[from] ApiError),
}
