//! Parsed image descriptors.

use std::fmt;

/// Advisory finding attached to a parsed image line. Warnings never make a
/// line invalid; they surface entries an operator may want to fix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageWarning {
    /// The line carries no tag; the pipeline will pull `latest`.
    NoTag,

    /// The line explicitly pins the mutable `latest` tag.
    LatestTag,

    /// A platform hint was given that does not target Linux.
    NonLinuxPlatform {
        /// The hint as written.
        hint: String,
    },
}

impl fmt::Display for ImageWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTag => f.write_str("no tag specified, defaulting to 'latest'"),
            Self::LatestTag => {
                f.write_str("tag 'latest' is mutable, pin a version for reproducible mirrors")
            }
            Self::NonLinuxPlatform { hint } => {
                write!(f, "platform hint '{hint}' does not start with 'linux/'")
            }
        }
    }
}

/// One validated line of an operator-supplied image list.
///
/// Descriptors are transient: they exist for the duration of one validation
/// pass and are never persisted. `index` preserves input order, which is the
/// only ordering guarantee; duplicate image names are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    /// The raw input line, verbatim.
    pub original: String,

    /// Image reference with any platform flag stripped.
    pub name: String,

    /// Platform requested via `--platform`, when present.
    pub platform_hint: Option<String>,

    /// Tag, defaulting to `latest` when the line carries none.
    pub tag: String,

    /// Registry host, defaulting to `docker.io`.
    pub registry_host: String,

    /// Whether the reference matches an acceptable shape.
    pub is_valid: bool,

    /// Advisory findings, in detection order.
    pub warnings: Vec<ImageWarning>,

    /// Position among the parsed descriptors.
    pub index: usize,
}

impl ImageDescriptor {
    /// Returns true when the descriptor carries at least one warning.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
