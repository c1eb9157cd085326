//! Sync-issue rendering using Handlebars.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, TemplateRenderer};

/// Returns the fixed title of a sync-request issue.
///
/// The pipeline's issue handler matches on this title together with the
/// `sync` label, so it must stay stable.
#[must_use]
pub fn sync_issue_title() -> &'static str {
    "[Docker Sync] Image synchronization request"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_stable() {
        assert_eq!(sync_issue_title(), "[Docker Sync] Image synchronization request");
    }
}
