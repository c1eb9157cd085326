//! Template rendering error types.

/// Errors from rendering the sync-issue body.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// The body template failed to render (e.g. a missing variable under
    /// strict mode).
    #[error("Issue body rendering error: {0}")]
    Render(#[from] handlebars::RenderError),
}
