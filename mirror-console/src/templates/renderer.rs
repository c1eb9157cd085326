//! Template renderer.

use handlebars::{no_escape, Handlebars};
use serde_json::json;

/// Body template for a sync-request issue. The image list uses a
/// triple-stache so the operator's text lands in the code block byte for
/// byte; the pipeline parses it back out of the fenced block.
const SYNC_ISSUE_TEMPLATE: &str = "\
## Requested images

```
{{{image_list}}}
```

### Parameters
- Force update: {{force_update}}
- Dry run: {{dry_run}}

---
*Created automatically by the mirror console*
";

/// Creates a configured Handlebars registry.
///
/// The registry is configured with:
/// - No HTML escaping (for markdown output)
/// - Strict mode (catches missing variables)
#[must_use]
pub fn create_handlebars_registry() -> Handlebars<'static> {
    let mut hbs = Handlebars::new();

    // Disable HTML escaping for markdown output
    hbs.register_escape_fn(no_escape);

    // Enable strict mode to catch missing variables
    hbs.set_strict_mode(true);

    hbs
}

/// Renderer for the issue bodies the panel creates.
pub struct TemplateRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRenderer {
    /// Creates a new template renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlebars: create_handlebars_registry(),
        }
    }

    /// Renders the sync-request issue body.
    ///
    /// # Arguments
    ///
    /// * `image_list` - The literal image list, embedded unmodified
    /// * `force_update` - Whether existing mirrored tags are re-pushed
    /// * `dry_run` - Whether the pipeline only reports what it would do
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails.
    pub fn render_sync_issue(
        &self,
        image_list: &str,
        force_update: bool,
        dry_run: bool,
    ) -> Result<String, super::TemplateError> {
        let data = json!({
            "image_list": image_list,
            "force_update": force_update,
            "dry_run": dry_run,
        });

        Ok(self.handlebars.render_template(SYNC_ISSUE_TEMPLATE, &data)?)
    }
}
