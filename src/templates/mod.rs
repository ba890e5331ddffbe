//! Built-in page templates using the Tera template engine
//!
//! Templates are embedded in the binary. Autoescaping stays on for every
//! `.html` template; only pre-sanitized article bodies and the JSON-LD block
//! are marked `safe`.

use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

use crate::helpers::html_escape;

pub const ARTICLE: &str = "article.html";
pub const NOT_FOUND: &str = "not_found.html";
pub const UNAVAILABLE: &str = "unavailable.html";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("JSON-LD serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Template renderer with the embedded article pages
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all page templates loaded
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();

        // Tera's default escaper also rewrites '/', which mangles every URL
        tera.set_escape_fn(html_escape);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("pages/layout.html")),
            (ARTICLE, include_str!("pages/article.html")),
            (NOT_FOUND, include_str!("pages/not_found.html")),
            (UNAVAILABLE, include_str!("pages/unavailable.html")),
            (
                "partials/styles.css",
                include_str!("pages/partials/styles.css"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with a serializable view
    pub fn render<T: Serialize>(&self, template_name: &str, view: &T) -> Result<String, RenderError> {
        let context = Context::from_serialize(view)?;
        Ok(self.tera.render(template_name, &context)?)
    }
}
