//! Helper functions for page rendering
//!
//! URL building, date display and HTML cleanup shared by the article
//! templates.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use url::*;
