//! Post model and content types

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// An article as returned by the content API
///
/// Every field is optional upstream; rendering substitutes localized
/// fallbacks for the missing ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Article title
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,

    /// Short summary shown as the lead paragraph
    #[serde(default, deserialize_with = "lenient_string")]
    pub excerpt: Option<String>,

    /// Category name (plain string or `{ "name": ... }`)
    #[serde(default, deserialize_with = "lenient_string")]
    pub category: Option<String>,

    /// Cover image, absolute or relative to the API origin
    #[serde(default, deserialize_with = "lenient_string")]
    pub featured_image: Option<String>,

    /// Creation timestamp
    #[serde(default, deserialize_with = "lenient_string")]
    pub created_at: Option<String>,

    /// Last update timestamp
    #[serde(default, deserialize_with = "lenient_string")]
    pub updated_at: Option<String>,

    /// Plain-text body
    #[serde(default, deserialize_with = "lenient_string")]
    pub content: Option<String>,

    /// Rich HTML body, preferred over `content` when present
    #[serde(default, deserialize_with = "lenient_string")]
    pub content_html: Option<String>,

    /// Author name (news only)
    #[serde(default, deserialize_with = "lenient_string")]
    pub author: Option<String>,
}

impl Post {
    /// Title if it is present and not blank
    pub fn title(&self) -> Option<&str> {
        non_blank(&self.title)
    }

    pub fn excerpt(&self) -> Option<&str> {
        non_blank(&self.excerpt)
    }

    pub fn category(&self) -> Option<&str> {
        non_blank(&self.category)
    }

    pub fn featured_image(&self) -> Option<&str> {
        non_blank(&self.featured_image)
    }

    pub fn author(&self) -> Option<&str> {
        non_blank(&self.author)
    }

    pub fn content_html(&self) -> Option<&str> {
        non_blank(&self.content_html)
    }

    pub fn content(&self) -> Option<&str> {
        non_blank(&self.content)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Top-level shape of a by-slug response: `{ "data": { ... } }`
#[derive(Debug, Deserialize)]
pub struct PostEnvelope {
    #[serde(default)]
    pub data: Option<Post>,
}

impl PostEnvelope {
    /// The post, if the payload carries one with a usable title
    pub fn into_valid_post(self) -> Option<Post> {
        self.data.filter(|post| post.title().is_some())
    }
}

/// Accept strings, numbers and `{ "name": ... }` objects; anything else is absent
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(serde_json::Value::Object(map)) => map
            .get("name")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        _ => None,
    })
}

/// The two kinds of article the site renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Knowledge,
    News,
}

impl ContentType {
    pub const ALL: [ContentType; 2] = [ContentType::Knowledge, ContentType::News];

    /// Path segment used both on the site and in the upstream API
    pub fn segment(self) -> &'static str {
        match self {
            ContentType::Knowledge => "knowledge",
            ContentType::News => "news",
        }
    }

    /// schema.org type for the JSON-LD block
    pub fn schema_type(self) -> &'static str {
        match self {
            ContentType::Knowledge => "Article",
            ContentType::News => "NewsArticle",
        }
    }

    /// Whether the byline is shown
    pub fn shows_author(self) -> bool {
        matches!(self, ContentType::News)
    }

    /// Site path of an article, without a trailing slash
    pub fn article_path(self, slug: &str) -> String {
        format!("/{}/{}", self.segment(), slug)
    }

    /// Path of the pre-built static page for an article
    pub fn static_path(self, slug: &str) -> String {
        format!("/{}/{}/", self.segment(), slug)
    }

    /// Path of the listing page
    pub fn listing_path(self) -> String {
        format!("/{}", self.segment())
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "knowledge" => Ok(ContentType::Knowledge),
            "news" => Ok(ContentType::News),
            other => Err(format!(
                "Unknown content type: {}. Available: knowledge, news",
                other
            )),
        }
    }
}
