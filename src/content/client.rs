//! Content API client
//!
//! One request per article view, no retries and no caching. The deadline is
//! applied around the whole call so that dropping the future aborts the
//! in-flight socket.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

use super::post::{ContentType, Post, PostEnvelope};
use crate::helpers::{encode_path_segment, join_url};
use crate::i18n::Lang;

/// Result of a successful round trip to the content API
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Found(Post),
    /// Upstream answered 404
    NotFound,
}

/// Ways a fetch can fail
///
/// All variants end up as the same 503 page; the distinction only shows in
/// the logs.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("Network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("HTTP error! status: {status} {text}")]
    Status { status: u16, text: String },

    #[error("Invalid post data received")]
    InvalidPayload {
        #[source]
        source: Option<serde_json::Error>,
    },
}

impl FetchError {
    /// Stable short name for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout(_) => "timeout",
            FetchError::Network(_) => "network",
            FetchError::Status { .. } => "status",
            FetchError::InvalidPayload { .. } => "invalid_payload",
        }
    }
}

/// Anything that can look up an article by slug
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_post(
        &self,
        content_type: ContentType,
        slug: &str,
        lang: Lang,
    ) -> Result<FetchOutcome, FetchError>;
}

/// Race a fetch against a deadline
///
/// The fetch future is dropped when the deadline passes, which cancels the
/// outbound request.
pub async fn fetch_with_deadline(
    source: &dyn ContentSource,
    content_type: ContentType,
    slug: &str,
    lang: Lang,
    deadline: Duration,
) -> Result<FetchOutcome, FetchError> {
    tokio::time::timeout(deadline, source.fetch_post(content_type, slug, lang))
        .await
        .map_err(|_| FetchError::Timeout(deadline))?
}

/// HTTP client for `{api}/api/{type}/by-slug/{slug}?lang={lang}`
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    api_base: String,
}

impl ApiClient {
    /// Create a client for an API origin
    pub fn new(api_base: &str) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("article-edge/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, api_base))
    }

    /// Use an existing `reqwest::Client`
    pub fn with_client(client: Client, api_base: &str) -> Self {
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// URL of the by-slug endpoint for an article
    pub fn post_url(&self, content_type: ContentType, slug: &str, lang: Lang) -> String {
        let path = format!(
            "api/{}/by-slug/{}?lang={}",
            content_type.segment(),
            encode_path_segment(slug),
            lang.code()
        );
        join_url(&self.api_base, &path)
    }
}

#[async_trait]
impl ContentSource for ApiClient {
    async fn fetch_post(
        &self,
        content_type: ContentType,
        slug: &str,
        lang: Lang,
    ) -> Result<FetchOutcome, FetchError> {
        let url = self.post_url(content_type, slug, lang);
        tracing::debug!("Fetching {}", url);

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Network(Box::new(e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(FetchOutcome::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(Box::new(e)))?;
        let envelope: PostEnvelope = serde_json::from_slice(&body)
            .map_err(|e| FetchError::InvalidPayload { source: Some(e) })?;

        envelope
            .into_valid_post()
            .map(FetchOutcome::Found)
            .ok_or(FetchError::InvalidPayload { source: None })
    }
}
