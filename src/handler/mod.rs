//! Article request pipeline
//!
//! validate slug -> static redirect -> fetch with deadline -> render.
//! Every branch ends in a complete response; nothing propagates to the
//! framework's default error pages.

use axum::http::{header, HeaderName, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

use crate::content::{fetch_with_deadline, ContentSource, ContentType, FetchError, FetchOutcome};
use crate::helpers::encode_path_segment;
use crate::i18n::Lang;
use crate::render::PageRenderer;
use crate::routes::StaticRouteLookup;

pub const X_STATIC_REDIRECT: HeaderName = HeaderName::from_static("x-static-redirect");

pub const CACHE_ARTICLE: &str = "public, max-age=1800, s-maxage=3600, stale-while-revalidate=86400";
pub const CACHE_SHORT: &str = "public, max-age=300";
pub const CACHE_NONE: &str = "no-cache, no-store, must-revalidate";
pub const RETRY_AFTER_SECS: &str = "300";

/// Everything needed to answer an article request
pub struct ArticleHandler {
    renderer: PageRenderer,
    source: Arc<dyn ContentSource>,
    static_routes: Arc<dyn StaticRouteLookup>,
    fetch_timeout: Duration,
}

impl ArticleHandler {
    pub fn new(
        renderer: PageRenderer,
        source: Arc<dyn ContentSource>,
        static_routes: Arc<dyn StaticRouteLookup>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            renderer,
            source,
            static_routes,
            fetch_timeout,
        }
    }

    /// Answer `GET /{content_type}/{slug}?lang=..`
    pub async fn handle(
        &self,
        content_type: ContentType,
        slug: Option<&str>,
        lang: Option<&str>,
    ) -> Response {
        let Some(slug) = slug.filter(|s| !s.is_empty()) else {
            return invalid_slug();
        };
        let lang = Lang::parse_or(lang, self.renderer.default_language());

        if self.static_routes.is_static(content_type, slug) {
            tracing::debug!(slug, %content_type, "Redirecting to static page");
            return static_redirect(content_type, slug);
        }

        let outcome = fetch_with_deadline(
            self.source.as_ref(),
            content_type,
            slug,
            lang,
            self.fetch_timeout,
        )
        .await;

        match outcome {
            Ok(FetchOutcome::Found(post)) => {
                match self.renderer.render_article(content_type, slug, lang, &post) {
                    Ok(html) => article_page(html),
                    Err(e) => {
                        log_failure(content_type, slug, lang, "render", &e);
                        self.unavailable(content_type, slug, lang)
                    }
                }
            }
            Ok(FetchOutcome::NotFound) => {
                tracing::info!(slug, %lang, %content_type, "Article not found upstream");
                match self.renderer.render_not_found(content_type, slug, lang) {
                    Ok(html) => not_found_page(html),
                    Err(e) => {
                        log_failure(content_type, slug, lang, "render", &e);
                        self.unavailable(content_type, slug, lang)
                    }
                }
            }
            Err(e) => {
                log_fetch_error(content_type, slug, lang, &e);
                self.unavailable(content_type, slug, lang)
            }
        }
    }

    fn unavailable(&self, content_type: ContentType, slug: &str, lang: Lang) -> Response {
        unavailable_page(self.renderer.render_unavailable(content_type, slug, lang))
    }
}

fn invalid_slug() -> Response {
    (StatusCode::BAD_REQUEST, "Invalid slug").into_response()
}

fn static_redirect(content_type: ContentType, slug: &str) -> Response {
    let location = content_type.static_path(&encode_path_segment(slug));
    (
        StatusCode::FOUND,
        [
            (header::LOCATION, location),
            (header::CACHE_CONTROL, CACHE_SHORT.to_string()),
            (X_STATIC_REDIRECT, "true".to_string()),
        ],
    )
        .into_response()
}

fn article_page(html: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CACHE_CONTROL, CACHE_ARTICLE),
            (header::VARY, "Accept-Language"),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
            (header::X_FRAME_OPTIONS, "SAMEORIGIN"),
            (header::REFERRER_POLICY, "strict-origin-when-cross-origin"),
        ],
        Html(html),
    )
        .into_response()
}

fn not_found_page(html: String) -> Response {
    (
        StatusCode::NOT_FOUND,
        [
            (header::CACHE_CONTROL, CACHE_SHORT),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        Html(html),
    )
        .into_response()
}

fn unavailable_page(html: String) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        [
            (header::CACHE_CONTROL, CACHE_NONE),
            (header::RETRY_AFTER, RETRY_AFTER_SECS),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        ],
        Html(html),
    )
        .into_response()
}

fn log_fetch_error(content_type: ContentType, slug: &str, lang: Lang, err: &FetchError) {
    log_failure(content_type, slug, lang, err.kind(), err);
}

/// Structured error entry; the only server-side trace of a 503
fn log_failure(
    content_type: ContentType,
    slug: &str,
    lang: Lang,
    kind: &str,
    err: &dyn std::error::Error,
) {
    tracing::error!(
        slug,
        %lang,
        %content_type,
        kind,
        error = %err,
        source = %error_chain(err),
        timestamp = %Utc::now().to_rfc3339(),
        "Error serving article"
    );
}

/// Render the `source()` chain of an error, outermost first
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut chain = Vec::new();
    let mut current = err.source();
    while let Some(source) = current {
        chain.push(source.to_string());
        current = source.source();
    }
    chain.join(": ")
}

#[cfg(test)]
mod tests;
