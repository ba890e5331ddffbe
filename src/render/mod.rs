//! Page rendering: turns a fetched post, or the lack of one, into HTML
//!
//! Views are plain serializable structs handed to the embedded templates.

use chrono::Utc;
use chrono_tz::Tz;
use serde::Serialize;
use serde_json::json;

use crate::config::SiteConfig;
use crate::content::{ContentType, Post};
use crate::helpers::{
    absolute_url, date_xml, encode_path_segment, localized_url, paragraphs, script_safe_json,
    share_links, squash_whitespace, strip_html, truncate, DisplayDate, HtmlSanitizer, ShareLink,
};
use crate::i18n::{I18n, Lang};
use crate::templates::{self, RenderError, TemplateRenderer};

/// Meta description length in characters
const DESCRIPTION_LENGTH: usize = 160;

/// Served when even the 503 template cannot be rendered
pub const FALLBACK_UNAVAILABLE_HTML: &str = "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>503 Service Unavailable</title></head><body><h1>Service Unavailable</h1><p>Please try again later.</p></body></html>";

#[derive(Debug, Serialize)]
struct Alternate {
    hreflang: &'static str,
    href: String,
}

#[derive(Debug, Serialize)]
struct Labels {
    home: String,
    section: String,
    back: String,
    published: String,
    updated: String,
    author: String,
    share: String,
    no_content: String,
    retry: String,
}

#[derive(Debug, Serialize)]
struct ArticleView {
    html_lang: &'static str,
    og_locale: &'static str,
    site_name: String,
    home_url: String,
    listing_url: String,
    content_type: ContentType,
    page_title: String,
    title: String,
    description: String,
    category: String,
    canonical_url: String,
    alternates: Vec<Alternate>,
    image: Option<String>,
    twitter_card: &'static str,
    published: Option<DisplayDate>,
    updated: Option<DisplayDate>,
    author: Option<String>,
    excerpt: Option<String>,
    content_html: Option<String>,
    paragraphs: Vec<String>,
    share_links: Vec<ShareLink>,
    json_ld: String,
    labels: Labels,
}

#[derive(Debug, Serialize)]
struct StatusView {
    html_lang: &'static str,
    site_name: String,
    home_url: String,
    listing_url: String,
    retry_url: String,
    heading: String,
    message: String,
    labels: Labels,
}

/// Renders the three article outcomes
pub struct PageRenderer {
    templates: TemplateRenderer,
    i18n: I18n,
    sanitizer: HtmlSanitizer,
    site_name: String,
    site_description: String,
    site_base: String,
    api_base: String,
    publisher_logo: Option<String>,
    tz: Tz,
}

impl PageRenderer {
    pub fn new(config: &SiteConfig, i18n: I18n) -> Result<Self, RenderError> {
        Ok(Self {
            templates: TemplateRenderer::new()?,
            i18n,
            sanitizer: HtmlSanitizer::new(),
            site_name: config.title.clone(),
            site_description: config.description.trim().to_string(),
            site_base: config.site_base().to_string(),
            api_base: config.api_base().to_string(),
            publisher_logo: config.publisher_logo.clone(),
            tz: config.tz(),
        })
    }

    pub fn default_language(&self) -> Lang {
        self.i18n.default_language()
    }

    fn t(&self, lang: Lang, key: &str) -> String {
        self.i18n.get(lang, key)
    }

    fn labels(&self, content_type: ContentType, lang: Lang) -> Labels {
        let section = content_type.segment();
        Labels {
            home: self.t(lang, "site.home"),
            section: self.t(lang, &format!("{}.label", section)),
            back: self.t(lang, &format!("{}.back", section)),
            published: self.t(lang, "article.published"),
            updated: self.t(lang, "article.updated"),
            author: self.t(lang, "article.author"),
            share: self.t(lang, "article.share"),
            no_content: self.t(lang, "article.no_content"),
            retry: self.t(lang, "unavailable.retry"),
        }
    }

    fn url(&self, path: &str, lang: Lang) -> String {
        localized_url(&self.site_base, path, lang, self.default_language())
    }

    /// Site path of an article; the slug arrives decoded from the router
    fn article_path(content_type: ContentType, slug: &str) -> String {
        content_type.article_path(&encode_path_segment(slug))
    }

    /// Full article page
    pub fn render_article(
        &self,
        content_type: ContentType,
        slug: &str,
        lang: Lang,
        post: &Post,
    ) -> Result<String, RenderError> {
        let section = content_type.segment();
        let title = post
            .title()
            .map(str::to_string)
            .unwrap_or_else(|| self.t(lang, &format!("{}.fallback_title", section)));
        let category = post
            .category()
            .map(str::to_string)
            .unwrap_or_else(|| self.t(lang, &format!("{}.fallback_category", section)));

        let content_html = post.content_html().map(|html| self.sanitizer.clean(html));
        let paragraphs = match (&content_html, post.content()) {
            (None, Some(text)) => paragraphs(text),
            _ => Vec::new(),
        };
        let description = self.description(post, &title);

        let article_path = Self::article_path(content_type, slug);
        let canonical_url = self.url(&article_path, lang);
        let alternates = Lang::ALL
            .iter()
            .map(|&l| Alternate {
                hreflang: l.html_lang(),
                href: self.url(&article_path, l),
            })
            .chain(std::iter::once(Alternate {
                hreflang: "x-default",
                href: self.url(&article_path, self.default_language()),
            }))
            .collect();

        let image = post
            .featured_image()
            .map(|path| absolute_url(&self.api_base, path));
        let published = post
            .created_at
            .as_deref()
            .and_then(|raw| DisplayDate::from_api(raw, lang, self.tz));
        let updated = post
            .updated_at
            .as_deref()
            .and_then(|raw| DisplayDate::from_api(raw, lang, self.tz));
        let author = if content_type.shows_author() {
            post.author().map(str::to_string)
        } else {
            None
        };

        let json_ld = self.json_ld(
            content_type,
            lang,
            &JsonLdFields {
                title: &title,
                description: &description,
                category: &category,
                canonical_url: &canonical_url,
                image: image.as_deref(),
                published: published.as_ref(),
                updated: updated.as_ref(),
                author: author.as_deref(),
            },
        )?;

        let view = ArticleView {
            html_lang: lang.html_lang(),
            og_locale: lang.og_locale(),
            site_name: self.site_name.clone(),
            home_url: self.url("/", lang),
            listing_url: self.url(&content_type.listing_path(), lang),
            content_type,
            page_title: format!("{} | {}", title, self.site_name),
            share_links: share_links(&canonical_url, &title),
            twitter_card: if image.is_some() {
                "summary_large_image"
            } else {
                "summary"
            },
            excerpt: post.excerpt().map(str::to_string),
            labels: self.labels(content_type, lang),
            title,
            description,
            category,
            canonical_url,
            alternates,
            image,
            published,
            updated,
            author,
            content_html,
            paragraphs,
            json_ld,
        };

        self.templates.render(templates::ARTICLE, &view)
    }

    /// Excerpt, else the start of the body, else the site description, else the title
    fn description(&self, post: &Post, title: &str) -> String {
        let source = post
            .excerpt()
            .map(str::to_string)
            .or_else(|| post.content_html().map(strip_html))
            .or_else(|| post.content().map(str::to_string))
            .map(|text| squash_whitespace(&text))
            .filter(|text| !text.is_empty())
            .or_else(|| (!self.site_description.is_empty()).then(|| self.site_description.clone()))
            .unwrap_or_else(|| title.to_string());
        truncate(&source, DESCRIPTION_LENGTH, Some("..."))
    }

    fn json_ld(
        &self,
        content_type: ContentType,
        lang: Lang,
        fields: &JsonLdFields<'_>,
    ) -> Result<String, RenderError> {
        let published = fields
            .published
            .map(|d| d.iso.clone())
            .unwrap_or_else(|| date_xml(&Utc::now().with_timezone(&self.tz)));
        let modified = fields
            .updated
            .map(|d| d.iso.clone())
            .unwrap_or_else(|| published.clone());

        let author = match fields.author {
            Some(name) => json!({ "@type": "Person", "name": name }),
            None => json!({
                "@type": "Organization",
                "name": self.t(lang, "site.editorial_team"),
            }),
        };

        let mut publisher = json!({ "@type": "Organization", "name": self.site_name });
        if let Some(logo) = &self.publisher_logo {
            publisher["logo"] = json!({
                "@type": "ImageObject",
                "url": absolute_url(&self.site_base, logo),
            });
        }

        let mut data = json!({
            "@context": "https://schema.org",
            "@type": content_type.schema_type(),
            "headline": fields.title,
            "description": fields.description,
            "articleSection": fields.category,
            "inLanguage": lang.html_lang(),
            "datePublished": published,
            "dateModified": modified,
            "author": author,
            "publisher": publisher,
            "mainEntityOfPage": { "@type": "WebPage", "@id": fields.canonical_url },
        });
        if let Some(image) = fields.image {
            data["image"] = json!([image]);
        }

        Ok(script_safe_json(&serde_json::to_string(&data)?))
    }

    /// Page for an article the API does not know
    pub fn render_not_found(
        &self,
        content_type: ContentType,
        slug: &str,
        lang: Lang,
    ) -> Result<String, RenderError> {
        let view = self.status_view(content_type, slug, lang, "not_found");
        self.templates.render(templates::NOT_FOUND, &view)
    }

    /// Page for any upstream failure; never fails
    pub fn render_unavailable(&self, content_type: ContentType, slug: &str, lang: Lang) -> String {
        let view = self.status_view(content_type, slug, lang, "unavailable");
        self.templates
            .render(templates::UNAVAILABLE, &view)
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to render 503 page");
                FALLBACK_UNAVAILABLE_HTML.to_string()
            })
    }

    fn status_view(&self, content_type: ContentType, slug: &str, lang: Lang, key: &str) -> StatusView {
        StatusView {
            html_lang: lang.html_lang(),
            site_name: self.site_name.clone(),
            home_url: self.url("/", lang),
            listing_url: self.url(&content_type.listing_path(), lang),
            retry_url: self.url(&Self::article_path(content_type, slug), lang),
            heading: self.t(lang, &format!("{}.title", key)),
            message: self.t(lang, &format!("{}.message", key)),
            labels: self.labels(content_type, lang),
        }
    }
}

struct JsonLdFields<'a> {
    title: &'a str,
    description: &'a str,
    category: &'a str,
    canonical_url: &'a str,
    image: Option<&'a str>,
    published: Option<&'a DisplayDate>,
    updated: Option<&'a DisplayDate>,
    author: Option<&'a str>,
}
