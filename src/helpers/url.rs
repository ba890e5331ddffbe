//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::i18n::Lang;

/// Characters kept as-is in a single path segment (RFC 3986 unreserved)
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Encode a value for use as a query parameter
pub fn encode_url(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

/// Encode a value as one URL path segment
pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Join an origin and a path without doubling slashes
///
/// # Examples
/// ```ignore
/// join_url("https://example.com/", "/news/a") // -> "https://example.com/news/a"
/// ```
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Resolve a possibly relative asset path against an origin
pub fn absolute_url(base: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else if let Some(rest) = path.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        join_url(base, path)
    }
}

/// Public URL of an article in a language
///
/// The default language has no `lang` parameter so that it stays the
/// canonical form.
pub fn localized_url(site_base: &str, path: &str, lang: Lang, default: Lang) -> String {
    let url = join_url(site_base, path);
    if lang == default {
        url
    } else {
        format!("{}?lang={}", url, lang.code())
    }
}

/// A share target for an article
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ShareLink {
    pub network: &'static str,
    pub label: &'static str,
    pub href: String,
}

/// Build Facebook, Twitter and LinkedIn share links
pub fn share_links(url: &str, title: &str) -> Vec<ShareLink> {
    let url = encode_url(url);
    let title = encode_url(title);
    vec![
        ShareLink {
            network: "facebook",
            label: "Facebook",
            href: format!("https://www.facebook.com/sharer/sharer.php?u={}", url),
        },
        ShareLink {
            network: "twitter",
            label: "Twitter",
            href: format!(
                "https://twitter.com/intent/tweet?url={}&text={}",
                url, title
            ),
        },
        ShareLink {
            network: "linkedin",
            label: "LinkedIn",
            href: format!(
                "https://www.linkedin.com/sharing/share-offsite/?url={}",
                url
            ),
        },
    ]
}
