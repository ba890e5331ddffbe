//! Static-route allow-list
//!
//! Articles that were pre-rendered at build time are redirected to their
//! static page instead of being fetched. The set comes from the site config
//! and, optionally, from scanning the public directory for
//! `{type}/{slug}/index.html`.

use anyhow::Result;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use walkdir::WalkDir;

use crate::config::StaticRoutesConfig;
use crate::content::ContentType;

/// Decides whether an article has a pre-built static page
pub trait StaticRouteLookup: Send + Sync {
    fn is_static(&self, content_type: ContentType, slug: &str) -> bool;
}

/// Known static slugs per content type
#[derive(Debug, Clone, Default)]
pub struct StaticRoutes {
    routes: HashMap<ContentType, BTreeSet<String>>,
}

impl StaticRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the lists in `_config.yml`
    pub fn from_config(config: &StaticRoutesConfig) -> Self {
        let mut routes = Self::new();
        for slug in &config.knowledge {
            routes.insert(ContentType::Knowledge, slug);
        }
        for slug in &config.news {
            routes.insert(ContentType::News, slug);
        }
        routes
    }

    /// Add a slug; blank slugs are ignored
    pub fn insert(&mut self, content_type: ContentType, slug: &str) -> bool {
        let slug = slug.trim().trim_matches('/');
        if slug.is_empty() {
            return false;
        }
        self.routes
            .entry(content_type)
            .or_default()
            .insert(slug.to_string())
    }

    /// Add every `{type}/{slug}/index.html` found under a public directory
    ///
    /// Returns the number of slugs that were not already known.
    pub fn discover<P: AsRef<Path>>(&mut self, public_dir: P) -> Result<usize> {
        let public_dir = public_dir.as_ref();
        let mut added = 0;

        for content_type in ContentType::ALL {
            let type_dir = public_dir.join(content_type.segment());
            if !type_dir.is_dir() {
                continue;
            }

            for entry in WalkDir::new(&type_dir).min_depth(2).max_depth(2) {
                let entry = entry?;
                if !entry.file_type().is_file() || entry.file_name() != "index.html" {
                    continue;
                }
                let slug = entry
                    .path()
                    .parent()
                    .and_then(|dir| dir.file_name())
                    .and_then(|name| name.to_str());
                if let Some(slug) = slug {
                    if self.insert(content_type, slug) {
                        tracing::debug!("Discovered static page /{}/{}/", content_type, slug);
                        added += 1;
                    }
                }
            }
        }

        Ok(added)
    }

    /// Slugs for one content type, sorted
    pub fn slugs(&self, content_type: ContentType) -> impl Iterator<Item = &str> {
        self.routes
            .get(&content_type)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StaticRouteLookup for StaticRoutes {
    fn is_static(&self, content_type: ContentType, slug: &str) -> bool {
        self.routes
            .get(&content_type)
            .is_some_and(|set| set.contains(slug))
    }
}
