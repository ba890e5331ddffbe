//! article-edge: dynamic renderer for knowledge and news articles
//!
//! Articles with a pre-built static page are redirected to it; everything
//! else is fetched from the content API and rendered to a complete HTML
//! document with SEO metadata, degrading to 404 and 503 pages.

pub mod commands;
pub mod config;
pub mod content;
pub mod handler;
pub mod helpers;
pub mod i18n;
pub mod render;
pub mod routes;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

/// The main application: configuration plus resolved directories
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Pre-built static site
    pub public_dir: std::path::PathBuf,
    /// Translation overrides
    pub i18n_dir: std::path::PathBuf,
}

impl Site {
    /// Create a new Site from a directory, reading `_config.yml` if present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a Site with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);
        let i18n_dir = base_dir.join(&config.i18n_dir);

        Self {
            config,
            base_dir,
            public_dir,
            i18n_dir,
        }
    }

    /// Default language from the config, Vietnamese if unrecognized
    pub fn default_language(&self) -> i18n::Lang {
        i18n::Lang::parse_or(Some(&self.config.language), i18n::Lang::default())
    }

    /// Translations: embedded defaults plus overrides from `i18n_dir`
    pub fn i18n(&self) -> Result<i18n::I18n> {
        let mut i18n = i18n::I18n::builtin(self.default_language())?;
        i18n.load_languages(&self.i18n_dir)?;
        Ok(i18n)
    }

    /// The static-route allow-list from config and the public directory
    pub fn static_routes(&self) -> Result<routes::StaticRoutes> {
        let mut routes = routes::StaticRoutes::from_config(&self.config.static_routes);
        if self.config.discover_static_routes {
            let added = routes.discover(&self.public_dir)?;
            tracing::debug!("Discovered {} static pages in {:?}", added, self.public_dir);
        }
        Ok(routes)
    }

    /// Wire the article handler against the real content API
    pub fn article_handler(&self) -> Result<handler::ArticleHandler> {
        let renderer = render::PageRenderer::new(&self.config, self.i18n()?)?;
        let client = content::ApiClient::new(self.config.api_base())?;
        let routes = self.static_routes()?;
        tracing::info!(
            "Loaded {} static routes, content API at {}",
            routes.len(),
            self.config.api_base()
        );

        Ok(handler::ArticleHandler::new(
            renderer,
            Arc::new(client),
            Arc::new(routes),
            self.config.fetch_timeout(),
        ))
    }
}
