//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// API origin used when neither the config file nor the environment names one
pub const DEFAULT_API_URL: &str = "https://api.example.com";

/// Environment variable that overrides `api_url` at startup
pub const API_URL_ENV: &str = "NEXT_PUBLIC_API_URL";

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,
    pub timezone: String,
    pub publisher_logo: Option<String>,

    // URL
    pub url: String,

    // Upstream
    pub api_url: String,
    pub fetch_timeout_secs: u64,

    // Directory
    pub public_dir: String,
    pub i18n_dir: String,

    // Static pages
    #[serde(default)]
    pub static_routes: StaticRoutesConfig,
    pub discover_static_routes: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Logistics".to_string(),
            description: String::new(),
            language: "vn".to_string(),
            timezone: "Asia/Ho_Chi_Minh".to_string(),
            publisher_logo: None,

            url: "http://localhost:3000".to_string(),

            api_url: DEFAULT_API_URL.to_string(),
            fetch_timeout_secs: 10,

            public_dir: "public".to_string(),
            i18n_dir: "languages".to_string(),

            static_routes: StaticRoutesConfig::default(),
            discover_static_routes: true,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config {:?}", path))?;
        Ok(config)
    }

    /// Apply the API origin override, if one is given
    ///
    /// Called once at startup with the value of `--api-url` or
    /// `NEXT_PUBLIC_API_URL`; the handler never reads the environment.
    pub fn override_api_url(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            tracing::debug!("Using API origin override: {}", url);
            self.api_url = url;
        }
    }

    /// API origin without a trailing slash
    pub fn api_base(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// Public site origin without a trailing slash
    pub fn site_base(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Deadline for the single upstream call
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Timezone used when displaying dates, UTC if the name is unknown
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown timezone {:?}, falling back to UTC", self.timezone);
            Tz::UTC
        })
    }
}

/// Slugs that have a pre-built static page, per content type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticRoutesConfig {
    pub knowledge: Vec<String>,
    pub news: Vec<String>,
}

impl Default for StaticRoutesConfig {
    fn default() -> Self {
        Self {
            knowledge: Vec::new(),
            news: [
                "company-anniversary-celebration",
                "new-bonded-warehouse-opening",
                "sea-freight-service-launch",
                "air-freight-partnership-announcement",
                "customs-clearance-regulation-update",
                "year-end-logistics-outlook",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}
