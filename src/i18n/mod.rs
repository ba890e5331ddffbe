//! Internationalization (i18n) support
//!
//! Translations for every supported language are embedded in the binary.
//! A language directory can override individual keys at startup.

mod language;

pub use language::Lang;

use anyhow::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

type Translations = HashMap<String, serde_yaml::Value>;

const BUILTIN_LANGUAGES: [(Lang, &str); 3] = [
    (Lang::Vn, include_str!("languages/vn.yml")),
    (Lang::En, include_str!("languages/en.yml")),
    (Lang::Zh, include_str!("languages/zh.yml")),
];

/// Internationalization handler
#[derive(Debug, Clone)]
pub struct I18n {
    /// Language used when a key is missing from the requested one
    default_language: Lang,
    /// Language data: lang -> key -> translation
    translations: HashMap<Lang, Translations>,
}

impl I18n {
    /// Create an empty i18n handler
    pub fn new(default_language: Lang) -> Self {
        Self {
            default_language,
            translations: HashMap::new(),
        }
    }

    /// Create a handler with the embedded translations loaded
    pub fn builtin(default_language: Lang) -> Result<Self> {
        let mut i18n = Self::new(default_language);
        for (lang, source) in BUILTIN_LANGUAGES {
            let data: Translations = serde_yaml::from_str(source)?;
            i18n.translations.insert(lang, data);
        }
        Ok(i18n)
    }

    /// Load override files (`vn.yml`, `en.yml`, ...) from a directory
    ///
    /// Top-level sections in a file replace the embedded ones.
    pub fn load_languages<P: AsRef<Path>>(&mut self, dir: P) -> Result<()> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let ext = path.extension().and_then(|e| e.to_str());
            if !path.is_file() || !matches!(ext, Some("yml") | Some("yaml")) {
                continue;
            }

            let Some(lang) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(Lang::from_code)
            else {
                tracing::warn!("Skipping language file for unsupported language: {:?}", path);
                continue;
            };

            let content = fs::read_to_string(&path)?;
            match serde_yaml::from_str::<Translations>(&content) {
                Ok(data) => {
                    self.translations.entry(lang).or_default().extend(data);
                    tracing::debug!("Loaded language file: {:?}", path);
                }
                Err(e) => {
                    tracing::warn!("Failed to parse language file {:?}: {}", path, e);
                }
            }
        }

        Ok(())
    }

    /// Get the default language
    pub fn default_language(&self) -> Lang {
        self.default_language
    }

    /// Get a translation for a specific language
    /// Key can be nested like "news.fallback_title"
    pub fn get(&self, lang: Lang, key: &str) -> String {
        if let Some(value) = self.lookup(lang, key) {
            return value;
        }

        if lang != self.default_language {
            if let Some(value) = self.lookup(self.default_language, key) {
                return value;
            }
        }

        // Return key as fallback
        key.to_string()
    }

    fn lookup(&self, lang: Lang, key: &str) -> Option<String> {
        let data = self.translations.get(&lang)?;
        get_nested_value(data, key).map(yaml_value_to_string)
    }
}

/// Get a nested value from a YAML map using dot notation
fn get_nested_value<'a>(data: &'a Translations, key: &str) -> Option<&'a serde_yaml::Value> {
    let mut parts = key.split('.');
    let mut current = data.get(parts.next()?);

    for part in parts {
        match current {
            Some(serde_yaml::Value::Mapping(map)) => {
                current = map.get(serde_yaml::Value::String(part.to_string()));
            }
            _ => return None,
        }
    }

    current
}

/// Convert a YAML value to a string
fn yaml_value_to_string(value: &serde_yaml::Value) -> String {
    match value {
        serde_yaml::Value::String(s) => s.clone(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Null => String::new(),
        _ => format!("{:?}", value),
    }
}
