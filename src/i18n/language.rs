//! Supported site languages

use std::fmt;

/// A language the site renders articles in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Lang {
    /// Vietnamese, the site default
    #[default]
    Vn,
    En,
    Zh,
}

impl Lang {
    pub const ALL: [Lang; 3] = [Lang::Vn, Lang::En, Lang::Zh];

    /// Parse a language code, accepting the common aliases
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "vn" | "vi" | "vi-vn" => Some(Lang::Vn),
            "en" | "en-us" | "en-gb" => Some(Lang::En),
            "zh" | "cn" | "zh-cn" | "zh-hans" => Some(Lang::Zh),
            _ => None,
        }
    }

    /// Parse the `lang` query parameter, using `default` when missing or unknown
    pub fn parse_or(code: Option<&str>, default: Lang) -> Self {
        code.and_then(Self::from_code).unwrap_or(default)
    }

    /// Code used in query strings and upstream requests
    pub fn code(self) -> &'static str {
        match self {
            Lang::Vn => "vn",
            Lang::En => "en",
            Lang::Zh => "zh",
        }
    }

    /// Value for the `<html lang>` and `hreflang` attributes
    pub fn html_lang(self) -> &'static str {
        match self {
            Lang::Vn => "vi",
            Lang::En => "en",
            Lang::Zh => "zh-CN",
        }
    }

    /// Open Graph locale
    pub fn og_locale(self) -> &'static str {
        match self {
            Lang::Vn => "vi_VN",
            Lang::En => "en_US",
            Lang::Zh => "zh_CN",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_default() {
        assert_eq!(Lang::parse_or(None, Lang::Vn), Lang::Vn);
        assert_eq!(Lang::parse_or(Some(""), Lang::Vn), Lang::Vn);
        assert_eq!(Lang::parse_or(Some("fr"), Lang::Vn), Lang::Vn);
        assert_eq!(Lang::parse_or(Some("EN"), Lang::Vn), Lang::En);
        assert_eq!(Lang::parse_or(Some("zh-CN"), Lang::Vn), Lang::Zh);
        assert_eq!(Lang::parse_or(Some("vi"), Lang::En), Lang::Vn);
    }

    #[test]
    fn test_locale_codes() {
        assert_eq!(Lang::Vn.code(), "vn");
        assert_eq!(Lang::Vn.html_lang(), "vi");
        assert_eq!(Lang::Zh.og_locale(), "zh_CN");
        assert_eq!(Lang::En.to_string(), "en");
    }
}
