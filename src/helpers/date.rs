//! Date helper functions

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::i18n::Lang;

/// Parse a timestamp as sent by the content API
///
/// Accepts RFC 3339, naive `YYYY-MM-DD HH:MM:SS` (taken as UTC) and plain dates.
pub fn parse_api_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz2: TimeZone>(date: &DateTime<Tz2>) -> String
where
    Tz2::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Long human date in the reader's language
///
/// # Examples
/// ```ignore
/// localized_date(&date, Lang::En, tz) // -> "January 15, 2024"
/// localized_date(&date, Lang::Vn, tz) // -> "15 tháng 1, 2024"
/// localized_date(&date, Lang::Zh, tz) // -> "2024年1月15日"
/// ```
pub fn localized_date(date: &DateTime<Utc>, lang: Lang, tz: Tz) -> String {
    let local = date.with_timezone(&tz);
    match lang {
        Lang::Vn => format!("{} tháng {}, {}", local.day(), local.month(), local.year()),
        Lang::En => local.format("%B %-d, %Y").to_string(),
        Lang::Zh => format!("{}年{}月{}日", local.year(), local.month(), local.day()),
    }
}

/// A date prepared for templates: machine value plus display text
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DisplayDate {
    pub iso: String,
    pub text: String,
}

impl DisplayDate {
    /// Build from an API timestamp; unparseable values are shown verbatim
    pub fn from_api(raw: &str, lang: Lang, tz: Tz) -> Option<Self> {
        match parse_api_date(raw) {
            Some(date) => Some(Self {
                iso: date_xml(&date.with_timezone(&tz)),
                text: localized_date(&date, lang, tz),
            }),
            None if raw.trim().is_empty() => None,
            None => Some(Self {
                iso: raw.trim().to_string(),
                text: raw.trim().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_date_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 3, 30, 0).unwrap();
        assert_eq!(parse_api_date("2024-01-15T03:30:00Z"), Some(expected));
        assert_eq!(parse_api_date("2024-01-15T10:30:00+07:00"), Some(expected));
        assert_eq!(parse_api_date("2024-01-15T03:30:00.000000"), Some(expected));
        assert_eq!(parse_api_date("2024-01-15 03:30:00"), Some(expected));
        assert_eq!(
            parse_api_date("2024-01-15"),
            Some(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_api_date("last tuesday"), None);
        assert_eq!(parse_api_date(" "), None);
    }

    #[test]
    fn test_localized_date() {
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 3, 30, 0).unwrap();
        let tz = chrono_tz::Asia::Ho_Chi_Minh;
        assert_eq!(localized_date(&date, Lang::En, tz), "January 15, 2024");
        assert_eq!(localized_date(&date, Lang::Vn, tz), "15 tháng 1, 2024");
        assert_eq!(localized_date(&date, Lang::Zh, tz), "2024年1月15日");
    }

    #[test]
    fn test_localized_date_uses_site_timezone() {
        // 20:00 UTC is already the next day in Ho Chi Minh City
        let date = Utc.with_ymd_and_hms(2024, 1, 15, 20, 0, 0).unwrap();
        assert_eq!(
            localized_date(&date, Lang::En, chrono_tz::Asia::Ho_Chi_Minh),
            "January 16, 2024"
        );
        assert_eq!(localized_date(&date, Lang::En, Tz::UTC), "January 15, 2024");
    }

    #[test]
    fn test_display_date() {
        let tz = chrono_tz::Asia::Ho_Chi_Minh;
        let date = DisplayDate::from_api("2024-01-15T03:30:00Z", Lang::En, tz).unwrap();
        assert_eq!(date.iso, "2024-01-15T10:30:00+07:00");
        assert_eq!(date.text, "January 15, 2024");

        let raw = DisplayDate::from_api("Q1 2024", Lang::En, tz).unwrap();
        assert_eq!(raw.text, "Q1 2024");
        assert!(DisplayDate::from_api("", Lang::En, tz).is_none());
    }
}
