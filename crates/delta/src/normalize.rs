use std::sync::LazyLock;

use regex::Regex;

static ISO_TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{4}-\d{2}-\d{2}(?:T\d{2}:\d{2}:\d{2}(?:\.\d+)?Z?)?\b").unwrap()
});

const MONTHS: &str = "Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|Jun(?:e)?|Jul(?:y)?|Aug(?:ust)?|Sep(?:t|tember)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?";

static MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:{MONTHS})\.?\s+\d{{1,2}}(?:st|nd|rd|th)?(?:,?\s+\d{{4}})?\b"
    ))
    .unwrap()
});

static WEEKDAY_MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:Mon(?:day)?|Tue(?:s(?:day)?)?|Wed(?:nesday)?|Thu(?:r(?:s(?:day)?)?)?|Fri(?:day)?|Sat(?:urday)?|Sun(?:day)?)\.?,?\s+(?:{MONTHS})\.?\s+\d{{1,2}}(?:st|nd|rd|th)?(?:,?\s+\d{{4}})?\b"
    ))
    .unwrap()
});

static ANALYTICS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bUA-\d+-\d+\b|\bG-[A-Z0-9]{6,}\b|\bgtm-[A-Za-z0-9]+\b").unwrap()
});

static SESSION_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Fa-f0-9]{32,}\b").unwrap());

static COPYRIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)copyright\s*©?\s*\d{4}[^\n.]*\.?").unwrap());

static ALL_RIGHTS_RESERVED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)all rights reserved\.?").unwrap());

static TRACKING_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[?&](?:fbclid|gclid|gad_source|utm_[a-z]+)=[^&\s]*").unwrap()
});

static STANDALONE_YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:19|20)\d{2}\b").unwrap());

static LOADING_PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Loading[\w\s]*\.\.\.").unwrap());

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Strips volatile, non-semantic content before hashing (spec §4.6):
/// timestamps, dated phrases, analytics/session tokens, copyright
/// footers, URL tracking params, bare years, and loading placeholders.
/// Without this, timestamp-driven noise would make every venue "changed"
/// on every run.
pub fn normalize(text: &str) -> String {
    let mut s = text.to_string();
    s = WEEKDAY_MONTH_DAY_RE.replace_all(&s, "").into_owned();
    s = MONTH_DAY_RE.replace_all(&s, "").into_owned();
    s = ISO_TIMESTAMP_RE.replace_all(&s, "").into_owned();
    s = ANALYTICS_RE.replace_all(&s, "").into_owned();
    s = SESSION_TOKEN_RE.replace_all(&s, "").into_owned();
    s = COPYRIGHT_RE.replace_all(&s, "").into_owned();
    s = ALL_RIGHTS_RESERVED_RE.replace_all(&s, "").into_owned();
    s = TRACKING_PARAM_RE.replace_all(&s, "").into_owned();
    s = STANDALONE_YEAR_RE.replace_all(&s, "").into_owned();
    s = LOADING_PLACEHOLDER_RE.replace_all(&s, "").into_owned();
    WHITESPACE_RE.replace_all(s.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_iso_timestamps() {
        let s = normalize("Updated at 2026-07-31T14:22:00Z daily specials");
        assert!(!s.contains("2026-07-31"));
        assert!(s.contains("daily specials"));
    }

    #[test]
    fn strips_month_day_phrases() {
        let s = normalize("Join us Jan 28th, 2026 for trivia");
        assert!(!s.contains("Jan"));
        assert!(!s.contains("2026"));
        assert!(s.contains("Join us"));
        assert!(s.contains("trivia"));
    }

    #[test]
    fn strips_weekday_month_day_combos() {
        let s = normalize("See you Friday, January 30 at the bar");
        assert!(!s.contains("Friday"));
        assert!(!s.contains("January"));
    }

    #[test]
    fn strips_analytics_and_session_tokens() {
        let s = normalize("tracked by UA-12345-2 and G-ABC123XYZ and gtm-PZQRT9 session a1b2c3d4e5f60718293a4b5c6d7e8f90");
        assert!(!s.contains("UA-"));
        assert!(!s.contains("G-ABC"));
        assert!(!s.contains("gtm-"));
        assert!(!s.contains("a1b2c3d4"));
    }

    #[test]
    fn strips_copyright_footer() {
        let s = normalize("Happy hour daily. Copyright © 2026 The Tavern. All rights reserved.");
        assert!(!s.to_lowercase().contains("copyright"));
        assert!(!s.to_lowercase().contains("all rights reserved"));
        assert!(s.contains("Happy hour daily"));
    }

    #[test]
    fn strips_tracking_params_from_urls() {
        let s = normalize("Visit https://example.com/menu?utm_source=fb&fbclid=abc123 today");
        assert!(!s.contains("utm_source"));
        assert!(!s.contains("fbclid"));
    }

    #[test]
    fn strips_standalone_years() {
        let s = normalize("Established 2015, serving since then");
        assert!(!s.contains("2015"));
    }

    #[test]
    fn strips_loading_placeholders() {
        let s = normalize("Menu: Loading product options... Burger $12");
        assert!(!s.to_lowercase().contains("loading"));
        assert!(s.contains("Burger"));
    }

    #[test]
    fn collapses_whitespace() {
        let s = normalize("too    many     spaces\n\nhere");
        assert!(!s.contains("  "));
    }

    #[test]
    fn identical_after_normalization_despite_date_drift() {
        let a = normalize("Happy hour today, 2026-07-30T10:00:00Z. Copyright © 2026.");
        let b = normalize("Happy hour today, 2026-07-31T11:05:00Z. Copyright © 2026.");
        assert_eq!(a, b);
    }
}
