//! Title cleanup helpers shared by the site extractors.

use regex::Regex;
use std::sync::LazyLock;

/// Characters that end the meaningful part of a page title.
const SEPARATORS: &[char] = &['-', '|', '\u{2013}', '\u{2014}'];

/// Titles that pages show while the player is still loading.
static JUNK_TITLES: phf::Set<&'static str> = phf::phf_set! {
    "loading",
    "loading...",
    "please wait",
    "untitled",
    "video player",
    "player",
    "watch",
    "home",
    "browse",
    "detected",
};

static RE_LEADING_VERB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:watch|stream|online|free)\s+").unwrap());

static RE_TRAILING_JUNK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[-|\u{2013}]\s*.*$").unwrap());

static RE_INLINE_SEASON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bseason\s*\d+\b").unwrap());

static RE_INLINE_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bepisode\s*\d+\b").unwrap());

static RE_INLINE_SXXEXX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bs\d+e\d+\b").unwrap());

static RE_RELEASE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*\(((?:19|20)\d{2})\)\s*$").unwrap());

static RE_FIRST_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:#\s*)?(.+?)(?:\s*\n|$)").unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Keep everything before the first separator (`-`, `|`, en dash, em dash).
pub fn cut_at_separator(title: &str) -> &str {
    title.split(SEPARATORS).next().unwrap_or_default().trim()
}

/// Remove every match of `brand` and trim the result.
pub fn strip_brand(title: &str, brand: &Regex) -> String {
    brand.replace_all(title, "").trim().to_string()
}

/// General cleanup applied to raw page titles before any site logic.
///
/// Drops a leading "watch"/"stream" verb, everything after the first
/// separator, and inline season/episode markers.
pub fn clean_page_title(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let s = RE_LEADING_VERB.replace(raw, "");
    let s = RE_TRAILING_JUNK.replace(&s, "");
    let s = RE_INLINE_SEASON.replace_all(&s, "");
    let s = RE_INLINE_EPISODE.replace_all(&s, "");
    let s = RE_INLINE_SXXEXX.replace_all(&s, "");
    collapse_whitespace(&s)
}

/// Split a trailing `(YYYY)` off a title.
pub fn split_release_year(title: &str) -> (String, Option<String>) {
    match RE_RELEASE_YEAR.captures(title) {
        Some(caps) => (caps[1].trim().to_string(), Some(caps[2].to_string())),
        None => (title.trim().to_string(), None),
    }
}

/// First non-empty line of visible page text, minus a markdown-style `#`.
pub fn first_line(body: &str) -> Option<String> {
    let caps = RE_FIRST_LINE.captures(body.trim_start())?;
    let line = caps.get(1)?.as_str().trim();
    (!line.is_empty()).then(|| line.to_string())
}

/// Whether `title` carries no usable signal: too short or a known
/// loading/placeholder string.
pub fn is_junk_title(title: &str) -> bool {
    let trimmed = title.trim();
    if trimmed.chars().count() <= 2 {
        return true;
    }
    JUNK_TITLES.contains(trimmed.to_lowercase().as_str())
}

/// Collapse runs of whitespace into single spaces and trim.
pub fn collapse_whitespace(s: &str) -> String {
    RE_WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut_at_separator() {
        assert_eq!(cut_at_separator("Dark | Netflix"), "Dark");
        assert_eq!(cut_at_separator("Severance \u{2013} Apple TV+"), "Severance");
        assert_eq!(cut_at_separator("Plain"), "Plain");
        assert_eq!(cut_at_separator(""), "");
    }

    #[test]
    fn test_strip_brand() {
        let brand = Regex::new(r"(?i)\s*[-|]\s*Peacock$").unwrap();
        assert_eq!(strip_brand("The Office | Peacock", &brand), "The Office");
    }

    #[test]
    fn test_clean_page_title() {
        assert_eq!(clean_page_title("Watch Breaking Bad - Stream Online"), "Breaking Bad");
        assert_eq!(clean_page_title("Fargo Season 2 Episode 3"), "Fargo");
        assert_eq!(clean_page_title("Fargo S02E03"), "Fargo");
        assert_eq!(clean_page_title(""), "");
    }

    #[test]
    fn test_split_release_year() {
        assert_eq!(
            split_release_year("Dune (2021)"),
            ("Dune".to_string(), Some("2021".to_string()))
        );
        assert_eq!(split_release_year("Blade Runner 2049"), ("Blade Runner 2049".to_string(), None));
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("# The Bear\nSeason 1"), Some("The Bear".to_string()));
        assert_eq!(first_line("\n\n  Shogun  \nmore"), Some("Shogun".to_string()));
        assert_eq!(first_line(""), None);
    }

    #[test]
    fn test_junk_titles() {
        assert!(is_junk_title("A"));
        assert!(is_junk_title("  "));
        assert!(is_junk_title("Loading..."));
        assert!(!is_junk_title("Dark"));
    }
}
