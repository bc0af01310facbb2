use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// A season/episode pair read from page text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonEpisode {
    pub season: u32,
    pub episode: u32,
}

// ── Regex patterns (compiled once) ──────────────────────────────

/// `S1E2`, `S01 E02`, `S1:E2`, `S1 : 2`.
static RE_SHORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)S(\d+)\s*[E:]\s*E?(\d+)").unwrap());

/// `S1 E2` only, no colon form.
static RE_SHORT_SPACED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)S(\d+)\s*E\s*(\d+)").unwrap());

/// `S1:E2` / `S1 : E2`.
static RE_SHORT_COLON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)S(\d+)\s*:\s*E(\d+)").unwrap());

/// `S1, E2` / `S1 E2` as rendered in subtitle lines.
static RE_SHORT_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)S(\d+)\s*[,\s]\s*E(\d+)").unwrap());

/// `1x02`.
static RE_CROSS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)(\d+)x(\d+)").unwrap());

/// `Season 1, Episode 2`.
static RE_LONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Season\s+(\d+)[,\s]+Episode\s+(\d+)").unwrap());

/// `Сезон 1, 2 серия`.
static RE_LONG_CYRILLIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Сезон\s+(\d+)[,\s]+(\d+)\s+[Сс]ери").unwrap());

/// One step of a season/episode cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    Short,
    ShortSpaced,
    ShortColon,
    ShortComma,
    Cross,
    Long,
    LongCyrillic,
}

impl Pattern {
    fn regex(self) -> &'static Regex {
        match self {
            Self::Short => &RE_SHORT,
            Self::ShortSpaced => &RE_SHORT_SPACED,
            Self::ShortColon => &RE_SHORT_COLON,
            Self::ShortComma => &RE_SHORT_COMMA,
            Self::Cross => &RE_CROSS,
            Self::Long => &RE_LONG,
            Self::LongCyrillic => &RE_LONG_CYRILLIC,
        }
    }

    /// Apply this single pattern to `text`.
    pub fn find(self, text: &str) -> Option<SeasonEpisode> {
        let caps = self.regex().captures(text)?;
        let season = caps.get(1)?.as_str().parse().ok()?;
        let episode = caps.get(2)?.as_str().parse().ok()?;
        Some(SeasonEpisode { season, episode })
    }
}

/// Cascade shared by most streaming sites: short forms, then `NxM`, then
/// the spelled-out form.
pub const DEFAULT_CASCADE: &[Pattern] = &[Pattern::Short, Pattern::Cross, Pattern::Long];

/// Run `cascade` in order and return the first hit.
pub fn parse_with(text: &str, cascade: &[Pattern]) -> Option<SeasonEpisode> {
    if text.is_empty() {
        return None;
    }
    let found = cascade.iter().find_map(|p| p.find(text));
    if let Some(se) = found {
        tracing::trace!(season = se.season, episode = se.episode, "season/episode found");
    }
    found
}

/// [`parse_with`] using [`DEFAULT_CASCADE`].
pub fn parse_default(text: &str) -> Option<SeasonEpisode> {
    parse_with(text, DEFAULT_CASCADE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn se(season: u32, episode: u32) -> Option<SeasonEpisode> {
        Some(SeasonEpisode { season, episode })
    }

    #[test]
    fn test_short_forms() {
        assert_eq!(parse_default("Now playing S2 E5"), se(2, 5));
        assert_eq!(parse_default("s01e03 Pilot"), se(1, 3));
        assert_eq!(parse_default("S3:E10"), se(3, 10));
    }

    #[test]
    fn test_cross_form() {
        assert_eq!(parse_default("Episode guide 4x12"), se(4, 12));
    }

    #[test]
    fn test_long_form() {
        assert_eq!(parse_default("Season 2, Episode 7 - The Return"), se(2, 7));
        assert_eq!(parse_default("season 1 episode 1"), se(1, 1));
    }

    #[test]
    fn test_priority_short_before_long() {
        // Both forms present; the short form wins regardless of position.
        let text = "Season 9, Episode 9 ... up next S1 E2";
        assert_eq!(parse_default(text), se(1, 2));
    }

    #[test]
    fn test_cyrillic_cascade() {
        let cascade = [Pattern::Short, Pattern::Cross, Pattern::LongCyrillic, Pattern::Long];
        assert_eq!(parse_with("Сезон 3, 8 серия", &cascade), se(3, 8));
        assert_eq!(parse_default("Сезон 3, 8 серия"), None);
    }

    #[test]
    fn test_custom_cascade_excludes_colon() {
        assert_eq!(parse_with("S1:E4", &[Pattern::ShortSpaced]), None);
        assert_eq!(parse_with("S1:E4", &[Pattern::ShortColon]), se(1, 4));
    }

    #[test]
    fn test_overflow_falls_through() {
        // Season number too large for u32; the long form still matches.
        let text = "S99999999999E1 Season 1, Episode 2";
        assert_eq!(parse_default(text), se(1, 2));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(parse_default(""), None);
        assert_eq!(parse_default("A movie with no numbers"), None);
    }

    #[test]
    fn test_pattern_names() {
        let p: Pattern = serde_json::from_str(r#""long_cyrillic""#).unwrap();
        assert_eq!(p, Pattern::LongCyrillic);
    }

    #[test]
    fn test_serializes() {
        let json = serde_json::to_string(&SeasonEpisode { season: 1, episode: 2 }).unwrap();
        assert_eq!(json, r#"{"season":1,"episode":2}"#);
    }
}
