//! Title normalization for catalog search matching.
//!
//! Page titles and catalog titles differ in casing, punctuation, typography
//! and numbering ("Rocky II" vs "Rocky 2"). Both sides go through the same
//! pipeline before the substring comparison.

use unicode_normalization::UnicodeNormalization;

/// Apply the full normalization pipeline.
///
/// Levels applied in order:
/// 1. Unicode NFKC + case folding
/// 2. Character transliteration
/// 3. Roman numeral conversion
/// 4. Punctuation erasure
/// 5. Whitespace collapse
pub fn normalize(s: &str) -> String {
    let s = unicode_normalize(s);
    let s = transliterate(&s);
    let s = convert_roman_numerals(&s);
    let s = erase_punctuation(&s);
    collapse_whitespace(&s)
}

/// Whether two titles name the same thing: after normalization, either
/// contains the other. Empty titles never match.
pub fn titles_match(a: &str, b: &str) -> bool {
    let (a, b) = (normalize(a), normalize(b));
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(&b) || b.contains(&a)
}

// ── Level 1: Unicode NFKC + case folding ──────────────────────────────

/// Apply NFKC normalization (fullwidth → ASCII, compose diacritics) and lowercase.
fn unicode_normalize(s: &str) -> String {
    s.nfkc().collect::<String>().to_lowercase()
}

// ── Level 2: Character transliteration ────────────────────────────────

/// Replace typographic variants pages and catalogs disagree on.
fn transliterate(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str(" and "),
            '\u{00D7}' => result.push('x'),                            // ×
            '\u{2019}' | '\u{2018}' | '\u{02BC}' => result.push('\''), // curly quotes
            '\u{2013}' | '\u{2014}' => result.push('-'),               // en/em dash
            '\u{00E6}' => result.push_str("ae"),                       // æ
            '\u{0153}' => result.push_str("oe"),                       // œ
            '\u{00DF}' => result.push_str("ss"),                       // ß
            '\u{0451}' => result.push('\u{0435}'),                     // ё → е
            c => result.push(c),
        }
    }
    result
}

// ── Level 3: Roman numeral conversion ─────────────────────────────────

/// Sequel numerals, ordered longest-first for greedy matching.
const ROMAN_NUMERALS: &[(&str, u32)] = &[
    ("viii", 8),
    ("vii", 7),
    ("iii", 3),
    ("vi", 6),
    ("iv", 4),
    ("ix", 9),
    ("ii", 2),
    ("v", 5),
    ("x", 10),
];

/// Convert standalone roman numerals to arabic numbers.
///
/// "i" is left alone (it is far more often a word than a numeral), and
/// numerals inside words are untouched: "Hawaii" stays "hawaii".
fn convert_roman_numerals(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let (base, suffix) = split_trailing_punct(word);
            match ROMAN_NUMERALS.iter().find(|(roman, _)| *roman == base) {
                Some((_, value)) => format!("{value}{suffix}"),
                None => word.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split trailing punctuation from a word (e.g., "iii:" → ("iii", ":")).
fn split_trailing_punct(s: &str) -> (&str, &str) {
    let end = s
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_punctuation())
        .last()
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    (&s[..end], &s[end..])
}

// ── Level 4: Punctuation erasure ──────────────────────────────────────

/// Strip punctuation and symbols, keeping alphanumerics (any script) and whitespace.
fn erase_punctuation(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}

// ── Level 5: Whitespace collapse ──────────────────────────────────────

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fullwidth_and_case() {
        assert_eq!(unicode_normalize("ＤＡＲＫ"), "dark");
        assert_eq!(unicode_normalize("Breaking BAD"), "breaking bad");
    }

    #[test]
    fn typographic_variants() {
        assert_eq!(transliterate("grey\u{2019}s"), "grey's");
        assert_eq!(transliterate("law & order"), "law  and  order");
        assert_eq!(transliterate("ёлки"), "елки");
    }

    #[test]
    fn roman_numerals() {
        assert_eq!(convert_roman_numerals("rocky ii"), "rocky 2");
        assert_eq!(convert_roman_numerals("part vii:"), "part 7:");
        assert_eq!(convert_roman_numerals("hawaii five-0"), "hawaii five-0");
        assert_eq!(convert_roman_numerals("i am legend"), "i am legend");
    }

    #[test]
    fn punctuation_erased() {
        assert_eq!(erase_punctuation("spider-man: no way home"), "spiderman no way home");
    }

    #[test]
    fn full_pipeline() {
        assert_eq!(normalize("Grey\u{2019}s Anatomy"), "greys anatomy");
        assert_eq!(normalize("Law & Order: SVU"), "law and order svu");
        assert_eq!(normalize("Rocky II"), "rocky 2");
        assert_eq!(normalize("Во все тяжкие!"), "во все тяжкие");
        assert_eq!(normalize("---"), "");
    }

    #[test]
    fn matching_is_symmetric_substring() {
        assert!(titles_match("The Office", "The Office (US)"));
        assert!(titles_match("The Office (US)", "the office"));
        assert!(titles_match("Rocky 2", "Rocky II"));
        assert!(!titles_match("Dark", "Dune"));
    }

    #[test]
    fn empty_never_matches() {
        assert!(!titles_match("", "Anything"));
        assert!(!titles_match("!!!", "Anything"));
    }
}
