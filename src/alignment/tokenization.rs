use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_TIME_TAGS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\s*\[\d{1,3}:\d{1,2}(?:[.:]\d{1,3})?\])+").expect("valid regex"));

static METADATA_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\[[^\]]*\]|\([^)]*\)|\{[^}]*\})$").expect("valid regex")
});

const MUSIC_SYMBOLS: [char; 4] = ['♪', '♫', '♬', '♩'];

/// Lowercase alphanumeric tokens, punctuation stripped, whitespace collapsed.
///
/// Apostrophes and hyphens inside a word are dropped rather than split on, so
/// "they're" becomes "theyre" and stays comparable with homophone entries.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .filter_map(|word| {
            let token: String = word
                .chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect();
            (!token.is_empty()).then_some(token)
        })
        .collect()
}

/// Splits user lyrics into alignable lines.
///
/// Leading LRC time tags are stripped; lines that are only tags, bracketed
/// section markers such as `[Chorus]`, or punctuation are dropped.
pub fn parse_lyric_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(|raw| {
            let line = LEADING_TIME_TAGS.replace(raw.trim(), "");
            let line = line.trim();
            if line.is_empty() || METADATA_MARKER.is_match(line) {
                return None;
            }
            if tokenize(line).is_empty() {
                return None;
            }
            Some(line.to_string())
        })
        .collect()
}

/// True for transcriber output that carries no lyric content:
/// `[Music]`, `(instrumental)`, bare music symbols, or punctuation.
pub fn is_non_lyrical(text: &str) -> bool {
    let trimmed = text.trim();
    if METADATA_MARKER.is_match(trimmed) {
        return true;
    }
    let without_symbols: String = trimmed
        .chars()
        .filter(|c| !MUSIC_SYMBOLS.contains(c))
        .collect();
    tokenize(&without_symbols).is_empty()
}
