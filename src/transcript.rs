use std::path::Path;

use serde::Deserialize;

use crate::error::AlignmentError;
use crate::types::{Transcript, TranscriptSegment, WordToken};

/// Word as emitted by assorted transcribers; every field optional.
#[derive(Debug, Deserialize)]
struct RawWord {
    #[serde(default, alias = "word")]
    text: Option<String>,
    #[serde(default, alias = "start_time", alias = "startTime")]
    start: Option<f64>,
    #[serde(default, alias = "end_time", alias = "endTime")]
    end: Option<f64>,
    #[serde(default, alias = "score", alias = "confidence", alias = "prob")]
    probability: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, alias = "start_time", alias = "startTime")]
    start: Option<f64>,
    #[serde(default, alias = "end_time", alias = "endTime")]
    end: Option<f64>,
    #[serde(default)]
    words: Vec<RawWord>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTranscript {
    Words(Vec<RawWord>),
    Document {
        #[serde(default)]
        segments: Vec<RawSegment>,
        #[serde(default, alias = "words")]
        word_segments: Option<Vec<RawWord>>,
    },
}

impl Transcript {
    /// Parses any supported transcript shape into the canonical form.
    pub fn from_json_str(data: &str) -> Result<Self, AlignmentError> {
        let raw: RawTranscript =
            serde_json::from_str(data).map_err(|e| AlignmentError::json("parse transcript", e))?;
        Ok(normalize(raw))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read transcript", e))?;
        Self::from_json_str(&data)
    }
}

fn normalize(raw: RawTranscript) -> Transcript {
    match raw {
        RawTranscript::Words(words) => {
            let words = normalize_words(words);
            Transcript {
                words,
                segments: Vec::new(),
            }
        }
        RawTranscript::Document {
            segments,
            word_segments,
        } => {
            let segments: Vec<TranscriptSegment> =
                segments.into_iter().filter_map(normalize_segment).collect();
            let words = match word_segments {
                Some(words) => normalize_words(words),
                None => {
                    let mut words: Vec<WordToken> =
                        segments.iter().flat_map(|s| s.words.iter().cloned()).collect();
                    sort_by_start(&mut words);
                    words
                }
            };
            Transcript { words, segments }
        }
    }
}

fn normalize_words(raw: Vec<RawWord>) -> Vec<WordToken> {
    let total = raw.len();
    let mut words: Vec<WordToken> = raw.into_iter().filter_map(normalize_word).collect();
    if words.len() < total {
        tracing::warn!(
            dropped = total - words.len(),
            "transcript words without timing were dropped"
        );
    }
    sort_by_start(&mut words);
    words
}

fn normalize_word(raw: RawWord) -> Option<WordToken> {
    let (start, end) = resolve_times(raw.start, raw.end)?;
    let probability = raw
        .probability
        .filter(|p| p.is_finite())
        .unwrap_or(0.0)
        .clamp(0.0, 1.0) as f32;
    Some(WordToken {
        text: raw.text.unwrap_or_default().trim().to_string(),
        start,
        end,
        probability,
    })
}

fn normalize_segment(raw: RawSegment) -> Option<TranscriptSegment> {
    let words = normalize_words(raw.words);

    let (start, end) = match resolve_times(raw.start, raw.end) {
        Some(times) => times,
        None => {
            let first = words.first()?;
            let last_end = words.iter().map(|w| w.end).fold(first.end, f64::max);
            (first.start, last_end)
        }
    };
    let text = match raw.text {
        Some(text) => text.trim().to_string(),
        None => words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" "),
    };
    Some(TranscriptSegment {
        text,
        start,
        end,
        words,
    })
}

/// Fills one missing bound from the other and clamps an inverted pair.
fn resolve_times(start: Option<f64>, end: Option<f64>) -> Option<(f64, f64)> {
    let start = start.filter(|t| t.is_finite());
    let end = end.filter(|t| t.is_finite());
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) => (s, e),
        (Some(s), None) => (s, s),
        (None, Some(e)) => (e, e),
        (None, None) => return None,
    };
    Some((start, end.max(start)))
}

fn sort_by_start(words: &mut [WordToken]) {
    words.sort_by(|a, b| a.start.total_cmp(&b.start));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_word_array_with_aliases() {
        let data = r#"[
            {"word": "hello", "start": 0.5, "end": 0.9, "score": 0.8},
            {"text": "again", "startTime": 0.1, "endTime": 0.3, "confidence": 1.4},
            {"word": "world", "start_time": 1.0, "end_time": 1.2}
        ]"#;
        let transcript = Transcript::from_json_str(data).expect("parse");
        let texts: Vec<&str> = transcript.words.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, ["again", "hello", "world"]);
        assert_eq!(transcript.words[0].probability, 1.0);
        assert_eq!(transcript.words[2].probability, 0.0);
        assert!(transcript.segments.is_empty());
    }

    #[test]
    fn missing_and_inverted_times_are_repaired() {
        let data = r#"[
            {"word": "a", "start": 2.0},
            {"word": "b", "end": 3.0},
            {"word": "c", "start": 5.0, "end": 4.0},
            {"word": "d"}
        ]"#;
        let transcript = Transcript::from_json_str(data).expect("parse");
        assert_eq!(transcript.words.len(), 3);
        assert_eq!((transcript.words[0].start, transcript.words[0].end), (2.0, 2.0));
        assert_eq!((transcript.words[1].start, transcript.words[1].end), (3.0, 3.0));
        assert_eq!((transcript.words[2].start, transcript.words[2].end), (5.0, 5.0));
    }

    #[test]
    fn segments_supply_words_when_no_word_list_is_given() {
        let data = r#"{"segments": [
            {"text": " second ", "start": 3.0, "end": 4.0,
             "words": [{"word": "second", "start": 3.0, "end": 3.8, "prob": 0.7}]},
            {"text": "first", "start": 0.0, "end": 1.0,
             "words": [{"word": "first", "start": 0.0, "end": 0.8, "prob": 0.9}]}
        ]}"#;
        let transcript = Transcript::from_json_str(data).expect("parse");
        assert_eq!(transcript.segments.len(), 2);
        assert_eq!(transcript.segments[0].text, "second");
        assert_eq!(transcript.words[0].text, "first");
        assert_eq!(transcript.words[1].text, "second");
    }

    #[test]
    fn explicit_word_segments_take_precedence() {
        let data = r#"{
            "segments": [{"text": "hi there", "start": 0.0, "end": 1.0}],
            "word_segments": [
                {"word": "hi", "start": 0.0, "end": 0.4, "score": 0.9},
                {"word": "there", "start": 0.5, "end": 1.0, "score": 0.8}
            ]
        }"#;
        let transcript = Transcript::from_json_str(data).expect("parse");
        assert_eq!(transcript.words.len(), 2);
        assert!(transcript.segments[0].words.is_empty());
    }

    #[test]
    fn segment_without_times_borrows_its_words() {
        let data = r#"{"segments": [
            {"words": [
                {"word": "la", "start": 1.0, "end": 1.5},
                {"word": "di", "start": 1.6, "end": 2.0}
            ]},
            {"text": "no timing at all"}
        ]}"#;
        let transcript = Transcript::from_json_str(data).expect("parse");
        assert_eq!(transcript.segments.len(), 1);
        let segment = &transcript.segments[0];
        assert_eq!((segment.start, segment.end), (1.0, 2.0));
        assert_eq!(segment.text, "la di");
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let err = Transcript::from_json_str("{not json").expect_err("must fail");
        assert!(matches!(err, AlignmentError::Json { .. }));
    }
}
