use crate::types::WordToken;

/// Transcript word with its tokens computed once up front.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedWord {
    pub start: f64,
    pub end: f64,
    pub probability: f32,
    pub tokens: Vec<String>,
}

impl PreparedWord {
    pub fn new(word: &WordToken, tokens: Vec<String>) -> Self {
        Self {
            start: word.start,
            end: word.end,
            probability: word.probability,
            tokens,
        }
    }
}

/// Knobs for one span search.
#[derive(Debug, Clone, Copy)]
pub struct SpanSearch {
    pub slack_below: usize,
    pub slack_above: usize,
    pub similarity_weight: f32,
    pub probability_weight: f32,
}

/// Best span found inside a window. Indices are relative to the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanMatch {
    pub timestamp: f64,
    /// Latest word end inside the span; words may overlap.
    pub end_time: f64,
    pub confidence: f32,
    pub start_index: usize,
    pub end_index: usize,
}

/// Finds the contiguous run of window words that best matches one lyric line.
///
/// Span lengths run from `tokens - slack_below` (at least 1) to
/// `tokens + slack_above`. A window shorter than the shortest allowed span
/// gives no match. Spans are visited by increasing start index, then
/// increasing length, and only a strictly higher score replaces the current
/// best, so ties resolve to the earliest and shortest span.
pub fn best_span(
    line_tokens: &[String],
    window: &[PreparedWord],
    search: &SpanSearch,
    similarity: impl Fn(&[String], &[String]) -> f32,
) -> Option<SpanMatch> {
    if line_tokens.is_empty() || window.is_empty() {
        return None;
    }

    let min_len = line_tokens.len().saturating_sub(search.slack_below).max(1);
    if min_len > window.len() {
        return None;
    }
    let max_len = (line_tokens.len() + search.slack_above).min(window.len());
    let (flat, offsets) = flatten_tokens(window);

    let mut best: Option<SpanMatch> = None;
    for start in 0..window.len() {
        for len in min_len..=max_len {
            let end = start + len;
            if end > window.len() {
                break;
            }
            let heard = &flat[offsets[start]..offsets[end]];
            if heard.is_empty() {
                continue;
            }
            let span = &window[start..end];
            let sim = similarity(line_tokens, heard);
            let avg_prob =
                span.iter().map(|w| w.probability).sum::<f32>() / span.len() as f32;
            let score = (search.similarity_weight * sim + search.probability_weight * avg_prob)
                .clamp(0.0, 1.0);

            if best.is_none_or(|b| score > b.confidence) {
                best = Some(SpanMatch {
                    timestamp: span[0].start,
                    end_time: span.iter().map(|w| w.end).fold(f64::NEG_INFINITY, f64::max),
                    confidence: score,
                    start_index: start,
                    end_index: end - 1,
                });
            }
        }
    }
    best
}

/// All window tokens in one vector plus per-word offsets, so every span's
/// tokens are a contiguous slice.
fn flatten_tokens(window: &[PreparedWord]) -> (Vec<String>, Vec<usize>) {
    let mut flat = Vec::new();
    let mut offsets = Vec::with_capacity(window.len() + 1);
    offsets.push(0);
    for word in window {
        flat.extend(word.tokens.iter().cloned());
        offsets.push(flat.len());
    }
    (flat, offsets)
}
