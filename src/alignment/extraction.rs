use crate::alignment::tokenization::is_non_lyrical;
use crate::config::AlignerConfig;
use crate::error::AlignmentError;
use crate::types::{AlignedLyricLine, TranscriptSegment};

/// Lines derived straight from transcript segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedLines {
    pub lines: Vec<AlignedLyricLine>,
    pub successful: usize,
    pub warnings: Vec<String>,
}

/// Segments merged into one output phrase before length splitting.
#[derive(Debug, Clone)]
struct PhraseGroup {
    text: String,
    start: f64,
    end: f64,
    probabilities: Vec<f32>,
}

impl PhraseGroup {
    fn from_segment(segment: &TranscriptSegment) -> Self {
        Self {
            text: segment.text.trim().to_string(),
            start: segment.start,
            end: segment.end.max(segment.start),
            probabilities: segment.words.iter().map(|w| w.probability).collect(),
        }
    }

    fn can_absorb(&self, next: &PhraseGroup, config: &AlignerConfig) -> bool {
        let gap = next.start - self.end;
        let combined = self.text.chars().count() + 1 + next.text.chars().count();
        gap < config.extraction_merge_gap_secs
            && combined < config.extraction_max_line_chars
            && !ends_sentence(&self.text)
    }

    fn absorb(&mut self, next: PhraseGroup) {
        self.text.push(' ');
        self.text.push_str(&next.text);
        self.end = self.end.max(next.end);
        self.probabilities.extend(next.probabilities);
    }

    fn mean_probability(&self) -> Option<f32> {
        if self.probabilities.is_empty() {
            return None;
        }
        let sum: f32 = self.probabilities.iter().sum();
        Some((sum / self.probabilities.len() as f32).clamp(0.0, 1.0))
    }
}

fn ends_sentence(text: &str) -> bool {
    text.trim_end().ends_with(['.', '!', '?'])
}

/// Turns transcript segments into timed lyric lines without user lyrics.
///
/// Non-lyrical segments (`[Music]`, bare symbols) are skipped. Close short
/// segments are merged, then anything longer than the line limit is split on
/// word boundaries with start times spread across the segment by character
/// position.
pub fn extract_lines(
    segments: &[TranscriptSegment],
    config: &AlignerConfig,
    tokenize: impl Fn(&str) -> Vec<String>,
) -> Result<ExtractedLines, AlignmentError> {
    if segments.is_empty() {
        return Err(AlignmentError::EmptyTranscript);
    }

    let usable: Vec<&TranscriptSegment> = segments
        .iter()
        .filter(|s| !is_non_lyrical(&s.text) && !tokenize(&s.text).is_empty())
        .collect();
    if usable.is_empty() {
        tracing::warn!(
            segments = segments.len(),
            "extraction: every segment is non-lyrical"
        );
        return Err(AlignmentError::InstrumentalOnly);
    }

    let groups = merge_segments(&usable, config);
    let mut out = ExtractedLines::default();

    for group in &groups {
        let confidence = group.mean_probability();
        for (text, start) in split_group(group, config.extraction_max_line_chars) {
            let order = out.lines.len();
            match confidence {
                None => out.warnings.push(format!(
                    "Line {}: segment at {:.2}s has no word confidences",
                    order + 1,
                    start
                )),
                Some(c) if c < config.low_confidence_segment_threshold => {
                    out.warnings.push(format!(
                        "Line {}: low transcription confidence ({:.2}) for \"{}\"",
                        order + 1,
                        c,
                        text
                    ))
                }
                Some(_) => out.successful += 1,
            }
            out.lines.push(AlignedLyricLine {
                text,
                timestamp: start,
                order,
                confidence,
            });
        }
    }

    tracing::debug!(
        segments = segments.len(),
        usable = usable.len(),
        groups = groups.len(),
        lines = out.lines.len(),
        "extraction: segments converted to lines"
    );
    Ok(out)
}

fn merge_segments(segments: &[&TranscriptSegment], config: &AlignerConfig) -> Vec<PhraseGroup> {
    let mut groups: Vec<PhraseGroup> = Vec::with_capacity(segments.len());
    for segment in segments {
        let next = PhraseGroup::from_segment(segment);
        match groups.last_mut() {
            Some(open) if open.can_absorb(&next, config) => open.absorb(next),
            _ => groups.push(next),
        }
    }
    groups
}

/// Splits a phrase into chunks of at most `max_chars`, each paired with a
/// start time proportional to its character offset within the phrase.
fn split_group(group: &PhraseGroup, max_chars: usize) -> Vec<(String, f64)> {
    if group.text.chars().count() <= max_chars {
        return vec![(group.text.clone(), group.start)];
    }

    let chunks = wrap_words(&group.text, max_chars);
    let total_chars: usize =
        chunks.iter().map(|c| c.chars().count()).sum::<usize>() + chunks.len().saturating_sub(1);
    let duration = group.end - group.start;

    let mut offset = 0usize;
    chunks
        .into_iter()
        .map(|chunk| {
            let start = group.start + duration * offset as f64 / total_chars.max(1) as f64;
            offset += chunk.chars().count() + 1;
            (chunk, start)
        })
        .collect()
}

/// Greedy word wrap; a single word longer than the limit is cut into pieces.
fn wrap_words(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            let chars: Vec<char> = word.chars().collect();
            chunks.extend(chars.chunks(max_chars).map(|piece| piece.iter().collect::<String>()));
            continue;
        }
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word_len <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            chunks.push(std::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
