use crate::alignment::matcher::{best_span, PreparedWord, SpanMatch, SpanSearch};
use crate::config::AlignerConfig;
use crate::types::AlignedLyricLine;

/// How a line was classified after matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Trusted; the search re-bases past its end.
    Anchor,
    /// Timestamp kept, search only nudged forward.
    Tentative,
    Unmatched,
}

/// Per-line search state for one alignment run.
///
/// The search only re-bases from trusted anchors, so one wrong match cannot
/// shift every following line.
pub struct AnchorController<'a, F> {
    config: &'a AlignerConfig,
    words: &'a [PreparedWord],
    similarity: F,
    search_start_timestamp: f64,
    search_start_index: usize,
    successful_matches: usize,
    warnings: Vec<String>,
}

impl<'a, F> AnchorController<'a, F>
where
    F: Fn(&[String], &[String]) -> f32,
{
    /// `words` must be sorted by start time.
    pub fn new(config: &'a AlignerConfig, words: &'a [PreparedWord], similarity: F) -> Self {
        Self {
            config,
            words,
            similarity,
            search_start_timestamp: 0.0,
            search_start_index: 0,
            successful_matches: 0,
            warnings: Vec::new(),
        }
    }

    pub fn search_start_timestamp(&self) -> f64 {
        self.search_start_timestamp
    }

    pub fn search_start_index(&self) -> usize {
        self.search_start_index
    }

    pub fn successful_matches(&self) -> usize {
        self.successful_matches
    }

    /// Places one lyric line and advances the search state.
    pub fn place_line(
        &mut self,
        order: usize,
        text: &str,
        tokens: &[String],
    ) -> (AlignedLyricLine, Placement) {
        if tokens.is_empty() {
            self.warnings.push(format!(
                "Line {}: nothing to match in \"{}\"",
                order + 1,
                text
            ));
            self.search_start_timestamp += self.config.unmatched_advance_secs;
            return (AlignedLyricLine::unmatched(text, order), Placement::Unmatched);
        }

        let found = self.search(tokens);
        let confidence = found.map_or(0.0, |m| m.confidence);

        match found {
            Some(m) if confidence >= self.config.anchor_threshold => {
                self.search_start_timestamp = self
                    .search_start_timestamp
                    .max(m.end_time + self.config.anchor_epsilon_secs);
                let hint = self.words.partition_point(|w| w.start < m.timestamp);
                self.search_start_index = self.search_start_index.max(hint);
                self.successful_matches += 1;
                tracing::debug!(
                    line = order,
                    timestamp = m.timestamp,
                    confidence = format!("{:.3}", m.confidence),
                    next_search_from = self.search_start_timestamp,
                    "anchor: trusted match"
                );
                (placed(text, order, &m), Placement::Anchor)
            }
            Some(m) if confidence > self.config.tentative_floor => {
                self.search_start_timestamp += self.config.tentative_advance_secs;
                self.warnings.push(format!(
                    "Line {}: low-confidence match ({:.2}) at {:.2}s for \"{}\"",
                    order + 1,
                    m.confidence,
                    m.timestamp,
                    text
                ));
                tracing::debug!(
                    line = order,
                    timestamp = m.timestamp,
                    confidence = format!("{:.3}", m.confidence),
                    "anchor: tentative match, anchor not moved"
                );
                (placed(text, order, &m), Placement::Tentative)
            }
            _ => {
                self.search_start_timestamp += self.config.unmatched_advance_secs;
                self.warnings.push(format!(
                    "Line {}: no confident match for \"{}\"",
                    order + 1,
                    text
                ));
                tracing::debug!(
                    line = order,
                    confidence = format!("{confidence:.3}"),
                    "anchor: line left unmatched"
                );
                (AlignedLyricLine::unmatched(text, order), Placement::Unmatched)
            }
        }
    }

    /// Consumes the controller, returning the trusted-match count and warnings.
    pub fn finish(self) -> (usize, Vec<String>) {
        (self.successful_matches, self.warnings)
    }

    fn search(&self, tokens: &[String]) -> Option<SpanMatch> {
        let primary = self.match_in_window(tokens, self.config.window_secs);
        let primary_conf = primary.map_or(0.0, |m| m.confidence);
        if primary_conf >= self.config.not_found_threshold {
            return primary;
        }

        // Likely swallowed by an instrumental break; look further once, but
        // demand more, since a long leash can land on another chorus.
        let expanded = self.match_in_window(tokens, self.config.expanded_window_secs);
        match expanded {
            Some(m) if m.confidence > self.config.expanded_accept_threshold => {
                tracing::debug!(
                    timestamp = m.timestamp,
                    confidence = format!("{:.3}", m.confidence),
                    "anchor: accepted expanded-window match"
                );
                Some(m)
            }
            _ => primary,
        }
    }

    fn match_in_window(&self, tokens: &[String], leash_secs: f64) -> Option<SpanMatch> {
        let window = self.window(leash_secs);
        let search = SpanSearch {
            slack_below: self.config.span_slack_below,
            slack_above: self.config.span_slack_above,
            similarity_weight: self.config.similarity_weight,
            probability_weight: self.config.probability_weight,
        };
        best_span(tokens, window, &search, &self.similarity)
    }

    /// Words with `end >= anchor` and `start <= anchor + leash`, scanning
    /// from the index hint.
    fn window(&self, leash_secs: f64) -> &'a [PreparedWord] {
        let anchor = self.search_start_timestamp;
        let limit = anchor + leash_secs;
        let hint = self.search_start_index.min(self.words.len());
        let tail = &self.words[hint..];

        let Some(first) = tail.iter().position(|w| w.end >= anchor) else {
            return &[];
        };
        let last = tail.partition_point(|w| w.start <= limit);
        if last <= first {
            return &[];
        }
        &tail[first..last]
    }
}

fn placed(text: &str, order: usize, m: &SpanMatch) -> AlignedLyricLine {
    AlignedLyricLine {
        text: text.to_string(),
        timestamp: m.timestamp,
        order,
        confidence: Some(m.confidence),
    }
}
