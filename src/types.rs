use serde::{Deserialize, Serialize};

/// One transcribed word. Times are seconds from the start of the audio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordToken {
    pub text: String,
    pub start: f64,
    pub end: f64,
    /// Transcription confidence in [0, 1].
    pub probability: f32,
}

impl WordToken {
    pub fn new(text: impl Into<String>, start: f64, end: f64, probability: f32) -> Self {
        Self {
            text: text.into(),
            start,
            end,
            probability,
        }
    }
}

/// A transcriber segment: a phrase with its own bounds and the words inside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub words: Vec<WordToken>,
}

/// Canonical transcript after ingestion normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub words: Vec<WordToken>,
    pub segments: Vec<TranscriptSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedLyricLine {
    pub text: String,
    /// Seconds. Unmatched placeholders sit at 0.0.
    pub timestamp: f64,
    /// Position in the input; never changes.
    pub order: usize,
    /// `None` means the line could not be placed.
    pub confidence: Option<f32>,
}

impl AlignedLyricLine {
    pub(crate) fn unmatched(text: impl Into<String>, order: usize) -> Self {
        Self {
            text: text.into(),
            timestamp: 0.0,
            order,
            confidence: None,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.confidence.is_some_and(|c| c > 0.0)
    }

    pub fn confidence_or_zero(&self) -> f32 {
        self.confidence.unwrap_or(0.0)
    }
}

/// Span of audio inferred to contain vocals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSegment {
    pub start: f64,
    pub end: f64,
}

impl VoiceSegment {
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start && t <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoTimestampResult {
    pub lyrics: Vec<AlignedLyricLine>,
    pub overall_confidence: f32,
    pub warnings: Vec<String>,
    pub successful_matches: usize,
    pub total_lines: usize,
    pub processing_time_secs: f64,
}

impl AutoTimestampResult {
    /// The engine never upgrades confidence; callers pick their own bar.
    pub fn is_low_confidence(&self, threshold: f32) -> bool {
        self.overall_confidence < threshold
    }
}

/// Terminal state of one job run.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed(AutoTimestampResult),
    Cancelled,
}

impl JobOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn completed(self) -> Option<AutoTimestampResult> {
        match self {
            Self::Completed(result) => Some(result),
            Self::Cancelled => None,
        }
    }
}

/// Ground-truth lyric word with timing borrowed or interpolated from the transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
    /// True when timing comes straight from a transcript word.
    pub matched: bool,
}
