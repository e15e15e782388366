use std::time::Instant;

use crate::alignment::anchor::AnchorController;
use crate::alignment::extraction::extract_lines;
use crate::alignment::interpolation::{interpolate, InterpolationParams};
use crate::alignment::matcher::PreparedWord;
use crate::alignment::report::build_result;
use crate::alignment::tokenization::is_non_lyrical;
use crate::alignment::voice_activity::segment_voice_activity;
use crate::alignment::word_mapper;
use crate::config::AlignerConfig;
use crate::error::AlignmentError;
use crate::pipeline::job::{AlignmentJob, JobContext};
use crate::pipeline::traits::{SequenceScorer, Tokenizer};
use crate::types::{JobOutcome, MappedWord, TranscriptSegment, WordToken};

pub struct LyricAligner {
    config: AlignerConfig,
    tokenizer: Box<dyn Tokenizer>,
    sequence_scorer: Box<dyn SequenceScorer>,
}

pub(crate) struct LyricAlignerParts {
    pub config: AlignerConfig,
    pub tokenizer: Box<dyn Tokenizer>,
    pub sequence_scorer: Box<dyn SequenceScorer>,
}

impl LyricAligner {
    pub(crate) fn from_parts(parts: LyricAlignerParts) -> Self {
        Self {
            config: parts.config,
            tokenizer: parts.tokenizer,
            sequence_scorer: parts.sequence_scorer,
        }
    }

    pub fn config(&self) -> &AlignerConfig {
        &self.config
    }

    /// A fresh job: uncancelled, no progress hook, new anchor state per run.
    pub fn job(&self) -> AlignmentJob<'_> {
        AlignmentJob::new(self)
    }

    pub fn align<S: AsRef<str>>(
        &self,
        words: &[WordToken],
        lines: &[S],
    ) -> Result<JobOutcome, AlignmentError> {
        self.job().align(words, lines)
    }

    pub fn extract(&self, segments: &[TranscriptSegment]) -> Result<JobOutcome, AlignmentError> {
        self.job().extract(segments)
    }

    pub fn map_words(&self, lyrics_text: &str, words: &[WordToken]) -> Vec<MappedWord> {
        word_mapper::map_words(lyrics_text, words)
    }

    pub(crate) fn run_align<S: AsRef<str>>(
        &self,
        words: &[WordToken],
        lines: &[S],
        job: &JobContext<'_>,
    ) -> Result<JobOutcome, AlignmentError> {
        let started = Instant::now();

        let line_tokens: Vec<Vec<String>> = lines
            .iter()
            .map(|line| self.tokenizer.tokenize(line.as_ref()))
            .collect();
        if line_tokens.iter().all(Vec::is_empty) {
            return Err(AlignmentError::NoLyricsProvided);
        }
        if words.is_empty() {
            return Err(AlignmentError::EmptyTranscript);
        }

        let mut prepared: Vec<PreparedWord> = words
            .iter()
            .filter(|w| !is_non_lyrical(&w.text))
            .filter_map(|w| {
                let tokens = self.tokenizer.tokenize(&w.text);
                (!tokens.is_empty()).then(|| PreparedWord::new(w, tokens))
            })
            .collect();
        if prepared.is_empty() {
            tracing::warn!(
                words = words.len(),
                "transcript has words but none carry lyric content"
            );
            return Err(AlignmentError::InstrumentalOnly);
        }
        prepared.sort_by(|a, b| a.start.total_cmp(&b.start));

        job.report("preparing", 0.1);
        if job.is_cancelled() {
            return Ok(cancelled("preparing"));
        }

        let scorer = self.sequence_scorer.as_ref();
        let mut controller =
            AnchorController::new(&self.config, &prepared, |lyric: &[String], heard: &[String]| {
                scorer.similarity(lyric, heard)
            });
        let mut aligned = Vec::with_capacity(lines.len());
        for (order, (line, tokens)) in lines.iter().zip(&line_tokens).enumerate() {
            if job.is_cancelled() {
                return Ok(cancelled("matching"));
            }
            let (placed, _) = controller.place_line(order, line.as_ref().trim(), tokens);
            aligned.push(placed);
        }
        let (successful, warnings) = controller.finish();
        job.report("matching", 0.7);

        let voice = segment_voice_activity(
            prepared.iter().map(|w| (w.start, w.end)),
            self.config.voice_gap_secs,
        );
        job.report("voice_activity", 0.8);
        if job.is_cancelled() {
            return Ok(cancelled("voice_activity"));
        }

        let retimed = interpolate(&mut aligned, &voice, &InterpolationParams::from(&self.config));
        job.report("interpolating", 0.9);
        if job.is_cancelled() {
            return Ok(cancelled("interpolating"));
        }

        let result = build_result(aligned, successful, warnings, started.elapsed())?;
        job.report("reporting", 1.0);

        tracing::info!(
            lines = result.total_lines,
            matched = result.successful_matches,
            interpolated = retimed,
            voice_segments = voice.len(),
            overall_confidence = format!("{:.3}", result.overall_confidence),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "alignment finished"
        );
        Ok(JobOutcome::Completed(result))
    }

    pub(crate) fn run_extract(
        &self,
        segments: &[TranscriptSegment],
        job: &JobContext<'_>,
    ) -> Result<JobOutcome, AlignmentError> {
        let started = Instant::now();
        job.report("preparing", 0.1);
        if job.is_cancelled() {
            return Ok(cancelled("preparing"));
        }

        let extracted = extract_lines(segments, &self.config, |text: &str| {
            self.tokenizer.tokenize(text)
        })?;
        job.report("segmenting", 0.6);
        if job.is_cancelled() {
            return Ok(cancelled("segmenting"));
        }

        let result = build_result(
            extracted.lines,
            extracted.successful,
            extracted.warnings,
            started.elapsed(),
        )?;
        job.report("reporting", 1.0);

        tracing::info!(
            segments = segments.len(),
            lines = result.total_lines,
            confident = result.successful_matches,
            overall_confidence = format!("{:.3}", result.overall_confidence),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "extraction finished"
        );
        Ok(JobOutcome::Completed(result))
    }
}

fn cancelled(phase: &str) -> JobOutcome {
    tracing::info!(phase, "job cancelled; partial results discarded");
    JobOutcome::Cancelled
}
