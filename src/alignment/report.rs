use std::time::Duration;

use serde::Serialize;

use crate::config::AlignerConfig;
use crate::error::AlignmentError;
use crate::types::{AlignedLyricLine, AutoTimestampResult};

const INTERPOLATED_TOLERANCE: f32 = 1e-6;

/// Per-band line counts and confidence spread for one finished result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultDiagnostics {
    pub matched_lines: usize,
    pub tentative_lines: usize,
    pub interpolated_lines: usize,
    pub unmatched_lines: usize,
    pub mean_confidence: Option<f32>,
    pub min_confidence: Option<f32>,
    /// Adjacent placed lines whose timestamps run backwards.
    pub non_monotonic_pairs: usize,
}

/// Assembles the caller-facing result, rejecting non-finite numbers.
pub fn build_result(
    mut lines: Vec<AlignedLyricLine>,
    successful_matches: usize,
    warnings: Vec<String>,
    elapsed: Duration,
) -> Result<AutoTimestampResult, AlignmentError> {
    for line in &mut lines {
        if !line.timestamp.is_finite() {
            return Err(AlignmentError::invalid_input(format!(
                "line {} produced non-finite timestamp: {}",
                line.order + 1,
                line.timestamp
            )));
        }
        line.timestamp = line.timestamp.max(0.0);
        if let Some(confidence) = line.confidence {
            let checked = checked_f32(f64::from(confidence), "line.confidence")?;
            line.confidence = Some(checked.clamp(0.0, 1.0));
        }
    }

    let total_lines = lines.len();
    let overall = if total_lines == 0 {
        0.0
    } else {
        successful_matches as f64 / total_lines as f64
    };

    Ok(AutoTimestampResult {
        lyrics: lines,
        overall_confidence: checked_f32(overall, "overall_confidence")?,
        warnings,
        successful_matches,
        total_lines,
        processing_time_secs: elapsed.as_secs_f64(),
    })
}

/// Buckets every line by confidence band.
///
/// Bands follow the aligner thresholds: no confidence is unmatched, exactly
/// the interpolated value is interpolated, at or above the anchor threshold is
/// matched, anything else is tentative.
pub fn diagnose(
    result: &AutoTimestampResult,
    config: &AlignerConfig,
) -> Result<ResultDiagnostics, AlignmentError> {
    let mut diagnostics = ResultDiagnostics {
        matched_lines: 0,
        tentative_lines: 0,
        interpolated_lines: 0,
        unmatched_lines: 0,
        mean_confidence: None,
        min_confidence: None,
        non_monotonic_pairs: 0,
    };

    let mut placed: Vec<&AlignedLyricLine> = Vec::with_capacity(result.lyrics.len());
    for line in &result.lyrics {
        if !line.is_matched() {
            diagnostics.unmatched_lines += 1;
            continue;
        }
        let confidence = line.confidence_or_zero();
        if (confidence - config.interpolated_confidence).abs() < INTERPOLATED_TOLERANCE {
            diagnostics.interpolated_lines += 1;
        } else if confidence >= config.anchor_threshold {
            diagnostics.matched_lines += 1;
        } else {
            diagnostics.tentative_lines += 1;
        }
        placed.push(line);
    }

    if !placed.is_empty() {
        let confidences: Vec<f64> = placed
            .iter()
            .map(|l| f64::from(l.confidence_or_zero()))
            .collect();
        let mean = confidences.iter().sum::<f64>() / confidences.len() as f64;
        let min = confidences.iter().copied().fold(f64::INFINITY, f64::min);
        diagnostics.mean_confidence = Some(checked_f32(mean, "diagnostics.mean_confidence")?);
        diagnostics.min_confidence = Some(checked_f32(min, "diagnostics.min_confidence")?);
    }

    diagnostics.non_monotonic_pairs = placed
        .windows(2)
        .filter(|pair| pair[1].timestamp < pair[0].timestamp)
        .count();

    Ok(diagnostics)
}

fn checked_f32(value: f64, metric_name: &str) -> Result<f32, AlignmentError> {
    if !value.is_finite() {
        return Err(AlignmentError::invalid_input(format!(
            "metric '{metric_name}' produced non-finite value: {value}"
        )));
    }
    if value < f32::MIN as f64 || value > f32::MAX as f64 {
        return Err(AlignmentError::invalid_input(format!(
            "metric '{metric_name}' out of f32 range: {value}"
        )));
    }
    Ok(value as f32)
}
