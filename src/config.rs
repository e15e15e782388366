use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AlignmentError;

/// Tunables for matching, anchoring, interpolation and extraction.
///
/// Times are seconds, confidences and weights are in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    /// How far past the anchor the primary search looks.
    pub window_secs: f64,
    /// Leash used for the single retry after a miss.
    pub expanded_window_secs: f64,
    /// Primary results below this are treated as "not found".
    pub not_found_threshold: f32,
    /// Expanded-window results must beat this to replace the primary one.
    pub expanded_accept_threshold: f32,
    /// At or above this a match becomes a trusted anchor.
    pub anchor_threshold: f32,
    /// At or below this a line is left unmatched.
    pub tentative_floor: f32,
    pub tentative_advance_secs: f64,
    pub unmatched_advance_secs: f64,
    /// Added to a trusted match end so the next window starts strictly after it.
    pub anchor_epsilon_secs: f64,
    pub span_slack_below: usize,
    pub span_slack_above: usize,
    pub similarity_weight: f32,
    pub probability_weight: f32,
    pub homophone_cost: f32,
    /// Word gaps at or above this close a voice segment.
    pub voice_gap_secs: f64,
    pub interpolation_anchor_confidence: f32,
    pub min_anchor_spacing_secs: f64,
    pub snap_stagger_secs: f64,
    pub interpolated_confidence: f32,
    pub extraction_max_line_chars: usize,
    pub extraction_merge_gap_secs: f64,
    pub low_confidence_segment_threshold: f32,
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            window_secs: 15.0,
            expanded_window_secs: 60.0,
            not_found_threshold: 0.4,
            expanded_accept_threshold: 0.8,
            anchor_threshold: 0.6,
            tentative_floor: 0.3,
            tentative_advance_secs: 2.0,
            unmatched_advance_secs: 1.0,
            anchor_epsilon_secs: 0.01,
            span_slack_below: 2,
            span_slack_above: 3,
            similarity_weight: 0.8,
            probability_weight: 0.2,
            homophone_cost: 0.2,
            voice_gap_secs: 2.0,
            interpolation_anchor_confidence: 0.75,
            min_anchor_spacing_secs: 0.5,
            snap_stagger_secs: 0.1,
            interpolated_confidence: 0.5,
            extraction_max_line_chars: 45,
            extraction_merge_gap_secs: 0.25,
            low_confidence_segment_threshold: 0.5,
        }
    }
}

impl AlignerConfig {
    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read aligner config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| AlignmentError::json("parse aligner config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AlignmentError> {
        let durations = [
            ("window_secs", self.window_secs),
            ("expanded_window_secs", self.expanded_window_secs),
            ("tentative_advance_secs", self.tentative_advance_secs),
            ("unmatched_advance_secs", self.unmatched_advance_secs),
            ("anchor_epsilon_secs", self.anchor_epsilon_secs),
            ("voice_gap_secs", self.voice_gap_secs),
            ("min_anchor_spacing_secs", self.min_anchor_spacing_secs),
            ("snap_stagger_secs", self.snap_stagger_secs),
            ("extraction_merge_gap_secs", self.extraction_merge_gap_secs),
        ];
        for (name, value) in durations {
            if !value.is_finite() || value < 0.0 {
                return Err(AlignmentError::invalid_config(format!(
                    "{name} must be a finite, non-negative number of seconds (got {value})"
                )));
            }
        }

        let unit_values = [
            ("not_found_threshold", self.not_found_threshold),
            ("expanded_accept_threshold", self.expanded_accept_threshold),
            ("anchor_threshold", self.anchor_threshold),
            ("tentative_floor", self.tentative_floor),
            ("similarity_weight", self.similarity_weight),
            ("probability_weight", self.probability_weight),
            ("homophone_cost", self.homophone_cost),
            (
                "interpolation_anchor_confidence",
                self.interpolation_anchor_confidence,
            ),
            ("interpolated_confidence", self.interpolated_confidence),
            (
                "low_confidence_segment_threshold",
                self.low_confidence_segment_threshold,
            ),
        ];
        for (name, value) in unit_values {
            if !(0.0..=1.0).contains(&value) {
                return Err(AlignmentError::invalid_config(format!(
                    "{name} must lie in [0, 1] (got {value})"
                )));
            }
        }

        if self.window_secs == 0.0 {
            return Err(AlignmentError::invalid_config("window_secs must be > 0"));
        }
        if self.expanded_window_secs < self.window_secs {
            return Err(AlignmentError::invalid_config(format!(
                "expanded_window_secs ({}) must not be shorter than window_secs ({})",
                self.expanded_window_secs, self.window_secs
            )));
        }
        if self.tentative_floor > self.anchor_threshold {
            return Err(AlignmentError::invalid_config(format!(
                "tentative_floor ({}) must not exceed anchor_threshold ({})",
                self.tentative_floor, self.anchor_threshold
            )));
        }
        let weight_sum = self.similarity_weight + self.probability_weight;
        if (weight_sum - 1.0).abs() > 1e-3 {
            return Err(AlignmentError::invalid_config(format!(
                "similarity_weight + probability_weight must equal 1 (got {weight_sum})"
            )));
        }
        if self.extraction_max_line_chars == 0 {
            return Err(AlignmentError::invalid_config(
                "extraction_max_line_chars must be > 0",
            ));
        }
        Ok(())
    }
}
