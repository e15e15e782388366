use std::collections::HashMap;

use crate::alignment::voice_activity::{next_segment_after, segment_containing};
use crate::config::AlignerConfig;
use crate::types::{AlignedLyricLine, VoiceSegment};

#[derive(Debug, Clone, Copy)]
pub struct InterpolationParams {
    pub anchor_confidence: f32,
    pub min_anchor_spacing_secs: f64,
    pub snap_stagger_secs: f64,
    pub interpolated_confidence: f32,
}

impl From<&AlignerConfig> for InterpolationParams {
    fn from(config: &AlignerConfig) -> Self {
        Self {
            anchor_confidence: config.interpolation_anchor_confidence,
            min_anchor_spacing_secs: config.min_anchor_spacing_secs,
            snap_stagger_secs: config.snap_stagger_secs,
            interpolated_confidence: config.interpolated_confidence,
        }
    }
}

/// Indices of lines trusted as interpolation anchors.
///
/// The first and last lines and every line at or above `anchor_confidence`
/// are candidates. A candidate is demoted when it lands less than
/// `min_anchor_spacing_secs` after the previous line or the previous anchor,
/// since real lines cannot be sung that close together.
pub fn find_anchors(lines: &[AlignedLyricLine], params: &InterpolationParams) -> Vec<usize> {
    let last_idx = lines.len().saturating_sub(1);
    let mut anchors: Vec<usize> = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let candidate = idx == 0
            || idx == last_idx
            || line.confidence_or_zero() >= params.anchor_confidence;
        if !candidate {
            continue;
        }
        if idx > 0 {
            let floor = lines[idx - 1].timestamp + params.min_anchor_spacing_secs;
            let after_previous_line = line.timestamp >= floor;
            let after_previous_anchor = anchors.last().is_none_or(|&a| {
                line.timestamp >= lines[a].timestamp + params.min_anchor_spacing_secs
            });
            if !(after_previous_line && after_previous_anchor) {
                tracing::debug!(
                    line = idx,
                    timestamp = line.timestamp,
                    "interpolation: anchor demoted by spacing check"
                );
                continue;
            }
        }
        anchors.push(idx);
    }
    anchors
}

/// Re-times every line strictly between two consecutive anchors.
///
/// Lines are spread by equal steps between the anchors. A timestamp that
/// falls outside every voice segment moves forward to the start of the next
/// segment, staggered so lines snapped to the same segment do not collide.
/// Re-timed lines stay within `[left anchor, right anchor]` and never step
/// backwards. Returns the number of lines re-timed.
pub fn interpolate(
    lines: &mut [AlignedLyricLine],
    voice: &[VoiceSegment],
    params: &InterpolationParams,
) -> usize {
    let anchors = find_anchors(lines, params);
    let mut snaps_per_segment: HashMap<usize, usize> = HashMap::new();
    let mut retimed = 0usize;

    for pair in anchors.windows(2) {
        let (left, right) = (pair[0], pair[1]);
        if right - left < 2 {
            continue;
        }
        let t_left = lines[left].timestamp;
        let t_right = lines[right].timestamp;
        let step = (t_right - t_left) / (right - left) as f64;
        let mut previous = t_left;
        let mut snapped_run = false;

        for idx in left + 1..right {
            let raw = t_left + step * (idx - left) as f64;
            let mut t = raw;
            if segment_containing(voice, raw).is_none() {
                if let Some(seg_idx) = next_segment_after(voice, raw) {
                    let count = snaps_per_segment.entry(seg_idx).or_insert(0);
                    t = voice[seg_idx].start + params.snap_stagger_secs * *count as f64;
                    *count += 1;
                    snapped_run = true;
                }
            }
            // Once a run has snapped, landing on the previous line is a collision.
            if t < previous || (snapped_run && t <= previous) {
                t = previous + params.snap_stagger_secs;
            }
            // Never overtake the right anchor; ties with it are allowed.
            t = t.min(t_right).max(previous);
            previous = t;

            let line = &mut lines[idx];
            line.timestamp = t;
            line.confidence = Some(params.interpolated_confidence);
            retimed += 1;
        }
    }

    tracing::debug!(
        anchors = anchors.len(),
        retimed,
        "interpolation: elastic pass finished"
    );
    retimed
}
