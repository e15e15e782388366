use crate::types::{VoiceSegment, WordToken};

/// Merges time-ordered word spans into voice segments.
///
/// A word joins the open segment while the gap from the segment's end to the
/// word's start is below `gap_secs`; a gap at or above it is treated as an
/// instrumental break and opens a new segment.
pub fn segment_voice_activity<I>(spans: I, gap_secs: f64) -> Vec<VoiceSegment>
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut segments: Vec<VoiceSegment> = Vec::new();
    let mut current: Option<VoiceSegment> = None;

    for (start, end) in spans {
        let end = end.max(start);
        current = match current {
            None => Some(VoiceSegment { start, end }),
            Some(mut open) if start - open.end < gap_secs => {
                open.end = open.end.max(end);
                Some(open)
            }
            Some(closed) => {
                segments.push(closed);
                Some(VoiceSegment { start, end })
            }
        };
    }
    segments.extend(current);
    segments
}

pub fn voice_segments(words: &[WordToken], gap_secs: f64) -> Vec<VoiceSegment> {
    segment_voice_activity(words.iter().map(|w| (w.start, w.end)), gap_secs)
}

/// Index of the segment containing `t`.
pub fn segment_containing(segments: &[VoiceSegment], t: f64) -> Option<usize> {
    let idx = segments.partition_point(|s| s.end < t);
    segments.get(idx).filter(|s| s.contains(t)).map(|_| idx)
}

/// Index of the first segment starting strictly after `t`.
pub fn next_segment_after(segments: &[VoiceSegment], t: f64) -> Option<usize> {
    let idx = segments.partition_point(|s| s.start <= t);
    (idx < segments.len()).then_some(idx)
}
