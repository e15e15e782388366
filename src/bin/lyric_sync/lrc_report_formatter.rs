use std::io::Write;
use std::path::Path;

use lyric_sync::AlignedLyricLine;

use crate::output::open_output;

/// Writes placed lines as `[mm:ss.xx]text`. Unmatched placeholders are left out.
pub fn write_lrc(path: Option<&Path>, lines: &[AlignedLyricLine]) -> Result<(), String> {
    let rendered = render_lrc(lines);
    let skipped = lines.iter().filter(|l| !l.is_matched()).count();
    if skipped > 0 {
        tracing::warn!(skipped, "unmatched lines omitted from LRC output");
    }
    let mut out = open_output(path)?;
    out.write_all(rendered.as_bytes())
        .and_then(|_| out.flush())
        .map_err(|err| format!("Failed to write LRC output: {err}"))
}

fn render_lrc(lines: &[AlignedLyricLine]) -> String {
    lines
        .iter()
        .filter(|line| line.is_matched())
        .map(|line| format!("{}{}\n", lrc_timestamp(line.timestamp), line.text))
        .collect()
}

fn lrc_timestamp(secs: f64) -> String {
    let centis = (secs.max(0.0) * 100.0).round() as u64;
    format!(
        "[{:02}:{:02}.{:02}]",
        centis / 6000,
        (centis / 100) % 60,
        centis % 100
    )
}
