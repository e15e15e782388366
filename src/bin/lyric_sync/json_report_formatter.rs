use std::io::Write;
use std::path::Path;

use chrono::Utc;
use lyric_sync::{AutoTimestampResult, MappedWord, ResultDiagnostics};
use serde::Serialize;

use crate::output::open_output;

#[derive(Serialize)]
struct LineReport<'a> {
    generated_at: String,
    mode: &'a str,
    diagnostics: &'a ResultDiagnostics,
    result: &'a AutoTimestampResult,
}

#[derive(Serialize)]
struct WordReport<'a> {
    generated_at: String,
    mode: &'a str,
    matched_words: usize,
    total_words: usize,
    words: &'a [MappedWord],
}

pub fn write_line_report(
    path: Option<&Path>,
    mode: &str,
    result: &AutoTimestampResult,
    diagnostics: &ResultDiagnostics,
) -> Result<(), String> {
    write_json(
        path,
        &LineReport {
            generated_at: Utc::now().to_rfc3339(),
            mode,
            diagnostics,
            result,
        },
    )
}

pub fn write_word_report(path: Option<&Path>, words: &[MappedWord]) -> Result<(), String> {
    write_json(
        path,
        &WordReport {
            generated_at: Utc::now().to_rfc3339(),
            mode: "words",
            matched_words: words.iter().filter(|w| w.matched).count(),
            total_words: words.len(),
            words,
        },
    )
}

fn write_json<T: Serialize>(path: Option<&Path>, report: &T) -> Result<(), String> {
    let mut out = open_output(path)?;
    serde_json::to_writer_pretty(&mut out, report)
        .map_err(|err| format!("Failed to serialize report JSON: {err}"))?;
    out.write_all(b"\n")
        .and_then(|_| out.flush())
        .map_err(|err| format!("Failed to finalize report output: {err}"))?;
    Ok(())
}
