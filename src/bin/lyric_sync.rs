use std::env;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use lyric_sync::{
    diagnose, parse_lyric_lines, AlignerConfig, JobOutcome, LyricAligner, LyricAlignerBuilder,
    Transcript,
};

#[path = "lyric_sync/json_report_formatter.rs"]
mod json_report_formatter;
#[path = "lyric_sync/lrc_report_formatter.rs"]
mod lrc_report_formatter;
#[path = "lyric_sync/output.rs"]
mod output;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// One timestamp per lyric line.
    Lines,
    /// Per-word timing for the supplied lyrics.
    Words,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Lrc,
}

#[derive(Debug, Parser)]
#[command(name = "lyric_sync")]
#[command(about = "Timestamp lyric lines from a word-level speech transcript")]
struct Args {
    /// Transcript JSON: a word array or a document with segments.
    #[arg(long, env = "LYRIC_SYNC_TRANSCRIPT")]
    transcript: PathBuf,
    /// Plain-text lyrics. Without it, lines are extracted from the transcript.
    #[arg(long, env = "LYRIC_SYNC_LYRICS")]
    lyrics: Option<PathBuf>,
    #[arg(long, env = "LYRIC_SYNC_MODE", value_enum, default_value_t = Mode::Lines)]
    mode: Mode,
    #[arg(long, env = "LYRIC_SYNC_CONFIG")]
    config: Option<PathBuf>,
    /// Output file; stdout when omitted.
    #[arg(long, env = "LYRIC_SYNC_OUT")]
    out: Option<PathBuf>,
    #[arg(
        long,
        env = "LYRIC_SYNC_FORMAT",
        value_enum,
        default_value_t = OutputFormat::Json
    )]
    output_format: OutputFormat,
    /// Overall confidence below which the result is flagged.
    #[arg(long, env = "LYRIC_SYNC_MIN_CONFIDENCE", default_value_t = 0.5)]
    min_confidence: f32,
}

fn main() {
    init_logging();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging() {
    let env_filter = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run() -> Result<(), String> {
    let args = Args::parse();

    let config = match args.config.as_ref() {
        Some(path) => AlignerConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => AlignerConfig::default(),
    };
    let aligner = LyricAlignerBuilder::new(config)
        .build()
        .map_err(|err| format!("Failed to build LyricAligner: {err}"))?;

    let transcript = Transcript::from_json_file(&args.transcript).map_err(|err| {
        format!(
            "Failed to load transcript '{}': {err}",
            args.transcript.display()
        )
    })?;
    let lyrics_text = args
        .lyrics
        .as_ref()
        .map(|path| {
            fs::read_to_string(path)
                .map_err(|err| format!("Failed to read lyrics '{}': {err}", path.display()))
        })
        .transpose()?;
    tracing::info!(
        words = transcript.words.len(),
        segments = transcript.segments.len(),
        "transcript loaded"
    );

    match (args.mode, lyrics_text) {
        (Mode::Words, None) => Err("--mode words requires --lyrics".to_string()),
        (Mode::Words, Some(_)) if args.output_format == OutputFormat::Lrc => {
            Err("--mode words only supports --output-format json".to_string())
        }
        (Mode::Words, Some(text)) => {
            let words = aligner.map_words(&text, &transcript.words);
            json_report_formatter::write_word_report(args.out.as_deref(), &words)
        }
        (Mode::Lines, lyrics) => run_lines(&args, &aligner, &transcript, lyrics.as_deref()),
    }
}

fn run_lines(
    args: &Args,
    aligner: &LyricAligner,
    transcript: &Transcript,
    lyrics: Option<&str>,
) -> Result<(), String> {
    let progress = ProgressBar::new(100);
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    progress.set_message("starting...");

    let bar = progress.clone();
    let job = aligner.job().with_progress(move |phase, fraction| {
        bar.set_position((fraction * 100.0).round() as u64);
        bar.set_message(phase.to_string());
    });

    let (mode_label, outcome) = match lyrics {
        Some(text) => {
            let lines = parse_lyric_lines(text);
            ("align", job.align(&transcript.words, &lines))
        }
        None => ("extract", job.extract(&transcript.segments)),
    };
    progress.finish_and_clear();

    let result = match outcome.map_err(|err| format!("Alignment failed: {err}"))? {
        JobOutcome::Completed(result) => result,
        JobOutcome::Cancelled => return Err("Alignment was cancelled".to_string()),
    };

    for warning in &result.warnings {
        tracing::debug!(%warning, "line warning");
    }
    if result.is_low_confidence(args.min_confidence) {
        tracing::warn!(
            overall_confidence = format!("{:.3}", result.overall_confidence),
            threshold = args.min_confidence,
            warnings = result.warnings.len(),
            "low-confidence alignment"
        );
    }

    match args.output_format {
        OutputFormat::Json => {
            let diagnostics = diagnose(&result, aligner.config())
                .map_err(|err| format!("Failed to compute diagnostics: {err}"))?;
            json_report_formatter::write_line_report(
                args.out.as_deref(),
                mode_label,
                &result,
                &diagnostics,
            )
        }
        OutputFormat::Lrc => lrc_report_formatter::write_lrc(args.out.as_deref(), &result.lyrics),
    }
}
