use lyric_sync::alignment::anchor::{AnchorController, Placement};
use lyric_sync::alignment::distance::{sequence_similarity, token_distance};
use lyric_sync::alignment::interpolation::{find_anchors, interpolate, InterpolationParams};
use lyric_sync::alignment::matcher::PreparedWord;
use lyric_sync::alignment::voice_activity::segment_voice_activity;
use lyric_sync::{
    diagnose, tokenize, AlignedLyricLine, AlignerConfig, LyricAligner, LyricAlignerBuilder,
    VoiceSegment, WordToken,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const CASES: usize = 40;

fn seeded(salt: u64) -> StdRng {
    let base = std::env::var("LYRIC_SYNC_IT_SEED")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(7);
    StdRng::seed_from_u64(base ^ salt)
}

fn aligner() -> LyricAligner {
    LyricAlignerBuilder::new(AlignerConfig::default())
        .build()
        .expect("default config builds")
}

/// Distinct alphabetic word for every index; digits would be dropped by
/// normalization and collide.
fn unique_word(mut idx: usize) -> String {
    let mut word = String::from("zq");
    loop {
        word.push((b'a' + (idx % 26) as u8) as char);
        idx /= 26;
        if idx == 0 {
            break;
        }
    }
    word
}

struct CleanSong {
    lines: Vec<String>,
    words: Vec<WordToken>,
    line_starts: Vec<f64>,
}

fn clean_song(rng: &mut StdRng) -> CleanSong {
    let line_count = rng.gen_range(2..10);
    let mut lines = Vec::with_capacity(line_count);
    let mut words = Vec::new();
    let mut line_starts = Vec::with_capacity(line_count);
    let mut t = rng.gen_range(0.0..5.0);
    let mut next_word = 0usize;

    for _ in 0..line_count {
        if rng.gen_bool(0.2) {
            t += rng.gen_range(20.0..30.0);
        }
        line_starts.push(t);
        let len = rng.gen_range(3..7);
        let mut text = Vec::with_capacity(len);
        for _ in 0..len {
            let word = unique_word(next_word);
            next_word += 1;
            let duration = rng.gen_range(0.3..0.6);
            words.push(WordToken::new(word.clone(), t, t + duration, 0.9));
            text.push(word);
            t += duration + rng.gen_range(0.1..0.3);
        }
        lines.push(text.join(" "));
    }

    CleanSong {
        lines,
        words,
        line_starts,
    }
}

#[test]
fn clean_transcripts_anchor_every_line_on_its_first_word() {
    let aligner = aligner();
    let mut rng = seeded(0x11);

    for case in 0..CASES {
        let song = clean_song(&mut rng);
        let result = aligner
            .align(&song.words, &song.lines)
            .expect("align")
            .completed()
            .expect("not cancelled");

        assert_eq!(result.lyrics.len(), song.lines.len(), "case {case}");
        for (line, expected) in result.lyrics.iter().zip(&song.line_starts) {
            assert!(
                (line.timestamp - expected).abs() < 1e-9,
                "case {case}: line {} at {} expected {}",
                line.order,
                line.timestamp,
                expected
            );
            assert!(line.confidence_or_zero() >= 0.9, "case {case}");
        }
        assert_eq!(result.successful_matches, song.lines.len(), "case {case}");
        assert_eq!(result.overall_confidence, 1.0, "case {case}");
    }
}

#[test]
fn noisy_transcripts_keep_structural_guarantees() {
    const VOCAB: [&str; 14] = [
        "love", "you", "to", "too", "night", "knight", "baby", "oh", "hold", "me", "here",
        "hear", "[Music]", "♪",
    ];
    let aligner = aligner();
    let config = AlignerConfig::default();
    let mut rng = seeded(0x22);

    for case in 0..CASES {
        let mut t = 0.0;
        let words: Vec<WordToken> = (0..rng.gen_range(1..60))
            .map(|_| {
                t += rng.gen_range(0.05..4.0);
                let start = t;
                t += rng.gen_range(0.1..0.8);
                let text = *VOCAB.choose(&mut rng).expect("non-empty vocabulary");
                WordToken::new(text, start, t, rng.gen_range(0.0..=1.0))
            })
            .collect();
        let lines: Vec<String> = (0..rng.gen_range(1..12))
            .map(|_| {
                (0..rng.gen_range(1..6))
                    .map(|_| *VOCAB[..12].choose(&mut rng).expect("non-empty vocabulary"))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();

        let outcome = aligner.align(&words, &lines);
        let result = match outcome {
            Ok(outcome) => outcome.completed().expect("not cancelled"),
            // Every word drawn may be non-lyrical.
            Err(lyric_sync::AlignmentError::InstrumentalOnly) => continue,
            Err(err) => panic!("case {case}: unexpected error {err}"),
        };

        assert_eq!(result.lyrics.len(), lines.len(), "case {case}");
        assert_eq!(result.total_lines, lines.len(), "case {case}");
        assert!(result.successful_matches <= result.total_lines, "case {case}");
        assert!((0.0..=1.0).contains(&result.overall_confidence), "case {case}");
        for (idx, line) in result.lyrics.iter().enumerate() {
            assert_eq!(line.order, idx, "case {case}");
            assert_eq!(line.text, lines[idx], "case {case}");
            assert!(line.timestamp >= 0.0 && line.timestamp.is_finite(), "case {case}");
            if let Some(c) = line.confidence {
                assert!((0.0..=1.0).contains(&c), "case {case}: confidence {c}");
            }
        }
        let diagnostics = diagnose(&result, &config).expect("diagnose");
        assert_eq!(
            diagnostics.matched_lines
                + diagnostics.tentative_lines
                + diagnostics.interpolated_lines
                + diagnostics.unmatched_lines,
            lines.len(),
            "case {case}"
        );
    }
}

#[test]
fn interpolated_lines_never_move_backwards() {
    let params = InterpolationParams::from(&AlignerConfig::default());
    let mut rng = seeded(0x33);

    for case in 0..CASES * 5 {
        let count = rng.gen_range(2..16);
        let mut t = 0.0;
        let mut lines: Vec<AlignedLyricLine> = (0..count)
            .map(|order| {
                t += rng.gen_range(0.0..8.0);
                let confidence = match rng.gen_range(0..3) {
                    0 => None,
                    1 => Some(rng.gen_range(0.3..0.75)),
                    _ => Some(rng.gen_range(0.75..=1.0)),
                };
                AlignedLyricLine {
                    text: format!("line {order}"),
                    timestamp: t,
                    order,
                    confidence,
                }
            })
            .collect();

        let mut s = 0.0;
        let spans: Vec<(f64, f64)> = (0..rng.gen_range(0..10))
            .map(|_| {
                s += rng.gen_range(0.5..20.0);
                let start = s;
                s += rng.gen_range(0.2..10.0);
                (start, s)
            })
            .collect();
        let voice: Vec<VoiceSegment> = segment_voice_activity(spans, 2.0);

        let anchors = find_anchors(&lines, &params);
        let anchor_times: Vec<f64> = anchors.iter().map(|&a| lines[a].timestamp).collect();
        interpolate(&mut lines, &voice, &params);

        for (&a, &before) in anchors.iter().zip(&anchor_times) {
            assert_eq!(lines[a].timestamp, before, "case {case}: anchor {a} moved");
        }
        for pair in anchors.windows(2) {
            let (left, right) = (pair[0], pair[1]);
            let mut previous = lines[left].timestamp;
            for line in &lines[left + 1..right] {
                assert!(
                    line.timestamp >= previous,
                    "case {case}: line {} at {} before {}",
                    line.order,
                    line.timestamp,
                    previous
                );
                assert!(
                    line.timestamp <= lines[right].timestamp,
                    "case {case}: line {} at {} passed anchor {right}",
                    line.order,
                    line.timestamp
                );
                assert_eq!(line.confidence, Some(params.interpolated_confidence));
                previous = line.timestamp;
            }
        }
    }
}

fn random_text(rng: &mut StdRng) -> String {
    const ALPHABET: &[char] = &[
        'a', 'b', 'e', 'k', 'n', 'o', 'r', 't', 'y', 'A', 'T', '0', '7', 'é', 'ß', '\'', '-',
        ',', '.', '!', '♪', ' ', ' ', ' ', '\t',
    ];
    (0..rng.gen_range(0..40))
        .map(|_| *ALPHABET.choose(rng).expect("non-empty alphabet"))
        .collect()
}

#[test]
fn tokenizing_tokens_changes_nothing() {
    let mut rng = seeded(0x44);
    for _ in 0..CASES * 10 {
        let text = random_text(&mut rng);
        let once = tokenize(&text);
        let twice = tokenize(&once.join(" "));
        assert_eq!(once, twice, "{text:?}");
        assert!(once.iter().all(|t| !t.is_empty()));
    }
}

#[test]
fn token_distance_is_a_bounded_symmetric_cost() {
    let mut rng = seeded(0x55);
    for _ in 0..CASES * 10 {
        let a = random_text(&mut rng);
        let b = random_text(&mut rng);
        let ab = token_distance(&a, &b, 0.2);
        assert_eq!(ab, token_distance(&b, &a, 0.2), "{a:?} / {b:?}");
        assert!((0.0..=1.0).contains(&ab));
        assert_eq!(token_distance(&a, &a, 0.2), 0.0);
    }
}

#[test]
fn search_start_only_moves_forward() {
    let config = AlignerConfig::default();
    let mut rng = seeded(0x66);
    let vocab = ["shine", "on", "me", "bright", "star", "tonight", "glow"];

    for case in 0..CASES {
        let mut t = 0.0;
        let words: Vec<PreparedWord> = (0..rng.gen_range(0..40))
            .map(|_| {
                t += rng.gen_range(0.05..6.0);
                let start = t;
                t += rng.gen_range(0.1..0.7);
                let word = WordToken::new(
                    *vocab.choose(&mut rng).expect("non-empty vocabulary"),
                    start,
                    t,
                    rng.gen_range(0.0..=1.0),
                );
                PreparedWord::new(&word, tokenize(&word.text))
            })
            .collect();

        let mut controller = AnchorController::new(&config, &words, |a: &[String], b: &[String]| {
            sequence_similarity(a, b, config.homophone_cost)
        });
        let mut last_anchor_end = f64::NEG_INFINITY;
        for order in 0..rng.gen_range(1..10) {
            let line: Vec<&str> = (0..rng.gen_range(1..5))
                .map(|_| *vocab.choose(&mut rng).expect("non-empty vocabulary"))
                .collect();
            let text = line.join(" ");
            let before = controller.search_start_timestamp();
            let anchors_before = controller.successful_matches();
            let (placed, placement) = controller.place_line(order, &text, &tokenize(&text));
            let after = controller.search_start_timestamp();

            assert!(after > before, "case {case}: search start went {before} -> {after}");
            match placement {
                Placement::Anchor => {
                    assert!(placed.timestamp >= last_anchor_end - config.anchor_epsilon_secs);
                    assert!(placed.confidence_or_zero() >= config.anchor_threshold);
                    assert_eq!(controller.successful_matches(), anchors_before + 1);
                    last_anchor_end = after;
                }
                Placement::Tentative => {
                    assert!((after - before - config.tentative_advance_secs).abs() < 1e-9);
                    assert_eq!(controller.successful_matches(), anchors_before);
                }
                Placement::Unmatched => {
                    assert_eq!(placed.confidence, None);
                    assert!((after - before - config.unmatched_advance_secs).abs() < 1e-9);
                }
            }
        }
    }
}
