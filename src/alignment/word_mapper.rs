use std::collections::HashMap;

use crate::alignment::tokenization::parse_lyric_lines;
use crate::types::{MappedWord, WordToken};

/// Assumed duration of each trailing word with no later match to aim at.
const TRAILING_SECS_PER_WORD: f64 = 0.5;
/// Fraction of the interpolation step an interpolated word lasts.
const INTERPOLATED_FILL: f64 = 0.8;

/// Maps every word of the user's lyrics onto transcript timing.
///
/// Words that appear in a common run with the transcript take that word's
/// timing directly. The rest are spread between the surrounding matched
/// words, each filled slot becoming the lower bound for the next.
pub fn map_words(lyrics_text: &str, transcript: &[WordToken]) -> Vec<MappedWord> {
    let truth: Vec<String> = parse_lyric_lines(lyrics_text)
        .iter()
        .flat_map(|line| line.split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .collect();
    let clean_truth: Vec<String> = truth.iter().map(|w| clean_word(w)).collect();
    let clean_heard: Vec<String> = transcript.iter().map(|w| clean_word(&w.text)).collect();

    let mut slots: Vec<Option<(f64, f64)>> = vec![None; truth.len()];
    for block in matching_blocks(&clean_truth, &clean_heard) {
        for k in 0..block.size {
            let heard = &transcript[block.b + k];
            slots[block.a + k] = Some((round_ms(heard.start), round_ms(heard.end)));
        }
    }
    let matched: Vec<bool> = slots.iter().map(Option::is_some).collect();

    for i in 0..slots.len() {
        if slots[i].is_some() {
            continue;
        }
        let (prev_idx, prev_time) = (0..i)
            .rev()
            .find_map(|p| slots[p].map(|(_, end)| (p as isize, end)))
            .unwrap_or((-1, 0.0));
        let (next_idx, next_time) = (i + 1..slots.len())
            .find_map(|q| slots[q].map(|(start, _)| (q as isize, start)))
            .unwrap_or_else(|| {
                let end = slots.len() as isize;
                let assumed = prev_time + TRAILING_SECS_PER_WORD * (end - prev_idx) as f64;
                (end, assumed)
            });

        let step = ((next_time - prev_time) / (next_idx - prev_idx) as f64).max(0.0);
        let start = round_ms(prev_time + step * (i as isize - prev_idx) as f64);
        let end = round_ms(start + step * INTERPOLATED_FILL);
        slots[i] = Some((start, end));
    }

    let mapped: Vec<MappedWord> = truth
        .into_iter()
        .zip(slots)
        .zip(matched)
        .map(|((word, slot), matched)| {
            let (start, end) = slot.unwrap_or_default();
            MappedWord {
                word,
                start,
                end,
                matched,
            }
        })
        .collect();

    tracing::debug!(
        words = mapped.len(),
        matched = mapped.iter().filter(|w| w.matched).count(),
        "word mapper: lyrics mapped onto transcript"
    );
    mapped
}

fn clean_word(word: &str) -> String {
    word.chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn round_ms(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Block {
    a: usize,
    b: usize,
    size: usize,
}

/// Non-overlapping equal runs between `a` and `b`, ordered by position.
///
/// Takes the longest common run, then recurses on the pieces to its left and
/// right. Empty tokens never match.
fn matching_blocks(a: &[String], b: &[String]) -> Vec<Block> {
    let mut b_index: HashMap<&str, Vec<usize>> = HashMap::new();
    for (j, token) in b.iter().enumerate() {
        if !token.is_empty() {
            b_index.entry(token.as_str()).or_default().push(j);
        }
    }

    let mut blocks = Vec::new();
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let block = longest_block(a, &b_index, alo, ahi, blo, bhi);
        if block.size == 0 {
            continue;
        }
        if alo < block.a && blo < block.b {
            pending.push((alo, block.a, blo, block.b));
        }
        if block.a + block.size < ahi && block.b + block.size < bhi {
            pending.push((block.a + block.size, ahi, block.b + block.size, bhi));
        }
        blocks.push(block);
    }
    blocks.sort_by_key(|block| (block.a, block.b));
    blocks
}

/// Longest run with `a[i..i+k] == b[j..j+k]` inside the given bounds.
/// Ties go to the smallest `i`, then the smallest `j`.
fn longest_block(
    a: &[String],
    b_index: &HashMap<&str, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> Block {
    let mut best = Block {
        a: alo,
        b: blo,
        size: 0,
    };
    let mut run_ending_at: HashMap<usize, usize> = HashMap::new();

    for (i, token) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_runs = HashMap::new();
        if let Some(positions) = b_index.get(token.as_str()) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| run_ending_at.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_runs.insert(j, k);
                if k > best.size {
                    best = Block {
                        a: i + 1 - k,
                        b: j + 1 - k,
                        size: k,
                    };
                }
            }
        }
        run_ending_at = next_runs;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heard(entries: &[(&str, f64, f64)]) -> Vec<WordToken> {
        entries.iter()
            .map(|(w, s, e)| WordToken::new(*w, *s, *e, 0.9))
            .collect()
    }

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn exact_transcript_copies_timing() {
        let transcript = heard(&[("Hello,", 0.0, 0.4), ("world", 0.5, 1.0)]);
        let mapped = map_words("hello World!", &transcript);
        assert_eq!(mapped.len(), 2);
        assert!(mapped.iter().all(|w| w.matched));
        assert_eq!(mapped[1].word, "World!");
        assert_eq!((mapped[1].start, mapped[1].end), (0.5, 1.0));
    }

    #[test]
    fn missing_word_is_placed_between_neighbours() {
        let transcript = heard(&[("hold", 1.0, 1.4), ("close", 2.0, 2.4), ("tonight", 2.5, 3.0)]);
        let mapped = map_words("hold me close tonight", &transcript);
        assert!(!mapped[1].matched);
        assert!((mapped[1].start - 1.7).abs() < 1e-9);
        assert!((mapped[1].end - 1.94).abs() < 1e-9);
        assert_eq!(mapped[2].start, 2.0);
    }

    #[test]
    fn trailing_words_assume_half_a_second_each() {
        let transcript = heard(&[("hello", 0.0, 0.5)]);
        let mapped = map_words("hello world again", &transcript);
        assert!((mapped[1].start - 1.0).abs() < 1e-9);
        assert!((mapped[1].end - 1.4).abs() < 1e-9);
        assert!((mapped[2].start - 1.9).abs() < 1e-9);
        assert!((mapped[2].end - 2.3).abs() < 1e-9);
    }

    #[test]
    fn leading_words_count_from_zero() {
        let transcript = heard(&[("hello", 2.0, 2.5)]);
        let mapped = map_words("oh hello", &transcript);
        assert!((mapped[0].start - 1.0).abs() < 1e-9);
        assert!((mapped[0].end - 1.8).abs() < 1e-9);
        assert!(mapped[1].matched);
    }

    #[test]
    fn section_markers_are_not_mapped() {
        let transcript = heard(&[("la", 0.0, 0.3)]);
        let mapped = map_words("[Chorus]\nla", &transcript);
        assert_eq!(mapped.len(), 1);
        assert_eq!(mapped[0].word, "la");
    }

    #[test]
    fn empty_inputs() {
        assert!(map_words("", &heard(&[("la", 0.0, 1.0)])).is_empty());
        let mapped = map_words("la la", &[]);
        assert_eq!(mapped.len(), 2);
        assert!(mapped.iter().all(|w| !w.matched));
        assert!(mapped[0].start < mapped[1].start);
    }

    #[test]
    fn blocks_prefer_the_longest_run() {
        let a = toks(&["a", "b", "c", "x", "d"]);
        let b = toks(&["b", "c", "d", "a", "b", "c"]);
        let blocks = matching_blocks(&a, &b);
        assert_eq!(blocks[0], Block { a: 0, b: 3, size: 3 });
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn blocks_recurse_on_both_sides() {
        let a = toks(&["x", "one", "two", "y", "three"]);
        let b = toks(&["one", "two", "z", "three"]);
        let blocks = matching_blocks(&a, &b);
        assert_eq!(
            blocks,
            vec![Block { a: 1, b: 0, size: 2 }, Block { a: 4, b: 3, size: 1 }]
        );
    }
}
