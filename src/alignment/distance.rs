use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Groups of words a transcriber commonly swaps for one another.
/// Entries are stored in normalized form (bare lowercase letters).
const HOMOPHONE_GROUPS: &[&[&str]] = &[
    &["to", "too", "two"],
    &["their", "there", "theyre"],
    &["your", "youre"],
    &["here", "hear"],
    &["no", "know"],
    &["for", "four", "fore"],
    &["be", "bee"],
    &["see", "sea"],
    &["write", "right", "rite"],
    &["night", "knight"],
    &["by", "buy", "bye"],
    &["one", "won"],
    &["eye", "i"],
    &["where", "wear"],
    &["new", "knew"],
    &["whole", "hole"],
    &["dear", "deer"],
    &["meet", "meat"],
    &["weight", "wait"],
];

static HOMOPHONE_INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    HOMOPHONE_GROUPS
        .iter()
        .enumerate()
        .flat_map(|(group, words)| words.iter().map(move |w| (*w, group)))
        .collect()
});

/// Bare lowercase letters; digits and punctuation dropped.
pub fn normalize_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn are_homophones(a: &str, b: &str) -> bool {
    match (HOMOPHONE_INDEX.get(a), HOMOPHONE_INDEX.get(b)) {
        (Some(ga), Some(gb)) => ga == gb,
        _ => false,
    }
}

/// Cost of substituting `b` for `a`, in [0, 1].
///
/// Equal tokens cost 0, listed homophones cost `homophone_cost`, anything
/// else costs the Levenshtein distance normalized by the longer token.
pub fn token_distance(a: &str, b: &str, homophone_cost: f32) -> f32 {
    let a = normalize_token(a);
    let b = normalize_token(b);
    if a == b {
        return 0.0;
    }
    if are_homophones(&a, &b) {
        return homophone_cost;
    }
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }
    strsim::levenshtein(&a, &b) as f32 / longest as f32
}

/// Classic DTW over two token sequences, normalized by the longer length.
///
/// Returns `None` when either side is empty.
pub fn dtw_cost(lyric: &[String], heard: &[String], homophone_cost: f32) -> Option<f32> {
    let n = lyric.len();
    let m = heard.len();
    if n == 0 || m == 0 {
        return None;
    }

    let mut prev = vec![f32::INFINITY; m + 1];
    let mut curr = vec![f32::INFINITY; m + 1];
    prev[0] = 0.0;

    for lyric_token in lyric {
        curr[0] = f32::INFINITY;
        for j in 1..=m {
            let cost = token_distance(lyric_token, &heard[j - 1], homophone_cost);
            let best = prev[j].min(curr[j - 1]).min(prev[j - 1]);
            curr[j] = cost + best;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    Some(prev[m] / n.max(m) as f32)
}

/// `1 / (1 + dtw_cost)`, or 0 when either side is empty.
pub fn sequence_similarity(lyric: &[String], heard: &[String], homophone_cost: f32) -> f32 {
    dtw_cost(lyric, heard, homophone_cost)
        .map(|cost| 1.0 / (1.0 + cost))
        .unwrap_or(0.0)
}
