use crate::alignment::distance::sequence_similarity;
use crate::alignment::tokenization::tokenize;
use crate::pipeline::traits::{SequenceScorer, Tokenizer};

pub struct AlphanumericTokenizer;

impl Tokenizer for AlphanumericTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize(text)
    }
}

/// DTW over tokens with a homophone-aware substitution cost.
pub struct PhoneticDtwScorer {
    pub homophone_cost: f32,
}

impl SequenceScorer for PhoneticDtwScorer {
    fn similarity(&self, lyric: &[String], heard: &[String]) -> f32 {
        sequence_similarity(lyric, heard, self.homophone_cost)
    }
}
