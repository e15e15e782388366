/// Splits text into comparable tokens. Used for lyric lines and transcript words alike.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Scores how well a heard token run matches a lyric line, in [0, 1].
pub trait SequenceScorer: Send + Sync {
    fn similarity(&self, lyric: &[String], heard: &[String]) -> f32;
}
