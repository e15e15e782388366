pub mod alignment;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod transcript;
pub mod types;

pub use alignment::report::{diagnose, ResultDiagnostics};
pub use alignment::tokenization::{parse_lyric_lines, tokenize};
pub use alignment::word_mapper::map_words;
pub use config::AlignerConfig;
pub use error::AlignmentError;
pub use pipeline::builder::LyricAlignerBuilder;
pub use pipeline::defaults::{AlphanumericTokenizer, PhoneticDtwScorer};
pub use pipeline::job::{AlignmentJob, CancelHandle};
pub use pipeline::runtime::LyricAligner;
pub use pipeline::traits::{SequenceScorer, Tokenizer};
pub use types::{
    AlignedLyricLine, AutoTimestampResult, JobOutcome, MappedWord, Transcript, TranscriptSegment,
    VoiceSegment, WordToken,
};
