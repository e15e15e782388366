use std::path::Path;

use crate::config::AlignerConfig;
use crate::error::AlignmentError;
use crate::pipeline::defaults::{AlphanumericTokenizer, PhoneticDtwScorer};
use crate::pipeline::runtime::{LyricAligner, LyricAlignerParts};
use crate::pipeline::traits::{SequenceScorer, Tokenizer};

pub struct LyricAlignerBuilder {
    config: AlignerConfig,
    tokenizer: Option<Box<dyn Tokenizer>>,
    sequence_scorer: Option<Box<dyn SequenceScorer>>,
}

impl LyricAlignerBuilder {
    pub fn new(config: AlignerConfig) -> Self {
        Self {
            config,
            tokenizer: None,
            sequence_scorer: None,
        }
    }

    /// Starts from a JSON config file; missing keys take their defaults.
    pub fn from_config_file(path: &Path) -> Result<Self, AlignmentError> {
        Ok(Self::new(AlignerConfig::load(path)?))
    }

    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = Some(tokenizer);
        self
    }

    pub fn with_sequence_scorer(mut self, sequence_scorer: Box<dyn SequenceScorer>) -> Self {
        self.sequence_scorer = Some(sequence_scorer);
        self
    }

    pub fn build(self) -> Result<LyricAligner, AlignmentError> {
        self.config.validate()?;
        let homophone_cost = self.config.homophone_cost;

        Ok(LyricAligner::from_parts(LyricAlignerParts {
            config: self.config,
            tokenizer: self
                .tokenizer
                .unwrap_or_else(|| Box::new(AlphanumericTokenizer)),
            sequence_scorer: self
                .sequence_scorer
                .unwrap_or_else(|| Box::new(PhoneticDtwScorer { homophone_cost })),
        }))
    }
}
