use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("invalid aligner config: {message}")]
    InvalidConfig { message: String },
    #[error("no lyric lines to align")]
    NoLyricsProvided,
    #[error("transcript contains no words")]
    EmptyTranscript,
    #[error("transcript contains only instrumental or non-lyrical content")]
    InstrumentalOnly,
    #[error("an alignment is already running on this job")]
    JobInProgress,
}

impl AlignmentError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// True for failures that describe the input itself rather than the engine.
    pub fn is_input_failure(&self) -> bool {
        matches!(
            self,
            Self::NoLyricsProvided | Self::EmptyTranscript | Self::InstrumentalOnly
        )
    }
}
