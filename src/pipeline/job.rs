use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::AlignmentError;
use crate::pipeline::runtime::LyricAligner;
use crate::types::{JobOutcome, TranscriptSegment, WordToken};

type ProgressFn<'a> = dyn Fn(&str, f32) + Send + Sync + 'a;

/// Cooperative stop signal shared between a job and its controller.
///
/// Cancelling is idempotent and sticky for the job it came from.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One alignment run with its own cancel flag and progress hook.
///
/// Only one run may be active per job; a second call while one is running
/// fails with [`AlignmentError::JobInProgress`].
pub struct AlignmentJob<'a> {
    aligner: &'a LyricAligner,
    cancel: CancelHandle,
    running: AtomicBool,
    progress: Option<Box<ProgressFn<'a>>>,
}

impl<'a> AlignmentJob<'a> {
    pub(crate) fn new(aligner: &'a LyricAligner) -> Self {
        Self {
            aligner,
            cancel: CancelHandle::default(),
            running: AtomicBool::new(false),
            progress: None,
        }
    }

    /// Called with a phase name and overall fraction after each phase.
    pub fn with_progress(mut self, progress: impl Fn(&str, f32) + Send + Sync + 'a) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Places every lyric line against the transcript words.
    pub fn align<S: AsRef<str>>(
        &self,
        words: &[WordToken],
        lines: &[S],
    ) -> Result<JobOutcome, AlignmentError> {
        let _guard = RunGuard::acquire(&self.running)?;
        self.aligner.run_align(words, lines, &self.context())
    }

    /// Derives lyric lines from transcript segments alone.
    pub fn extract(&self, segments: &[TranscriptSegment]) -> Result<JobOutcome, AlignmentError> {
        let _guard = RunGuard::acquire(&self.running)?;
        self.aligner.run_extract(segments, &self.context())
    }

    fn context(&self) -> JobContext<'_> {
        JobContext {
            cancel: &self.cancel,
            progress: self.progress.as_deref(),
        }
    }
}

/// What the runtime sees of a job while it runs.
pub(crate) struct JobContext<'j> {
    cancel: &'j CancelHandle,
    progress: Option<&'j ProgressFn<'j>>,
}

impl JobContext<'_> {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn report(&self, phase: &str, fraction: f32) {
        tracing::debug!(phase, fraction, "job progress");
        if let Some(progress) = self.progress {
            progress(phase, fraction.clamp(0.0, 1.0));
        }
    }
}

/// Holds the job's running flag for the duration of one call.
struct RunGuard<'g>(&'g AtomicBool);

impl<'g> RunGuard<'g> {
    fn acquire(flag: &'g AtomicBool) -> Result<Self, AlignmentError> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| AlignmentError::JobInProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
