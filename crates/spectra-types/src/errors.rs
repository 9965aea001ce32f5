use thiserror::Error;

pub type Result<T, E = SpectraError> = std::result::Result<T, E>;

/// Unified error type covering failure scenarios across the analysis crates.
///
/// Frame classification outcomes (invalid, replay) are not errors; they are
/// carried as [`crate::validity::FrameValidity`] values.
#[derive(Debug, Error)]
pub enum SpectraError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("vision error: {0}")]
    Vision(String),
    #[error("extraction error: {0}")]
    Extraction(String),
    #[error("player slot {slot} did not finish within {timeout_ms}ms")]
    WorkerTimeout { slot: usize, timeout_ms: u64 },
    #[error("analysis error: {0}")]
    Analysis(String),
    #[error("operational error: {0}")]
    Ops(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SpectraError {
    /// True for faults that abort a single frame rather than the whole run.
    pub fn is_frame_fault(&self) -> bool {
        matches!(
            self,
            SpectraError::Extraction(_) | SpectraError::WorkerTimeout { .. }
        )
    }
}
