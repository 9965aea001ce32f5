//! Per-frame analysis core: player dispatch, kill-feed dedup, validity gates
//! and match-scoped avatar templates.

pub mod analyzer;
pub mod avatars;
pub mod context;
pub mod dispatch;
pub mod extractors;
pub mod killfeed;
pub mod progress;
pub mod snapshot;
pub mod validation;

#[cfg(test)]
mod test_support;

use spectra_types::SpectraError;

pub use analyzer::FrameAnalyzer;
pub use avatars::{AvatarTemplates, SlotAvatars};
pub use context::MatchContext;
pub use extractors::{KillfeedExtractor, PlayerExtractor, PlayerRequest};
pub use progress::TracingProgress;
pub use snapshot::{FrameSnapshot, SampledFrame};

pub fn analysis_error(message: impl Into<String>) -> SpectraError {
    SpectraError::Analysis(message.into())
}

pub fn extraction_error(message: impl Into<String>) -> SpectraError {
    SpectraError::Extraction(message.into())
}
