//! Pixel-level building blocks for frame analysis.

pub mod pixels;
pub mod similarity;
pub mod stats;
pub mod templates;

use spectra_types::SpectraError;

pub use pixels::{crop, overlay, pixel_at, resize, solid_fill};
pub use similarity::structural_similarity;
pub use stats::ChannelStats;
pub use templates::ReferenceTemplates;

pub fn vision_error(message: impl Into<String>) -> SpectraError {
    SpectraError::Vision(message.into())
}
