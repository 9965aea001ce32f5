use image::RgbImage;
use spectra_types::{
    killfeed::{KillfeedEntry, KILLFEED_SLOTS},
    Result,
};
use tracing::debug;

use crate::{context::MatchContext, extractors::KillfeedExtractor, snapshot::FrameSnapshot};

/// Kill-feed rows read from one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KillfeedScan {
    /// Events not seen on the previous frame, oldest first.
    pub entries: Vec<KillfeedEntry>,
    /// Newest row on screen, whether or not it was already counted.
    pub head: Option<KillfeedEntry>,
}

/// Read the feed top-down and keep only events newer than the previous
/// frame's head.
///
/// Rows are contiguous from the top, so the first empty row ends the scan.
/// Meeting the previous frame's newest event also ends it: that event and
/// everything below it were counted before.
pub fn collect(
    extractor: &dyn KillfeedExtractor,
    frame: &RgbImage,
    ctx: &MatchContext,
) -> Result<KillfeedScan> {
    let reference = ctx.last_frame().and_then(FrameSnapshot::killfeed_head);
    let mut scan = KillfeedScan::default();

    for slot in 0..KILLFEED_SLOTS {
        let Some(entry) = extractor.extract(frame, slot, ctx)? else {
            break;
        };
        if slot == 0 {
            scan.head = Some(entry.clone());
        }
        if reference == Some(&entry) {
            debug!("Kill-feed row {} already counted on previous frame", slot);
            break;
        }
        scan.entries.push(entry);
    }

    scan.entries.reverse();
    Ok(scan)
}
