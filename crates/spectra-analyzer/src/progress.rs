use spectra_types::{
    progress::{FrameReport, ProgressReporter},
    SpectraError,
};
use tracing::{debug, info, warn};

/// Reports frame progress through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn frame_started(&self, timestamp: f64) {
        debug!("Analysing frame at {:.2}s", timestamp);
    }

    fn frame_analyzed(&self, report: &FrameReport) {
        info!(
            "Frame {:.2}s: {} ({} live, {} new kills) in {}ms",
            report.timestamp,
            report.validity.label(),
            report.live_players,
            report.killfeed_entries,
            report.elapsed.as_millis()
        );
    }

    fn frame_failed(&self, timestamp: f64, error: &SpectraError) {
        warn!("Frame {:.2}s could not be analysed: {}", timestamp, error);
    }
}
