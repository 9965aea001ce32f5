use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{validity::FrameValidity, SpectraError};

/// Summary of one analysed frame, handed to progress reporters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub timestamp: f64,
    pub validity: FrameValidity,
    pub live_players: usize,
    pub killfeed_entries: usize,
    pub elapsed: Duration,
}

/// Capability the analyzer calls at fixed points of each frame.
///
/// Passed in at construction; there is no process-wide reporter.
pub trait ProgressReporter: Send + Sync {
    fn frame_started(&self, _timestamp: f64) {}
    fn frame_analyzed(&self, _report: &FrameReport) {}
    fn frame_failed(&self, _timestamp: f64, _error: &SpectraError) {}
}

/// Reporter that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {}
