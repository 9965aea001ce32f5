//! Operational helpers: logging and per-match analysis telemetry.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spectra_types::{
    config::OpsConfig,
    progress::{FrameReport, ProgressReporter},
    validity::FrameValidity,
    Result, SpectraError,
};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_tracing(config: &OpsConfig) -> Result<()> {
    let filter = EnvFilter::try_new(config.log_level.clone())
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|err| SpectraError::Ops(format!("failed to create log filter: {err}")))?;

    fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| SpectraError::Ops(format!("tracing init error: {err}")))?;
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameTiming {
    pub timestamp: f64,
    pub outcome: String,
    pub elapsed_ms: u64,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisTelemetry {
    pub started_at: DateTime<Utc>,
    pub valid: usize,
    pub invalid: usize,
    pub replay: usize,
    pub failed: usize,
    pub timings: Vec<FrameTiming>,
}

impl AnalysisTelemetry {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            valid: 0,
            invalid: 0,
            replay: 0,
            failed: 0,
            timings: Vec::new(),
        }
    }

    pub fn total_frames(&self) -> usize {
        self.valid + self.invalid + self.replay + self.failed
    }

    /// Mean analysis time over classified frames.
    pub fn mean_elapsed_ms(&self) -> Option<f64> {
        if self.timings.is_empty() {
            return None;
        }
        let total: u64 = self.timings.iter().map(|timing| timing.elapsed_ms).sum();
        Some(total as f64 / self.timings.len() as f64)
    }
}

/// In-memory telemetry for one analysis run. Clones share the same counters.
#[derive(Debug, Clone)]
pub struct TelemetryStore {
    inner: Arc<Mutex<AnalysisTelemetry>>,
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(AnalysisTelemetry::new())),
        }
    }

    pub fn snapshot(&self) -> AnalysisTelemetry {
        self.lock().clone()
    }

    /// Write the current telemetry as pretty JSON into `dir`.
    pub fn export_json(&self, dir: &str) -> Result<PathBuf> {
        let dir = ensure_telemetry_dir(dir)?;
        let telemetry = self.snapshot();
        let path = dir.join(format!(
            "analysis-{}.json",
            telemetry.started_at.format("%Y%m%dT%H%M%S")
        ));
        let body = serde_json::to_string_pretty(&telemetry)
            .map_err(|err| SpectraError::Ops(format!("failed to encode telemetry: {err}")))?;
        write_file(&path, &body)?;
        info!(
            "Telemetry for {} frames written to {:?}",
            telemetry.total_frames(),
            path
        );
        Ok(path)
    }

    fn lock(&self) -> MutexGuard<'_, AnalysisTelemetry> {
        // Counters stay meaningful even if a reporter call panicked mid-update.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProgressReporter for TelemetryStore {
    fn frame_analyzed(&self, report: &FrameReport) {
        let mut telemetry = self.lock();
        match report.validity {
            FrameValidity::Valid => telemetry.valid += 1,
            FrameValidity::Invalid { .. } => telemetry.invalid += 1,
            FrameValidity::Replay { .. } => telemetry.replay += 1,
            FrameValidity::Pending => return,
        }
        telemetry.timings.push(FrameTiming {
            timestamp: report.timestamp,
            outcome: report.validity.label().to_string(),
            elapsed_ms: report.elapsed.as_millis() as u64,
            recorded_at: Utc::now(),
        });
    }

    fn frame_failed(&self, _timestamp: f64, _error: &SpectraError) {
        self.lock().failed += 1;
    }
}

pub fn ensure_telemetry_dir(path: &str) -> Result<PathBuf> {
    let dir = PathBuf::from(path);
    fs::create_dir_all(&dir)
        .map_err(|err| SpectraError::Ops(format!("failed to create telemetry dir: {err}")))?;
    info!("Telemetry directory ready at {:?}", dir);
    Ok(dir)
}

fn write_file(path: &Path, body: &str) -> Result<()> {
    fs::write(path, body)
        .map_err(|err| SpectraError::Ops(format!("failed to write {}: {err}", path.display())))
}
