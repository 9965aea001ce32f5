use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{game_type::GameType, Result, SpectraError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub game_type: GameType,
    /// Directory holding the replay icon, hero avatars and ult charge digits.
    pub template_dir: String,
    /// Player extraction pool size; defaults to the available parallelism.
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_worker_timeout_ms")]
    pub worker_timeout_ms: u64,
}

impl AnalyzerConfig {
    pub fn worker_timeout(&self) -> Duration {
        Duration::from_millis(self.worker_timeout_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == Some(0) {
            return Err(SpectraError::Configuration(
                "analyzer.worker_threads must be greater than zero".into(),
            ));
        }
        if self.worker_timeout_ms == 0 {
            return Err(SpectraError::Configuration(
                "analyzer.worker_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.template_dir.trim().is_empty() {
            return Err(SpectraError::Configuration(
                "analyzer.template_dir must not be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_worker_timeout_ms() -> u64 {
    10_000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsConfig {
    pub log_level: String,
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpectraConfig {
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub ops: OpsConfig,
}

impl SpectraConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref).map_err(|err| {
            SpectraError::Configuration(format!(
                "unable to read config file {}: {err}",
                path_ref.display()
            ))
        })?;
        toml::from_str(&contents).map_err(|err| {
            SpectraError::Configuration(format!(
                "failed to parse config file {}: {err}",
                path_ref.display()
            ))
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.analyzer.validate()?;
        if self.ops.log_level.trim().is_empty() {
            return Err(SpectraError::Configuration(
                "ops.log_level must not be empty".into(),
            ));
        }
        Ok(())
    }
}
