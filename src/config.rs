//! Service configuration. Loaded from JSON; every section falls back to defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file with student, academic, attendance and fee records
    pub database_path: PathBuf,
    /// External (or in-process) scoring backend
    pub scoring: ScoringConfig,
    /// Risk bucket thresholds
    pub risk: RiskConfig,
    /// At-risk scan parameters
    pub scan: ScanConfig,
    /// Local model training / label synthesis
    pub training: TrainingConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringBackend {
    Remote,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub backend: ScoringBackend,
    /// Base URL of the prediction service
    pub endpoint: String,
    /// Upper bound for a whole request, per student
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Score at or above this is high risk (0.0–1.0)
    pub high_threshold: f64,
    /// Score at or above this is medium risk
    pub medium_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Students scored concurrently
    pub workers: usize,
    /// Rescan interval; 0 runs a single scan
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub epochs: usize,
    pub learning_rate: f64,
    /// Fixes the label draws and makes training reproducible
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("erp.db"),
            scoring: ScoringConfig::default(),
            risk: RiskConfig::default(),
            scan: ScanConfig::default(),
            training: TrainingConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            backend: ScoringBackend::Remote,
            endpoint: "http://localhost:5001".to_string(),
            timeout_secs: 15,
            connect_timeout_secs: 5,
        }
    }
}

impl ScoringConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            high_threshold: 0.7,
            medium_threshold: 0.4,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            interval_secs: 0,
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 500,
            learning_rate: 0.1,
            seed: None,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl AppConfig {
    /// Load from JSON file if present; otherwise return default
    pub fn load(path: &std::path::Path) -> Self {
        if path.exists() {
            if let Ok(data) = std::fs::read_to_string(path) {
                if let Ok(c) = serde_json::from_str::<AppConfig>(&data) {
                    return c;
                }
            }
        }
        Self::default()
    }
}
