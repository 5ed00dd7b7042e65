//! Scoring service boundary: train, predict, feature importance.
//!
//! - [`HttpScoringClient`] - remote prediction service over HTTP
//! - [`LocalScorer`] - in-process logistic model, usable offline

mod http;
mod local;

pub use http::HttpScoringClient;
pub use local::LocalScorer;

use crate::config::{AppConfig, ScoringBackend};
use crate::error::Result;
use crate::features::{FeatureVector, TrainingRecord};
use crate::risk::RiskLevel;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Whatever the backend reports after training (accuracy, sample count, ...).
pub type TrainingSummary = serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reason {
    pub factor: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    /// Dropout probability in [0, 1]
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub top_reasons: Vec<Reason>,
}

/// A dropout classifier. Implementations perform no retries; callers decide.
pub trait ScoringService: Send + Sync {
    fn train(&self, training_set: &[TrainingRecord]) -> Result<TrainingSummary>;

    /// Score one student. The payload never carries a label.
    fn predict(&self, features: &FeatureVector) -> Result<Prediction>;

    fn feature_importance(&self) -> Result<serde_json::Value>;
}

/// Build the backend selected in config.
pub fn from_config(config: &AppConfig) -> Result<Arc<dyn ScoringService>> {
    let scorer: Arc<dyn ScoringService> = match config.scoring.backend {
        ScoringBackend::Remote => Arc::new(HttpScoringClient::new(&config.scoring)?),
        ScoringBackend::Local => Arc::new(LocalScorer::new(
            config.risk.clone(),
            config.training.clone(),
        )),
    };
    Ok(scorer)
}
