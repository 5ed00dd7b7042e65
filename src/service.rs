//! Entry points for callers such as a dashboard route layer. Collaborators are injected;
//! nothing here is process-global.

use crate::error::{Result, RiskError};
use crate::features::FeatureExtractor;
use crate::predictor::{Prediction, ScoringService, TrainingSummary};
use crate::records::{RecordSource, StudentId};
use crate::risk::{AtRiskResult, AtRiskScanner, ScanReport};
use crate::training::TrainingSetBuilder;
use serde_json::Value;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub struct DropoutService {
    source: Arc<dyn RecordSource>,
    scorer: Arc<dyn ScoringService>,
    extractor: FeatureExtractor,
    scanner: AtRiskScanner,
    training: TrainingSetBuilder,
}

impl DropoutService {
    pub fn new(
        source: Arc<dyn RecordSource>,
        scorer: Arc<dyn ScoringService>,
        workers: usize,
        seed: Option<u64>,
    ) -> Self {
        Self {
            extractor: FeatureExtractor::new(source.clone()),
            scanner: AtRiskScanner::new(source.clone(), scorer.clone(), workers),
            training: TrainingSetBuilder::new(source.clone(), seed),
            source,
            scorer,
        }
    }

    /// Ranked Medium/High students; per-student failures are logged and skipped.
    pub fn scan_at_risk(&self) -> Result<Vec<AtRiskResult>> {
        self.scanner.scan_at_risk()
    }

    /// Full scan with partial-failure counts; stops early when `cancel` is set.
    pub fn scan_report(&self, cancel: &AtomicBool) -> Result<ScanReport> {
        self.scanner.scan_with_cancel(cancel)
    }

    /// Single-student prediction. Every failure propagates.
    pub fn predict_for_student(&self, raw_id: &str) -> Result<Prediction> {
        let id = StudentId::parse(raw_id)?;
        if self.source.student(&id)?.is_none() {
            return Err(RiskError::StudentNotFound(id.to_string()));
        }
        let features = self.extractor.extract(&id)?;
        let prediction = self.scorer.predict(&features)?;
        info!(
            student_id = %id,
            risk_score = prediction.risk_score,
            risk_level = %prediction.risk_level,
            "student risk predicted"
        );
        Ok(prediction)
    }

    /// Build the bootstrap training set and send it to the scoring backend.
    pub fn train_model(&self) -> Result<TrainingSummary> {
        let set = self.training.build()?;
        self.scorer.train(&set)
    }

    pub fn get_feature_importance(&self) -> Result<Value> {
        self.scorer.feature_importance()
    }
}
