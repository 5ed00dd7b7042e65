//! Training set assembly: every student with readable aggregations, labelled by the
//! bootstrap synthesizer.

use crate::error::{Result, RiskError};
use crate::features::{synthesize_label, FeatureExtractor, TrainingRecord};
use crate::records::RecordSource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::info;

pub struct TrainingSetBuilder {
    source: Arc<dyn RecordSource>,
    extractor: FeatureExtractor,
    seed: Option<u64>,
}

impl TrainingSetBuilder {
    pub fn new(source: Arc<dyn RecordSource>, seed: Option<u64>) -> Self {
        Self {
            extractor: FeatureExtractor::new(source.clone()),
            source,
            seed,
        }
    }

    /// Build with the configured seed, or thread randomness when unseeded.
    pub fn build(&self) -> Result<Vec<TrainingRecord>> {
        match self.seed {
            Some(seed) => self.build_with_rng(&mut StdRng::seed_from_u64(seed)),
            None => self.build_with_rng(&mut rand::thread_rng()),
        }
    }

    /// Students whose features cannot be extracted are dropped. An empty result is an error.
    pub fn build_with_rng<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<TrainingRecord>> {
        let students = self.source.students()?;
        let total = students.len();
        let records: Vec<TrainingRecord> = students
            .iter()
            .filter_map(|s| self.extractor.extract_features(&s.id))
            .map(|features| TrainingRecord {
                dropout: synthesize_label(&features, &mut *rng),
                features,
            })
            .collect();

        if records.is_empty() {
            return Err(RiskError::EmptyTrainingSet);
        }
        let positives = records.iter().filter(|r| r.dropout).count();
        info!(
            students = total,
            records = records.len(),
            skipped = total - records.len(),
            positives,
            "training set built"
        );
        Ok(records)
    }
}
