//! In-process scoring backend: logistic regression over standardized features,
//! trained by batch gradient descent. Before training it scores with the bootstrap
//! formula so an offline deployment still ranks students.

use super::{Prediction, Reason, ScoringService, TrainingSummary};
use crate::config::{RiskConfig, TrainingConfig};
use crate::error::{Result, RiskError};
use crate::features::{dropout_score, FeatureVector, TrainingRecord};
use crate::risk::RiskLevel;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use std::sync::RwLock;
use tracing::info;

const N_FEATURES: usize = FeatureVector::NAMES.len();
const MAX_REASONS: usize = 3;
const IMPORTANCE_FLOOR: f64 = 0.1;

#[derive(Debug, Clone)]
struct LogisticModel {
    means: [f64; N_FEATURES],
    scales: [f64; N_FEATURES],
    weights: [f64; N_FEATURES],
    bias: f64,
    trained_at: DateTime<Utc>,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl LogisticModel {
    fn fit(records: &[TrainingRecord], epochs: usize, learning_rate: f64) -> Self {
        let n = records.len() as f64;
        let rows: Vec<[f64; N_FEATURES]> = records.iter().map(|r| r.features.as_array()).collect();
        let labels: Vec<f64> = records.iter().map(|r| f64::from(u8::from(r.dropout))).collect();

        let mut means = [0.0; N_FEATURES];
        let mut scales = [1.0; N_FEATURES];
        for j in 0..N_FEATURES {
            means[j] = rows.iter().map(|x| x[j]).sum::<f64>() / n;
            let var = rows.iter().map(|x| (x[j] - means[j]).powi(2)).sum::<f64>() / n;
            if var > f64::EPSILON {
                scales[j] = var.sqrt();
            }
        }
        let z: Vec<[f64; N_FEATURES]> = rows
            .iter()
            .map(|x| std::array::from_fn(|j| (x[j] - means[j]) / scales[j]))
            .collect();

        let mut weights = [0.0; N_FEATURES];
        let mut bias = 0.0;
        for _ in 0..epochs {
            let mut grad_w = [0.0; N_FEATURES];
            let mut grad_b = 0.0;
            for (x, y) in z.iter().zip(&labels) {
                let p = sigmoid(bias + dot(&weights, x));
                let err = p - y;
                for j in 0..N_FEATURES {
                    grad_w[j] += err * x[j];
                }
                grad_b += err;
            }
            for j in 0..N_FEATURES {
                weights[j] -= learning_rate * grad_w[j] / n;
            }
            bias -= learning_rate * grad_b / n;
        }

        Self {
            means,
            scales,
            weights,
            bias,
            trained_at: Utc::now(),
        }
    }

    fn probability(&self, features: &FeatureVector) -> f64 {
        let x = features.as_array();
        let z: [f64; N_FEATURES] = std::array::from_fn(|j| (x[j] - self.means[j]) / self.scales[j]);
        sigmoid(self.bias + dot(&self.weights, &z))
    }

    /// Absolute weights normalized to sum to 1.
    fn importance(&self) -> [f64; N_FEATURES] {
        let total: f64 = self.weights.iter().map(|w| w.abs()).sum();
        if total <= f64::EPSILON {
            return [0.0; N_FEATURES];
        }
        std::array::from_fn(|j| self.weights[j].abs() / total)
    }
}

fn dot(a: &[f64; N_FEATURES], b: &[f64; N_FEATURES]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn title_case(name: &str) -> String {
    name.split('_')
        .map(|w| {
            let mut c = w.chars();
            match c.next() {
                Some(first) => first.to_uppercase().chain(c).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn reason(factor: &str, description: String, impact: &str) -> Reason {
    Reason {
        factor: factor.to_string(),
        description,
        impact: Some(impact.to_string()),
    }
}

/// Rule-based explanations first, then the most important model features; unique by factor.
fn top_reasons(f: &FeatureVector, importance: Option<&[f64; N_FEATURES]>) -> Vec<Reason> {
    let mut reasons = Vec::new();
    if f.attendance < 75.0 {
        reasons.push(reason(
            "Low Attendance",
            format!("Attendance is below 75% ({:.1}%)", f.attendance),
            "High",
        ));
    }
    if f.cgpa < 2.5 {
        reasons.push(reason(
            "Low Academic Performance",
            format!("CGPA is below 2.5 ({:.2})", f.cgpa),
            "High",
        ));
    }
    if f.backlogs > 2 {
        reasons.push(reason(
            "Multiple Backlogs",
            format!("Student has {} backlogs", f.backlogs),
            "Medium",
        ));
    }
    if f.assignments_submitted < 5 {
        reasons.push(reason(
            "Low Assignment Submission",
            format!("Only {} assignments submitted", f.assignments_submitted),
            "Medium",
        ));
    }
    if f.pending_fee_ratio > 0.3 {
        reasons.push(reason(
            "High Pending Fees",
            format!("Student has {:.1}% of fees pending", f.pending_fee_ratio * 100.0),
            "Medium",
        ));
    }

    if let Some(importance) = importance {
        let mut ranked: Vec<(&str, f64)> = FeatureVector::NAMES
            .iter()
            .copied()
            .zip(importance.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        for (name, weight) in ranked.into_iter().take(MAX_REASONS) {
            if weight > IMPORTANCE_FLOOR {
                reasons.push(reason(
                    &title_case(name),
                    format!("Feature '{}' has high importance ({:.2}) in prediction", name, weight),
                    "Medium",
                ));
            }
        }
    }

    let mut seen = std::collections::HashSet::new();
    reasons.retain(|r| seen.insert(r.factor.clone()));
    reasons.truncate(MAX_REASONS);
    reasons
}

pub struct LocalScorer {
    risk: RiskConfig,
    training: TrainingConfig,
    model: RwLock<Option<LogisticModel>>,
}

impl LocalScorer {
    pub fn new(risk: RiskConfig, training: TrainingConfig) -> Self {
        Self {
            risk,
            training,
            model: RwLock::new(None),
        }
    }

    pub fn is_trained(&self) -> bool {
        self.model.read().map(|m| m.is_some()).unwrap_or(false)
    }

    fn current(&self) -> Option<LogisticModel> {
        self.model.read().ok().and_then(|m| m.clone())
    }
}

impl ScoringService for LocalScorer {
    fn train(&self, training_set: &[TrainingRecord]) -> Result<TrainingSummary> {
        if training_set.is_empty() {
            return Err(RiskError::EmptyTrainingSet);
        }
        let model = LogisticModel::fit(
            training_set,
            self.training.epochs,
            self.training.learning_rate,
        );
        let correct = training_set
            .iter()
            .filter(|r| (model.probability(&r.features) >= 0.5) == r.dropout)
            .count();
        let accuracy = correct as f64 / training_set.len() as f64;
        let trained_at = model.trained_at;
        match self.model.write() {
            Ok(mut slot) => *slot = Some(model),
            Err(poisoned) => *poisoned.into_inner() = Some(model),
        }
        info!(samples = training_set.len(), accuracy, "local model trained");
        Ok(json!({
            "success": true,
            "message": "Model trained successfully",
            "samples": training_set.len(),
            "accuracy": accuracy,
            "trained_at": trained_at.to_rfc3339(),
        }))
    }

    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        let model = self.current();
        let risk_score = match &model {
            Some(m) => m.probability(features),
            None => dropout_score(features),
        };
        let importance = model.as_ref().map(LogisticModel::importance);
        Ok(Prediction {
            risk_score,
            risk_level: RiskLevel::from_score(risk_score, &self.risk),
            top_reasons: top_reasons(features, importance.as_ref()),
        })
    }

    fn feature_importance(&self) -> Result<Value> {
        let model = self.current().ok_or(RiskError::ModelNotTrained)?;
        let mut map = Map::new();
        for (name, weight) in FeatureVector::NAMES.iter().zip(model.importance()) {
            map.insert(name.to_string(), json!(weight));
        }
        Ok(Value::Object(map))
    }
}
