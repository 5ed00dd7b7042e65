//! Per-student feature extraction and bootstrap risk labels.

mod extractor;
mod label;

pub use extractor::FeatureExtractor;
pub use label::{dropout_score, synthesize_label, BACKLOG_CAP};

use serde::{Deserialize, Serialize, Serializer};

/// Normalized per-student summary sent to the scoring service. Computed fresh on every call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Mean per-subject attendance percentage, [0, 100]
    pub attendance: f64,
    /// Credit-weighted CGPA, [0, 10]
    pub cgpa: f64,
    /// Failed subject records
    pub backlogs: u32,
    /// Academic summary entries (proxy, no assignment data exists)
    pub assignments_submitted: u32,
    /// Unpaid / billed, [0, 1]; 0 when nothing is billed
    pub pending_fee_ratio: f64,
}

/// Feature vector plus the synthesized outcome. Only ever sent to `/train`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrainingRecord {
    #[serde(flatten)]
    pub features: FeatureVector,
    #[serde(serialize_with = "label_as_int")]
    pub dropout: bool,
}

fn label_as_int<S: Serializer>(dropout: &bool, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u8(u8::from(*dropout))
}

impl FeatureVector {
    /// Fixed feature order used by the in-process model.
    pub const NAMES: [&'static str; 5] = [
        "attendance",
        "cgpa",
        "backlogs",
        "assignments_submitted",
        "pending_fee_ratio",
    ];

    pub fn as_array(&self) -> [f64; 5] {
        [
            self.attendance,
            self.cgpa,
            self.backlogs as f64,
            self.assignments_submitted as f64,
            self.pending_fee_ratio,
        ]
    }
}
