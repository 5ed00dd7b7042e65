//! Feature extraction: academic, attendance and fee aggregations → one feature vector.

use super::FeatureVector;
use crate::error::{Result, RiskError};
use crate::records::{RecordSource, StudentId, SubjectAttendance};
use std::sync::Arc;
use tracing::debug;

pub struct FeatureExtractor {
    source: Arc<dyn RecordSource>,
}

fn missing<'a>(
    id: &'a StudentId,
    source_name: &'static str,
) -> impl FnOnce(RiskError) -> RiskError + 'a {
    move |e| RiskError::MissingData {
        student_id: id.to_string(),
        source_name,
        reason: e.to_string(),
    }
}

/// Unweighted mean of per-subject percentages; subjects with more classes do not count more.
fn mean_attendance(subjects: &[SubjectAttendance]) -> f64 {
    if subjects.is_empty() {
        return 0.0;
    }
    let total: f64 = subjects.iter().map(|s| s.attendance_percentage).sum();
    (total / subjects.len() as f64).clamp(0.0, 100.0)
}

fn pending_ratio(total_fees: f64, total_pending: f64) -> f64 {
    if total_fees > 0.0 {
        (total_pending / total_fees).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

impl FeatureExtractor {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        Self { source }
    }

    /// Read all aggregations for the student and build the vector. Any unreadable
    /// aggregation yields `MissingData`.
    pub fn extract(&self, id: &StudentId) -> Result<FeatureVector> {
        let academic = self
            .source
            .academic_summary(id)
            .map_err(missing(id, "academic summary"))?;
        let cgpa = self
            .source
            .cumulative_gpa(id)
            .map_err(missing(id, "cgpa"))?;
        let attendance = self
            .source
            .attendance_summary(id)
            .map_err(missing(id, "attendance"))?;
        let backlogs = self
            .source
            .backlog_count(id)
            .map_err(missing(id, "backlogs"))?;
        let fees = self.source.fee_summary(id).map_err(missing(id, "fees"))?;

        Ok(FeatureVector {
            attendance: mean_attendance(&attendance),
            cgpa: cgpa.clamp(0.0, 10.0),
            backlogs,
            assignments_submitted: academic.len() as u32,
            pending_fee_ratio: pending_ratio(fees.total_fees, fees.total_pending),
        })
    }

    /// Skip-on-failure variant for batch callers: `None` means "skip this student".
    pub fn extract_features(&self, id: &StudentId) -> Option<FeatureVector> {
        match self.extract(id) {
            Ok(fv) => Some(fv),
            Err(e) => {
                debug!(student_id = %id, error = %e, "feature extraction skipped");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendance_mean_is_unweighted() {
        let subjects = vec![
            SubjectAttendance::new("A", 100, 100),
            SubjectAttendance::new("B", 10, 5),
        ];
        assert_eq!(mean_attendance(&subjects), 75.0);
        assert_eq!(mean_attendance(&[]), 0.0);
    }

    #[test]
    fn pending_ratio_guards_zero_billing() {
        assert_eq!(pending_ratio(0.0, 0.0), 0.0);
        assert_eq!(pending_ratio(0.0, 500.0), 0.0);
        assert_eq!(pending_ratio(1000.0, 250.0), 0.25);
        assert_eq!(pending_ratio(1000.0, 1500.0), 1.0);
        assert!(!pending_ratio(0.0, 0.0).is_nan());
    }
}
