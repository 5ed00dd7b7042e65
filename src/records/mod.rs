//! ERP record types and the per-student read contracts the risk pipeline needs.

mod aggregate;

pub use aggregate::{attendance_percentage, cumulative_gpa, is_backlog, round2, FAILING_GRADE};

use crate::error::{Result, RiskError};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const MAX_ID_LEN: usize = 64;

/// Opaque student identifier as issued by the storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(String);

impl StudentId {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(RiskError::Validation("empty id".to_string()));
        }
        if raw.len() > MAX_ID_LEN {
            return Err(RiskError::Validation(format!("id longer than {} chars", MAX_ID_LEN)));
        }
        if !raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(RiskError::Validation(format!("unexpected characters in {:?}", raw)));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub roll_no: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultStatus {
    Pass,
    Fail,
    Absent,
    Pending,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Pass => "Pass",
            ResultStatus::Fail => "Fail",
            ResultStatus::Absent => "Absent",
            ResultStatus::Pending => "Pending",
        }
    }

    pub fn from_db(s: &str) -> Self {
        match s {
            "Pass" => ResultStatus::Pass,
            "Fail" => ResultStatus::Fail,
            "Absent" => ResultStatus::Absent,
            _ => ResultStatus::Pending,
        }
    }

    /// Status implied by a letter grade.
    pub fn for_grade(grade: &str) -> Self {
        if grade == FAILING_GRADE {
            ResultStatus::Fail
        } else {
            ResultStatus::Pass
        }
    }
}

/// One graded subject for one semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcademicRecord {
    pub subject: String,
    pub grade: String,
    pub grade_point: f64,
    pub credits_earned: f64,
    pub result_status: ResultStatus,
}

/// Academic summary entry: all subjects of one semester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemesterSummary {
    pub semester_no: u32,
    /// Unweighted mean grade point of the semester
    pub semester_gpa: f64,
    pub total_credits: f64,
    pub subjects: Vec<AcademicRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectAttendance {
    pub subject: String,
    pub total_classes: u32,
    pub present_classes: u32,
    pub attendance_percentage: f64,
}

impl SubjectAttendance {
    pub fn new(subject: impl Into<String>, total_classes: u32, present_classes: u32) -> Self {
        Self {
            subject: subject.into(),
            total_classes,
            present_classes,
            attendance_percentage: attendance_percentage(present_classes, total_classes),
        }
    }
}

/// Fee totals across all billed periods.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeSummary {
    pub total_fees: f64,
    pub total_paid: f64,
    pub total_pending: f64,
}

/// Read-only per-student aggregations. Implementations must be shareable across scan workers.
pub trait RecordSource: Send + Sync {
    /// All students, in a stable enumeration order.
    fn students(&self) -> Result<Vec<Student>>;

    fn student(&self, id: &StudentId) -> Result<Option<Student>>;

    /// Per-semester academic summary, ordered by semester.
    fn academic_summary(&self, id: &StudentId) -> Result<Vec<SemesterSummary>>;

    /// Credit-weighted CGPA over passed subjects.
    fn cumulative_gpa(&self, id: &StudentId) -> Result<f64>;

    fn attendance_summary(&self, id: &StudentId) -> Result<Vec<SubjectAttendance>>;

    /// Number of academic records carrying a failing grade.
    fn backlog_count(&self, id: &StudentId) -> Result<u32>;

    fn fee_summary(&self, id: &StudentId) -> Result<FeeSummary>;
}
