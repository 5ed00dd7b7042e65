//! At-risk scan: score every student, keep Medium/High, rank by descending risk.
//! Per-student failures are recorded and the scan moves on.

use crate::error::Result;
use crate::features::FeatureExtractor;
use crate::predictor::{Reason, ScoringService};
use crate::records::{RecordSource, Student, StudentId};
use crate::risk::RiskLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

/// One ranked student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtRiskResult {
    pub student_id: StudentId,
    pub name: String,
    pub roll_no: String,
    pub email: String,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub top_reasons: Vec<Reason>,
}

/// What happened to a single student during a scan.
#[derive(Debug, Clone, PartialEq)]
pub enum StudentOutcome {
    Ranked(AtRiskResult),
    Low(StudentId),
    /// Aggregations unavailable; not a failure of the scan
    Skipped { student_id: StudentId, reason: String },
    /// Scoring call failed
    Failed { student_id: StudentId, error: String },
    /// Scan was cancelled before this student was reached
    Cancelled(StudentId),
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub generated_at: DateTime<Utc>,
    /// Medium/High students, highest risk first
    pub results: Vec<AtRiskResult>,
    pub scanned: usize,
    pub low_risk: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl ScanReport {
    /// Outcomes must be in enumeration order; ties in risk keep that order.
    pub fn from_outcomes(outcomes: Vec<StudentOutcome>) -> Self {
        let mut report = ScanReport {
            generated_at: Utc::now(),
            results: Vec::new(),
            scanned: outcomes.len(),
            low_risk: 0,
            skipped: 0,
            failed: 0,
            cancelled: 0,
        };
        for outcome in outcomes {
            match outcome {
                StudentOutcome::Ranked(r) => report.results.push(r),
                StudentOutcome::Low(_) => report.low_risk += 1,
                StudentOutcome::Skipped { .. } => report.skipped += 1,
                StudentOutcome::Failed { .. } => report.failed += 1,
                StudentOutcome::Cancelled(_) => report.cancelled += 1,
            }
        }
        report
            .results
            .sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
        report
    }

    pub fn is_partial(&self) -> bool {
        self.failed > 0 || self.cancelled > 0
    }
}

pub struct AtRiskScanner {
    source: Arc<dyn RecordSource>,
    extractor: FeatureExtractor,
    scorer: Arc<dyn ScoringService>,
    workers: usize,
}

impl AtRiskScanner {
    pub fn new(
        source: Arc<dyn RecordSource>,
        scorer: Arc<dyn ScoringService>,
        workers: usize,
    ) -> Self {
        Self {
            extractor: FeatureExtractor::new(source.clone()),
            source,
            scorer,
            workers: workers.max(1),
        }
    }

    /// Ranked Medium/High students. Empty means nobody is currently at risk.
    pub fn scan_at_risk(&self) -> Result<Vec<AtRiskResult>> {
        Ok(self.scan()?.results)
    }

    pub fn scan(&self) -> Result<ScanReport> {
        self.scan_with_cancel(&AtomicBool::new(false))
    }

    /// Once `cancel` is set no further students are scored; finished ones are kept.
    pub fn scan_with_cancel(&self, cancel: &AtomicBool) -> Result<ScanReport> {
        let students = self.source.students()?;
        let report = ScanReport::from_outcomes(self.score_students(&students, cancel));
        info!(
            scanned = report.scanned,
            at_risk = report.results.len(),
            low_risk = report.low_risk,
            skipped = report.skipped,
            failed = report.failed,
            cancelled = report.cancelled,
            "at-risk scan complete"
        );
        Ok(report)
    }

    /// Score students on a bounded pool of scoped workers. Output is in input order.
    pub fn score_students(&self, students: &[Student], cancel: &AtomicBool) -> Vec<StudentOutcome> {
        let workers = self.workers.min(students.len()).max(1);
        let cursor = &AtomicUsize::new(0);

        let finished: Vec<(usize, StudentOutcome)> = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for _ in 0..workers {
                handles.push(scope.spawn(move || {
                    let mut local = Vec::new();
                    loop {
                        let i = cursor.fetch_add(1, Ordering::Relaxed);
                        let Some(student) = students.get(i) else {
                            break;
                        };
                        let outcome = if cancel.load(Ordering::Relaxed) {
                            StudentOutcome::Cancelled(student.id.clone())
                        } else {
                            self.score_isolated(student)
                        };
                        local.push((i, outcome));
                    }
                    local
                }));
            }
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap_or_default())
                .collect()
        });

        let mut slots: Vec<Option<StudentOutcome>> = vec![None; students.len()];
        for (i, outcome) in finished {
            slots[i] = Some(outcome);
        }
        slots
            .into_iter()
            .zip(students)
            .map(|(slot, s)| {
                slot.unwrap_or_else(|| StudentOutcome::Failed {
                    student_id: s.id.clone(),
                    error: "scan worker panicked".to_string(),
                })
            })
            .collect()
    }

    /// A panic while scoring fails this student only; the worker keeps going.
    fn score_isolated(&self, student: &Student) -> StudentOutcome {
        panic::catch_unwind(AssertUnwindSafe(|| self.score_one(student))).unwrap_or_else(|_| {
            warn!(student_id = %student.id, "scoring panicked");
            StudentOutcome::Failed {
                student_id: student.id.clone(),
                error: "scoring panicked".to_string(),
            }
        })
    }

    fn score_one(&self, student: &Student) -> StudentOutcome {
        let features = match self.extractor.extract(&student.id) {
            Ok(f) => f,
            Err(e) => {
                debug!(student_id = %student.id, error = %e, "student skipped");
                return StudentOutcome::Skipped {
                    student_id: student.id.clone(),
                    reason: e.to_string(),
                };
            }
        };
        match self.scorer.predict(&features) {
            Ok(p) if p.risk_level == RiskLevel::Low => StudentOutcome::Low(student.id.clone()),
            Ok(p) => StudentOutcome::Ranked(AtRiskResult {
                student_id: student.id.clone(),
                name: student.name.clone(),
                roll_no: student.roll_no.clone(),
                email: student.email.clone(),
                risk_score: p.risk_score,
                risk_level: p.risk_level,
                top_reasons: p.top_reasons,
            }),
            Err(e) => {
                warn!(student_id = %student.id, error = %e, "risk prediction failed");
                StudentOutcome::Failed {
                    student_id: student.id.clone(),
                    error: e.to_string(),
                }
            }
        }
    }
}
