//! Pure aggregation math shared by every record source.

use super::{AcademicRecord, ResultStatus};

pub const FAILING_GRADE: &str = "F";

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// present/total as a percentage, two decimals. Zero classes yields 0.
pub fn attendance_percentage(present: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(present as f64 / total as f64 * 100.0).min(100.0)
}

/// Credit-weighted grade point average over passed records, two decimals, in [0, 10].
pub fn cumulative_gpa<'a>(records: impl IntoIterator<Item = &'a AcademicRecord>) -> f64 {
    let (points, credits) = records
        .into_iter()
        .filter(|r| r.result_status == ResultStatus::Pass)
        .fold((0.0, 0.0), |(p, c), r| {
            (p + r.grade_point * r.credits_earned, c + r.credits_earned)
        });
    if credits <= 0.0 {
        return 0.0;
    }
    round2(points / credits).clamp(0.0, 10.0)
}

pub fn is_backlog(record: &AcademicRecord) -> bool {
    record.grade == FAILING_GRADE
}
