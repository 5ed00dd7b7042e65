//! Risk levels and the batch at-risk scan.

mod level;
mod scanner;

pub use level::RiskLevel;
pub use scanner::{AtRiskResult, AtRiskScanner, ScanReport, StudentOutcome};
