//! Error taxonomy for extraction, training and scoring.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RiskError>;

#[derive(Debug, Error)]
pub enum RiskError {
    /// An aggregation for the student could not be read; batch callers skip the student.
    #[error("{source_name} data unavailable for student {student_id}: {reason}")]
    MissingData {
        student_id: String,
        source_name: &'static str,
        reason: String,
    },

    #[error("no training data available")]
    EmptyTrainingSet,

    /// Network failure talking to the scoring service (connect, timeout, reset).
    #[error("scoring service unreachable: {0}")]
    Transport(String),

    /// Scoring service answered with a non-2xx status.
    #[error("scoring service returned {status}: {body}")]
    Service { status: u16, body: String },

    /// 2xx reply that does not match the expected shape.
    #[error("malformed scoring service reply: {0}")]
    Decode(String),

    #[error("invalid student id: {0}")]
    Validation(String),

    #[error("student {0} not found")]
    StudentNotFound(String),

    #[error("model not trained yet")]
    ModelNotTrained,

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl RiskError {
    /// Transport-level failures of the scoring call (network or non-2xx).
    pub fn is_transport(&self) -> bool {
        matches!(self, RiskError::Transport(_) | RiskError::Service { .. })
    }
}

impl From<reqwest::Error> for RiskError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RiskError::Decode(err.to_string())
        } else {
            RiskError::Transport(err.to_string())
        }
    }
}
