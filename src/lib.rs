//! Dropout risk - per-student feature extraction, bootstrap labelling and at-risk ranking.
//!
//! Modular structure:
//! - [`records`] - ERP record types and per-student read contracts
//! - [`storage`] - SQLite record store
//! - [`features`] - Feature vector extraction and bootstrap labels
//! - [`training`] - Training set assembly
//! - [`predictor`] - Scoring service boundary (HTTP client, local model)
//! - [`risk`] - Risk levels and the at-risk scan
//! - [`service`] - Caller-facing entry points
//! - [`logging`] - Structured JSON logging

pub mod config;
pub mod error;
pub mod records;
pub mod storage;
pub mod features;
pub mod training;
pub mod predictor;
pub mod risk;
pub mod service;
pub mod logging;

pub use config::AppConfig;
pub use error::{Result, RiskError};
pub use records::{RecordSource, Student, StudentId};
pub use storage::RecordStore;
pub use features::{FeatureExtractor, FeatureVector, TrainingRecord};
pub use training::TrainingSetBuilder;
pub use predictor::{HttpScoringClient, LocalScorer, Prediction, ScoringService};
pub use risk::{AtRiskResult, AtRiskScanner, RiskLevel, ScanReport};
pub use service::DropoutService;
pub use logging::StructuredLogger;
