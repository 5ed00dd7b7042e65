//! HTTP client for the external prediction service (`/train`, `/predict`, `/feature-importance`).

use super::{Prediction, ScoringService, TrainingSummary};
use crate::config::ScoringConfig;
use crate::error::{Result, RiskError};
use crate::features::{FeatureVector, TrainingRecord};
use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use tracing::{debug, info};

pub struct HttpScoringClient {
    client: Client,
    base_url: String,
}

/// The service wraps replies as `{success, data, message, error}`; return `data` when present.
fn unwrap_envelope(body: Value) -> Result<Value> {
    match body {
        Value::Object(mut map) => {
            if map.get("success") == Some(&Value::Bool(false)) {
                let reason = map
                    .get("error")
                    .or_else(|| map.get("message"))
                    .and_then(Value::as_str)
                    .unwrap_or("request rejected")
                    .to_string();
                return Err(RiskError::Decode(reason));
            }
            match map.remove("data") {
                Some(data) => Ok(data),
                None => Ok(Value::Object(map)),
            }
        }
        other => Ok(other),
    }
}

impl HttpScoringClient {
    pub fn new(config: &ScoringConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .no_proxy()
            .build()?;
        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, req: RequestBuilder) -> Result<Value> {
        let res = req.send()?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            return Err(RiskError::Service {
                status: status.as_u16(),
                body,
            });
        }
        let body: Value = res.json()?;
        Ok(body)
    }
}

impl ScoringService for HttpScoringClient {
    fn train(&self, training_set: &[TrainingRecord]) -> Result<TrainingSummary> {
        let body = self.send(self.client.post(self.url("/train")).json(training_set))?;
        info!(records = training_set.len(), "scoring service trained");
        Ok(body)
    }

    fn predict(&self, features: &FeatureVector) -> Result<Prediction> {
        let body = self.send(self.client.post(self.url("/predict")).json(features))?;
        let prediction: Prediction = serde_json::from_value(unwrap_envelope(body)?)
            .map_err(|e| RiskError::Decode(e.to_string()))?;
        if !(0.0..=1.0).contains(&prediction.risk_score) {
            return Err(RiskError::Decode(format!(
                "risk_score {} outside [0, 1]",
                prediction.risk_score
            )));
        }
        debug!(
            risk_score = prediction.risk_score,
            risk_level = ?prediction.risk_level,
            "prediction received"
        );
        Ok(prediction)
    }

    fn feature_importance(&self) -> Result<Value> {
        let body = self.send(self.client.get(self.url("/feature-importance")))?;
        unwrap_envelope(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_data_is_unwrapped() {
        let v = unwrap_envelope(json!({"success": true, "data": {"cgpa": 0.4}})).unwrap();
        assert_eq!(v, json!({"cgpa": 0.4}));
        let v = unwrap_envelope(json!({"success": true, "message": "Model trained successfully"}))
            .unwrap();
        assert_eq!(v["message"], "Model trained successfully");
        let v = unwrap_envelope(json!([1, 2])).unwrap();
        assert_eq!(v, json!([1, 2]));
    }

    #[test]
    fn envelope_failure_is_an_error() {
        let err = unwrap_envelope(json!({"success": false, "error": "Model not trained yet"}))
            .unwrap_err();
        assert!(err.to_string().contains("Model not trained yet"));
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = ScoringConfig {
            endpoint: "http://scoring:5001/".to_string(),
            ..ScoringConfig::default()
        };
        let client = HttpScoringClient::new(&config).unwrap();
        assert_eq!(client.url("/predict"), "http://scoring:5001/predict");
    }
}
