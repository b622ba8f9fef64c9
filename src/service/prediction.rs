//! Prediction service - core request pipeline.
//!
//! Threads one request through validate -> map -> infer -> log as typed
//! Results, strictly sequential, no retries. The model artifact is injected
//! at construction, so tests substitute estimators and stores freely.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::error::PredictError;
use crate::features::map_features;
use crate::model::{ModelArtifact, DEFAULT_THRESHOLD, MODEL_VERSION};
use crate::schema::validate;
use crate::storage::PredictionStore;

/// Outcome of one served prediction, ready for the response DTO.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    pub prediction: i64,
    pub probability: Option<f64>,
    pub threshold_used: f64,
    pub log_id: i64,
}

/// Snapshot for the health route.
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub model_loaded: bool,
    pub threshold_configured: f64,
    pub model_version: &'static str,
}

pub struct PredictionService<S: PredictionStore> {
    artifact: Option<Arc<ModelArtifact>>,
    store: Arc<S>,
}

impl<S: PredictionStore> PredictionService<S> {
    pub fn new(artifact: Option<Arc<ModelArtifact>>, store: Arc<S>) -> Self {
        Self { artifact, store }
    }

    /// Run the full pipeline for one raw request payload.
    ///
    /// Validation happens before any side effect; the log row is committed
    /// before the outcome is returned, so a prediction that could not be
    /// logged is never reported as a success.
    pub async fn predict(&self, payload: &Value) -> Result<PredictionOutcome, PredictError> {
        let record = validate(payload).map_err(PredictError::Validation)?;

        let artifact = self
            .artifact
            .as_ref()
            .ok_or(PredictError::ModelUnavailable)?;

        let vector = map_features(&record, &artifact.features)
            .map_err(|e| PredictError::Configuration(e.0))?;

        let outcome = artifact.infer(&vector).map_err(PredictError::Inference)?;

        // The audit log keeps the raw validated input, not the mapped vector.
        let inputs = serde_json::to_value(record)
            .map_err(|e| PredictError::Persistence(e.to_string()))?;

        let log = self
            .store
            .log_prediction(&inputs, outcome.label, outcome.probability)
            .await
            .map_err(|e| PredictError::Persistence(e.to_string()))?;

        info!(
            "Prédiction {} journalisée (label={}, proba={:?})",
            log.id, outcome.label, outcome.probability
        );

        Ok(PredictionOutcome {
            prediction: outcome.label,
            probability: outcome.probability,
            threshold_used: artifact.threshold,
            log_id: log.id,
        })
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            model_loaded: self.artifact.is_some(),
            threshold_configured: self
                .artifact
                .as_ref()
                .map(|a| a.threshold)
                .unwrap_or(DEFAULT_THRESHOLD),
            model_version: MODEL_VERSION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::estimator::LogisticModel;
    use crate::model::Estimator;
    use crate::storage::{EmployeeHistoryRecord, PredictionLog};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::Mutex;

    /// In-memory store; `failing` simulates a persistence outage.
    struct MemoryStore {
        rows: Mutex<Vec<PredictionLog>>,
        failing: bool,
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                failing: false,
            }
        }

        fn failing() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                failing: true,
            }
        }
    }

    #[async_trait]
    impl PredictionStore for MemoryStore {
        async fn log_prediction(
            &self,
            inputs: &Value,
            prediction: i64,
            probability: Option<f64>,
        ) -> Result<PredictionLog> {
            if self.failing {
                return Err(anyhow!("base de données indisponible"));
            }
            let mut rows = self.rows.lock().unwrap();
            let log = PredictionLog {
                id: rows.len() as i64 + 1,
                timestamp: Utc::now(),
                inputs: inputs.clone(),
                prediction,
                probability,
            };
            rows.push(log.clone());
            Ok(log)
        }

        async fn get_log(&self, id: i64) -> Result<Option<PredictionLog>> {
            Ok(self.rows.lock().unwrap().iter().find(|l| l.id == id).cloned())
        }

        async fn count_logs(&self) -> Result<i64> {
            Ok(self.rows.lock().unwrap().len() as i64)
        }

        async fn replace_history(&self, _rows: &[EmployeeHistoryRecord]) -> Result<u64> {
            Ok(0)
        }
    }

    fn logistic_artifact(intercept: f64) -> Arc<ModelArtifact> {
        Arc::new(ModelArtifact::new(
            Estimator::Logistic(LogisticModel {
                coefficients: vec![0.0; 10],
                intercept,
                feature_names: None,
            }),
            DEFAULT_THRESHOLD,
            Vec::new(),
        ))
    }

    fn payload() -> Value {
        json!({
            "ratio_surcharge_anciennete": 0.14,
            "nombre_participation_pee": 0,
            "statut_marital_divorce": 1.0,
            "age": 28,
            "annees_dans_l_entreprise": 1,
            "frequence_deplacement_frequent": 1.0,
            "poste_representant_commercial": 1.0,
            "niveau_education": 2,
            "domaine_etude_marketing": 0.0,
            "poste_consultant": 0.0,
        })
    }

    #[tokio::test]
    async fn full_pipeline_logs_and_returns_the_outcome() {
        let store = Arc::new(MemoryStore::new());
        // intercept ln(4) => probability 0.8, above the 0.235 threshold
        let service = PredictionService::new(Some(logistic_artifact(4.0f64.ln())), store.clone());

        let outcome = service.predict(&payload()).await.unwrap();
        assert_eq!(outcome.prediction, 1);
        assert!((outcome.probability.unwrap() - 0.8).abs() < 1e-9);
        assert_eq!(outcome.threshold_used, DEFAULT_THRESHOLD);

        let log = store.get_log(outcome.log_id).await.unwrap().unwrap();
        assert_eq!(log.prediction, 1);
        assert_eq!(log.inputs["age"], json!(28));
    }

    #[tokio::test]
    async fn validation_failure_happens_before_any_side_effect() {
        let store = Arc::new(MemoryStore::new());
        let service = PredictionService::new(Some(logistic_artifact(0.0)), store.clone());

        let err = service.predict(&json!({"age": 28})).await.unwrap_err();
        match err {
            PredictError::Validation(fields) => assert_eq!(fields.len(), 9),
            other => panic!("attendu Validation, obtenu {other:?}"),
        }
        assert_eq!(store.count_logs().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_artifact_is_model_unavailable() {
        let store = Arc::new(MemoryStore::new());
        let service = PredictionService::new(None, store.clone());

        let err = service.predict(&payload()).await.unwrap_err();
        assert!(matches!(err, PredictError::ModelUnavailable));
        assert_eq!(store.count_logs().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn inconsistent_feature_list_is_a_configuration_error() {
        let store = Arc::new(MemoryStore::new());
        let artifact = Arc::new(ModelArtifact::new(
            Estimator::Logistic(LogisticModel {
                coefficients: vec![0.0; 10],
                intercept: 0.0,
                feature_names: None,
            }),
            DEFAULT_THRESHOLD,
            vec!["colonne_fantome".to_string(); 10],
        ));
        let service = PredictionService::new(Some(artifact), store.clone());

        let err = service.predict(&payload()).await.unwrap_err();
        assert!(matches!(err, PredictError::Configuration(_)));
        assert_eq!(store.count_logs().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn estimator_failure_is_an_inference_error_without_a_log_row() {
        let store = Arc::new(MemoryStore::new());
        let artifact = Arc::new(ModelArtifact::new(
            Estimator::Logistic(LogisticModel {
                coefficients: vec![0.0; 3], // wrong dimension
                intercept: 0.0,
                feature_names: None,
            }),
            DEFAULT_THRESHOLD,
            Vec::new(),
        ));
        let service = PredictionService::new(Some(artifact), store.clone());

        let err = service.predict(&payload()).await.unwrap_err();
        match err {
            PredictError::Inference(msg) => assert!(msg.contains("3 features")),
            other => panic!("attendu Inference, obtenu {other:?}"),
        }
        assert_eq!(store.count_logs().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn persistence_failure_is_not_reported_as_success() {
        let store = Arc::new(MemoryStore::failing());
        let service = PredictionService::new(Some(logistic_artifact(4.0f64.ln())), store);

        let err = service.predict(&payload()).await.unwrap_err();
        assert!(matches!(err, PredictError::Persistence(_)));
    }

    #[tokio::test]
    async fn health_reflects_artifact_presence() {
        let store = Arc::new(MemoryStore::new());

        let with_model = PredictionService::new(Some(logistic_artifact(0.0)), store.clone());
        assert!(with_model.health().model_loaded);
        assert_eq!(with_model.health().threshold_configured, DEFAULT_THRESHOLD);

        let without_model = PredictionService::<MemoryStore>::new(None, store);
        assert!(!without_model.health().model_loaded);
    }
}
