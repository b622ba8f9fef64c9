//! Storage abstraction traits
//!
//! Defines the interface for the prediction audit log and the bootstrapped
//! history dataset. Implementations can be substituted in tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One immutable audit row for a served prediction.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionLog {
    /// Store-assigned identifier.
    pub id: i64,
    /// Server-assigned insert timestamp.
    pub timestamp: DateTime<Utc>,
    /// The raw validated input payload, as received.
    pub inputs: serde_json::Value,
    /// Predicted label, 0 or 1.
    pub prediction: i64,
    /// Churn probability; absent for label-only estimators.
    pub probability: Option<f64>,
}

/// One row of the bootstrapped training dataset (`employees_history`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeHistoryRecord {
    pub ratio_surcharge_anciennete: f64,
    pub nombre_participation_pee: i64,
    pub departement_consulting: f64,
    pub age: i64,
    pub poste_consultant: f64,
    pub tension_salaire: f64,
    pub statut_marital_marie: f64,
    pub annees_dans_l_entreprise: i64,
    pub satisfaction_globale_moyenne: f64,
    pub satisfaction_employee_nature_travail: i64,
    pub target_churn: Option<i64>,
}

/// Prediction audit log store.
/// Implementations must be thread-safe and async-compatible.
#[async_trait]
pub trait PredictionStore: Send + Sync + 'static {
    /// Persist one prediction with a store-assigned id and a server-assigned
    /// timestamp. The row is committed before this returns; on failure
    /// nothing was written.
    async fn log_prediction(
        &self,
        inputs: &serde_json::Value,
        prediction: i64,
        probability: Option<f64>,
    ) -> Result<PredictionLog>;

    /// Fetch a logged prediction by id.
    async fn get_log(&self, id: i64) -> Result<Option<PredictionLog>>;

    /// Total number of logged predictions.
    async fn count_logs(&self) -> Result<i64>;

    /// Replace the whole bootstrapped history dataset in one transaction.
    /// Returns the number of inserted rows.
    async fn replace_history(&self, rows: &[EmployeeHistoryRecord]) -> Result<u64>;
}
