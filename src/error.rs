//! Typed errors for the prediction pipeline.
//!
//! Each variant maps to exactly one HTTP status in the REST layer:
//! `Validation` is a client error (422), everything else a server error (500).

use serde::Serialize;
use thiserror::Error;

/// One field-level validation failure, shaped like the `detail` entries of a
/// 422 response.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
}

impl FieldError {
    pub fn new(field: &str, msg: impl Into<String>) -> Self {
        Self {
            loc: vec!["body".to_string(), field.to_string()],
            msg: msg.into(),
        }
    }

    /// Name of the offending field.
    pub fn field(&self) -> &str {
        self.loc.last().map(String::as_str).unwrap_or_default()
    }
}

/// Errors produced by the prediction pipeline.
#[derive(Debug, Error)]
pub enum PredictError {
    /// Client payload violates the input schema; every offending field is
    /// listed, not just the first one.
    #[error("payload invalide ({} champ(s) en erreur)", .0.len())]
    Validation(Vec<FieldError>),

    /// No model artifact was loaded at startup.
    #[error("Le modèle n'a pas pu être chargé.")]
    ModelUnavailable,

    /// The estimator failed while predicting; carries the original message.
    #[error("{0}")]
    Inference(String),

    /// The artifact feature list is inconsistent with the feature mapper.
    /// Fatal to the request, not to the process.
    #[error("configuration du modèle incohérente : {0}")]
    Configuration(String),

    /// The audit log row could not be written; the unit of work was rolled
    /// back and the prediction must not be reported as a success.
    #[error("échec de l'enregistrement de la prédiction : {0}")]
    Persistence(String),
}
