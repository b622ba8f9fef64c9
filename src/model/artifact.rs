//! Model artifact loading and the inference entry point.
//!
//! The artifact file is loaded once at process start and injected into the
//! request state as immutable shared data. A missing or unreadable artifact
//! is not an error: the service stays up and reports `model_loaded: false`.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::features::MappedFeatureVector;

use super::estimator::Estimator;

/// Tuned decision threshold used whenever the artifact carries none.
/// Single source of truth; there is no other fallback value.
pub const DEFAULT_THRESHOLD: f64 = 0.235;

/// Human-readable identifier of the deployed model generation.
pub const MODEL_VERSION: &str = "light (10 features)";

/// Structured artifact package as written by the export pipeline.
#[derive(Debug, Deserialize)]
struct ModelPackage {
    model: Estimator,
    threshold: Option<f64>,
    features: Option<Vec<String>>,
}

/// The loaded model with its tuned threshold and expected column order.
/// Immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    estimator: Estimator,
    pub threshold: f64,
    /// Training-time column order. Empty when the artifact declares none;
    /// the mapper then falls back to the canonical order and mapping
    /// correctness cannot be verified against the artifact.
    pub features: Vec<String>,
}

/// Result of one inference call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub label: i64,
    /// Present only for probabilistic estimators.
    pub probability: Option<f64>,
}

impl ModelArtifact {
    pub fn new(estimator: Estimator, threshold: f64, features: Vec<String>) -> Self {
        Self {
            estimator,
            threshold,
            features,
        }
    }

    /// Build an artifact from a deserialized file: either a structured
    /// package `{model, threshold, features}` or a bare estimator object.
    pub fn from_json(value: serde_json::Value) -> anyhow::Result<Self> {
        let is_package = value
            .as_object()
            .is_some_and(|object| object.contains_key("model"));

        if is_package {
            let package: ModelPackage = serde_json::from_value(value)?;
            Ok(Self {
                estimator: package.model,
                threshold: package.threshold.unwrap_or(DEFAULT_THRESHOLD),
                features: package.features.unwrap_or_default(),
            })
        } else {
            let estimator: Estimator = serde_json::from_value(value)?;
            let features = estimator
                .feature_names()
                .map(<[String]>::to_vec)
                .unwrap_or_default();
            Ok(Self {
                estimator,
                threshold: DEFAULT_THRESHOLD,
                features,
            })
        }
    }

    /// Load the artifact once at startup.
    ///
    /// Absence or corruption is reported through the return value, never as
    /// an error: health queries must keep working without a model.
    pub fn load(path: &Path) -> Option<Self> {
        info!("Chargement du modèle depuis : {}", path.display());

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Le fichier {} est introuvable : {}", path.display(), e);
                return None;
            }
        };

        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Artefact illisible ({}) : {}", path.display(), e);
                return None;
            }
        };

        match Self::from_json(value) {
            Ok(artifact) => {
                info!(
                    "Modèle chargé. Seuil : {}, {} features attendues",
                    artifact.threshold,
                    artifact.features.len()
                );
                Some(artifact)
            }
            Err(e) => {
                warn!("Impossible de charger le modèle : {}", e);
                None
            }
        }
    }

    pub fn is_probabilistic(&self) -> bool {
        self.estimator.is_probabilistic()
    }

    /// Run the estimator on a mapped vector and apply the decision rule.
    ///
    /// The stored threshold is tuned independently of the estimator, so the
    /// inclusive `p >= threshold` comparison here is the only decision rule
    /// for the probabilistic variant; the estimator's own boundary is never
    /// used. Label-only estimators bypass the threshold entirely.
    pub fn infer(&self, vector: &MappedFeatureVector) -> Result<Prediction, String> {
        match &self.estimator {
            Estimator::Logistic(model) => {
                let probability = model.predict_proba(vector.values())?;
                let label = i64::from(probability >= self.threshold);
                Ok(Prediction {
                    label,
                    probability: Some(probability),
                })
            }
            Estimator::DecisionStump(model) => {
                let label = model.predict(vector.values())?;
                Ok(Prediction {
                    label,
                    probability: None,
                })
            }
        }
    }
}
