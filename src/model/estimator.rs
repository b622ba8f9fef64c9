//! Estimator variants.
//!
//! The capability split (probabilistic vs label-only) is fixed once at load
//! time through the serde tag; request handling dispatches on the closed enum
//! and never probes capabilities at runtime.

use serde::Deserialize;

/// Closed set of estimator kinds the artifact file can carry.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    /// Probabilistic linear model: sigmoid(w·x + b) is the churn probability.
    Logistic(LogisticModel),
    /// Hard-label model with no probability output.
    DecisionStump(StumpModel),
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogisticModel {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Training-time column names the exporter may embed in the estimator
    /// itself (used when the package carries no feature list).
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StumpModel {
    pub feature_index: usize,
    pub cutoff: f64,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl Estimator {
    pub fn is_probabilistic(&self) -> bool {
        matches!(self, Estimator::Logistic(_))
    }

    /// Feature names declared by the estimator itself, if any.
    pub fn feature_names(&self) -> Option<&[String]> {
        match self {
            Estimator::Logistic(m) => m.feature_names.as_deref(),
            Estimator::DecisionStump(m) => m.feature_names.as_deref(),
        }
    }
}

impl LogisticModel {
    /// Probability of the positive (churn) class.
    pub fn predict_proba(&self, features: &[f64]) -> Result<f64, String> {
        if features.len() != self.coefficients.len() {
            return Err(format!(
                "le modèle attend {} features, {} reçues",
                self.coefficients.len(),
                features.len()
            ));
        }

        let z: f64 = self
            .coefficients
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;

        let p = 1.0 / (1.0 + (-z).exp());
        if !p.is_finite() {
            return Err(format!("probabilité non finie (score brut {z})"));
        }
        Ok(p)
    }
}

impl StumpModel {
    /// Hard 0/1 label.
    pub fn predict(&self, features: &[f64]) -> Result<i64, String> {
        match features.get(self.feature_index) {
            Some(v) => Ok(i64::from(*v >= self.cutoff)),
            None => Err(format!(
                "index de feature {} hors limites ({} features)",
                self.feature_index,
                features.len()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logistic_probability_is_sigmoid_of_linear_score() {
        let model = LogisticModel {
            coefficients: vec![1.0, -1.0],
            intercept: 0.0,
            feature_names: None,
        };

        // Equal inputs cancel out: z = 0 => p = 0.5
        let p = model.predict_proba(&[2.0, 2.0]).unwrap();
        assert!((p - 0.5).abs() < 1e-12);

        // z = ln(4) => p = 0.8
        let p = model.predict_proba(&[4.0f64.ln(), 0.0]).unwrap();
        assert!((p - 0.8).abs() < 1e-12);
    }

    #[test]
    fn logistic_rejects_dimension_mismatch() {
        let model = LogisticModel {
            coefficients: vec![1.0, 2.0, 3.0],
            intercept: 0.0,
            feature_names: None,
        };
        let err = model.predict_proba(&[1.0]).unwrap_err();
        assert!(err.contains("3 features"));
    }

    #[test]
    fn stump_labels_and_bounds() {
        let model = StumpModel {
            feature_index: 1,
            cutoff: 10.0,
            feature_names: None,
        };
        assert_eq!(model.predict(&[0.0, 12.0]).unwrap(), 1);
        assert_eq!(model.predict(&[0.0, 10.0]).unwrap(), 1);
        assert_eq!(model.predict(&[0.0, 9.9]).unwrap(), 0);
        assert!(model.predict(&[0.0]).is_err());
    }

    #[test]
    fn deserializes_both_kinds_from_the_serde_tag() {
        let logistic: Estimator = serde_json::from_str(
            r#"{"kind": "logistic", "coefficients": [0.1, 0.2], "intercept": -1.0}"#,
        )
        .unwrap();
        assert!(logistic.is_probabilistic());
        assert!(logistic.feature_names().is_none());

        let stump: Estimator = serde_json::from_str(
            r#"{"kind": "decision_stump", "feature_index": 3, "cutoff": 30.0,
                "feature_names": ["a", "b", "c", "age"]}"#,
        )
        .unwrap();
        assert!(!stump.is_probabilistic());
        assert_eq!(stump.feature_names().unwrap().len(), 4);
    }
}
