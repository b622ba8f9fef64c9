//! Model artifact loading and inference.

pub mod artifact;
pub mod estimator;

pub use artifact::{ModelArtifact, Prediction, DEFAULT_THRESHOLD, MODEL_VERSION};
pub use estimator::Estimator;
