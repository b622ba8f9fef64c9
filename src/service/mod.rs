//! Business logic

pub mod prediction;

pub use prediction::{HealthStatus, PredictionOutcome, PredictionService};
