//! REST response data transfer objects

use serde::Serialize;

/// Payload for `GET /`.
#[derive(Debug, Serialize)]
pub struct HomeResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub threshold_configured: f64,
    pub message: &'static str,
    pub model_version: &'static str,
}

/// Success payload for `POST /predict`.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: i64,
    pub probability: Option<f64>,
    pub threshold_used: f64,
    pub log_id: i64,
}
