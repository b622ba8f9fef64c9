//! Axum REST API handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::error::PredictError;
use crate::service::PredictionService;
use crate::storage::PredictionStore;

use super::dto::{HomeResponse, PredictResponse};

/// Application state shared across handlers
pub struct AppState<S: PredictionStore> {
    pub service: PredictionService<S>,
}

/// Create the REST API router
pub fn create_rest_router<S: PredictionStore>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/", get(home_handler::<S>))
        // Only POST is routed; axum answers 405 for any other method.
        .route("/predict", post(predict_handler::<S>))
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

type ApiError = (StatusCode, Json<Value>);

/// Map a pipeline error kind to its HTTP status and `detail` body.
fn error_response(err: PredictError) -> ApiError {
    match err {
        PredictError::Validation(fields) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({ "detail": fields })),
        ),
        PredictError::ModelUnavailable => {
            error!("Prédiction refusée : aucun modèle chargé");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "detail": "Erreur interne : Le modèle n'a pas pu être chargé."
                })),
            )
        }
        other => {
            error!("Erreur API : {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "detail": format!("Erreur lors de la prédiction : {}", other)
                })),
            )
        }
    }
}

/// Service status; answers whether or not a model was loaded.
async fn home_handler<S: PredictionStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Json<HomeResponse> {
    let health = state.service.health();

    Json(HomeResponse {
        status: "online",
        model_loaded: health.model_loaded,
        threshold_configured: health.threshold_configured,
        message: "API de prédiction de churn des employés",
        model_version: health.model_version,
    })
}

/// Run one prediction and journal it.
async fn predict_handler<S: PredictionStore>(
    State(state): State<Arc<AppState<S>>>,
    Json(payload): Json<Value>,
) -> Result<Json<PredictResponse>, ApiError> {
    let outcome = state
        .service
        .predict(&payload)
        .await
        .map_err(error_response)?;

    Ok(Json(PredictResponse {
        prediction: outcome.prediction,
        probability: outcome.probability,
        threshold_used: outcome.threshold_used,
        log_id: outcome.log_id,
    }))
}
