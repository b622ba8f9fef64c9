//! Employee Churn Prediction API
//!
//! Serves a pre-trained churn classifier over REST and journals every
//! prediction into a relational audit log.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use churn_api::api::rest::{create_rest_router, AppState};
use churn_api::config::Config;
use churn_api::model::ModelArtifact;
use churn_api::service::PredictionService;
use churn_api::storage::SqliteStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("Démarrage de l'API churn v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load(Config::default_path()).unwrap_or_else(|e| {
        info!("Configuration par défaut utilisée ({})", e);
        Config::default()
    });

    // Load the model once; its absence keeps the service up.
    let artifact = ModelArtifact::load(&config.model.artifact_path).map(Arc::new);
    if artifact.is_none() {
        warn!("Aucun modèle chargé : /predict répondra 500 tant que l'artefact manque");
    }

    // Initialize storage: DATABASE_URL wins, local SQLite otherwise.
    // An unreachable database is only logged; the API stays up and every
    // write fails individually until it becomes reachable.
    let store = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.is_empty() => {
            info!("Connexion BDD détectée (DATABASE_URL)");
            SqliteStore::connect(&url).await?
        }
        _ => {
            let path = config.storage.sqlite_path.to_string_lossy();
            warn!("Variable DATABASE_URL introuvable, bascule sur SQLite local ({})", path);
            SqliteStore::new(&path).await?
        }
    };
    let store = Arc::new(store);

    let state = Arc::new(AppState {
        service: PredictionService::new(artifact, store),
    });
    let router = create_rest_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("API à l'écoute sur http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Arrêt de l'API");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
