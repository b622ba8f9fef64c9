//! SQLite storage implementation

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::{debug, info, warn};

use super::traits::{EmployeeHistoryRecord, PredictionLog, PredictionStore};

/// SQLite-backed prediction store
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open a store backed by a local database file.
    pub async fn new(db_path: &str) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!("Création du répertoire {} impossible : {}", parent.display(), e);
                }
            }
        }

        Self::connect(&format!("sqlite:{}?mode=rwc", db_path)).await
    }

    /// Connect with a full connection string (the `DATABASE_URL` form).
    ///
    /// An unreachable database is not fatal: the pool is created lazily and
    /// a failed table creation is only logged, so health queries keep working
    /// and each write fails individually until the database comes back.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_lazy(database_url)
            .context("URL de base de données invalide")?;

        let store = Self { pool };
        if let Err(e) = store.initialize().await {
            warn!("Initialisation de la base impossible : {}", e);
        }

        Ok(store)
    }

    /// Create the tables if they do not exist yet.
    async fn initialize(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS prediction_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                inputs TEXT NOT NULL,
                prediction INTEGER NOT NULL,
                probability REAL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS employees_history (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ratio_surcharge_anciennete REAL,
                nombre_participation_pee INTEGER,
                departement_consulting REAL,
                age INTEGER,
                poste_consultant REAL,
                tension_salaire REAL,
                statut_marital_marie REAL,
                annees_dans_l_entreprise INTEGER,
                satisfaction_globale_moyenne REAL,
                satisfaction_employee_nature_travail INTEGER,
                target_churn INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Tables de la base de données vérifiées/créées");
        Ok(())
    }

    /// Number of rows in the bootstrapped history dataset.
    pub async fn count_history(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM employees_history")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }
}

fn row_to_log(row: &sqlx::sqlite::SqliteRow) -> Result<PredictionLog> {
    let timestamp: String = row.get("timestamp");
    let inputs: String = row.get("inputs");

    Ok(PredictionLog {
        id: row.get("id"),
        timestamp: DateTime::parse_from_rfc3339(&timestamp)
            .context("horodatage illisible")?
            .with_timezone(&Utc),
        inputs: serde_json::from_str(&inputs).context("inputs illisibles")?,
        prediction: row.get("prediction"),
        probability: row.get("probability"),
    })
}

#[async_trait]
impl PredictionStore for SqliteStore {
    async fn log_prediction(
        &self,
        inputs: &serde_json::Value,
        prediction: i64,
        probability: Option<f64>,
    ) -> Result<PredictionLog> {
        let timestamp = Utc::now();
        let inputs_json = serde_json::to_string(inputs)?;

        // Insert inside a transaction committed before returning: the caller
        // only ever sees a prediction as logged once the row is durable.
        // Dropping the transaction on any early return rolls it back.
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO prediction_logs (timestamp, inputs, prediction, probability)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(timestamp.to_rfc3339())
        .bind(&inputs_json)
        .bind(prediction)
        .bind(probability)
        .execute(&mut *tx)
        .await?;

        let id = result.last_insert_rowid();
        tx.commit().await?;

        debug!("Prédiction {} journalisée", id);

        Ok(PredictionLog {
            id,
            timestamp,
            inputs: inputs.clone(),
            prediction,
            probability,
        })
    }

    async fn get_log(&self, id: i64) -> Result<Option<PredictionLog>> {
        let row = sqlx::query(
            r#"
            SELECT id, timestamp, inputs, prediction, probability
            FROM prediction_logs
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(row_to_log(&row)?)),
            None => Ok(None),
        }
    }

    async fn count_logs(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM prediction_logs")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("n"))
    }

    async fn replace_history(&self, rows: &[EmployeeHistoryRecord]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM employees_history")
            .execute(&mut *tx)
            .await?;

        for record in rows {
            sqlx::query(
                r#"
                INSERT INTO employees_history (
                    ratio_surcharge_anciennete, nombre_participation_pee,
                    departement_consulting, age, poste_consultant,
                    tension_salaire, statut_marital_marie,
                    annees_dans_l_entreprise, satisfaction_globale_moyenne,
                    satisfaction_employee_nature_travail, target_churn
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(record.ratio_surcharge_anciennete)
            .bind(record.nombre_participation_pee)
            .bind(record.departement_consulting)
            .bind(record.age)
            .bind(record.poste_consultant)
            .bind(record.tension_salaire)
            .bind(record.statut_marital_marie)
            .bind(record.annees_dans_l_entreprise)
            .bind(record.satisfaction_globale_moyenne)
            .bind(record.satisfaction_employee_nature_travail)
            .bind(record.target_churn)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!("{} employés insérés dans employees_history", rows.len());
        Ok(rows.len() as u64)
    }
}
