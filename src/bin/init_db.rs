//! Bootstrap the historical employee dataset into the database.
//!
//! Reads the exported training CSV, renames its headers to the
//! `employees_history` column names, fills absent columns with 0 and
//! replaces the whole table in one transaction.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use churn_api::storage::{EmployeeHistoryRecord, PredictionStore, SqliteStore};

#[derive(Parser, Debug)]
#[command(name = "init_db")]
#[command(about = "Charge le dataset historique dans employees_history")]
struct Cli {
    /// CSV du dataset d'entraînement
    #[arg(long, default_value = "final_data_set.csv")]
    csv: PathBuf,

    /// Fichier SQLite cible (DATABASE_URL prime s'il est défini)
    #[arg(long, default_value = "data/demo.db")]
    database: PathBuf,
}

/// Exported header -> history column name.
const BOOTSTRAP_RENAMES: [(&str, &str); 4] = [
    ("statut_marital_Marié(e)", "statut_marital_marie"),
    ("departement_Consulting", "departement_consulting"),
    ("poste_Consultant", "poste_consultant"),
    ("a_quitte_l_entreprise_num", "target_churn"),
];

const HISTORY_COLUMNS: [&str; 11] = [
    "ratio_surcharge_anciennete",
    "nombre_participation_pee",
    "departement_consulting",
    "age",
    "poste_consultant",
    "tension_salaire",
    "statut_marital_marie",
    "annees_dans_l_entreprise",
    "satisfaction_globale_moyenne",
    "satisfaction_employee_nature_travail",
    "target_churn",
];

fn normalize_header(name: &str) -> &str {
    BOOTSTRAP_RENAMES
        .iter()
        .find(|(exported, _)| *exported == name)
        .map(|(_, column)| *column)
        .unwrap_or(name)
}

fn parse_rows(content: &str) -> Result<Vec<EmployeeHistoryRecord>> {
    let mut lines = content.lines();
    let header = lines.next().context("CSV vide")?;
    let columns: Vec<&str> = header
        .split(',')
        .map(|h| normalize_header(h.trim()))
        .collect();

    let index_of = |name: &str| columns.iter().position(|c| *c == name);
    for missing in HISTORY_COLUMNS.iter().filter(|c| index_of(c).is_none()) {
        warn!("Colonne '{}' absente du CSV, remplacée par 0", missing);
    }

    let mut rows = Vec::new();
    for line in lines {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();

        // Absent column, unparsable cell or NaN in the export becomes 0.
        let number = |name: &str| -> f64 {
            index_of(name)
                .and_then(|i| fields.get(i))
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .unwrap_or(0.0)
        };

        rows.push(EmployeeHistoryRecord {
            ratio_surcharge_anciennete: number("ratio_surcharge_anciennete"),
            nombre_participation_pee: number("nombre_participation_pee") as i64,
            departement_consulting: number("departement_consulting"),
            age: number("age") as i64,
            poste_consultant: number("poste_consultant"),
            tension_salaire: number("tension_salaire"),
            statut_marital_marie: number("statut_marital_marie"),
            annees_dans_l_entreprise: number("annees_dans_l_entreprise") as i64,
            satisfaction_globale_moyenne: number("satisfaction_globale_moyenne"),
            satisfaction_employee_nature_travail: number("satisfaction_employee_nature_travail")
                as i64,
            target_churn: Some(number("target_churn") as i64),
        });
    }

    Ok(rows)
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let content = std::fs::read_to_string(&cli.csv)
        .with_context(|| format!("Le fichier {} est introuvable", cli.csv.display()))?;
    let rows = parse_rows(&content)?;
    info!("{} lignes lues depuis {}", rows.len(), cli.csv.display());

    let store = match std::env::var("DATABASE_URL") {
        Ok(url) if !url.is_empty() => SqliteStore::connect(&url).await?,
        _ => SqliteStore::new(&cli.database.to_string_lossy()).await?,
    };

    let inserted = store.replace_history(&rows).await?;
    let total = store.count_history().await?;
    info!("Succès : {} employés insérés, {} lignes en base", inserted, total);

    Ok(())
}
