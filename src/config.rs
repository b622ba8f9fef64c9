//! Churn prediction service configuration

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Artifact file: a structured package `{model, threshold, features}`
    /// or a bare estimator object.
    pub artifact_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Local database file used when `DATABASE_URL` is not set.
    pub sqlite_path: PathBuf,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn default_path() -> &'static str {
        "config.toml"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            model: ModelConfig {
                artifact_path: PathBuf::from("model/modele_churn_light.json"),
            },
            storage: StorageConfig {
                sqlite_path: PathBuf::from("data/demo.db"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_config_file() {
        let config: Config = toml::from_str(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [model]
            artifact_path = "artifacts/churn.json"

            [storage]
            sqlite_path = "var/churn.db"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.model.artifact_path, PathBuf::from("artifacts/churn.json"));
        assert_eq!(config.storage.sqlite_path, PathBuf::from("var/churn.db"));
    }

    #[test]
    fn default_matches_the_deployment_layout() {
        let config = Config::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(
            config.model.artifact_path,
            PathBuf::from("model/modele_churn_light.json")
        );
    }
}
