use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

pub const CONFIG_FILE: &str = "rowmerge.toml";
pub const ENV_PREFIX: &str = "ROWMERGE__";

/// The two delimited files merged on each run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputConfig {
    pub first: PathBuf,
    pub second: PathBuf,
    /// Drop blank lines instead of turning them into single-field rows
    pub skip_blank_lines: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            first: PathBuf::from("Тестовый файл1.txt"),
            second: PathBuf::from("Тестовый файл2.txt"),
            skip_blank_lines: false,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputConfig {
    pub json_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json_path: PathBuf::from("combined_data.json"),
        }
    }
}

/// PostgreSQL connection settings and target table
#[derive(Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub table: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "test_db".to_string(),
            user: "postgres".to_string(),
            password: "password".to_string(),
            table: "combined_data".to_string(),
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .field("table", &self.table)
            .finish()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Stop after writing the JSON file
    pub skip_database: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub database: DatabaseConfig,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Defaults, then `rowmerge.toml`, then `ROWMERGE__` environment variables
    pub fn load() -> Result<Self> {
        Self::figment().extract().map_err(|e| {
            AppError::ConfigError(format!("Failed to load configuration: {}", e))
        })
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}
