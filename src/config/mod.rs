//! Configuration module for Rustsent.
//!
//! Process settings come from environment variables (optionally loaded from
//! `.env` by the binary). The analysis data lives in `analysis_config`.

mod analysis_config;

pub use analysis_config::AnalysisConfig;

use crate::domain::errors::PipelineError;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://database.db";

/// First id handed out when the sentiment store is empty. Ids below it were
/// assigned by hand before the batch job existed.
pub const DEFAULT_ID_FLOOR: i64 = 56;

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub analysis_config_path: Option<PathBuf>,
    pub id_floor: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            analysis_config_path: None,
            id_floor: DEFAULT_ID_FLOOR,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, PipelineError> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let analysis_config_path = env::var("ANALYSIS_CONFIG_PATH")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let id_floor = match env::var("SENTIMENT_ID_FLOOR") {
            Ok(raw) => Self::parse_id_floor(&raw)?,
            Err(_) => DEFAULT_ID_FLOOR,
        };

        Ok(Self {
            database_url,
            analysis_config_path,
            id_floor,
        })
    }

    fn parse_id_floor(raw: &str) -> Result<i64, PipelineError> {
        let value = raw.trim().parse::<i64>().map_err(|e| {
            PipelineError::configuration(format!("Invalid SENTIMENT_ID_FLOOR '{}': {}", raw, e))
        })?;
        if value < 1 {
            return Err(PipelineError::configuration(format!(
                "SENTIMENT_ID_FLOOR must be positive, got {}",
                value
            )));
        }
        Ok(value)
    }

    /// Load and validate the analysis configuration this config points at.
    pub fn load_analysis_config(&self) -> Result<AnalysisConfig, PipelineError> {
        AnalysisConfig::load(self.analysis_config_path.as_deref())
    }
}
