//! Analysis configuration: alias table, polarity lexicon and metadata rules.
//!
//! The data is static for a run. It is read from a TOML file when one is
//! configured, otherwise from the default compiled into the binary with
//! `include_str!`, so instruments and keywords change without code changes.

use crate::domain::errors::PipelineError;
use crate::domain::instrument::{AliasTable, Instrument};
use crate::domain::lexicon::{HorizonKeywords, Lexicon, MetadataRules, ThemeRule};
use serde::Deserialize;
use std::path::Path;

const EMBEDDED_CONFIG: &str = include_str!("../../config/analysis.toml");

fn default_theme() -> String {
    "general".to_string()
}

/// On-disk shape of the configuration file.
#[derive(Debug, Deserialize)]
struct AnalysisConfigFile {
    #[serde(default = "default_theme")]
    default_theme: String,
    #[serde(default)]
    uncertainty: Vec<String>,
    instruments: Vec<Instrument>,
    lexicon: Lexicon,
    horizon: HorizonKeywords,
    #[serde(default)]
    themes: Vec<ThemeRule>,
}

/// Validated, immutable analysis configuration injected into the pipeline.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub aliases: AliasTable,
    pub lexicon: Lexicon,
    pub rules: MetadataRules,
}

impl AnalysisConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, PipelineError> {
        let file: AnalysisConfigFile = toml::from_str(content)
            .map_err(|e| PipelineError::configuration(format!("TOML parse error: {}", e)))?;

        let aliases = AliasTable::new(file.instruments)?;
        let lexicon = Lexicon::new(
            file.lexicon.positive,
            file.lexicon.negative,
            file.lexicon.neutral,
        )?;
        let rules = MetadataRules::new(
            file.themes,
            file.default_theme,
            file.horizon,
            file.uncertainty,
        )?;

        Ok(Self {
            aliases,
            lexicon,
            rules,
        })
    }

    /// Default configuration shipped with the binary.
    pub fn embedded() -> Result<Self, PipelineError> {
        Self::from_toml_str(EMBEDDED_CONFIG)
    }

    pub fn from_path(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::configuration(format!(
                "cannot read analysis config {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// File when `path` is given, embedded default otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, PipelineError> {
        match path {
            Some(p) => Self::from_path(p),
            None => Self::embedded(),
        }
    }
}
