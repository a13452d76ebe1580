//! Instruments and the alias table used to spot them in free text.

use crate::domain::errors::PipelineError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A listed instrument and the surface names that identify it in an article.
///
/// The first alias is the canonical display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub ticker: String,
    pub aliases: Vec<String>,
}

impl Instrument {
    pub fn new(ticker: impl Into<String>, aliases: &[&str]) -> Self {
        Self {
            ticker: ticker.into(),
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Canonical display name (first declared alias).
    pub fn canonical_name(&self) -> &str {
        self.aliases
            .first()
            .map(String::as_str)
            .unwrap_or(self.ticker.as_str())
    }

    /// Case-insensitive check against every alias.
    ///
    /// `haystack_lower` must already be lower-cased.
    pub fn is_mentioned_in(&self, haystack_lower: &str) -> bool {
        self.aliases
            .iter()
            .any(|alias| haystack_lower.contains(&alias.to_lowercase()))
    }
}

/// Latin aliases below this length match inside ordinary words.
pub const MIN_LATIN_ALIAS_CHARS: usize = 3;

fn is_too_generic(alias: &str) -> bool {
    let alias = alias.trim();
    alias.is_ascii() && alias.chars().count() < MIN_LATIN_ALIAS_CHARS
}

/// Immutable, ordered instrument dictionary.
///
/// Declaration order is significant: detection results follow it.
#[derive(Debug, Clone)]
pub struct AliasTable {
    instruments: Vec<Instrument>,
}

impl AliasTable {
    pub fn new(instruments: Vec<Instrument>) -> Result<Self, PipelineError> {
        if instruments.is_empty() {
            return Err(PipelineError::configuration("alias table has no instruments"));
        }

        let mut tickers = HashSet::new();
        for instrument in &instruments {
            if instrument.ticker.trim().is_empty() {
                return Err(PipelineError::configuration("instrument with blank ticker"));
            }
            if !tickers.insert(instrument.ticker.as_str()) {
                return Err(PipelineError::configuration(format!(
                    "duplicate ticker in alias table: {}",
                    instrument.ticker
                )));
            }
            if instrument.aliases.is_empty() {
                return Err(PipelineError::configuration(format!(
                    "instrument {} has no aliases",
                    instrument.ticker
                )));
            }
            if instrument.aliases.iter().any(|a| a.trim().is_empty()) {
                return Err(PipelineError::configuration(format!(
                    "instrument {} has a blank alias",
                    instrument.ticker
                )));
            }
            if let Some(alias) = instrument.aliases.iter().find(|a| is_too_generic(a)) {
                return Err(PipelineError::configuration(format!(
                    "instrument {} has alias '{}' shorter than {} Latin characters",
                    instrument.ticker, alias, MIN_LATIN_ALIAS_CHARS
                )));
            }
        }

        Ok(Self { instruments })
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn get(&self, ticker: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.ticker == ticker)
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}
