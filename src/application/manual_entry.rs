//! Hand-written analyses written through the persistence gateway.
//!
//! Detection and scoring are bypassed entirely: the caller supplies the full
//! analysis. Duplicate `(post, ticker)` pairs are skipped and ids come from
//! the gateway's allocator like any other record.

use crate::application::persistence_gateway::{PersistenceGateway, WriteOutcome};
use crate::domain::errors::PipelineError;
use crate::domain::sentiment::{Conviction, Horizon, Polarity, SentimentRecord, SupportingEvidence};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// One externally supplied analysis, in the sentiment table's vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualRecord {
    pub post_id: i64,
    pub ticker: String,
    pub sentiment: Polarity,
    pub sentiment_score: f64,
    pub key_reasoning: String,
    #[serde(default)]
    pub supporting_evidence: SupportingEvidence,
    #[serde(default)]
    pub investment_perspective: Vec<String>,
    pub investment_timeframe: Horizon,
    /// Derived from the score when omitted.
    #[serde(default)]
    pub conviction_level: Option<Conviction>,
    #[serde(default)]
    pub uncertainty_factors: Vec<String>,
    #[serde(default)]
    pub mention_context: String,
    /// Defaults to the import date.
    #[serde(default)]
    pub analysis_date: Option<NaiveDate>,
}

impl ManualRecord {
    pub fn into_record(self, default_date: NaiveDate) -> Result<SentimentRecord, PipelineError> {
        let score = self.sentiment_score;
        if !(-1.0..=1.0).contains(&score) {
            return Err(PipelineError::invalid_record(format!(
                "post {} / {}: score {} outside [-1.0, 1.0]",
                self.post_id, self.ticker, score
            )));
        }
        let sign_ok = match self.sentiment {
            Polarity::Positive => score > 0.0,
            Polarity::Negative => score < 0.0,
            Polarity::Neutral => score == 0.0,
        };
        if !sign_ok {
            return Err(PipelineError::invalid_record(format!(
                "post {} / {}: score {} does not match polarity {}",
                self.post_id, self.ticker, score, self.sentiment
            )));
        }

        Ok(SentimentRecord {
            id: None,
            post_key: self.post_id,
            ticker: self.ticker,
            polarity: self.sentiment,
            score,
            rationale: self.key_reasoning,
            evidence: self.supporting_evidence,
            themes: self.investment_perspective,
            horizon: self.investment_timeframe,
            conviction: self
                .conviction_level
                .unwrap_or_else(|| Conviction::from_score(score)),
            uncertainty_factors: self.uncertainty_factors,
            mention_excerpt: self.mention_context,
            analysis_date: self.analysis_date.unwrap_or(default_date),
        })
    }
}

pub fn load_manual_records(path: &Path) -> Result<Vec<ManualRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manual records: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse manual records JSON: {}", path.display()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub written: Vec<i64>,
    pub skipped: usize,
    pub rejected: usize,
    pub failed: usize,
}

/// Validate and write every record; bad or failing entries are counted, not fatal.
pub async fn import_records(
    gateway: &mut PersistenceGateway,
    records: Vec<ManualRecord>,
    default_date: NaiveDate,
) -> ImportSummary {
    let mut summary = ImportSummary::default();

    for manual in records {
        let record = match manual.into_record(default_date) {
            Ok(record) => record,
            Err(e) => {
                warn!("Rejected manual record: {}", e);
                summary.rejected += 1;
                continue;
            }
        };
        let (post_key, ticker) = (record.post_key, record.ticker.clone());

        match gateway.write(record).await {
            Ok(WriteOutcome::Written(id)) => {
                info!("Inserted manual sentiment {} (post {} / {})", id, post_key, ticker);
                summary.written.push(id);
            }
            Ok(WriteOutcome::AlreadyExists) => {
                info!("Post {} / {} already analyzed, skipping", post_key, ticker);
                summary.skipped += 1;
            }
            Err(e) => {
                warn!("{}", e);
                summary.failed += 1;
            }
        }
    }

    summary
}
