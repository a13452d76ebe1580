use crate::domain::repositories::SentimentRepository;
use crate::domain::sentiment::{Conviction, Horizon, Polarity, SentimentRecord, SupportingEvidence};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::info;

/// SQLite sentiment table. List-valued fields are stored as JSON text.
pub struct SqliteSentimentRepository {
    pool: SqlitePool,
}

impl SqliteSentimentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SentimentRepository for SqliteSentimentRepository {
    async fn exists(&self, post_key: i64, ticker: &str) -> Result<bool> {
        let row = sqlx::query("SELECT id FROM sentiments WHERE post_id = ? AND ticker = ? LIMIT 1")
            .bind(post_key)
            .bind(ticker)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to check existing sentiment")?;
        Ok(row.is_some())
    }

    async fn max_id(&self) -> Result<Option<i64>> {
        let row = sqlx::query("SELECT MAX(id) AS max_id FROM sentiments")
            .fetch_one(&self.pool)
            .await
            .context("Failed to read max sentiment id")?;
        let max_id: Option<i64> = row.try_get("max_id")?;
        Ok(max_id)
    }

    async fn insert(&self, record: &SentimentRecord) -> Result<()> {
        let id = record
            .id
            .ok_or_else(|| anyhow!("Cannot store sentiment without an id"))?;

        let evidence_json = serde_json::to_string(&record.evidence)?;
        let themes_json = serde_json::to_string(&record.themes)?;
        let uncertainty_json = serde_json::to_string(&record.uncertainty_factors)?;

        sqlx::query(
            r#"
            INSERT INTO sentiments (
                id, post_id, ticker, sentiment, sentiment_score, key_reasoning,
                supporting_evidence, investment_perspective, investment_timeframe,
                conviction_level, uncertainty_factors, mention_context, analysis_date
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(record.post_key)
        .bind(&record.ticker)
        .bind(record.polarity.as_str())
        .bind(record.score)
        .bind(&record.rationale)
        .bind(evidence_json)
        .bind(themes_json)
        .bind(record.horizon.as_str())
        .bind(record.conviction.as_str())
        .bind(uncertainty_json)
        .bind(&record.mention_excerpt)
        .bind(record.analysis_date)
        .execute(&self.pool)
        .await
        .context("Failed to save sentiment")?;

        info!(
            "Persisted Sentiment {} (post {} / {})",
            id, record.post_key, record.ticker
        );
        Ok(())
    }

    async fn find_by_post(&self, post_key: i64) -> Result<Vec<SentimentRecord>> {
        let rows = sqlx::query("SELECT * FROM sentiments WHERE post_id = ? ORDER BY id ASC")
            .bind(post_key)
            .fetch_all(&self.pool)
            .await
            .context("Failed to load sentiments")?;
        self.map_rows_to_records(rows)
    }

    async fn count(&self) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM sentiments")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count as usize)
    }
}

impl SqliteSentimentRepository {
    fn map_rows_to_records(&self, rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<SentimentRecord>> {
        let mut records = Vec::new();
        for row in rows {
            let polarity: String = row.try_get("sentiment")?;
            let horizon: String = row.try_get("investment_timeframe")?;
            let conviction: String = row.try_get("conviction_level")?;
            let evidence: String = row.try_get("supporting_evidence")?;
            let themes: String = row.try_get("investment_perspective")?;
            let uncertainty: String = row.try_get("uncertainty_factors")?;
            let analysis_date: NaiveDate = row.try_get("analysis_date")?;

            records.push(SentimentRecord {
                id: Some(row.try_get("id")?),
                post_key: row.try_get("post_id")?,
                ticker: row.try_get("ticker")?,
                polarity: Polarity::from_str(&polarity)?,
                score: row.try_get("sentiment_score")?,
                rationale: row.try_get("key_reasoning")?,
                evidence: serde_json::from_str::<SupportingEvidence>(&evidence)
                    .context("Malformed supporting_evidence JSON")?,
                themes: serde_json::from_str(&themes)
                    .context("Malformed investment_perspective JSON")?,
                horizon: Horizon::from_str(&horizon)?,
                conviction: Conviction::from_str(&conviction)?,
                uncertainty_factors: serde_json::from_str(&uncertainty)
                    .context("Malformed uncertainty_factors JSON")?,
                mention_excerpt: row.try_get("mention_context")?,
                analysis_date,
            });
        }
        Ok(records)
    }
}
