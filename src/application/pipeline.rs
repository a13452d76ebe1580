//! Batch driver: articles in, sentiment records out.
//!
//! Two levels of skipping keep re-runs cheap and idempotent: the article
//! query leaves out posts that already have any record, and each detected
//! instrument is checked against the exact `(post, ticker)` pair before it is
//! scored. Articles are processed one at a time, to completion.

use crate::application::analysis::PostAnalyzer;
use crate::application::persistence_gateway::{PersistenceGateway, WriteOutcome};
use crate::domain::article::Article;
use crate::domain::errors::PipelineError;
use crate::domain::repositories::ArticleRepository;
use crate::domain::sentiment::Polarity;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which articles a run looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunScope {
    /// Only posts without any sentiment record.
    #[default]
    Unanalyzed,
    /// Every post; finishes partially analyzed ones.
    All,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CandidateOutcome {
    Written { id: i64, polarity: Polarity, score: f64 },
    Skipped,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentReport {
    pub ticker: String,
    pub outcome: CandidateOutcome,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArticleReport {
    pub post_key: i64,
    pub title: String,
    pub instruments: Vec<InstrumentReport>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub articles: usize,
    pub candidates: usize,
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
    pub reports: Vec<ArticleReport>,
}

impl RunSummary {
    fn record(&mut self, outcome: &CandidateOutcome) {
        self.candidates += 1;
        match outcome {
            CandidateOutcome::Written { .. } => self.written += 1,
            CandidateOutcome::Skipped => self.skipped += 1,
            CandidateOutcome::Failed => self.failed += 1,
        }
    }
}

fn preview(title: &str) -> String {
    title.chars().take(50).collect()
}

pub struct SentimentPipeline {
    articles: Arc<dyn ArticleRepository>,
    gateway: PersistenceGateway,
    analyzer: PostAnalyzer,
}

impl SentimentPipeline {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        gateway: PersistenceGateway,
        analyzer: PostAnalyzer,
    ) -> Self {
        Self {
            articles,
            gateway,
            analyzer,
        }
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    pub async fn run(
        &mut self,
        scope: RunScope,
        analysis_date: NaiveDate,
    ) -> Result<RunSummary, PipelineError> {
        let articles = match scope {
            RunScope::Unanalyzed => self.articles.fetch_unanalyzed().await,
            RunScope::All => self.articles.fetch_all().await,
        }
        .map_err(PipelineError::store_read)?;

        info!("Analysis target posts: {} ({:?})", articles.len(), scope);

        let mut summary = RunSummary::default();
        let total = articles.len();
        for (index, article) in articles.iter().enumerate() {
            info!(
                "[{}/{}] Analyzing post {}: {}",
                index + 1,
                total,
                article.post_key,
                preview(&article.title)
            );
            let report = self.process_article(article, analysis_date, &mut summary).await;
            summary.articles += 1;
            summary.reports.push(report);
        }

        info!(
            "Analysis complete: {} written, {} skipped, {} failed ({} candidates in {} posts)",
            summary.written, summary.skipped, summary.failed, summary.candidates, summary.articles
        );
        Ok(summary)
    }

    async fn process_article(
        &mut self,
        article: &Article,
        analysis_date: NaiveDate,
        summary: &mut RunSummary,
    ) -> ArticleReport {
        let mentioned = self.analyzer.detect(article);
        if mentioned.is_empty() {
            debug!("Post {}: no instruments mentioned", article.post_key);
        }

        let mut instruments = Vec::with_capacity(mentioned.len());
        for instrument in mentioned {
            let outcome = match self.gateway.contains(article.post_key, &instrument.ticker).await {
                Ok(true) => {
                    debug!("  - {}: already analyzed", instrument.ticker);
                    CandidateOutcome::Skipped
                }
                Ok(false) => {
                    let record = self.analyzer.analyze(article, instrument, analysis_date);
                    let (polarity, score) = (record.polarity, record.score);
                    match self.gateway.write(record).await {
                        Ok(WriteOutcome::Written(id)) => {
                            info!("  - {}: {} ({})", instrument.ticker, polarity, score);
                            CandidateOutcome::Written {
                                id,
                                polarity,
                                score,
                            }
                        }
                        Ok(WriteOutcome::AlreadyExists) => CandidateOutcome::Skipped,
                        Err(e) => {
                            warn!("  - {}: {}", instrument.ticker, e);
                            CandidateOutcome::Failed
                        }
                    }
                }
                Err(e) => {
                    warn!("  - {}: {}", instrument.ticker, e);
                    CandidateOutcome::Failed
                }
            };

            summary.record(&outcome);
            instruments.push(InstrumentReport {
                ticker: instrument.ticker.clone(),
                outcome,
            });
        }

        ArticleReport {
            post_key: article.post_key,
            title: article.title.clone(),
            instruments,
        }
    }
}
