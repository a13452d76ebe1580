use anyhow::{Result, bail};
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use rustsent::application::analysis::PostAnalyzer;
use rustsent::application::analysis::evidence_extractor::NO_DIRECTION_PLACEHOLDER;
use rustsent::application::pipeline::{CandidateOutcome, RunScope, SentimentPipeline};
use rustsent::application::PersistenceGateway;
use rustsent::config::AnalysisConfig;
use rustsent::domain::article::Article;
use rustsent::domain::errors::PipelineError;
use rustsent::domain::repositories::{ArticleRepository, SentimentRepository};
use rustsent::domain::sentiment::{Conviction, Polarity, SentimentRecord};
use rustsent::infrastructure::{InMemoryArticleRepository, InMemorySentimentRepository};
use std::collections::HashSet;
use std::sync::Arc;

const TEST_CONFIG: &str = r#"
uncertainty = ["risk", "volatility"]

[[instruments]]
ticker = "TSLA"
aliases = ["Tesla", "테슬라"]

[[instruments]]
ticker = "AAPL"
aliases = ["Apple", "애플"]

[[instruments]]
ticker = "NVDA"
aliases = ["NVIDIA", "엔비디아"]

[lexicon]
positive = ["growth", "upgrade", "beat", "record high"]
negative = ["downgrade", "loss", "lawsuit"]
neutral = ["hold", "review"]

[horizon]
short_term = ["this week"]
long_term = ["next decade"]
medium_term = ["next quarter"]

[[themes]]
label = "electric-vehicle"
keywords = ["battery"]
"#;

const FLOOR: i64 = 56;

fn analysis_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 20).unwrap()
}

fn article(post_key: i64, hours_ago: i64, title: &str, body: &str) -> Article {
    Article {
        post_key,
        title: title.to_string(),
        body: body.to_string(),
        created_at: Utc::now() - Duration::hours(hours_ago),
    }
}

fn analyzer() -> PostAnalyzer {
    let config = AnalysisConfig::from_toml_str(TEST_CONFIG).expect("test config is valid");
    PostAnalyzer::new(Arc::new(config))
}

struct Stores {
    sentiments: Arc<InMemorySentimentRepository>,
    articles: Arc<InMemoryArticleRepository>,
}

async fn stores(posts: &[Article]) -> Stores {
    let sentiments = Arc::new(InMemorySentimentRepository::new());
    let articles = Arc::new(InMemoryArticleRepository::new(sentiments.clone()));
    for post in posts {
        articles.insert(post).await.unwrap();
    }
    Stores {
        sentiments,
        articles,
    }
}

async fn pipeline(
    articles: Arc<dyn ArticleRepository>,
    sentiments: Arc<dyn SentimentRepository>,
) -> SentimentPipeline {
    let gateway = PersistenceGateway::open(sentiments, FLOOR).await.unwrap();
    SentimentPipeline::new(articles, gateway, analyzer())
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[tokio::test]
async fn test_positive_article_end_to_end() {
    init_logging();
    let stores = stores(&[article(
        1,
        1,
        "Tesla quarterly update",
        "Tesla posts strong growth. Analysts upgrade the stock after a clear beat",
    )])
    .await;
    let mut pipeline = pipeline(stores.articles.clone(), stores.sentiments.clone()).await;

    let summary = pipeline.run(RunScope::Unanalyzed, analysis_date()).await.unwrap();
    assert_eq!(summary.written, 1);

    let records = stores.sentiments.find_by_post(1).await.unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.id, Some(FLOOR));
    assert_eq!(record.ticker, "TSLA");
    assert_eq!(record.polarity, Polarity::Positive);
    assert_eq!(record.score, 0.45);
    assert_eq!(record.conviction, Conviction::Medium);
    assert_eq!(record.evidence.positive_factors.len(), 3);
    assert!(record.evidence.negative_factors.is_empty());
    assert!(record.evidence.neutral_factors.is_empty());
    assert_eq!(record.mention_excerpt, "Tesla quarterly update\nTesla posts strong growth");
    assert!(record.rationale.starts_with("Tesla: "));
    assert!(record.rationale.ends_with("a positive outlook is expected."));
    assert_eq!(record.analysis_date, analysis_date());
}

#[tokio::test]
async fn test_two_instruments_share_article_level_score() {
    let stores = stores(&[article(
        2,
        1,
        "Big tech notes",
        "Apple and NVIDIA both reported growth this week",
    )])
    .await;
    let mut pipeline = pipeline(stores.articles.clone(), stores.sentiments.clone()).await;

    let summary = pipeline.run(RunScope::Unanalyzed, analysis_date()).await.unwrap();
    assert_eq!(summary.written, 2);

    let records = stores.sentiments.find_by_post(2).await.unwrap();
    let tickers: Vec<&str> = records.iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["AAPL", "NVDA"]);
    assert_eq!(records[0].polarity, records[1].polarity);
    assert_eq!(records[0].score, records[1].score);
    assert_eq!(records[0].score, 0.15);
    assert_eq!(records[0].horizon.as_str(), "short-term");
}

#[tokio::test]
async fn test_no_keyword_hits_gives_neutral_placeholder() {
    let stores = stores(&[article(3, 1, "Launch day", "Apple unveiled a new phone today")]).await;
    let mut pipeline = pipeline(stores.articles.clone(), stores.sentiments.clone()).await;

    pipeline.run(RunScope::Unanalyzed, analysis_date()).await.unwrap();

    let records = stores.sentiments.find_by_post(3).await.unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.polarity, Polarity::Neutral);
    assert_eq!(record.score, 0.0);
    assert_eq!(record.conviction, Conviction::Low);
    assert_eq!(record.evidence.neutral_factors, vec![NO_DIRECTION_PLACEHOLDER]);
    assert!(record.uncertainty_factors.is_empty());
    assert_eq!(record.themes, vec!["general"]);
    assert_eq!(record.horizon.as_str(), "medium-to-long-term");
}

#[tokio::test]
async fn test_article_without_mentions_produces_nothing() {
    let stores = stores(&[article(4, 1, "Weekend", "A walk in the park")]).await;
    let mut pipeline = pipeline(stores.articles.clone(), stores.sentiments.clone()).await;

    let summary = pipeline.run(RunScope::Unanalyzed, analysis_date()).await.unwrap();
    assert_eq!(summary.articles, 1);
    assert_eq!(summary.candidates, 0);
    assert_eq!(stores.sentiments.count().await.unwrap(), 0);
}

fn sample_posts() -> Vec<Article> {
    vec![
        article(10, 3, "Tesla battery", "Tesla battery growth beats the street"),
        article(11, 2, "Chip lawsuit", "NVIDIA faces a lawsuit and a downgrade"),
        article(12, 1, "Mixed bag", "Apple growth, Tesla loss, NVIDIA under review"),
    ]
}

#[tokio::test]
async fn test_second_run_writes_nothing() {
    let stores = stores(&sample_posts()).await;

    let mut first = pipeline(stores.articles.clone(), stores.sentiments.clone()).await;
    let summary = first.run(RunScope::Unanalyzed, analysis_date()).await.unwrap();
    assert_eq!(summary.written, 5);
    let count_after_first = stores.sentiments.count().await.unwrap();

    let mut second = pipeline(stores.articles.clone(), stores.sentiments.clone()).await;
    let summary = second.run(RunScope::Unanalyzed, analysis_date()).await.unwrap();
    assert_eq!(summary.articles, 0);
    assert_eq!(summary.written, 0);
    assert_eq!(stores.sentiments.count().await.unwrap(), count_after_first);

    // Re-scanning everything is idempotent as well.
    let mut third = pipeline(stores.articles.clone(), stores.sentiments.clone()).await;
    let summary = third.run(RunScope::All, analysis_date()).await.unwrap();
    assert_eq!(summary.articles, 3);
    assert_eq!(summary.written, 0);
    assert_eq!(summary.skipped, 5);
    assert_eq!(stores.sentiments.count().await.unwrap(), count_after_first);
}

#[tokio::test]
async fn test_pairs_stay_unique_and_ids_increase() {
    let stores = stores(&sample_posts()).await;
    // A record inserted by hand before the batch job ran.
    let analyzer = analyzer();
    let apple = analyzer.config().aliases.get("AAPL").unwrap();
    let manual = analyzer.analyze(&sample_posts()[2], apple, analysis_date());
    stores.sentiments.insert(&manual.with_id(70)).await.unwrap();

    // Post 12 is partially analyzed: the article-level filter hides it.
    let mut pending = pipeline(stores.articles.clone(), stores.sentiments.clone()).await;
    assert_eq!(pending.gateway().next_id(), 71);
    let summary = pending.run(RunScope::Unanalyzed, analysis_date()).await.unwrap();
    assert_eq!(summary.articles, 2);
    assert_eq!(summary.written, 2);

    // A full scan completes it without touching the existing pair.
    let mut full = pipeline(stores.articles.clone(), stores.sentiments.clone()).await;
    let summary = full.run(RunScope::All, analysis_date()).await.unwrap();
    assert_eq!(summary.written, 2);
    assert_eq!(summary.skipped, 3);

    let all: Vec<SentimentRecord> = stores.sentiments.all().await;
    assert_eq!(all.len(), 5);

    let mut pairs = HashSet::new();
    for record in &all {
        assert!(pairs.insert((record.post_key, record.ticker.clone())));
    }

    let ids: Vec<i64> = all.iter().map(|r| r.id.unwrap()).collect();
    assert_eq!(ids, vec![70, 71, 72, 73, 74]);
}

#[tokio::test]
async fn test_articles_processed_newest_first() {
    let stores = stores(&sample_posts()).await;
    let mut pipeline = pipeline(stores.articles.clone(), stores.sentiments.clone()).await;

    let summary = pipeline.run(RunScope::Unanalyzed, analysis_date()).await.unwrap();
    let order: Vec<i64> = summary.reports.iter().map(|r| r.post_key).collect();
    assert_eq!(order, vec![12, 11, 10]);

    let first = &summary.reports[0];
    assert_eq!(first.instruments.len(), 3);
    assert!(matches!(
        first.instruments[0].outcome,
        CandidateOutcome::Written { id: 56, .. }
    ));
}

/// Sentiment store that refuses to insert records for one ticker.
struct FlakySentimentRepository {
    inner: InMemorySentimentRepository,
    failing_ticker: String,
}

#[async_trait]
impl SentimentRepository for FlakySentimentRepository {
    async fn exists(&self, post_key: i64, ticker: &str) -> Result<bool> {
        self.inner.exists(post_key, ticker).await
    }

    async fn max_id(&self) -> Result<Option<i64>> {
        self.inner.max_id().await
    }

    async fn insert(&self, record: &SentimentRecord) -> Result<()> {
        if record.ticker == self.failing_ticker {
            bail!("disk I/O error");
        }
        self.inner.insert(record).await
    }

    async fn find_by_post(&self, post_key: i64) -> Result<Vec<SentimentRecord>> {
        self.inner.find_by_post(post_key).await
    }

    async fn count(&self) -> Result<usize> {
        self.inner.count().await
    }
}

#[tokio::test]
async fn test_write_failures_are_counted_and_run_continues() {
    init_logging();
    let stores = stores(&sample_posts()).await;
    let flaky = Arc::new(FlakySentimentRepository {
        inner: InMemorySentimentRepository::new(),
        failing_ticker: "NVDA".to_string(),
    });
    let mut pipeline = pipeline(stores.articles.clone(), flaky.clone()).await;

    let summary = pipeline.run(RunScope::Unanalyzed, analysis_date()).await.unwrap();
    assert_eq!(summary.candidates, 5);
    assert_eq!(summary.failed, 2);
    assert_eq!(summary.written, 3);
    assert_eq!(flaky.count().await.unwrap(), 3);

    // Failed writes do not burn ids.
    let ids: Vec<i64> = flaky.inner.all().await.iter().map(|r| r.id.unwrap()).collect();
    assert_eq!(ids, vec![56, 57, 58]);
}

struct BrokenArticleRepository;

#[async_trait]
impl ArticleRepository for BrokenArticleRepository {
    async fn fetch_all(&self) -> Result<Vec<Article>> {
        bail!("no such table: blog_posts")
    }

    async fn fetch_unanalyzed(&self) -> Result<Vec<Article>> {
        bail!("no such table: blog_posts")
    }

    async fn insert(&self, _article: &Article) -> Result<()> {
        bail!("read-only")
    }
}

#[tokio::test]
async fn test_article_read_failure_is_fatal() {
    let sentiments = Arc::new(InMemorySentimentRepository::new());
    let mut pipeline = pipeline(Arc::new(BrokenArticleRepository), sentiments).await;

    let err = pipeline
        .run(RunScope::Unanalyzed, analysis_date())
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::StoreRead { .. }));
    assert!(err.to_string().contains("blog_posts"));
}
