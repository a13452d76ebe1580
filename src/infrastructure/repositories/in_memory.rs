//! In-Memory Repository Implementations
//!
//! This module provides thread-safe, in-memory implementations of the
//! repository traits defined in `domain::repositories`.
//!
//! # Features
//!
//! - **Thread-safe**: Uses `Arc<RwLock>` for shared access
//! - **Async**: All operations are async-ready
//! - **Testing**: Ideal for unit tests and dry runs
//!
//! # Limitations
//!
//! - Data is lost when the process exits
//! - The article store needs the sentiment store to answer
//!   `fetch_unanalyzed`, mirroring the SQL sub-select of the SQLite version

use crate::domain::article::Article;
use crate::domain::repositories::{ArticleRepository, SentimentRepository};
use crate::domain::sentiment::SentimentRecord;
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of SentimentRepository
pub struct InMemorySentimentRepository {
    records: Arc<RwLock<Vec<SentimentRecord>>>,
}

impl InMemorySentimentRepository {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Posts that have at least one record.
    pub async fn analyzed_posts(&self) -> HashSet<i64> {
        self.records.read().await.iter().map(|r| r.post_key).collect()
    }

    pub async fn all(&self) -> Vec<SentimentRecord> {
        self.records.read().await.clone()
    }
}

impl Default for InMemorySentimentRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SentimentRepository for InMemorySentimentRepository {
    async fn exists(&self, post_key: i64, ticker: &str) -> Result<bool> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .any(|r| r.post_key == post_key && r.ticker == ticker))
    }

    async fn max_id(&self) -> Result<Option<i64>> {
        Ok(self.records.read().await.iter().filter_map(|r| r.id).max())
    }

    async fn insert(&self, record: &SentimentRecord) -> Result<()> {
        let Some(id) = record.id else {
            bail!("Cannot store sentiment without an id");
        };
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id == Some(id)) {
            bail!("Duplicate sentiment id {}", id);
        }
        records.push(record.clone());
        Ok(())
    }

    async fn find_by_post(&self, post_key: i64) -> Result<Vec<SentimentRecord>> {
        let records = self.records.read().await;
        let mut found: Vec<SentimentRecord> = records
            .iter()
            .filter(|r| r.post_key == post_key)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.id);
        Ok(found)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.records.read().await.len())
    }
}

/// In-memory implementation of ArticleRepository
pub struct InMemoryArticleRepository {
    articles: Arc<RwLock<Vec<Article>>>,
    sentiments: Arc<InMemorySentimentRepository>,
}

impl InMemoryArticleRepository {
    pub fn new(sentiments: Arc<InMemorySentimentRepository>) -> Self {
        Self {
            articles: Arc::new(RwLock::new(Vec::new())),
            sentiments,
        }
    }

    async fn newest_first(&self, filter: impl Fn(&Article) -> bool) -> Vec<Article> {
        let articles = self.articles.read().await;
        let mut selected: Vec<Article> = articles.iter().filter(|a| filter(a)).cloned().collect();
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        selected
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn fetch_all(&self) -> Result<Vec<Article>> {
        Ok(self.newest_first(|_| true).await)
    }

    async fn fetch_unanalyzed(&self) -> Result<Vec<Article>> {
        let analyzed = self.sentiments.analyzed_posts().await;
        Ok(self
            .newest_first(|a| !analyzed.contains(&a.post_key))
            .await)
    }

    async fn insert(&self, article: &Article) -> Result<()> {
        let mut articles = self.articles.write().await;
        articles.retain(|a| a.post_key != article.post_key);
        articles.push(article.clone());
        Ok(())
    }
}
