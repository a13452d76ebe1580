//! Repository Pattern Abstractions
//!
//! This module defines the two storage collaborators of the pipeline:
//! - `ArticleRepository`: read access to blog posts (the article store)
//! - `SentimentRepository`: the append-only sentiment table
//!
//! # Implementations
//!
//! `infrastructure::persistence` provides SQLite implementations backed by
//! `sqlx`; `infrastructure::repositories` provides in-memory ones for tests
//! and dry runs.
//!
//! # Example
//!
//! ```rust,no_run
//! use rustsent::domain::repositories::SentimentRepository;
//! use rustsent::infrastructure::repositories::InMemorySentimentRepository;
//!
//! # async {
//! let repo = InMemorySentimentRepository::new();
//! let exists = repo.exists(512, "005930").await.unwrap();
//! assert!(!exists);
//! # };
//! ```

use crate::domain::article::Article;
use crate::domain::sentiment::SentimentRecord;
use anyhow::Result;
use async_trait::async_trait;

/// Read access to the blog post store.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// All articles, newest first.
    async fn fetch_all(&self) -> Result<Vec<Article>>;

    /// Articles with no sentiment record at all, newest first.
    async fn fetch_unanalyzed(&self) -> Result<Vec<Article>>;

    /// Store an article (seeding and tests; the pipeline never writes posts).
    async fn insert(&self, article: &Article) -> Result<()>;
}

/// Append-only store of sentiment records.
///
/// `(post_key, ticker)` uniqueness is enforced by callers through `exists`.
#[async_trait]
pub trait SentimentRepository: Send + Sync {
    /// Whether a record already exists for the pair.
    async fn exists(&self, post_key: i64, ticker: &str) -> Result<bool>;

    /// Largest id currently stored, if any.
    async fn max_id(&self) -> Result<Option<i64>>;

    /// Persist a record. The record must carry an id.
    async fn insert(&self, record: &SentimentRecord) -> Result<()>;

    /// All records for one post, ordered by id.
    async fn find_by_post(&self, post_key: i64) -> Result<Vec<SentimentRecord>>;

    /// Total number of records.
    async fn count(&self) -> Result<usize>;
}
