use crate::domain::article::Article;
use crate::domain::repositories::ArticleRepository;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::{Row, SqlitePool};
use tracing::warn;

pub struct SqliteArticleRepository {
    pool: SqlitePool,
}

impl SqliteArticleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Epoch values at or above this are milliseconds, below it seconds.
const EPOCH_MILLIS_THRESHOLD: f64 = 1e11;

/// Posts were written by several tools over time; accept the date formats
/// they used, including Unix epochs in seconds or milliseconds.
fn parse_created_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        && let Some(naive) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(naive.and_utc());
    }
    if let Ok(epoch) = raw.parse::<f64>()
        && epoch.is_finite()
    {
        let millis = if epoch.abs() >= EPOCH_MILLIS_THRESHOLD {
            epoch
        } else {
            epoch * 1000.0
        };
        if let Some(dt) = DateTime::from_timestamp_millis(millis.round() as i64) {
            return Ok(dt);
        }
    }
    Err(anyhow!("Unrecognised created_date: {}", raw))
}

/// A bad date only affects ordering, so the post is kept and sorts last.
fn created_at_or_epoch(post_key: i64, raw: Option<&str>) -> DateTime<Utc> {
    match raw.map(parse_created_date) {
        Some(Ok(created_at)) => created_at,
        Some(Err(e)) => {
            warn!("Post {}: {}; ordering it as oldest", post_key, e);
            DateTime::UNIX_EPOCH
        }
        None => {
            warn!("Post {}: missing created_date; ordering it as oldest", post_key);
            DateTime::UNIX_EPOCH
        }
    }
}

impl SqliteArticleRepository {
    /// `created_date` is selected as TEXT so integer and real epochs decode too.
    fn map_rows_to_articles(&self, rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<Article>> {
        let mut articles = Vec::new();
        for row in rows {
            let post_key: i64 = row.try_get("id")?;
            let created: Option<String> = row.try_get("created_date")?;
            articles.push(Article {
                post_key,
                title: row.try_get("title")?,
                body: row.try_get("content")?,
                created_at: created_at_or_epoch(post_key, created.as_deref()),
            });
        }
        // SQLite orders mixed TEXT and INTEGER values by type first.
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(articles)
    }
}

#[async_trait]
impl ArticleRepository for SqliteArticleRepository {
    async fn fetch_all(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, content, CAST(created_date AS TEXT) AS created_date
            FROM blog_posts
            ORDER BY id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch blog posts")?;
        self.map_rows_to_articles(rows)
    }

    async fn fetch_unanalyzed(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT bp.id, bp.title, bp.content, CAST(bp.created_date AS TEXT) AS created_date
            FROM blog_posts bp
            WHERE bp.id NOT IN (SELECT DISTINCT post_id FROM sentiments)
            ORDER BY bp.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch unanalyzed blog posts")?;
        self.map_rows_to_articles(rows)
    }

    async fn insert(&self, article: &Article) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO blog_posts (id, title, content, created_date)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                content = excluded.content,
                created_date = excluded.created_date
            "#,
        )
        .bind(article.post_key)
        .bind(&article.title)
        .bind(&article.body)
        .bind(article.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save blog post")?;

        Ok(())
    }
}
