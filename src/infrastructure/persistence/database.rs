use anyhow::{Context, Result};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;
use tracing::info;

/// Shared SQLite handle holding both the article and the sentiment tables.
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
}

impl Database {
    pub async fn new(db_url: &str) -> Result<Self> {
        // Ensure the directory exists if it's a file path
        if let Some(path_part) = db_url.strip_prefix("sqlite://") {
            let path = Path::new(path_part);
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create database directory")?;
            }
        }

        let in_memory = db_url.contains(":memory:");
        let mut options = SqliteConnectOptions::from_str(db_url)?.create_if_missing(true);
        if !in_memory {
            options = options.journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);
        }

        // Every connection to an in-memory database is a separate database.
        let max_connections = if in_memory { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .context("Failed to connect to SQLite database")?;

        info!("Connected to database: {}", db_url);

        let db = Self { pool };
        db.init().await?;

        Ok(db)
    }

    /// Fresh in-memory database with the schema applied.
    pub async fn in_memory() -> Result<Self> {
        Self::new("sqlite::memory:").await
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;

        // 1. Blog posts (owned by the publishing side, read-only here)
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS blog_posts (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                created_date TEXT NOT NULL
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create blog_posts table")?;

        // 2. Sentiments. (post_id, ticker) uniqueness is enforced by the
        // persistence gateway, not by a constraint.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sentiments (
                id INTEGER PRIMARY KEY,
                post_id INTEGER NOT NULL,
                ticker TEXT NOT NULL,
                sentiment TEXT NOT NULL,
                sentiment_score REAL NOT NULL,
                key_reasoning TEXT NOT NULL,
                supporting_evidence TEXT NOT NULL,
                investment_perspective TEXT NOT NULL,
                investment_timeframe TEXT NOT NULL,
                conviction_level TEXT NOT NULL,
                uncertainty_factors TEXT NOT NULL,
                mention_context TEXT NOT NULL,
                analysis_date DATE NOT NULL
            );
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create sentiments table")?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_sentiments_post_ticker
            ON sentiments (post_id, ticker);
            "#,
        )
        .execute(&mut *conn)
        .await
        .context("Failed to create sentiments index")?;

        info!("Database schema initialized.");
        Ok(())
    }
}
