use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::domain::repositories::{ArticleRepository, SentimentRepository};
use crate::infrastructure::persistence::database::Database;
use crate::infrastructure::persistence::repositories::{
    SqliteArticleRepository, SqliteSentimentRepository,
};

pub struct PersistenceHandle {
    pub db: Database,
    pub article_repository: Arc<dyn ArticleRepository>,
    pub sentiment_repository: Arc<dyn SentimentRepository>,
}

pub struct PersistenceBootstrap;

impl PersistenceBootstrap {
    pub async fn init(db_url: &str) -> Result<PersistenceHandle> {
        info!("Initializing Database at {}", db_url);

        let db = Database::new(db_url)
            .await
            .context("Failed to initialize database")?;

        Ok(Self::from_database(db))
    }

    pub fn from_database(db: Database) -> PersistenceHandle {
        let article_repo = Arc::new(SqliteArticleRepository::new(db.pool.clone()));
        let sentiment_repo = Arc::new(SqliteSentimentRepository::new(db.pool.clone()));

        PersistenceHandle {
            db,
            article_repository: article_repo,
            sentiment_repository: sentiment_repo,
        }
    }
}
