mod article_repository;
mod sentiment_repository;

pub use article_repository::SqliteArticleRepository;
pub use sentiment_repository::SqliteSentimentRepository;
