//! Idempotent write path for sentiment records.
//!
//! A `(post_key, ticker)` pair is written at most once. Ids come from an
//! allocator seeded once per run from the store's current maximum, so they
//! never collide with ids that were inserted by hand.
//!
//! The existence check and the insert are not wrapped in a transaction; the
//! store is assumed to have a single writer for the duration of a run.

use crate::domain::errors::PipelineError;
use crate::domain::repositories::SentimentRepository;
use crate::domain::sentiment::SentimentRecord;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written(i64),
    AlreadyExists,
}

/// Strictly increasing id source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdAllocator {
    next: i64,
}

impl IdAllocator {
    /// Continue after `max_existing`, or start at `floor` for an empty store.
    pub fn starting_after(max_existing: Option<i64>, floor: i64) -> Self {
        let next = match max_existing {
            Some(max) => max + 1,
            None => floor,
        };
        Self { next }
    }

    pub fn peek(&self) -> i64 {
        self.next
    }

    /// Consume the current id. Only called once the record is committed,
    /// so a failed write does not burn an id.
    fn advance(&mut self) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

pub struct PersistenceGateway {
    repository: Arc<dyn SentimentRepository>,
    allocator: IdAllocator,
}

impl PersistenceGateway {
    /// Read the current maximum id and prepare the allocator.
    pub async fn open(
        repository: Arc<dyn SentimentRepository>,
        id_floor: i64,
    ) -> Result<Self, PipelineError> {
        let max_id = repository
            .max_id()
            .await
            .map_err(PipelineError::store_read)?;
        let allocator = IdAllocator::starting_after(max_id, id_floor);
        info!(
            "Sentiment id allocator starts at {} (max existing: {:?})",
            allocator.peek(),
            max_id
        );

        Ok(Self {
            repository,
            allocator,
        })
    }

    pub fn next_id(&self) -> i64 {
        self.allocator.peek()
    }

    pub async fn contains(&self, post_key: i64, ticker: &str) -> Result<bool, PipelineError> {
        self.repository
            .exists(post_key, ticker)
            .await
            .map_err(|e| PipelineError::existence_check(post_key, ticker, e))
    }

    /// Write `record` unless its pair is already stored.
    ///
    /// Any id carried by `record` is replaced by the allocator's.
    pub async fn write(&mut self, record: SentimentRecord) -> Result<WriteOutcome, PipelineError> {
        if self.contains(record.post_key, &record.ticker).await? {
            debug!(
                "Skipping post {} / {}: sentiment already recorded",
                record.post_key, record.ticker
            );
            return Ok(WriteOutcome::AlreadyExists);
        }

        let record = record.with_id(self.allocator.peek());
        self.repository
            .insert(&record)
            .await
            .map_err(|e| PipelineError::store_write(record.post_key, &record.ticker, e))?;

        let id = self.allocator.advance();
        debug!(
            "Persisted sentiment {} for post {} / {}",
            id, record.post_key, record.ticker
        );
        Ok(WriteOutcome::Written(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sentiment::{Conviction, Horizon, Polarity, SupportingEvidence};
    use crate::infrastructure::repositories::InMemorySentimentRepository;
    use chrono::NaiveDate;

    fn record(post_key: i64, ticker: &str) -> SentimentRecord {
        SentimentRecord {
            id: None,
            post_key,
            ticker: ticker.to_string(),
            polarity: Polarity::Neutral,
            score: 0.0,
            rationale: String::new(),
            evidence: SupportingEvidence::default(),
            themes: vec!["general".into()],
            horizon: Horizon::MediumToLongTerm,
            conviction: Conviction::Low,
            uncertainty_factors: vec![],
            mention_excerpt: String::new(),
            analysis_date: NaiveDate::from_ymd_opt(2025, 8, 16).unwrap(),
        }
    }

    #[test]
    fn test_allocator_start() {
        assert_eq!(IdAllocator::starting_after(None, 56).peek(), 56);
        assert_eq!(IdAllocator::starting_after(Some(270), 56).peek(), 271);
        assert_eq!(IdAllocator::starting_after(Some(3), 56).peek(), 4);
    }

    #[tokio::test]
    async fn test_empty_store_starts_at_floor() {
        let repo = Arc::new(InMemorySentimentRepository::new());
        let mut gateway = PersistenceGateway::open(repo.clone(), 56).await.unwrap();

        let outcome = gateway.write(record(1, "TSLA")).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Written(56));
        assert_eq!(gateway.next_id(), 57);
    }

    #[tokio::test]
    async fn test_continues_after_existing_max() {
        let repo = Arc::new(InMemorySentimentRepository::new());
        repo.insert(&record(512, "005930").with_id(55)).await.unwrap();

        let mut gateway = PersistenceGateway::open(repo.clone(), 56).await.unwrap();
        let outcome = gateway.write(record(5, "005930")).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Written(56));
    }

    #[tokio::test]
    async fn test_duplicate_pair_is_skipped() {
        let repo = Arc::new(InMemorySentimentRepository::new());
        let mut gateway = PersistenceGateway::open(repo.clone(), 1).await.unwrap();

        assert_eq!(
            gateway.write(record(7, "NVDA")).await.unwrap(),
            WriteOutcome::Written(1)
        );
        assert_eq!(
            gateway.write(record(7, "NVDA")).await.unwrap(),
            WriteOutcome::AlreadyExists
        );
        assert_eq!(
            gateway.write(record(7, "AMD")).await.unwrap(),
            WriteOutcome::Written(2)
        );
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    struct LockedStore;

    #[async_trait::async_trait]
    impl SentimentRepository for LockedStore {
        async fn exists(&self, _post_key: i64, _ticker: &str) -> anyhow::Result<bool> {
            anyhow::bail!("database is locked")
        }

        async fn max_id(&self) -> anyhow::Result<Option<i64>> {
            Ok(None)
        }

        async fn insert(&self, _record: &SentimentRecord) -> anyhow::Result<()> {
            Ok(())
        }

        async fn find_by_post(&self, _post_key: i64) -> anyhow::Result<Vec<SentimentRecord>> {
            Ok(vec![])
        }

        async fn count(&self) -> anyhow::Result<usize> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_failed_lookup_is_an_existence_check_error() {
        let mut gateway = PersistenceGateway::open(Arc::new(LockedStore), 56).await.unwrap();

        let err = gateway.contains(9, "TSLA").await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::ExistenceCheck { post_key: 9, .. }
        ));

        let err = gateway.write(record(9, "TSLA")).await.unwrap_err();
        assert!(matches!(err, PipelineError::ExistenceCheck { .. }));
        assert!(err.to_string().contains("database is locked"));
        assert_eq!(gateway.next_id(), 56);
    }

    #[tokio::test]
    async fn test_supplied_id_is_replaced() {
        let repo = Arc::new(InMemorySentimentRepository::new());
        let mut gateway = PersistenceGateway::open(repo.clone(), 100).await.unwrap();

        let outcome = gateway.write(record(1, "AAPL").with_id(3)).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Written(100));
        let stored = repo.find_by_post(1).await.unwrap();
        assert_eq!(stored[0].id, Some(100));
    }
}
