use thiserror::Error;

/// Errors raised by the sentiment pipeline.
///
/// A `(post, ticker)` pair that already has a record is not an error; see
/// `WriteOutcome::AlreadyExists`.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Alias table, lexicon or rule tables are malformed. Fatal at startup.
    #[error("Invalid analysis configuration: {reason}")]
    Configuration { reason: String },

    /// The article or sentiment store could not be read. Fatal for the run.
    #[error("Failed to read from store: {reason}")]
    StoreRead { reason: String },

    /// One record could not be persisted. The run continues.
    #[error("Failed to write sentiment for post {post_key} / {ticker}: {reason}")]
    StoreWrite {
        post_key: i64,
        ticker: String,
        reason: String,
    },

    /// Looking up an existing `(post, ticker)` record failed. Only that
    /// candidate is dropped.
    #[error("Failed to check existing sentiment for post {post_key} / {ticker}: {reason}")]
    ExistenceCheck {
        post_key: i64,
        ticker: String,
        reason: String,
    },

    /// An externally supplied record is inconsistent. Only that record is dropped.
    #[error("Invalid sentiment record: {reason}")]
    InvalidRecord { reason: String },
}

impl PipelineError {
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn store_read(err: impl std::fmt::Display) -> Self {
        Self::StoreRead {
            reason: format!("{:#}", err),
        }
    }

    pub fn store_write(post_key: i64, ticker: &str, err: impl std::fmt::Display) -> Self {
        Self::StoreWrite {
            post_key,
            ticker: ticker.to_string(),
            reason: format!("{:#}", err),
        }
    }

    pub fn existence_check(post_key: i64, ticker: &str, err: impl std::fmt::Display) -> Self {
        Self::ExistenceCheck {
            post_key,
            ticker: ticker.to_string(),
            reason: format!("{:#}", err),
        }
    }

    pub fn invalid_record(reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            reason: reason.into(),
        }
    }
}
