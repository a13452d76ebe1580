use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A blog post owned by the external article store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub post_key: i64,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Article {
    /// Title and body joined by a line break; the text every analysis stage sees.
    pub fn combined_text(&self) -> String {
        format!("{}\n{}", self.title, self.body)
    }
}
