use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
    Neutral,
}

impl Polarity {
    pub const ALL: [Polarity; 3] = [Self::Positive, Self::Negative, Self::Neutral];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Negative => "negative",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Polarity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            "neutral" => Ok(Self::Neutral),
            _ => anyhow::bail!("Invalid polarity: {}", s),
        }
    }
}

/// Implied investment time frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Horizon {
    ShortTerm,
    MediumTerm,
    LongTerm,
    MediumToLongTerm,
}

impl Horizon {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShortTerm => "short-term",
            Self::MediumTerm => "medium-term",
            Self::LongTerm => "long-term",
            Self::MediumToLongTerm => "medium-to-long-term",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Horizon {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short-term" => Ok(Self::ShortTerm),
            "medium-term" => Ok(Self::MediumTerm),
            "long-term" => Ok(Self::LongTerm),
            "medium-to-long-term" => Ok(Self::MediumToLongTerm),
            _ => anyhow::bail!("Invalid horizon: {}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Conviction {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl Conviction {
    /// Threshold ladder on `|score|`. Boundaries fall to the lower bracket.
    pub fn from_score(score: f64) -> Self {
        let magnitude = score.abs();
        if magnitude > 0.7 {
            Self::VeryHigh
        } else if magnitude > 0.5 {
            Self::High
        } else if magnitude > 0.3 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very-high",
        }
    }
}

impl fmt::Display for Conviction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Conviction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "very-high" => Ok(Self::VeryHigh),
            _ => anyhow::bail!("Invalid conviction: {}", s),
        }
    }
}

/// Keyword evidence behind a polarity decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportingEvidence {
    pub positive_factors: Vec<String>,
    pub negative_factors: Vec<String>,
    pub neutral_factors: Vec<String>,
}

/// One analysed (post, ticker) pair.
///
/// `id` is `None` until the persistence gateway assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
    pub id: Option<i64>,
    pub post_key: i64,
    pub ticker: String,
    pub polarity: Polarity,
    pub score: f64,
    pub rationale: String,
    pub evidence: SupportingEvidence,
    pub themes: Vec<String>,
    pub horizon: Horizon,
    pub conviction: Conviction,
    pub uncertainty_factors: Vec<String>,
    pub mention_excerpt: String,
    pub analysis_date: NaiveDate,
}

impl SentimentRecord {
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}
