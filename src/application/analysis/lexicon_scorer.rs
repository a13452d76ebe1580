//! Keyword-count polarity scoring.
//!
//! Each lexicon class scores one hit per distinct keyword found in the
//! lower-cased text. The class with the strictly greatest count wins and its
//! magnitude grows by `SCORE_PER_HIT` per hit, saturating at 1.0. Any tie,
//! including no hits at all, is neutral with score 0.0.

use crate::domain::lexicon::{Lexicon, contains_keyword};
use crate::domain::sentiment::Polarity;

pub const SCORE_PER_HIT: f64 = 0.15;

/// Distinct keyword hits per polarity class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeywordHits {
    pub positive: usize,
    pub negative: usize,
    pub neutral: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarityScore {
    pub polarity: Polarity,
    /// In [-1.0, 1.0], rounded to 3 decimals; sign follows `polarity`.
    pub score: f64,
}

impl PolarityScore {
    pub fn neutral() -> Self {
        Self {
            polarity: Polarity::Neutral,
            score: 0.0,
        }
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

pub struct LexiconScorer<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> LexiconScorer<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    pub fn count_hits(&self, text_lower: &str) -> KeywordHits {
        let hits = |polarity| {
            self.lexicon
                .keywords(polarity)
                .iter()
                .filter(|k| contains_keyword(text_lower, k))
                .count()
        };
        KeywordHits {
            positive: hits(Polarity::Positive),
            negative: hits(Polarity::Negative),
            neutral: hits(Polarity::Neutral),
        }
    }

    /// Score arbitrary text (lower-cased internally).
    pub fn score(&self, text: &str) -> PolarityScore {
        self.score_lowercased(&text.to_lowercase())
    }

    pub fn score_lowercased(&self, text_lower: &str) -> PolarityScore {
        Self::decide(self.count_hits(text_lower))
    }

    pub fn decide(hits: KeywordHits) -> PolarityScore {
        let KeywordHits {
            positive,
            negative,
            neutral,
        } = hits;

        if positive > negative && positive > neutral {
            PolarityScore {
                polarity: Polarity::Positive,
                score: round3((positive as f64 * SCORE_PER_HIT).min(1.0)),
            }
        } else if negative > positive && negative > neutral {
            PolarityScore {
                polarity: Polarity::Negative,
                score: round3((-(negative as f64) * SCORE_PER_HIT).max(-1.0)),
            }
        } else {
            PolarityScore::neutral()
        }
    }
}
