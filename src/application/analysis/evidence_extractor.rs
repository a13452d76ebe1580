//! Evidence and metadata derived from article text and score.
//!
//! Every derivation is a pure function of the text (lower-cased where keyword
//! matching is involved) and the already computed polarity score.

use crate::domain::instrument::Instrument;
use crate::domain::lexicon::{Lexicon, MetadataRules, contains_keyword, matched_keywords};
use crate::domain::sentiment::{Conviction, Horizon, Polarity, SupportingEvidence};

pub const MAX_POLAR_FACTORS: usize = 5;
pub const MAX_NEUTRAL_FACTORS: usize = 3;
pub const MAX_THEMES: usize = 3;
pub const MAX_UNCERTAINTY_FACTORS: usize = 3;
pub const RATIONALE_FRAGMENT_CHARS: usize = 50;
pub const EXCERPT_CHARS: usize = 100;
pub const NO_DIRECTION_PLACEHOLDER: &str = "no clear directional signal";

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Sentences of an article that mention one instrument.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionContext {
    pub sentences: Vec<String>,
}

impl MentionContext {
    /// Period-delimited segments containing any alias of `instrument`, trimmed,
    /// in text order.
    pub fn collect(text: &str, instrument: &Instrument) -> Self {
        let sentences = text
            .split('.')
            .filter(|segment| instrument.is_mentioned_in(&segment.to_lowercase()))
            .map(|segment| segment.trim().to_string())
            .collect();
        Self { sentences }
    }

    pub fn first(&self) -> Option<&str> {
        self.sentences.first().map(String::as_str)
    }

    /// First context sentence cut to `EXCERPT_CHARS` characters, or empty.
    pub fn excerpt(&self) -> String {
        self.first()
            .map(|s| truncate_chars(s, EXCERPT_CHARS))
            .unwrap_or_default()
    }
}

/// Everything the extractor derives for one (article, instrument) pair.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub rationale: String,
    pub evidence: SupportingEvidence,
    pub themes: Vec<String>,
    pub horizon: Horizon,
    pub conviction: Conviction,
    pub uncertainty_factors: Vec<String>,
}

pub struct EvidenceExtractor<'a> {
    lexicon: &'a Lexicon,
    rules: &'a MetadataRules,
}

impl<'a> EvidenceExtractor<'a> {
    pub fn new(lexicon: &'a Lexicon, rules: &'a MetadataRules) -> Self {
        Self { lexicon, rules }
    }

    pub fn extract(
        &self,
        text_lower: &str,
        instrument: &Instrument,
        context: &MentionContext,
        polarity: Polarity,
        score: f64,
    ) -> Extraction {
        Extraction {
            rationale: Self::rationale(instrument, context, polarity),
            evidence: self.evidence(text_lower),
            themes: self.themes(text_lower),
            horizon: self.horizon(text_lower),
            conviction: Conviction::from_score(score),
            uncertainty_factors: self.uncertainty_factors(text_lower),
        }
    }

    pub fn rationale(instrument: &Instrument, context: &MentionContext, polarity: Polarity) -> String {
        let name = instrument.canonical_name();
        let Some(sentence) = context.first() else {
            return format!("{} was mentioned without an explicit investment opinion.", name);
        };

        let fragment = truncate_chars(sentence, RATIONALE_FRAGMENT_CHARS);
        let closing = match polarity {
            Polarity::Positive => "a positive outlook is expected.",
            Polarity::Negative => "concerns are being raised.",
            Polarity::Neutral => "the trend is worth watching.",
        };
        format!("{}: {}... {}", name, fragment, closing)
    }

    pub fn evidence(&self, text_lower: &str) -> SupportingEvidence {
        let found = |polarity| -> Vec<String> {
            matched_keywords(text_lower, self.lexicon.keywords(polarity))
                .into_iter()
                .take(MAX_POLAR_FACTORS)
                .map(str::to_string)
                .collect()
        };

        let positive_factors = found(Polarity::Positive);
        let negative_factors = found(Polarity::Negative);
        let mut neutral_factors = Vec::new();
        if positive_factors.is_empty() && negative_factors.is_empty() {
            neutral_factors.push(NO_DIRECTION_PLACEHOLDER.to_string());
        }
        neutral_factors.truncate(MAX_NEUTRAL_FACTORS);

        SupportingEvidence {
            positive_factors,
            negative_factors,
            neutral_factors,
        }
    }

    pub fn themes(&self, text_lower: &str) -> Vec<String> {
        let themes: Vec<String> = self
            .rules
            .themes
            .iter()
            .filter(|rule| rule.keywords.iter().any(|k| contains_keyword(text_lower, k)))
            .take(MAX_THEMES)
            .map(|rule| rule.label.clone())
            .collect();

        if themes.is_empty() {
            vec![self.rules.default_theme.clone()]
        } else {
            themes
        }
    }

    pub fn horizon(&self, text_lower: &str) -> Horizon {
        let hit = |keywords: &[String]| keywords.iter().any(|k| contains_keyword(text_lower, k));
        let groups = &self.rules.horizon;

        if hit(groups.short_term.as_slice()) {
            Horizon::ShortTerm
        } else if hit(groups.long_term.as_slice()) {
            Horizon::LongTerm
        } else if hit(groups.medium_term.as_slice()) {
            Horizon::MediumTerm
        } else {
            Horizon::MediumToLongTerm
        }
    }

    pub fn uncertainty_factors(&self, text_lower: &str) -> Vec<String> {
        matched_keywords(text_lower, &self.rules.uncertainty)
            .into_iter()
            .take(MAX_UNCERTAINTY_FACTORS)
            .map(str::to_string)
            .collect()
    }
}
