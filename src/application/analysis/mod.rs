//! Text analysis: mention detection, lexicon scoring, evidence extraction
//! and record assembly.

pub mod evidence_extractor;
pub mod lexicon_scorer;
pub mod mention_detector;
pub mod record_builder;

pub use evidence_extractor::{EvidenceExtractor, Extraction, MentionContext};
pub use lexicon_scorer::{KeywordHits, LexiconScorer, PolarityScore};
pub use mention_detector::MentionDetector;
pub use record_builder::RecordBuilder;

use crate::config::AnalysisConfig;
use crate::domain::article::Article;
use crate::domain::instrument::Instrument;
use crate::domain::sentiment::SentimentRecord;
use chrono::NaiveDate;
use std::sync::Arc;

/// Runs the analysis stages over one article with an injected configuration.
///
/// Polarity is computed over the whole article, not the sentences around
/// each instrument, so every instrument in one article gets the same
/// polarity and score.
#[derive(Clone)]
pub struct PostAnalyzer {
    config: Arc<AnalysisConfig>,
}

impl PostAnalyzer {
    pub fn new(config: Arc<AnalysisConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Instruments mentioned in the article's title or body.
    pub fn detect(&self, article: &Article) -> Vec<&Instrument> {
        MentionDetector::new(&self.config.aliases).detect(&article.combined_text())
    }

    /// Build the (unpersisted) record for one detected instrument.
    pub fn analyze(
        &self,
        article: &Article,
        instrument: &Instrument,
        analysis_date: NaiveDate,
    ) -> SentimentRecord {
        let text = article.combined_text();
        let text_lower = text.to_lowercase();

        let context = MentionContext::collect(&text, instrument);
        let score = LexiconScorer::new(&self.config.lexicon).score_lowercased(&text_lower);
        let extraction = EvidenceExtractor::new(&self.config.lexicon, &self.config.rules).extract(
            &text_lower,
            instrument,
            &context,
            score.polarity,
            score.score,
        );

        RecordBuilder::build(article, instrument, &context, score, extraction, analysis_date)
    }
}
