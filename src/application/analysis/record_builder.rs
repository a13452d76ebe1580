use crate::application::analysis::evidence_extractor::{Extraction, MentionContext};
use crate::application::analysis::lexicon_scorer::PolarityScore;
use crate::domain::article::Article;
use crate::domain::instrument::Instrument;
use crate::domain::sentiment::SentimentRecord;
use chrono::NaiveDate;

/// Assembles a sentiment record. The id stays unassigned until the
/// persistence gateway writes it.
pub struct RecordBuilder;

impl RecordBuilder {
    pub fn build(
        article: &Article,
        instrument: &Instrument,
        context: &MentionContext,
        score: PolarityScore,
        extraction: Extraction,
        analysis_date: NaiveDate,
    ) -> SentimentRecord {
        SentimentRecord {
            id: None,
            post_key: article.post_key,
            ticker: instrument.ticker.clone(),
            polarity: score.polarity,
            score: score.score,
            rationale: extraction.rationale,
            evidence: extraction.evidence,
            themes: extraction.themes,
            horizon: extraction.horizon,
            conviction: extraction.conviction,
            uncertainty_factors: extraction.uncertainty_factors,
            mention_excerpt: context.excerpt(),
            analysis_date,
        }
    }
}
