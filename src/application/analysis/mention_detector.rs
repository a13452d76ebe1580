use crate::domain::instrument::{AliasTable, Instrument};
use std::collections::HashSet;

/// Finds the instruments an article talks about.
///
/// Plain case-insensitive substring matching against every alias; there is no
/// disambiguation, so the alias table must not contain generic words.
pub struct MentionDetector<'a> {
    table: &'a AliasTable,
}

impl<'a> MentionDetector<'a> {
    pub fn new(table: &'a AliasTable) -> Self {
        Self { table }
    }

    /// Distinct instruments mentioned in `text`, in alias-table order.
    pub fn detect(&self, text: &str) -> Vec<&'a Instrument> {
        let text_lower = text.to_lowercase();
        let mut seen: HashSet<&str> = HashSet::new();

        self.table
            .instruments()
            .iter()
            .filter(|instrument| instrument.is_mentioned_in(&text_lower))
            .filter(|instrument| seen.insert(instrument.ticker.as_str()))
            .collect()
    }
}
