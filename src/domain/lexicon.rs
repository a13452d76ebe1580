//! Polarity keyword lexicon and the rule tables used for metadata extraction.

use crate::domain::errors::PipelineError;
use crate::domain::sentiment::Polarity;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Substring hit test. `text_lower` must already be lower-cased.
pub fn contains_keyword(text_lower: &str, keyword: &str) -> bool {
    text_lower.contains(&keyword.to_lowercase())
}

/// Keywords from `keywords` that occur in `text_lower`, in declaration order.
pub fn matched_keywords<'a>(text_lower: &str, keywords: &'a [String]) -> Vec<&'a str> {
    keywords
        .iter()
        .filter(|k| contains_keyword(text_lower, k))
        .map(String::as_str)
        .collect()
}

/// Three disjoint keyword classes, one per polarity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lexicon {
    pub positive: Vec<String>,
    pub negative: Vec<String>,
    pub neutral: Vec<String>,
}

impl Lexicon {
    pub fn new(
        positive: Vec<String>,
        negative: Vec<String>,
        neutral: Vec<String>,
    ) -> Result<Self, PipelineError> {
        let lexicon = Self {
            positive,
            negative,
            neutral,
        };
        lexicon.validate()?;
        Ok(lexicon)
    }

    pub fn keywords(&self, polarity: Polarity) -> &[String] {
        match polarity {
            Polarity::Positive => &self.positive,
            Polarity::Negative => &self.negative,
            Polarity::Neutral => &self.neutral,
        }
    }

    fn validate(&self) -> Result<(), PipelineError> {
        let mut owner: HashMap<String, Polarity> = HashMap::new();

        for polarity in Polarity::ALL {
            let keywords = self.keywords(polarity);
            if keywords.is_empty() {
                return Err(PipelineError::configuration(format!(
                    "lexicon class '{}' is empty",
                    polarity
                )));
            }
            for keyword in keywords {
                if keyword.trim().is_empty() {
                    return Err(PipelineError::configuration(format!(
                        "lexicon class '{}' contains a blank keyword",
                        polarity
                    )));
                }
                if let Some(previous) = owner.insert(keyword.to_lowercase(), polarity)
                    && previous != polarity
                {
                    return Err(PipelineError::configuration(format!(
                        "keyword '{}' appears in both '{}' and '{}'",
                        keyword, previous, polarity
                    )));
                }
            }
        }
        Ok(())
    }
}

/// One theme rule: any keyword hit tags the article with `label`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeRule {
    pub label: String,
    pub keywords: Vec<String>,
}

/// Keyword groups for the time-horizon decision, checked short, long, medium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HorizonKeywords {
    pub short_term: Vec<String>,
    pub long_term: Vec<String>,
    pub medium_term: Vec<String>,
}

/// Rule tables for the metadata extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataRules {
    pub themes: Vec<ThemeRule>,
    pub default_theme: String,
    pub horizon: HorizonKeywords,
    pub uncertainty: Vec<String>,
}

impl MetadataRules {
    pub fn new(
        themes: Vec<ThemeRule>,
        default_theme: String,
        horizon: HorizonKeywords,
        uncertainty: Vec<String>,
    ) -> Result<Self, PipelineError> {
        if default_theme.trim().is_empty() {
            return Err(PipelineError::configuration("default theme is blank"));
        }
        for rule in &themes {
            if rule.label.trim().is_empty() {
                return Err(PipelineError::configuration("theme rule with blank label"));
            }
            if rule.keywords.is_empty() || rule.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(PipelineError::configuration(format!(
                    "theme '{}' has no usable keywords",
                    rule.label
                )));
            }
        }
        let blank = horizon
            .short_term
            .iter()
            .chain(&horizon.long_term)
            .chain(&horizon.medium_term)
            .chain(&uncertainty)
            .any(|k| k.trim().is_empty());
        if blank {
            return Err(PipelineError::configuration(
                "horizon or uncertainty keywords contain a blank entry",
            ));
        }

        Ok(Self {
            themes,
            default_theme,
            horizon,
            uncertainty,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_valid_lexicon() {
        let lexicon = Lexicon::new(
            words(&["상승", "surge"]),
            words(&["하락"]),
            words(&["유지"]),
        )
        .unwrap();
        assert_eq!(lexicon.keywords(Polarity::Positive).len(), 2);
    }

    #[test]
    fn test_rejects_empty_class() {
        let err = Lexicon::new(words(&["상승"]), vec![], words(&["유지"])).unwrap_err();
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_rejects_overlapping_classes() {
        let err = Lexicon::new(words(&["Rally"]), words(&["rally"]), words(&["hold"])).unwrap_err();
        assert!(err.to_string().contains("rally") || err.to_string().contains("Rally"));
    }

    #[test]
    fn test_matched_keywords_keep_declaration_order() {
        let keywords = words(&["전망", "성장", "Surge"]);
        let found = matched_keywords("surge 이후 성장 기대", &keywords);
        assert_eq!(found, vec!["성장", "Surge"]);
    }

    #[test]
    fn test_theme_rule_without_keywords_is_rejected() {
        let horizon = HorizonKeywords {
            short_term: vec![],
            long_term: vec![],
            medium_term: vec![],
        };
        let result = MetadataRules::new(
            vec![ThemeRule {
                label: "ai".into(),
                keywords: vec![],
            }],
            "general".into(),
            horizon,
            vec![],
        );
        assert!(result.is_err());
    }
}
