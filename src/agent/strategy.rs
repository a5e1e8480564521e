use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a crawl should pick and rank content
///
/// An empty strategy is the built-in default: the default tag set, nothing
/// ignored, no link priorities and no relevance scoring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionStrategy {
    /// URL substrings whose links are followed first
    pub priority_pages: Vec<String>,
    /// Selectors used when the caller supplies none
    pub content_patterns: Vec<String>,
    /// Keywords counted when scoring item relevance
    pub relevance_criteria: Vec<String>,
    /// Selectors whose subtrees are excluded
    pub ignore_patterns: Vec<String>,
    /// Element kind to extraction rule; carried through for planners
    pub extraction_rules: BTreeMap<String, String>,
}

impl ExtractionStrategy {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// Decodes a planner's JSON answer, falling back to the default strategy
pub fn parse_strategy(text: &str) -> ExtractionStrategy {
    match serde_json::from_str(text.trim()) {
        Ok(strategy) => strategy,
        Err(e) => {
            tracing::error!("Failed to parse strategy JSON: {}", e);
            ExtractionStrategy::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_strategy() {
        let strategy = parse_strategy(
            r#"{
                "priority_pages": ["/pricing"],
                "content_patterns": ["article", ".content"],
                "relevance_criteria": ["price", "plan"],
                "ignore_patterns": ["nav"],
                "extraction_rules": {"text": "getText"}
            }"#,
        );

        assert_eq!(strategy.priority_pages, vec!["/pricing"]);
        assert_eq!(strategy.content_patterns, vec!["article", ".content"]);
        assert_eq!(strategy.relevance_criteria, vec!["price", "plan"]);
        assert_eq!(strategy.ignore_patterns, vec!["nav"]);
        assert_eq!(
            strategy.extraction_rules.get("text").map(String::as_str),
            Some("getText")
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let strategy = parse_strategy(r#"{"relevance_criteria": ["faq"]}"#);
        assert_eq!(strategy.relevance_criteria, vec!["faq"]);
        assert!(strategy.content_patterns.is_empty());
    }

    #[test]
    fn test_garbage_falls_back_to_default() {
        assert!(parse_strategy("Sure! Here is a strategy:").is_default());
        assert!(parse_strategy(r#"{"priority_pages": 3}"#).is_default());
        assert!(parse_strategy("").is_default());
    }
}
