use crate::agent::strategy::ExtractionStrategy;
use async_trait::async_trait;
use thiserror::Error;

/// Failures of a strategy planner, always absorbed by the caller
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("planner unavailable: {0}")]
    Unavailable(String),

    #[error("planner returned an unusable strategy: {0}")]
    InvalidResponse(String),
}

/// Produces an extraction strategy for a URL and free-form instructions
///
/// Implementations may call out to a language model. Whatever they do, the
/// crawl never depends on them succeeding: see [`plan_or_default`].
#[async_trait]
pub trait StrategyPlanner: Send + Sync {
    async fn plan(&self, url: &str, instructions: &str)
        -> Result<ExtractionStrategy, PlannerError>;
}

/// Asks the planner, falling back to the default strategy on failure
pub async fn plan_or_default(
    planner: &dyn StrategyPlanner,
    url: &str,
    instructions: &str,
) -> ExtractionStrategy {
    match planner.plan(url, instructions).await {
        Ok(strategy) => {
            tracing::info!("Generated extraction strategy for {}", url);
            strategy
        }
        Err(e) => {
            tracing::error!("Strategy generation failed: {}", e);
            ExtractionStrategy::default()
        }
    }
}

const STOP_WORDS: &[&str] = &[
    "a", "about", "all", "an", "and", "any", "are", "as", "at", "be", "by", "find", "for", "from",
    "get", "give", "how", "i", "in", "into", "is", "it", "me", "my", "of", "on", "or", "our",
    "show", "that", "the", "their", "this", "to", "what", "when", "where", "which", "with",
    "extract", "information", "page", "pages", "website", "site",
];

/// Offline planner that turns instruction keywords into relevance criteria
#[derive(Debug, Clone, Copy, Default)]
pub struct InstructionPlanner;

impl InstructionPlanner {
    /// Lowercased instruction words, minus stop-words, first occurrence kept
    pub fn keywords(instructions: &str) -> Vec<String> {
        let mut keywords: Vec<String> = Vec::new();

        for word in instructions
            .split(|c: char| !c.is_alphanumeric())
            .map(str::to_lowercase)
        {
            if word.chars().count() < 3 || STOP_WORDS.contains(&word.as_str()) {
                continue;
            }
            if !keywords.contains(&word) {
                keywords.push(word);
            }
        }

        keywords
    }
}

#[async_trait]
impl StrategyPlanner for InstructionPlanner {
    async fn plan(
        &self,
        _url: &str,
        instructions: &str,
    ) -> Result<ExtractionStrategy, PlannerError> {
        Ok(ExtractionStrategy {
            relevance_criteria: Self::keywords(instructions),
            ..ExtractionStrategy::default()
        })
    }
}
