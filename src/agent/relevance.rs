use crate::extract::ContentItem;

/// Number of criteria occurring in `text`, ignoring case
pub fn relevance_score(text: &str, criteria: &[String]) -> f64 {
    let haystack = text.to_lowercase();
    criteria
        .iter()
        .filter(|c| !c.is_empty() && haystack.contains(&c.to_lowercase()))
        .count() as f64
}

/// Scores text-bodied items against relevance criteria
///
/// Items that already carry a score, and items without a text body, are
/// returned unchanged. With no criteria nothing is scored.
pub fn score_items(items: &[ContentItem], criteria: &[String]) -> Vec<ContentItem> {
    if criteria.is_empty() {
        return items.to_vec();
    }

    items
        .iter()
        .map(|item| match (item.metadata.relevance, item.text()) {
            (None, Some(text)) => item.with_relevance(relevance_score(text, criteria)),
            _ => item.clone(),
        })
        .collect()
}
