use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use url::Url;

/// Set of normalized URLs claimed during one crawl session
///
/// The set only grows. `claim` performs the membership check and the insert
/// under a single lock, so concurrent discoveries of the same URL cannot both
/// win the claim.
#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims a URL for fetching
    ///
    /// Returns `true` if the URL was not yet in the set and is now owned by
    /// the caller, `false` if another task claimed it first.
    pub fn claim(&self, url: &Url) -> bool {
        self.lock().insert(url.as_str().to_string())
    }

    /// Returns true if the URL has been claimed
    pub fn contains(&self, url: &Url) -> bool {
        self.lock().contains(url.as_str())
    }

    /// Number of claimed URLs
    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked mid-insert
        self.urls.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
