/// Page state definitions for a single crawl session
///
/// Every URL handed to the crawler moves through these states exactly once.
use std::fmt;

/// Represents the state of one page visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// URL is waiting to be examined at some depth
    Pending,

    /// URL has been claimed and the fetch is in flight
    Fetching,

    // ===== Terminal States =====
    /// Page was fetched and its content extracted
    Extracted,

    /// Fetch failed (transport error or non-success status)
    FetchFailed,

    /// Another branch of the crawl already claimed this URL
    AlreadyVisited,

    /// URL lies beyond the depth budget and was not fetched
    DepthExceeded,
}

impl PageState {
    /// Returns true if no further processing happens for this page
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending | Self::Fetching)
    }

    /// Returns true if the page contributed content
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Extracted)
    }

    /// Stable lowercase name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Extracted => "extracted",
            Self::FetchFailed => "fetch_failed",
            Self::AlreadyVisited => "already_visited",
            Self::DepthExceeded => "depth_exceeded",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
