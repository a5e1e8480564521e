//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: the lifecycle of one page visit (pending, fetching, extracted, ...)
//! - `VisitedSet`: the per-session set of claimed URLs

mod page_state;
mod visited;

pub use page_state::PageState;
pub use visited::VisitedSet;
