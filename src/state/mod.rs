//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: Tracks the lifecycle of individual URLs (unseen, enqueued, running, done)

mod page_state;

// Re-export main types
pub use page_state::PageState;
