//! Crawler module for page rendering and link following
//!
//! This module contains the core crawling logic, including:
//! - The frontier: visited set, per-URL state and work queue
//! - A bounded worker pool scheduling page tasks
//! - Page processing with fallback loading and escalating retries
//! - Challenge page detection
//! - Overall crawl coordination

mod coordinator;
pub mod detect;
mod frontier;
mod retry;
mod scheduler;

#[cfg(test)]
mod testing;

pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use detect::{BlockDetector, NeverBlocked, SignatureDetector};
pub use frontier::Frontier;
pub use retry::{OutcomeStatus, PageOutcome, PageProcessor, RetryPolicy};
pub use scheduler::Scheduler;
