//! Run statistics
//!
//! Counters are updated by page tasks as they finish and frozen into a
//! [`CrawlSummary`] once the crawl reaches its fixed point.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Live counters shared by every page task
#[derive(Debug, Default)]
pub struct RunStats {
    rendered: AtomicU64,
    degraded: AtomicU64,
    failed: AtomicU64,
    retries: AtomicU64,
    artifacts_written: AtomicU64,
    artifact_failures: AtomicU64,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_rendered(&self) {
        self.rendered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_degraded(&self) {
        self.degraded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_artifact(&self) {
        self.artifacts_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_artifact_failure(&self) {
        self.artifact_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Freezes the counters into a summary
    pub fn summarize(
        &self,
        total_visited: usize,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> CrawlSummary {
        CrawlSummary {
            started_at,
            elapsed,
            total_visited: total_visited as u64,
            rendered: self.rendered.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            artifacts_written: self.artifacts_written.load(Ordering::Relaxed),
            artifact_failures: self.artifact_failures.load(Ordering::Relaxed),
        }
    }
}

/// Summary statistics for a finished crawl
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlSummary {
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,

    /// Size of the visited set
    pub total_visited: u64,

    /// Pages that loaded and were not blocked
    pub rendered: u64,

    /// Pages still blocked after every retry
    pub degraded: u64,

    /// Pages where both load strategies failed
    pub failed: u64,

    /// Extra attempts spent on blocked pages
    pub retries: u64,

    pub artifacts_written: u64,
    pub artifact_failures: u64,
}

impl CrawlSummary {
    /// Pages per second over the whole run
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.total_visited as f64 / secs
    }
}

/// Logs a crawl summary
pub fn log_summary(summary: &CrawlSummary) {
    tracing::info!(
        "Rendered: {}, degraded: {}, failed: {}, retries: {}",
        summary.rendered,
        summary.degraded,
        summary.failed,
        summary.retries
    );
    tracing::info!(
        "Artifacts written: {}, artifact failures: {}",
        summary.artifacts_written,
        summary.artifact_failures
    );
    tracing::info!(
        "Started {} and took {:?} ({:.2} pages/sec)",
        summary.started_at.to_rfc3339(),
        summary.elapsed,
        summary.rate()
    );
}
