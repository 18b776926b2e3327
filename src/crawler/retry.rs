//! Per-page processing with fallback loading and escalating retries
//!
//! Each URL is loaded with the primary strategy and, if navigation fails,
//! once more with the lenient fallback. A page whose text looks like a
//! bot challenge is reloaded with a fresh identity up to `max_retries`
//! times; after that the content is accepted as degraded. Links are
//! extracted before the artifact is written.

use crate::config::{CrawlConfig, CrawlerSettings};
use crate::crawler::detect::BlockDetector;
use crate::output::{ensure_dir, OutputLayout, RunStats};
use crate::render::{Evasion, LoadStrategy, RenderedPage, Renderer, USER_AGENTS};
use crate::url::LinkFilter;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Timeouts, delays and the retry bound for page loads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub primary_timeout: Duration,
    pub fallback_timeout: Duration,
    pub pre_navigation_delay: (Duration, Duration),
    pub settle: Duration,
}

impl RetryPolicy {
    pub fn from_settings(settings: &CrawlerSettings) -> Self {
        let [min, max] = settings.pre_navigation_delay_ms;
        Self {
            max_retries: settings.max_retries,
            primary_timeout: settings.primary_timeout(),
            fallback_timeout: settings.fallback_timeout(),
            pre_navigation_delay: (Duration::from_millis(min), Duration::from_millis(max)),
            settle: settings.settle_delay(),
        }
    }

    /// Picks a random delay in the configured range
    pub fn pre_navigation_delay(&self) -> Duration {
        let (min, max) = self.pre_navigation_delay;
        if max <= min {
            return min;
        }
        let millis = rand::thread_rng().gen_range(min.as_millis()..=max.as_millis());
        Duration::from_millis(millis as u64)
    }

    /// Identity and behavior for the given attempt
    ///
    /// Every attempt simulates interaction and waits a jittered settle
    /// delay of `k` to `2k` times the base, where `k = attempt + 1`.
    /// Retries also switch to a user agent different from `previous`.
    pub fn evasion_for(&self, attempt: u32, previous: Option<&str>) -> Evasion {
        let mut rng = rand::thread_rng();
        let candidates: Vec<&str> = USER_AGENTS
            .iter()
            .copied()
            .filter(|ua| attempt == 0 || Some(*ua) != previous)
            .collect();
        let agent = candidates
            .choose(&mut rng)
            .copied()
            .unwrap_or(USER_AGENTS[0]);

        let floor = self.settle.saturating_mul(attempt.saturating_add(1));
        let ceiling = u64::try_from(floor.as_millis()).unwrap_or(u64::MAX);
        let jitter = Duration::from_millis(rng.gen_range(0..=ceiling));

        Evasion {
            attempt,
            ..Evasion::initial(agent, floor.saturating_add(jitter))
        }
    }
}

/// How a page's processing ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Loaded and not blocked
    Rendered,
    /// Still blocked after every retry; content used as-is
    Degraded,
    /// Both load strategies failed
    Failed,
}

/// Result of processing one URL
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub url: String,
    pub links: BTreeSet<String>,
    pub artifact: Option<PathBuf>,
    pub attempts: u32,
    pub status: OutcomeStatus,
}

impl PageOutcome {
    fn failed(url: &str, attempts: u32) -> Self {
        Self {
            url: url.to_string(),
            links: BTreeSet::new(),
            artifact: None,
            attempts,
            status: OutcomeStatus::Failed,
        }
    }
}

/// Renders single pages on behalf of the scheduler
pub struct PageProcessor<R: Renderer> {
    renderer: Arc<R>,
    config: Arc<CrawlConfig>,
    filter: LinkFilter,
    detector: Arc<dyn BlockDetector>,
    policy: RetryPolicy,
    layout: OutputLayout,
    stats: Arc<RunStats>,
}

impl<R: Renderer> PageProcessor<R> {
    pub fn new(
        renderer: Arc<R>,
        config: Arc<CrawlConfig>,
        filter: LinkFilter,
        detector: Arc<dyn BlockDetector>,
        stats: Arc<RunStats>,
    ) -> Self {
        let policy = RetryPolicy::from_settings(&config.crawler);
        let layout = OutputLayout::new(&config.output.output_dir);
        Self {
            renderer,
            config,
            filter,
            detector,
            policy,
            layout,
            stats,
        }
    }

    /// Loads `url`, retries while blocked and returns the in-scope links
    ///
    /// Never fails: navigation errors yield an outcome with no links, and
    /// artifact errors are logged and counted.
    pub async fn process(&self, url: &str) -> PageOutcome {
        let mut attempt = 0;
        let mut previous_agent: Option<String> = None;

        loop {
            let evasion = self.policy.evasion_for(attempt, previous_agent.as_deref());
            let delay = self.policy.pre_navigation_delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let Some(page) = self.load_with_fallback(url, &evasion).await else {
                self.stats.record_failed();
                return PageOutcome::failed(url, attempt + 1);
            };

            let text = match page.text().await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!("Failed to read text of {}: {}", url, e);
                    String::new()
                }
            };

            let blocked = self.detector.is_blocked(&text);
            if blocked && attempt < self.policy.max_retries {
                tracing::warn!(
                    "Challenge page detected on {} (attempt {}), retrying",
                    url,
                    attempt + 1
                );
                page.close().await;
                self.stats.record_retry();
                previous_agent = Some(evasion.user_agent);
                attempt += 1;
                continue;
            }

            let status = if blocked {
                tracing::warn!(
                    "Still blocked on {} after {} attempts, keeping degraded result",
                    url,
                    attempt + 1
                );
                self.stats.record_degraded();
                OutcomeStatus::Degraded
            } else {
                self.stats.record_rendered();
                OutcomeStatus::Rendered
            };

            let links = match page.hrefs().await {
                Ok(hrefs) => self.filter.filter(hrefs),
                Err(e) => {
                    tracing::warn!("Failed to extract links from {}: {}", url, e);
                    BTreeSet::new()
                }
            };

            let artifact = if self.config.dry_run {
                None
            } else {
                self.save_artifact(url, &page).await
            };
            page.close().await;

            return PageOutcome {
                url: url.to_string(),
                links,
                artifact,
                attempts: attempt + 1,
                status,
            };
        }
    }

    async fn load_with_fallback(&self, url: &str, evasion: &Evasion) -> Option<R::Page> {
        let primary = self
            .renderer
            .load(
                url,
                LoadStrategy::DomContentLoaded,
                self.policy.primary_timeout,
                evasion,
            )
            .await;
        match primary {
            Ok(page) => return Some(page),
            Err(e) => tracing::warn!("{}; falling back to {}", e, LoadStrategy::Load),
        }

        // the lenient load already waited longer, so settle for half as long
        let fallback = Evasion {
            settle: evasion.settle / 2,
            ..evasion.clone()
        };
        match self
            .renderer
            .load(url, LoadStrategy::Load, self.policy.fallback_timeout, &fallback)
            .await
        {
            Ok(page) => Some(page),
            Err(e) => {
                tracing::error!("Giving up on {}: {}", url, e);
                None
            }
        }
    }

    async fn save_artifact(&self, url: &str, page: &R::Page) -> Option<PathBuf> {
        let title = match page.title().await {
            Ok(title) => title,
            Err(e) => {
                tracing::debug!("No title for {}: {}", url, e);
                None
            }
        };

        let path = match self.layout.artifact_path(
            url,
            title.as_deref(),
            self.renderer.artifact_extension(),
        ) {
            Ok(path) => path,
            Err(e) => {
                tracing::error!("Cannot name artifact for {}: {}", url, e);
                self.stats.record_artifact_failure();
                return None;
            }
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = ensure_dir(parent).await {
                tracing::error!("Failed to save artifact for {}: {}", url, e);
                self.stats.record_artifact_failure();
                return None;
            }
        }

        match page.save_artifact(&path, &self.config.render).await {
            Ok(()) => {
                tracing::debug!("Saved {}", path.display());
                self.stats.record_artifact();
                Some(path)
            }
            Err(e) => {
                tracing::error!("Failed to save artifact for {}: {}", url, e);
                self.stats.record_artifact_failure();
                None
            }
        }
    }
}
