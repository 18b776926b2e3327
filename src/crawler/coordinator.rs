//! Crawler coordinator - main crawl orchestration logic
//!
//! This module ties the crawl together:
//! - Preparing the output directory
//! - Seeding the frontier with the root URL
//! - Running the scheduler to its fixed point
//! - Writing the sorted manifest and reporting totals

use crate::config::CrawlConfig;
use crate::crawler::detect::{BlockDetector, SignatureDetector};
use crate::crawler::retry::PageProcessor;
use crate::crawler::scheduler::Scheduler;
use crate::output::{
    ensure_dir, log_summary, CrawlSummary, FileManifestWriter, ManifestWriter, OutputLayout,
    RunStats,
};
use crate::render::{HttpRenderer, Renderer};
use crate::url::{domain_key, LinkFilter};
use crate::Result;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// What a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Every visited URL, sorted
    pub urls: Vec<String>,

    /// Domain key of the root URL
    pub domain_key: String,

    /// Where the manifest was written
    pub manifest_path: PathBuf,

    pub summary: CrawlSummary,
}

/// Main crawler coordinator structure
pub struct Coordinator<R: Renderer + 'static> {
    config: Arc<CrawlConfig>,
    renderer: Arc<R>,
    filter: LinkFilter,
    detector: Arc<dyn BlockDetector>,
    manifest: Arc<dyn ManifestWriter>,
    layout: OutputLayout,
    domain_key: String,
}

impl<R: Renderer + 'static> Coordinator<R> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - Validated crawl configuration
    /// * `renderer` - Browsing environment used for every page
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(SnapError)` - The root URL cannot be used
    pub fn new(config: CrawlConfig, renderer: R) -> Result<Self> {
        let filter = LinkFilter::new(&config.root_url, &config.crawler.ignore_extensions)?;
        let domain_key = domain_key(&config.root_url)?;
        let layout = OutputLayout::new(&config.output.output_dir);

        Ok(Self {
            detector: Arc::new(SignatureDetector::from_settings(&config.detection)),
            manifest: Arc::new(FileManifestWriter::new(layout.clone())),
            config: Arc::new(config),
            renderer: Arc::new(renderer),
            filter,
            layout,
            domain_key,
        })
    }

    /// Replaces the challenge page detector
    pub fn with_detector(mut self, detector: Arc<dyn BlockDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Replaces the manifest writer
    pub fn with_manifest_writer(mut self, manifest: Arc<dyn ManifestWriter>) -> Self {
        self.manifest = manifest;
        self
    }

    /// Runs the crawl to completion
    ///
    /// Individual page failures are logged and never abort the run. Only a
    /// missing output directory or a failed manifest write is fatal.
    pub async fn run(&self) -> Result<CrawlReport> {
        let started_at = Utc::now();
        let start_time = Instant::now();

        ensure_dir(self.layout.output_dir()).await?;

        let stats = Arc::new(RunStats::new());
        let processor = PageProcessor::new(
            self.renderer.clone(),
            self.config.clone(),
            self.filter.clone(),
            self.detector.clone(),
            stats.clone(),
        );
        let scheduler = Scheduler::new(
            Arc::new(processor),
            self.config.crawler.max_concurrent_pages_open as usize,
            self.config.verbose,
        );

        scheduler.seed(&self.config.root_url);
        let frontier = scheduler.run().await;
        tracing::info!("Frontier is empty, crawl complete");

        let urls = frontier.visited_sorted();
        let manifest_path = self
            .manifest
            .write_manifest(&self.domain_key, &urls)
            .await?;

        tracing::info!("Total URLs visited: {}", urls.len());
        if self.config.verbose {
            for url in &urls {
                tracing::info!("{}", url);
            }
        }

        let summary = stats.summarize(urls.len(), started_at, start_time.elapsed());
        log_summary(&summary);

        Ok(CrawlReport {
            urls,
            domain_key: self.domain_key.clone(),
            manifest_path,
            summary,
        })
    }
}

/// Runs a complete crawl with the HTTP renderer
///
/// # Example
///
/// ```no_run
/// use sitesnap::config::CrawlConfig;
/// use sitesnap::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(CrawlConfig::new("https://example.com/docs")).await?;
/// println!("{} pages", report.urls.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: CrawlConfig) -> Result<CrawlReport> {
    let renderer = HttpRenderer::new()?;
    Coordinator::new(config, renderer)?.run().await
}
