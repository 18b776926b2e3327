//! Bounded worker pool draining the frontier
//!
//! This module handles:
//! - A FIFO work queue fed by [`Frontier::admit`]
//! - Exactly N workers, so at most N pages render at once
//! - Admitting discovered links before a page is marked done
//! - Progress reporting as each URL starts

use crate::crawler::frontier::Frontier;
use crate::crawler::retry::PageProcessor;
use crate::render::Renderer;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::sync::Mutex;

type SharedReceiver = Arc<Mutex<UnboundedReceiver<String>>>;

/// Releases a URL's in-flight slot however its task ends
struct DoneGuard {
    frontier: Arc<Frontier>,
    url: String,
}

impl Drop for DoneGuard {
    fn drop(&mut self) {
        if let Err(e) = self.frontier.complete(&self.url) {
            tracing::warn!("{}", e);
        }
    }
}

/// Scheduler runs page tasks until the frontier is exhausted
pub struct Scheduler<R: Renderer + 'static> {
    processor: Arc<PageProcessor<R>>,
    frontier: Arc<Frontier>,
    receiver: SharedReceiver,
    workers: usize,
    verbose: bool,
}

impl<R: Renderer + 'static> Scheduler<R> {
    /// Creates a scheduler with `workers` concurrent page tasks
    ///
    /// # Arguments
    ///
    /// * `processor` - Renders one page and returns its links
    /// * `workers` - Concurrency limit, at least 1
    /// * `verbose` - Report visited and remaining counts per URL
    pub fn new(processor: Arc<PageProcessor<R>>, workers: usize, verbose: bool) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            processor,
            frontier: Arc::new(Frontier::new(sender)),
            receiver: Arc::new(Mutex::new(receiver)),
            workers: workers.max(1),
            verbose,
        }
    }

    /// Admits a starting URL
    pub fn seed(&self, url: &str) -> bool {
        self.frontier.admit(url)
    }

    /// Runs every worker until the queue closes
    ///
    /// # Returns
    ///
    /// The frontier, holding every visited URL in the `Done` state
    pub async fn run(self) -> Arc<Frontier> {
        self.frontier.close_if_idle();

        let mut handles = Vec::with_capacity(self.workers);
        for id in 0..self.workers {
            let worker = Worker {
                id,
                processor: self.processor.clone(),
                frontier: self.frontier.clone(),
                receiver: self.receiver.clone(),
                verbose: self.verbose,
            };
            handles.push(tokio::spawn(worker.run()));
        }

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!("Worker stopped unexpectedly: {}", e);
            }
        }

        self.frontier
    }
}

/// One progress line per started URL, with visited/remaining counts when given
fn progress_line(url: &str, counts: Option<(usize, usize)>) -> String {
    match counts {
        Some((visited, remaining)) => format!(
            "URL: {} (visited: {}, remaining: {})",
            url, visited, remaining
        ),
        None => format!("URL: {}", url),
    }
}

struct Worker<R: Renderer + 'static> {
    id: usize,
    processor: Arc<PageProcessor<R>>,
    frontier: Arc<Frontier>,
    receiver: SharedReceiver,
    verbose: bool,
}

impl<R: Renderer + 'static> Worker<R> {
    async fn run(self) {
        loop {
            let next = self.receiver.lock().await.recv().await;
            let Some(url) = next else {
                tracing::trace!("Worker {} exiting, queue closed", self.id);
                break;
            };
            self.handle(url).await;
        }
    }

    async fn handle(&self, url: String) {
        let _guard = DoneGuard {
            frontier: self.frontier.clone(),
            url: url.clone(),
        };

        if let Err(e) = self.frontier.start(&url) {
            tracing::warn!("{}", e);
            return;
        }

        let counts = self
            .verbose
            .then(|| (self.frontier.visited_count(), self.frontier.remaining()));
        tracing::info!("{}", progress_line(&url, counts));

        let processor = self.processor.clone();
        let task_url = url.clone();
        let task = tokio::spawn(async move { processor.process(&task_url).await });

        match task.await {
            Ok(outcome) => {
                let mut admitted = 0;
                for link in &outcome.links {
                    if self.frontier.admit(link) {
                        admitted += 1;
                    }
                }
                tracing::debug!(
                    "{} done after {} attempt(s), {} new link(s)",
                    url,
                    outcome.attempts,
                    admitted
                );
            }
            Err(e) => tracing::error!("Task for {} failed: {}", url, e),
        }
    }
}
