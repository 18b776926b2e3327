//! Scripted renderer for crawler unit tests

use crate::config::RenderOptions;
use crate::render::{Evasion, LoadStrategy, RenderError, RenderResult, RenderedPage, Renderer};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const CONTENT: &str = "Plenty of ordinary page content";
pub const CHALLENGE: &str = "Just a moment... checking your browser";

/// One recorded `load` call
#[derive(Debug, Clone)]
pub struct LoadCall {
    pub url: String,
    pub strategy: LoadStrategy,
    pub evasion: Evasion,
}

/// Renderer serving a fixed link graph
#[derive(Default)]
pub struct MockRenderer {
    links: HashMap<String, Vec<String>>,
    fail_primary: HashSet<String>,
    fail_always: HashSet<String>,
    blocked: HashSet<String>,
    panics: HashSet<String>,
    delay: Duration,
    calls: Mutex<Vec<LoadCall>>,
    active: AtomicUsize,
    max_active: AtomicUsize,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, links: &[&str]) -> Self {
        self.links
            .insert(url.to_string(), links.iter().map(|l| l.to_string()).collect());
        self
    }

    pub fn fail_primary(mut self, url: &str) -> Self {
        self.fail_primary.insert(url.to_string());
        self
    }

    pub fn fail_always(mut self, url: &str) -> Self {
        self.fail_always.insert(url.to_string());
        self
    }

    pub fn blocked(mut self, url: &str) -> Self {
        self.blocked.insert(url.to_string());
        self
    }

    pub fn panics(mut self, url: &str) -> Self {
        self.panics.insert(url.to_string());
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<LoadCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, url: &str) -> Vec<LoadCall> {
        self.calls().into_iter().filter(|c| c.url == url).collect()
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    type Page = MockPage;

    async fn load(
        &self,
        url: &str,
        strategy: LoadStrategy,
        timeout: Duration,
        evasion: &Evasion,
    ) -> RenderResult<MockPage> {
        self.calls.lock().unwrap().push(LoadCall {
            url: url.to_string(),
            strategy,
            evasion: evasion.clone(),
        });

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.panics.contains(url) {
            panic!("renderer crashed on {}", url);
        }
        if self.fail_always.contains(url)
            || (strategy == LoadStrategy::DomContentLoaded && self.fail_primary.contains(url))
        {
            return Err(RenderError::Timeout {
                url: url.to_string(),
                strategy,
                timeout,
            });
        }

        let text = if self.blocked.contains(url) {
            CHALLENGE
        } else {
            CONTENT
        };
        Ok(MockPage {
            text: text.to_string(),
            hrefs: self.links.get(url).cloned().unwrap_or_default(),
            title: Some("Mock Page".to_string()),
        })
    }

    fn artifact_extension(&self) -> &'static str {
        "html"
    }
}

pub struct MockPage {
    text: String,
    hrefs: Vec<String>,
    title: Option<String>,
}

#[async_trait]
impl RenderedPage for MockPage {
    async fn text(&self) -> RenderResult<String> {
        Ok(self.text.clone())
    }

    async fn hrefs(&self) -> RenderResult<Vec<String>> {
        Ok(self.hrefs.clone())
    }

    async fn title(&self) -> RenderResult<Option<String>> {
        Ok(self.title.clone())
    }

    async fn save_artifact(&self, path: &Path, _options: &RenderOptions) -> RenderResult<()> {
        tokio::fs::write(path, &self.text)
            .await
            .map_err(|e| RenderError::Artifact {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }

    async fn close(&self) {}
}
