//! Renderer abstraction
//!
//! A renderer loads a URL in some browsing environment and exposes the
//! loaded page: its visible text (for challenge detection), its raw `href`
//! values, its title, and a way to persist it as an artifact.
//!
//! - `HttpRenderer`: reqwest + scraper, HTML snapshots
//! - `BrowserRenderer` (feature `chromium`): headless Chromium, PDF snapshots

#[cfg(feature = "chromium")]
mod chromium;
mod http;

#[cfg(feature = "chromium")]
pub use chromium::BrowserRenderer;
pub use http::{HtmlPage, HttpRenderer};

use crate::config::RenderOptions;
use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// User agents rotated between attempts
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/121.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
];

/// Headers a desktop browser sends on a top-level navigation
///
/// Names are lowercase so both renderers can use them as-is.
pub const NAVIGATION_HEADERS: &[(&str, &str)] = &[
    ("accept-language", "en-US,en;q=0.9"),
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8",
    ),
    ("cache-control", "no-cache"),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "none"),
    ("sec-fetch-user", "?1"),
    ("upgrade-insecure-requests", "1"),
];

/// Errors raised by a renderer
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Navigation to {url} failed ({strategy}): {message}")]
    Navigation {
        url: String,
        strategy: LoadStrategy,
        message: String,
    },

    #[error("Navigation to {url} timed out after {timeout:?} ({strategy})")]
    Timeout {
        url: String,
        strategy: LoadStrategy,
        timeout: Duration,
    },

    #[error("Failed to extract content from {url}: {message}")]
    Extraction { url: String, message: String },

    #[error("Failed to write artifact {path}: {message}")]
    Artifact { path: String, message: String },

    #[error("Failed to launch renderer: {0}")]
    Launch(String),
}

/// Result type for renderer operations
pub type RenderResult<T> = Result<T, RenderError>;

/// When a navigation counts as finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadStrategy {
    /// Stop once the DOM is parsed; fast, tried first
    DomContentLoaded,

    /// Wait for the full load event; lenient fallback
    Load,
}

impl LoadStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DomContentLoaded => "domcontentloaded",
            Self::Load => "load",
        }
    }
}

impl fmt::Display for LoadStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity and behavior parameters for one navigation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evasion {
    /// Zero-based attempt number for this URL
    pub attempt: u32,

    /// User agent presented for this attempt
    pub user_agent: String,

    /// Wait after navigation for dynamic content
    pub settle: Duration,

    /// Simulate mouse movement and scrolling after load
    pub interact: bool,
}

impl Evasion {
    /// First-attempt parameters with the given user agent
    ///
    /// Interaction is on; every attempt behaves like a person would.
    pub fn initial(user_agent: impl Into<String>, settle: Duration) -> Self {
        Self {
            attempt: 0,
            user_agent: user_agent.into(),
            settle,
            interact: true,
        }
    }
}

/// A browsing environment able to load pages
#[async_trait]
pub trait Renderer: Send + Sync {
    /// The loaded page handle
    type Page: RenderedPage;

    /// Navigates to `url` with the given strategy and timeout
    ///
    /// # Returns
    ///
    /// * `Ok(Page)` - The page loaded (it may still be a challenge page)
    /// * `Err(RenderError)` - Navigation failed or timed out
    async fn load(
        &self,
        url: &str,
        strategy: LoadStrategy,
        timeout: Duration,
        evasion: &Evasion,
    ) -> RenderResult<Self::Page>;

    /// File extension of the artifacts this renderer writes (without dot)
    fn artifact_extension(&self) -> &'static str;
}

/// A page loaded by a [`Renderer`]
#[async_trait]
pub trait RenderedPage: Send + Sync {
    /// Visible text of the page
    async fn text(&self) -> RenderResult<String>;

    /// Raw `href` attribute values of every element that has one
    async fn hrefs(&self) -> RenderResult<Vec<String>>;

    /// Document title, if any
    async fn title(&self) -> RenderResult<Option<String>>;

    /// Writes the page to `path`
    async fn save_artifact(&self, path: &Path, options: &RenderOptions) -> RenderResult<()>;

    /// Releases the page; errors are logged by the implementation
    async fn close(&self);
}
