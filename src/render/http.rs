//! HTTP renderer implementation
//!
//! Loads pages with a plain HTTP client and parses them with `scraper`.
//! There is no script execution, so the settle wait and simulated
//! interaction of an [`Evasion`] are ignored; the user agent is honored.
//! Artifacts are the raw HTML of the page.

use crate::config::RenderOptions;
use crate::render::{
    Evasion, LoadStrategy, RenderError, RenderResult, RenderedPage, Renderer, NAVIGATION_HEADERS,
};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use reqwest::Client;
use scraper::{Html, Selector};
use std::path::Path;
use std::time::Duration;

/// Renderer backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct HttpRenderer {
    client: Client,
}

impl HttpRenderer {
    /// Builds the renderer and its HTTP client
    ///
    /// # Returns
    ///
    /// * `Ok(HttpRenderer)` - Ready to load pages
    /// * `Err(RenderError::Launch)` - The HTTP client could not be built
    pub fn new() -> RenderResult<Self> {
        let client = Client::builder()
            .default_headers(browser_headers())
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        Ok(Self { client })
    }
}

/// Default headers built from [`NAVIGATION_HEADERS`]
fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in NAVIGATION_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers
}

#[async_trait]
impl Renderer for HttpRenderer {
    type Page = HtmlPage;

    async fn load(
        &self,
        url: &str,
        strategy: LoadStrategy,
        timeout: Duration,
        evasion: &Evasion,
    ) -> RenderResult<HtmlPage> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, evasion.user_agent.as_str())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify_error(url, strategy, timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            // A browser would still render the error page, so keep it
            tracing::debug!("{} answered HTTP {}", url, status.as_u16());
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_error(url, strategy, timeout, e))?;

        Ok(HtmlPage::parse(body))
    }

    fn artifact_extension(&self) -> &'static str {
        "html"
    }
}

/// Maps a reqwest failure onto the renderer error taxonomy
fn classify_error(
    url: &str,
    strategy: LoadStrategy,
    timeout: Duration,
    error: reqwest::Error,
) -> RenderError {
    if error.is_timeout() {
        RenderError::Timeout {
            url: url.to_string(),
            strategy,
            timeout,
        }
    } else {
        RenderError::Navigation {
            url: url.to_string(),
            strategy,
            message: error.to_string(),
        }
    }
}

/// A fetched HTML document with its extracted content
///
/// Parsing happens once, eagerly, because `scraper::Html` cannot be held
/// across await points in a `Send` future.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    body: String,
    title: Option<String>,
    text: String,
    hrefs: Vec<String>,
}

impl HtmlPage {
    /// Parses a fetched HTML body
    ///
    /// # Example
    ///
    /// ```
    /// use sitesnap::render::HtmlPage;
    ///
    /// let page = HtmlPage::parse(
    ///     r#"<html><head><title>Home</title></head><body><a href="/a">A</a></body></html>"#.to_string(),
    /// );
    /// assert_eq!(page.title_str(), Some("Home"));
    /// assert_eq!(page.href_list(), ["/a".to_string()]);
    /// ```
    pub fn parse(body: String) -> Self {
        let document = Html::parse_document(&body);

        Self {
            title: extract_title(&document),
            text: extract_text(&document),
            hrefs: extract_hrefs(&document),
            body,
        }
    }

    pub fn title_str(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn href_list(&self) -> &[String] {
        &self.hrefs
    }

    pub fn visible_text(&self) -> &str {
        &self.text
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Collects the raw `href` of every element carrying one
fn extract_hrefs(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .map(|href| href.to_string())
        .collect()
}

/// Collects the body's text, skipping script and style contents
///
/// Whitespace runs collapse to a single space, roughly what `innerText`
/// would report.
fn extract_text(document: &Html) -> String {
    let body_selector = Selector::parse("body").ok();
    let root = body_selector
        .as_ref()
        .and_then(|selector| document.select(selector).next())
        .unwrap_or_else(|| document.root_element());

    let mut parts: Vec<&str> = Vec::new();
    for node in root.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };

        let hidden = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|e| e.name()))
            .map(|name| matches!(name, "script" | "style" | "noscript" | "template"))
            .unwrap_or(false);

        if !hidden {
            let text: &str = text;
            parts.push(text);
        }
    }

    parts
        .iter()
        .flat_map(|part| part.split_whitespace())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl RenderedPage for HtmlPage {
    async fn text(&self) -> RenderResult<String> {
        Ok(self.visible_text().to_string())
    }

    async fn hrefs(&self) -> RenderResult<Vec<String>> {
        Ok(self.href_list().to_vec())
    }

    async fn title(&self) -> RenderResult<Option<String>> {
        Ok(self.title_str().map(str::to_string))
    }

    async fn save_artifact(&self, path: &Path, _options: &RenderOptions) -> RenderResult<()> {
        tokio::fs::write(path, self.body.as_bytes())
            .await
            .map_err(|e| RenderError::Artifact {
                path: path.display().to_string(),
                message: e.to_string(),
            })
    }

    async fn close(&self) {}
}
