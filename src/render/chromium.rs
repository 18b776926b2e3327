//! Headless Chromium renderer
//!
//! Drives a local Chromium over the DevTools protocol. Each load gets its
//! own browser context, so cookies and storage never carry over between
//! attempts. The tab overrides the user agent, sends the navigation
//! headers, navigates and polls `document.readyState` until the requested
//! load strategy is satisfied. Artifacts are PDFs printed with the
//! configured media emulation.

use crate::config::RenderOptions;
use crate::render::{
    Evasion, LoadStrategy, RenderError, RenderResult, RenderedPage, Renderer, NAVIGATION_HEADERS,
};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::emulation::{MediaFeature, SetEmulatedMediaParams};
use chromiumoxide::cdp::browser_protocol::input::{
    DispatchMouseEventParams, DispatchMouseEventType,
};
use chromiumoxide::cdp::browser_protocol::network::{Headers, SetExtraHttpHeadersParams};
use chromiumoxide::cdp::browser_protocol::page::{NavigateParams, PrintToPdfParams};
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams,
};
use chromiumoxide::Page;
use futures::StreamExt;
use rand::Rng;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

const READY_POLL_INTERVAL: Duration = Duration::from_millis(100);

const HEADER_TEMPLATE: &str = r#"
<span style="font-size: 10px" class="date"></span>
<span style="font-size: 10px"> | </span>
<span style="font-size: 10px" class="title"></span>
"#;

const FOOTER_TEMPLATE: &str = r#"
<span style="font-size: 10px" class="url"></span>
<span style="font-size: 10px"> | </span>
<span style="font-size: 10px" class="pageNumber"></span>
<span style="font-size: 10px">/</span>
<span style="font-size: 10px" class="totalPages"></span>
"#;

/// Renderer backed by a headless Chromium process
pub struct BrowserRenderer {
    browser: Arc<Browser>,
    handler: JoinHandle<()>,
}

impl BrowserRenderer {
    /// Starts Chromium and the task pumping its protocol events
    pub async fn launch() -> RenderResult<Self> {
        let config = BrowserConfig::builder()
            .build()
            .map_err(RenderError::Launch)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler error: {}", e);
                }
            }
        });

        Ok(Self {
            browser: Arc::new(browser),
            handler,
        })
    }
}

impl Drop for BrowserRenderer {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

#[async_trait]
impl Renderer for BrowserRenderer {
    type Page = ChromePage;

    async fn load(
        &self,
        url: &str,
        strategy: LoadStrategy,
        timeout: Duration,
        evasion: &Evasion,
    ) -> RenderResult<ChromePage> {
        let context = self
            .browser
            .create_browser_context(CreateBrowserContextParams::default())
            .await
            .map_err(|e| navigation_error(url, strategy, e))?;

        let mut target = CreateTargetParams::new("about:blank");
        target.browser_context_id = Some(context.clone());
        let page = match self.browser.new_page(target).await {
            Ok(page) => page,
            Err(e) => {
                dispose_context(&self.browser, context).await;
                return Err(navigation_error(url, strategy, e));
            }
        };

        let page = ChromePage {
            browser: self.browser.clone(),
            context,
            page,
            url: url.to_string(),
        };

        match tokio::time::timeout(timeout, navigate(&page.page, url, strategy, evasion)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                page.close().await;
                return Err(e);
            }
            Err(_) => {
                page.close().await;
                return Err(RenderError::Timeout {
                    url: url.to_string(),
                    strategy,
                    timeout,
                });
            }
        }

        if evasion.interact {
            interact(&page.page).await;
        }
        if !evasion.settle.is_zero() {
            tokio::time::sleep(evasion.settle).await;
        }

        Ok(page)
    }

    fn artifact_extension(&self) -> &'static str {
        "pdf"
    }
}

async fn navigate(
    page: &Page,
    url: &str,
    strategy: LoadStrategy,
    evasion: &Evasion,
) -> RenderResult<()> {
    page.set_user_agent(evasion.user_agent.clone())
        .await
        .map_err(|e| navigation_error(url, strategy, e))?;
    page.execute(SetExtraHttpHeadersParams::new(Headers::new(
        navigation_headers(),
    )))
    .await
    .map_err(|e| navigation_error(url, strategy, e))?;

    let response = page
        .execute(NavigateParams::new(url))
        .await
        .map_err(|e| navigation_error(url, strategy, e))?;
    if let Some(message) = response.result.error_text.clone() {
        return Err(RenderError::Navigation {
            url: url.to_string(),
            strategy,
            message,
        });
    }

    let ready: &[&str] = match strategy {
        LoadStrategy::DomContentLoaded => &["interactive", "complete"],
        LoadStrategy::Load => &["complete"],
    };

    loop {
        // the blank tab reports "complete" until the navigation commits
        let state = page
            .evaluate("location.href === 'about:blank' ? 'loading' : document.readyState")
            .await
            .ok()
            .and_then(|result| result.into_value::<String>().ok());

        if let Some(state) = state {
            if ready.contains(&state.as_str()) {
                return Ok(());
            }
        }
        tokio::time::sleep(READY_POLL_INTERVAL).await;
    }
}

/// Moves the mouse and scrolls a little
async fn interact(page: &Page) {
    let (x, y, scroll) = {
        let mut rng = rand::thread_rng();
        (
            rng.gen_range(0.0..200.0),
            rng.gen_range(0.0..200.0),
            rng.gen_range(0..300),
        )
    };

    let moved = page
        .execute(DispatchMouseEventParams::new(
            DispatchMouseEventType::MouseMoved,
            x,
            y,
        ))
        .await;
    if let Err(e) = moved {
        tracing::debug!("Mouse move failed: {}", e);
    }

    if let Err(e) = page.evaluate(format!("window.scrollBy(0, {})", scroll)).await {
        tracing::debug!("Scroll failed: {}", e);
    }
}

/// [`NAVIGATION_HEADERS`] as the JSON object `Network.setExtraHTTPHeaders` expects
fn navigation_headers() -> serde_json::Value {
    NAVIGATION_HEADERS
        .iter()
        .map(|(name, value)| (name.to_string(), serde_json::Value::from(*value)))
        .collect::<serde_json::Map<_, _>>()
        .into()
}

async fn close_page(page: &Page) {
    if let Err(e) = page.clone().close().await {
        tracing::debug!("Failed to close page: {}", e);
    }
}

async fn dispose_context(browser: &Browser, context: BrowserContextId) {
    if let Err(e) = browser.dispose_browser_context(context).await {
        tracing::debug!("Failed to dispose browser context: {}", e);
    }
}

fn navigation_error(url: &str, strategy: LoadStrategy, e: impl std::fmt::Display) -> RenderError {
    RenderError::Navigation {
        url: url.to_string(),
        strategy,
        message: e.to_string(),
    }
}

/// A loaded Chromium tab and the browser context it lives in
pub struct ChromePage {
    browser: Arc<Browser>,
    context: BrowserContextId,
    page: Page,
    url: String,
}

impl ChromePage {
    fn extraction_error(&self, e: impl std::fmt::Display) -> RenderError {
        RenderError::Extraction {
            url: self.url.clone(),
            message: e.to_string(),
        }
    }
}

#[async_trait]
impl RenderedPage for ChromePage {
    async fn text(&self) -> RenderResult<String> {
        self.page
            .evaluate("document.body ? document.body.innerText : ''")
            .await
            .map_err(|e| self.extraction_error(e))?
            .into_value::<String>()
            .map_err(|e| self.extraction_error(e))
    }

    async fn hrefs(&self) -> RenderResult<Vec<String>> {
        self.page
            .evaluate("Array.from(document.querySelectorAll('[href]'), e => e.getAttribute('href'))")
            .await
            .map_err(|e| self.extraction_error(e))?
            .into_value::<Vec<String>>()
            .map_err(|e| self.extraction_error(e))
    }

    async fn title(&self) -> RenderResult<Option<String>> {
        self.page
            .get_title()
            .await
            .map_err(|e| self.extraction_error(e))
    }

    async fn save_artifact(&self, path: &Path, options: &RenderOptions) -> RenderResult<()> {
        let artifact_error = |e: chromiumoxide::error::CdpError| RenderError::Artifact {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let media = SetEmulatedMediaParams {
            media: Some(options.media.as_str().to_string()),
            features: Some(vec![MediaFeature::new(
                "prefers-color-scheme",
                options.color_scheme.as_str(),
            )]),
        };
        self.page.execute(media).await.map_err(artifact_error)?;

        let params = PrintToPdfParams {
            display_header_footer: Some(options.with_header),
            header_template: Some(HEADER_TEMPLATE.to_string()),
            footer_template: Some(FOOTER_TEMPLATE.to_string()),
            ..Default::default()
        };
        self.page
            .save_pdf(params, path)
            .await
            .map_err(artifact_error)?;

        tracing::debug!("PDF: {}", path.display());
        Ok(())
    }

    async fn close(&self) {
        close_page(&self.page).await;
        dispose_context(&self.browser, self.context.clone()).await;
    }
}
