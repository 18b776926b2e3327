use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Non-page resource extensions dropped by the link filter
pub const DEFAULT_IGNORE_EXTENSIONS: &[&str] = &[
    ".jpg", ".jpeg", ".png", ".gif", ".svg", ".css", ".js", ".ico", ".xml", ".json", ".txt",
    ".md", ".pdf", ".zip",
];

/// Phrases that identify an anti-bot challenge page (matched case-insensitively)
pub const DEFAULT_BLOCK_SIGNATURES: &[&str] = &[
    "just a moment",
    "checking your browser",
    "verify you are human",
    "attention required",
    "enable javascript and cookies to continue",
    "ddos protection by",
    "please complete the security check",
];

/// Media type emulated when rendering artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Media {
    Screen,
    #[default]
    Print,
}

impl Media {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Screen => "screen",
            Self::Print => "print",
        }
    }
}

impl fmt::Display for Media {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Color scheme emulated when rendering artifacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ColorScheme {
    Light,
    Dark,
    #[default]
    NoPreference,
}

impl ColorScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::NoPreference => "no-preference",
        }
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options forwarded to the renderer when producing an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    /// Print header and footer templates on every page
    pub with_header: bool,
    pub media: Media,
    pub color_scheme: ColorScheme,
}

/// Optional TOML tuning file
///
/// Every section and key is optional; missing values fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub crawler: CrawlerSettings,
    #[serde(default)]
    pub detection: DetectionSettings,
    #[serde(default)]
    pub output: OutputSettings,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerSettings {
    /// Maximum number of renders running at once
    pub max_concurrent_pages_open: u32,

    /// Retries allowed after a page looks blocked
    pub max_retries: u32,

    /// Timeout for the primary (DOM content loaded) strategy, in milliseconds
    pub primary_timeout_ms: u64,

    /// Timeout for the fallback (full load) strategy, in milliseconds
    pub fallback_timeout_ms: u64,

    /// Random delay range before each navigation, in milliseconds
    pub pre_navigation_delay_ms: [u64; 2],

    /// Base wait after navigation for dynamic content, in milliseconds
    pub settle_delay_ms: u64,

    /// Path extensions that never point at pages
    pub ignore_extensions: Vec<String>,
}

impl Default for CrawlerSettings {
    fn default() -> Self {
        Self {
            max_concurrent_pages_open: 5,
            max_retries: 2,
            primary_timeout_ms: 60_000,
            fallback_timeout_ms: 90_000,
            pre_navigation_delay_ms: [500, 1500],
            settle_delay_ms: 2000,
            ignore_extensions: DEFAULT_IGNORE_EXTENSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl CrawlerSettings {
    pub fn primary_timeout(&self) -> Duration {
        Duration::from_millis(self.primary_timeout_ms)
    }

    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_millis(self.fallback_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Challenge-page detection settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DetectionSettings {
    /// Phrases that mark a page as blocked
    pub signatures: Vec<String>,

    /// Pages with less visible text than this are treated as blocked
    pub min_content_length: usize,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            signatures: DEFAULT_BLOCK_SIGNATURES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_content_length: 100,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputSettings {
    /// Directory holding one subdirectory per crawled domain
    pub output_dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
        }
    }
}

/// Fully resolved configuration for one crawl run
///
/// Built once at startup and shared read-only with every task.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// The URL the crawl starts from; also the scope prefix for links
    pub root_url: String,

    /// Walk the link graph without writing artifacts
    pub dry_run: bool,

    /// Report visited/remaining counts and the final URL list
    pub verbose: bool,

    pub render: RenderOptions,
    pub crawler: CrawlerSettings,
    pub detection: DetectionSettings,
    pub output: OutputSettings,
}

impl CrawlConfig {
    /// Creates a configuration with default settings for the given root URL
    pub fn new(root_url: impl Into<String>) -> Self {
        Self::from_file(root_url, FileConfig::default())
    }

    /// Combines a root URL with settings loaded from a file
    pub fn from_file(root_url: impl Into<String>, file: FileConfig) -> Self {
        Self {
            root_url: root_url.into(),
            dry_run: false,
            verbose: false,
            render: RenderOptions::default(),
            crawler: file.crawler,
            detection: file.detection,
            output: file.output,
        }
    }
}
