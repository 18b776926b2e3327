//! Sitesnap: render every page of a website to a snapshot
//!
//! This crate crawls a site from a root URL, discovers in-scope links by
//! rendering each page, writes one artifact per page and finishes with a
//! manifest of every visited URL.

pub mod config;
pub mod crawler;
pub mod output;
pub mod render;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Sitesnap operations
#[derive(Debug, Error)]
pub enum SnapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Render error: {0}")]
    Render(#[from] render::RenderError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Invalid state transition for {url}: {from:?} -> {to:?}")]
    InvalidTransition {
        url: String,
        from: state::PageState,
        to: state::PageState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),
}

/// Result type alias for Sitesnap operations
pub type Result<T> = std::result::Result<T, SnapError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{run_crawl, Coordinator, CrawlReport};
pub use render::{HttpRenderer, Renderer};
pub use state::PageState;
pub use url::{domain_key, filter_links};
