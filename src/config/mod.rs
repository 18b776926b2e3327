//! Configuration module for Sitesnap
//!
//! A crawl is configured from command-line flags layered over an optional
//! TOML tuning file. The result is validated once and never mutated.
//!
//! # Example
//!
//! ```no_run
//! use sitesnap::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config("https://example.com/", Some(Path::new("sitesnap.toml"))).unwrap();
//! println!("Concurrency: {}", config.crawler.max_concurrent_pages_open);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ColorScheme, CrawlConfig, CrawlerSettings, DetectionSettings, FileConfig, Media,
    OutputSettings, RenderOptions, DEFAULT_BLOCK_SIGNATURES, DEFAULT_IGNORE_EXTENSIONS,
};

// Re-export parser functions
pub use parser::{load_config, load_file_config};
pub use validation::validate;
