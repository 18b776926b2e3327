//! Output module for artifacts, the URL manifest and run statistics
//!
//! This module handles:
//! - Naming artifacts and laying out the output directory
//! - Writing the sorted manifest of visited URLs
//! - Recording crawl statistics

mod manifest;
mod naming;
pub mod stats;
mod traits;

pub use manifest::{ensure_dir, render_manifest, FileManifestWriter};
pub use naming::{artifact_file_name, sanitize, url_tail, OutputLayout, MANIFEST_FILE_NAME};
pub use stats::{log_summary, CrawlSummary, RunStats};
pub use traits::{ManifestWriter, OutputError, OutputResult};
