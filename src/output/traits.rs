//! Output handler traits and types
//!
//! This module defines the manifest writer interface and the errors output
//! operations can raise.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Receives the final, sorted list of visited URLs
#[async_trait]
pub trait ManifestWriter: Send + Sync {
    /// Persists `urls` under the given domain key
    ///
    /// # Returns
    ///
    /// * `Ok(PathBuf)` - Where the manifest was written
    /// * `Err(OutputError)` - The manifest could not be written
    async fn write_manifest(&self, domain_key: &str, urls: &[String]) -> OutputResult<PathBuf>;
}
