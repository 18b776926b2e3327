//! Manifest file output

use crate::output::naming::OutputLayout;
use crate::output::traits::{ManifestWriter, OutputError, OutputResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Writes `___urls.txt` into the domain directory of an [`OutputLayout`]
#[derive(Debug, Clone)]
pub struct FileManifestWriter {
    layout: OutputLayout,
}

impl FileManifestWriter {
    pub fn new(layout: OutputLayout) -> Self {
        Self { layout }
    }
}

#[async_trait]
impl ManifestWriter for FileManifestWriter {
    async fn write_manifest(&self, domain_key: &str, urls: &[String]) -> OutputResult<PathBuf> {
        let dir = self.layout.domain_dir(domain_key);
        ensure_dir(&dir).await?;

        let path = self.layout.manifest_path(domain_key);
        tokio::fs::write(&path, render_manifest(urls))
            .await
            .map_err(|source| OutputError::Write {
                path: path.clone(),
                source,
            })?;

        tracing::debug!("Wrote {} URLs to {}", urls.len(), path.display());
        Ok(path)
    }
}

/// Joins URLs with newlines, without a trailing newline
pub fn render_manifest(urls: &[String]) -> String {
    urls.join("\n")
}

/// Creates a directory and its parents if they do not exist yet
pub async fn ensure_dir(dir: &Path) -> OutputResult<()> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| OutputError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })
}
