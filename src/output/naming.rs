//! Artifact naming and output layout

use crate::url::domain_key;
use crate::UrlResult;
use std::path::{Path, PathBuf};

/// Name of the manifest file written next to the artifacts
pub const MANIFEST_FILE_NAME: &str = "___urls.txt";

/// Replaces every character outside `[a-zA-Z0-9_]` with `_` and collapses
/// runs of `_` into one
///
/// # Examples
///
/// ```
/// use sitesnap::output::sanitize;
///
/// assert_eq!(sanitize("Getting Started | Docs"), "Getting_Started_Docs");
/// assert_eq!(sanitize("a__b"), "a_b");
/// assert_eq!(sanitize("Café"), "Caf_");
/// ```
pub fn sanitize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '_' {
            c
        } else {
            '_'
        };

        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Returns the part of a URL after its third `/`
///
/// For `https://host/a/b` that is `a/b`. URLs with fewer than three slashes
/// are returned whole.
pub fn url_tail(url: &str) -> &str {
    match url.match_indices('/').nth(2) {
        Some((idx, _)) => &url[idx + 1..],
        None => url,
    }
}

/// Builds the artifact file name for a page
///
/// # Example
///
/// ```
/// use sitesnap::output::artifact_file_name;
///
/// let name = artifact_file_name(Some("Intro - Docs"), "https://example.com/docs/intro", "pdf");
/// assert_eq!(name, "Intro_Docs_docs_intro.pdf");
/// ```
pub fn artifact_file_name(title: Option<&str>, url: &str, extension: &str) -> String {
    format!(
        "{}_{}.{}",
        sanitize(title.unwrap_or("")),
        sanitize(url_tail(url)),
        extension
    )
}

/// Directory layout of one crawl's output
#[derive(Debug, Clone)]
pub struct OutputLayout {
    output_dir: PathBuf,
}

impl OutputLayout {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// The top-level output directory
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Directory grouping everything produced for a domain key
    pub fn domain_dir(&self, domain_key: &str) -> PathBuf {
        self.output_dir.join(domain_key)
    }

    /// Where the artifact for `url` goes
    pub fn artifact_path(
        &self,
        url: &str,
        title: Option<&str>,
        extension: &str,
    ) -> UrlResult<PathBuf> {
        let key = domain_key(url)?;
        Ok(self
            .domain_dir(&key)
            .join(artifact_file_name(title, url, extension)))
    }

    /// Where the manifest for a domain key goes
    pub fn manifest_path(&self, domain_key: &str) -> PathBuf {
        self.domain_dir(domain_key).join(MANIFEST_FILE_NAME)
    }
}
