//! Link filtering
//!
//! Turns the raw `href` values found on a page into the set of in-scope,
//! page-like URLs worth visiting.

use crate::url::normalize::{origin_of, path_extension, resolve_root_relative, strip_fragment};
use crate::UrlResult;
use std::collections::BTreeSet;
use url::Url;

/// Link filter bound to one crawl's root URL and extension denylist
#[derive(Debug, Clone)]
pub struct LinkFilter {
    root_url: String,
    origin: Url,
    ignore_extensions: Vec<String>,
}

impl LinkFilter {
    /// Creates a filter scoped to `root_url`
    ///
    /// # Returns
    ///
    /// * `Ok(LinkFilter)` - Filter ready to use
    /// * `Err(UrlError)` - The root URL is not an absolute HTTP(S) URL
    pub fn new(root_url: &str, ignore_extensions: &[String]) -> UrlResult<Self> {
        Ok(Self {
            root_url: root_url.to_string(),
            origin: origin_of(root_url)?,
            ignore_extensions: ignore_extensions.to_vec(),
        })
    }

    /// Filters raw hrefs into a deduplicated set of URLs
    ///
    /// # Rules (applied in order)
    ///
    /// 1. Strip the fragment
    /// 2. `/...` resolves against the root origin; `http...` is kept as is
    ///    (trimmed); anything else is dropped, including relative paths
    ///    without a leading slash
    /// 3. Drop the empty string and bare `/`
    /// 4. Drop URLs whose path extension is on the denylist
    /// 5. Keep only URLs that start with the root URL string (plain prefix
    ///    match, so `/docs2` passes a root ending in `/doc`)
    ///
    /// # Example
    ///
    /// ```
    /// use sitesnap::url::LinkFilter;
    ///
    /// let filter = LinkFilter::new("https://example.com/docs", &[".png".to_string()]).unwrap();
    /// let links = filter.filter(["/docs/b", "https://other.com/x", "/img.png"]);
    /// assert_eq!(links.into_iter().collect::<Vec<_>>(), vec!["https://example.com/docs/b"]);
    /// ```
    pub fn filter<I, S>(&self, hrefs: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        hrefs
            .into_iter()
            .filter_map(|href| self.accept(href.as_ref()))
            .collect()
    }

    /// Applies the filter rules to a single href
    fn accept(&self, raw: &str) -> Option<String> {
        let href = strip_fragment(raw);

        let url = if href.starts_with('/') {
            resolve_root_relative(&self.origin, href.trim())?
        } else if href.starts_with("http") {
            href.trim().to_string()
        } else {
            return None;
        };

        if url.is_empty() || url == "/" {
            return None;
        }

        let extension = path_extension(&url);
        if self.ignore_extensions.iter().any(|ext| ext == extension) {
            return None;
        }

        if !url.starts_with("http") || url.starts_with(&self.root_url) {
            Some(url)
        } else {
            None
        }
    }
}

/// Filters raw hrefs against a root URL in one call
///
/// Convenience wrapper around [`LinkFilter`]; returns an empty set if the
/// root URL itself is invalid.
pub fn filter_links<I, S>(root_url: &str, ignore_extensions: &[String], hrefs: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match LinkFilter::new(root_url, ignore_extensions) {
        Ok(filter) => filter.filter(hrefs),
        Err(e) => {
            tracing::debug!("Cannot filter links for root {}: {}", root_url, e);
            BTreeSet::new()
        }
    }
}
