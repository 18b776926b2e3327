use crate::{UrlError, UrlResult};
use url::Url;

/// Derives the output grouping key for a URL's domain
///
/// The host loses its first `www.` and is split on `.`; the key is the
/// second-to-last label (the registrable name for most domains) or the only
/// label for single-label hosts.
///
/// # Arguments
///
/// * `url_str` - The URL to derive the key from
///
/// # Returns
///
/// * `Ok(String)` - The domain key
/// * `Err(UrlError)` - The URL cannot be parsed or has no host
///
/// # Examples
///
/// ```
/// use sitesnap::url::domain_key;
///
/// assert_eq!(domain_key("https://www.example.com/docs").unwrap(), "example");
/// assert_eq!(domain_key("https://docs.rust-lang.org/book").unwrap(), "rust-lang");
/// assert_eq!(domain_key("http://localhost:3000/").unwrap(), "localhost");
/// ```
pub fn domain_key(url_str: &str) -> UrlResult<String> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(format!("{}: {}", url_str, e)))?;
    let host = url
        .host_str()
        .ok_or_else(|| UrlError::MissingHost(url_str.to_string()))?;

    let host = host.replacen("www.", "", 1);
    let labels: Vec<&str> = host.split('.').collect();

    let key = if labels.len() >= 2 {
        labels[labels.len() - 2]
    } else {
        labels[0]
    };

    Ok(key.to_string())
}
