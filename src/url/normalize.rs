use crate::{UrlError, UrlResult};
use url::Url;

/// Removes the fragment (everything from the first `#`) from a raw href
///
/// # Examples
///
/// ```
/// use sitesnap::url::strip_fragment;
///
/// assert_eq!(strip_fragment("/docs/a#intro"), "/docs/a");
/// assert_eq!(strip_fragment("#top"), "");
/// assert_eq!(strip_fragment("/docs/a"), "/docs/a");
/// ```
pub fn strip_fragment(href: &str) -> &str {
    match href.find('#') {
        Some(idx) => &href[..idx],
        None => href,
    }
}

/// Returns the origin (scheme, host and port) of a URL
///
/// # Examples
///
/// ```
/// use sitesnap::url::origin_of;
///
/// let origin = origin_of("https://example.com/docs/a?x=1").unwrap();
/// assert_eq!(origin.as_str(), "https://example.com/");
/// ```
pub fn origin_of(url_str: &str) -> UrlResult<Url> {
    let url = Url::parse(url_str).map_err(|e| UrlError::Parse(format!("{}: {}", url_str, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost(url_str.to_string()));
    }

    Url::parse(&url.origin().ascii_serialization())
        .map_err(|e| UrlError::Parse(format!("{}: {}", url_str, e)))
}

/// Resolves a root-relative href (one starting with `/`) against an origin
///
/// Returns `None` if the joined URL cannot be parsed.
pub fn resolve_root_relative(origin: &Url, href: &str) -> Option<String> {
    origin.join(href).ok().map(|u| u.to_string())
}

/// Returns the extension of the last path segment of a URL string
///
/// The URL is treated as a plain path: the extension runs from the last
/// `.` of the final `/`-separated segment to the end of the string, so a
/// query string stays attached (`/a.png?v=1` yields `.png?v=1`). A segment
/// whose only dot is its first character has no extension.
///
/// # Examples
///
/// ```
/// use sitesnap::url::path_extension;
///
/// assert_eq!(path_extension("https://example.com/img.png"), ".png");
/// assert_eq!(path_extension("https://example.com/docs/page"), "");
/// assert_eq!(path_extension("https://example.com/.hidden"), "");
/// ```
pub fn path_extension(url_str: &str) -> &str {
    let trimmed = url_str.trim_end_matches('/');
    let segment = match trimmed.rfind('/') {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    };

    match segment.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &segment[idx..],
    }
}
