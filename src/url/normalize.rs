use crate::url::StructuredUrl;

/// Returns true if the URL probably names an HTML page
///
/// A valid URL qualifies when its path has no `.` at all or ends in `.htm` or
/// `.html`. Used to keep images, scripts and stylesheets out of the crawl.
///
/// # Examples
///
/// ```
/// use crawldex::url::is_likely_html;
///
/// assert!(is_likely_html("http://a.b/page.html"));
/// assert!(is_likely_html("http://a.b/dir"));
/// assert!(!is_likely_html("http://a.b/img.png"));
/// ```
pub fn is_likely_html(url: &str) -> bool {
    let parsed = StructuredUrl::parse(url);
    match parsed.path() {
        Some(path) if parsed.is_valid() => {
            !path.contains('.') || path.ends_with(".html") || path.ends_with(".htm")
        }
        _ => false,
    }
}

/// Appends a trailing slash to directory-like URLs
///
/// A valid URL whose path has no `.` and does not already end in `/` gets a
/// `/` appended, so `http://a.b/dir` and `http://a.b/dir/` name one site.
/// Anything else is returned unchanged. The slash goes at the very end of the
/// string, after any query or fragment; the fetched path stays `/dir`.
///
/// # Examples
///
/// ```
/// use crawldex::url::canonicalize_trailing_slash;
///
/// assert_eq!(canonicalize_trailing_slash("http://a.b/dir"), "http://a.b/dir/");
/// assert_eq!(
///     canonicalize_trailing_slash("http://a.b/page.html"),
///     "http://a.b/page.html"
/// );
/// ```
pub fn canonicalize_trailing_slash(url: &str) -> String {
    let parsed = StructuredUrl::parse(url);
    match parsed.path() {
        Some(path) if parsed.is_valid() && !path.contains('.') && !path.ends_with('/') => {
            let canonical = format!("{}/", url);
            tracing::trace!("{} -> {}", url, canonical);
            canonical
        }
        _ => url.to_string(),
    }
}
