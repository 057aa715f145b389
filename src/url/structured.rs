use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

// scheme://domain[/path][?query][#fragment], anchored on both ends
static URL_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.\-]*)://([^/?#]+)(/[^?#]*)?(?:\?([^#]*))?(?:#(.*))?$")
        .expect("URL grammar is a valid pattern")
});

/// A URL string split into its components
///
/// Parsing never fails: a string that does not match the whole grammar yields
/// a value with `is_valid() == false` and every component unset. A valid URL
/// with no path reports `/` as its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredUrl {
    raw: String,
    scheme: Option<String>,
    domain: Option<String>,
    path: Option<String>,
    query: Option<String>,
    fragment: Option<String>,
}

impl StructuredUrl {
    /// Parses a URL string against the anchored URL grammar
    ///
    /// # Examples
    ///
    /// ```
    /// use crawldex::url::StructuredUrl;
    ///
    /// let url = StructuredUrl::parse("http://a.b/c?q#f");
    /// assert!(url.is_valid());
    /// assert_eq!(url.domain(), Some("a.b"));
    /// assert_eq!(url.path(), Some("/c"));
    ///
    /// assert!(!StructuredUrl::parse("not a url").is_valid());
    /// ```
    pub fn parse(raw: &str) -> Self {
        let Some(caps) = URL_GRAMMAR.captures(raw) else {
            return Self::invalid(raw);
        };

        let group = |i: usize| caps.get(i).map(|m| m.as_str().to_string());

        Self {
            raw: raw.to_string(),
            scheme: group(1),
            domain: group(2),
            path: Some(group(3).unwrap_or_else(|| "/".to_string())),
            query: group(4),
            fragment: group(5),
        }
    }

    fn invalid(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            scheme: None,
            domain: None,
            path: None,
            query: None,
            fragment: None,
        }
    }

    /// The original string this value was parsed from
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_valid(&self) -> bool {
        self.scheme.is_some()
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    /// Authority section, including any explicit port
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }
}

impl fmt::Display for StructuredUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
