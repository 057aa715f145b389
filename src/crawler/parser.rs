//! HTML parser for extracting links and plain text
//!
//! This module handles turning a fetched page body into:
//! - Outbound page links (absolute, validated, likely HTML)
//! - Plain text with scripts, styles, tags and entity references removed
//! - Index tokens and a short display snippet

use crate::url::{is_likely_html, StructuredUrl};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use scraper::{Html, Selector};
use url::Url;

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script.+?</script>").expect("valid script pattern"));

static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style.+?</style>").expect("valid style pattern"));

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^<>]+?>").expect("valid tag pattern"));

static ENTITY_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&[a-zA-Z0-9#]+;").expect("valid entity pattern"));

static DECODABLE_ENTITY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid entity pattern")
});

/// Extracts outbound page links from an HTML document
///
/// # Link Extraction Rules
///
/// Two independent passes over `<a href="...">` tags:
/// 1. hrefs that are already absolute `http://` URLs
/// 2. hrefs without a scheme, resolved against `base_url`
///
/// Each candidate is kept only if it parses and looks like an HTML page
/// (see [`is_likely_html`]). Hrefs with any other scheme, empty hrefs and
/// fragment-only anchors are dropped. The result may contain duplicates.
///
/// # Example
///
/// ```
/// use crawldex::crawler::extract_links;
///
/// let html = r#"<a href="http://x.com/a.html">A</a><a href="/b.html">B</a>"#;
/// let links = extract_links(html, "http://x.com/");
/// assert_eq!(links, vec!["http://x.com/a.html", "http://x.com/b.html"]);
/// ```
pub fn extract_links(html: &str, base_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let hrefs = anchor_hrefs(&document);
    let mut links = Vec::new();

    for href in &hrefs {
        if href.starts_with("http://") {
            if is_likely_html(href) {
                links.push(href.clone());
            } else {
                tracing::trace!("Skipping non-page link: {}", href);
            }
        }
    }

    for href in &hrefs {
        if StructuredUrl::parse(href).is_valid() {
            continue;
        }
        match resolve_relative(base_url, href) {
            Some(absolute) if is_likely_html(&absolute) => {
                tracing::trace!("Relative link {} -> {}", href, absolute);
                links.push(absolute);
            }
            Some(absolute) => tracing::trace!("Skipping non-page link: {}", absolute),
            None => tracing::trace!("Could not resolve {} against {}", href, base_url),
        }
    }

    links
}

/// Collects trimmed href values of all anchors, minus empty and fragment-only ones
fn anchor_hrefs(document: &Html) -> Vec<String> {
    let mut hrefs = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                let href = href.trim();
                if href.is_empty() || href.starts_with('#') {
                    continue;
                }
                hrefs.push(href.to_string());
            }
        }
    }

    hrefs
}

/// Resolves a scheme-less href against the page it was found on
fn resolve_relative(base_url: &str, href: &str) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    base.join(href).ok().map(|url| url.to_string())
}

/// Strips markup from an HTML document, leaving plain text
///
/// Removal happens in a fixed order: `<script>` blocks, `<style>` blocks, all
/// remaining tags, then character entity references. Each removed span is
/// replaced by a space so neighbouring words stay apart.
///
/// # Example
///
/// ```
/// use crawldex::crawler::strip_markup;
///
/// let text = strip_markup("<p>Hello&nbsp;<b>world</b></p><script>var x;</script>");
/// assert_eq!(text.split_whitespace().collect::<Vec<_>>(), vec!["Hello", "world"]);
/// ```
pub fn strip_markup(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, " ");
    let text = STYLE_BLOCK.replace_all(text.trim(), " ");
    let text = TAG.replace_all(text.trim(), " ");
    let text = ENTITY_REF.replace_all(text.trim(), " ");
    text.trim().to_string()
}

/// Decodes common named and numeric character entity references
///
/// Unknown names and out-of-range code points are left as written.
pub fn decode_entities(text: &str) -> String {
    DECODABLE_ENTITY
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            decode_entity(name).map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}

fn decode_entity(name: &str) -> Option<char> {
    if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(dec) = name.strip_prefix('#') {
        return dec.parse::<u32>().ok().and_then(char::from_u32);
    }
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "copy" => Some('©'),
        "reg" => Some('®'),
        "mdash" => Some('—'),
        "ndash" => Some('–'),
        "hellip" => Some('…'),
        _ => None,
    }
}

/// Splits plain text into index tokens
///
/// Words are separated by whitespace, lowercased, and stripped of every
/// character that is not an ASCII letter or digit. Words left empty are
/// dropped, so they never consume a position.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|word| {
            word.to_lowercase()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// Builds the display snippet for a page's plain text
///
/// Returns the first `max_chars` characters of the entity-decoded text, or
/// `None` when the text is empty.
pub fn make_snippet(text: &str, max_chars: usize) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    Some(decode_entities(text).chars().take(max_chars).collect())
}
