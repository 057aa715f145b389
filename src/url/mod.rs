//! URL handling module for Crawldex
//!
//! This module provides the URL grammar used to validate and split URLs, plus
//! the two page-level rules applied before a URL is scheduled: the likely-HTML
//! filter and trailing-slash canonicalization.

mod normalize;
mod structured;

pub use normalize::{canonicalize_trailing_slash, is_likely_html};
pub use structured::StructuredUrl;
