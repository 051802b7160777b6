//! Utility functions and helpers.

pub mod log;

use scraper::ElementRef;
use url::Url;

use crate::error::Result;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> Result<String> {
    Ok(base.join(href)?.to_string())
}

/// Text content of an element with each line trimmed and blank lines dropped.
pub fn inner_text(element: ElementRef<'_>) -> String {
    let raw: String = element.text().collect();
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse all whitespace runs into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
