// src/models/selectors.rs

//! CSS selectors for reading entries out of a rendered feed.

use serde::{Deserialize, Serialize};

/// CSS selectors describing one way of locating and reading feed entries.
///
/// Every field list is tried in order; the first element with non-empty
/// text (or attribute, for timestamps) wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntrySelectors {
    /// Strategy name used in logs
    pub name: String,

    /// Selector for each entry element within the container
    pub entry: String,

    /// Selectors for the author label
    #[serde(default)]
    pub sender: Vec<String>,

    /// Selectors for the time element
    #[serde(default)]
    pub timestamp: Vec<String>,

    /// Attribute holding the machine-readable time
    #[serde(default = "default_timestamp_attr")]
    pub timestamp_attr: String,

    /// Selectors for the body text
    #[serde(default)]
    pub text: Vec<String>,

    /// Selector for media and link elements (`src` or `href` is read)
    #[serde(default = "default_media")]
    pub media: String,

    /// Selectors for the forwarded-from label
    #[serde(default)]
    pub forwarded_from: Vec<String>,

    /// Selectors for the reply preview
    #[serde(default)]
    pub reply_to: Vec<String>,
}

fn default_timestamp_attr() -> String {
    "datetime".to_string()
}

fn default_media() -> String {
    "img, video, a".to_string()
}

impl Default for EntrySelectors {
    fn default() -> Self {
        Self::with_entry("message", r#"div[data-testid="message"]"#)
    }
}

impl EntrySelectors {
    /// Field selectors of the standard message markup, with a custom entry selector.
    pub fn with_entry(name: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: entry.into(),
            sender: vec![
                r#"[data-testid="message-author"]"#.to_string(),
                "header [dir]".to_string(),
            ],
            timestamp: vec!["time".to_string()],
            timestamp_attr: default_timestamp_attr(),
            text: vec![
                r#"[data-testid="message-text"]"#.to_string(),
                r#"[class*="text"]"#.to_string(),
            ],
            media: default_media(),
            forwarded_from: vec![r#"[data-testid="forwarded-from"]"#.to_string()],
            reply_to: vec![r#"[data-testid="reply-meta"]"#.to_string()],
        }
    }

    /// Looser selectors for channel views that render entries as `<article>`.
    pub fn fallback() -> Self {
        Self::with_entry("article", "article")
    }

    /// Every selector string this strategy uses.
    pub fn all_selectors(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.entry.as_str())
            .chain(std::iter::once(self.media.as_str()))
            .chain(self.sender.iter().map(String::as_str))
            .chain(self.timestamp.iter().map(String::as_str))
            .chain(self.text.iter().map(String::as_str))
            .chain(self.forwarded_from.iter().map(String::as_str))
            .chain(self.reply_to.iter().map(String::as_str))
    }
}
