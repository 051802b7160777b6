//! Entry extraction strategies.
//!
//! A strategy knows how to locate entry elements inside the rendered
//! container and how to turn one of them into a [`Record`]. The host
//! markup drifts between releases, so the extractor keeps an ordered
//! list of strategies and uses the first one that finds anything.

use scraper::{ElementRef, Selector};
use url::Url;

use crate::error::Result;
use crate::models::{EntrySelectors, ExtractionConfig, Record, parse_selector};
use crate::utils::{inner_text, normalize_whitespace, resolve_url};

/// One way of locating and reading feed entries.
pub trait EntryStrategy: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Entry elements below `root`, in rendered (top-to-bottom) order.
    fn locate<'a>(&self, root: ElementRef<'a>) -> Vec<ElementRef<'a>>;

    /// Stable id of an entry, if it carries one.
    fn entry_id(&self, entry: ElementRef<'_>) -> Option<String>;

    /// Build the record for an entry whose id is already known.
    fn read(&self, id: &str, entry: ElementRef<'_>) -> Result<Record>;
}

/// Strategy driven by configured CSS selectors.
pub struct SelectorStrategy {
    name: String,
    entry: Selector,
    sender: Vec<Selector>,
    timestamp: Vec<Selector>,
    timestamp_attr: String,
    text: Vec<Selector>,
    media: Selector,
    forwarded_from: Vec<Selector>,
    reply_to: Vec<Selector>,
    id_attributes: Vec<String>,
    exclude_media_prefixes: Vec<String>,
    base_url: Option<Url>,
}

impl SelectorStrategy {
    /// Parse all selectors of `selectors` once, up front.
    pub fn compile(selectors: &EntrySelectors, extraction: &ExtractionConfig) -> Result<Self> {
        let base_url = extraction
            .base_url
            .as_deref()
            .map(Url::parse)
            .transpose()?;

        Ok(Self {
            name: selectors.name.clone(),
            entry: parse_selector(&selectors.entry)?,
            sender: parse_all(&selectors.sender)?,
            timestamp: parse_all(&selectors.timestamp)?,
            timestamp_attr: selectors.timestamp_attr.clone(),
            text: parse_all(&selectors.text)?,
            media: parse_selector(&selectors.media)?,
            forwarded_from: parse_all(&selectors.forwarded_from)?,
            reply_to: parse_all(&selectors.reply_to)?,
            id_attributes: extraction.id_attributes.clone(),
            exclude_media_prefixes: extraction.exclude_media_prefixes.clone(),
            base_url,
        })
    }

    fn timestamp(&self, entry: ElementRef<'_>) -> String {
        self.timestamp
            .iter()
            .filter_map(|sel| entry.select(sel).next())
            .find_map(|el| {
                let machine = el
                    .value()
                    .attr(&self.timestamp_attr)
                    .map(str::trim)
                    .filter(|v| !v.is_empty());
                match machine {
                    Some(value) => Some(value.to_string()),
                    None => Some(normalize_whitespace(&inner_text(el))).filter(|v| !v.is_empty()),
                }
            })
            .unwrap_or_default()
    }

    /// Media locators of an entry. A locator that cannot be resolved against
    /// the base is logged and left out.
    fn media(&self, id: &str, entry: ElementRef<'_>) -> Vec<String> {
        let mut media = Vec::new();
        for el in entry.select(&self.media) {
            let Some(src) = el
                .value()
                .attr("src")
                .or_else(|| el.value().attr("href"))
                .map(str::trim)
                .filter(|s| !s.is_empty())
            else {
                continue;
            };

            if self
                .exclude_media_prefixes
                .iter()
                .any(|prefix| src.starts_with(prefix.as_str()))
            {
                continue;
            }

            match &self.base_url {
                Some(base) => match resolve_url(base, src) {
                    Ok(url) => media.push(url),
                    Err(e) => log::warn!("Entry {}: skipping media '{}': {}", id, src, e),
                },
                None => media.push(src.to_string()),
            }
        }
        media
    }
}

impl EntryStrategy for SelectorStrategy {
    fn name(&self) -> &str {
        &self.name
    }

    fn locate<'a>(&self, root: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        root.select(&self.entry).collect()
    }

    fn entry_id(&self, entry: ElementRef<'_>) -> Option<String> {
        self.id_attributes.iter().find_map(|attr| {
            entry
                .value()
                .attr(attr)
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
        })
    }

    fn read(&self, id: &str, entry: ElementRef<'_>) -> Result<Record> {
        Ok(Record {
            id: id.to_string(),
            sender: first_label(entry, &self.sender),
            timestamp: self.timestamp(entry),
            text: first_text(entry, &self.text),
            media: self.media(id, entry),
            forwarded_from: first_label(entry, &self.forwarded_from),
            reply_to: first_label(entry, &self.reply_to),
        })
    }
}

fn parse_all(selectors: &[String]) -> Result<Vec<Selector>> {
    selectors.iter().map(|s| parse_selector(s)).collect()
}

/// Text of the first match with any content, across selectors in order.
fn first_text(entry: ElementRef<'_>, selectors: &[Selector]) -> String {
    selectors
        .iter()
        .filter_map(|sel| entry.select(sel).next())
        .map(inner_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Like [`first_text`], collapsed onto a single line.
fn first_label(entry: ElementRef<'_>, selectors: &[Selector]) -> String {
    normalize_whitespace(&first_text(entry, selectors))
}
