//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::EntrySelectors;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Loop timing settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Entry extraction rules
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Feed container lookup
    #[serde(default)]
    pub feed: FeedConfig,

    /// User-facing message templates
    #[serde(default)]
    pub messages: Messages,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.scraper.settle_ms == 0 {
            return Err(AppError::validation("scraper.settle_ms must be > 0"));
        }
        if self.extraction.strategies.is_empty() {
            return Err(AppError::validation("No extraction strategies defined"));
        }
        if self.extraction.id_attributes.is_empty() {
            return Err(AppError::validation(
                "extraction.id_attributes must not be empty",
            ));
        }
        if let Some(base) = &self.extraction.base_url {
            url::Url::parse(base)?;
        }
        for strategy in &self.extraction.strategies {
            if strategy.entry.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "strategy '{}' has an empty entry selector",
                    strategy.name
                )));
            }
            for selector in strategy.all_selectors() {
                parse_selector(selector)?;
            }
        }
        parse_selector(&self.feed.container_selector)?;
        Ok(())
    }
}

/// Parse a CSS selector, mapping failures into [`AppError::Selector`].
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Scrape loop timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Wait between loop iterations in milliseconds
    #[serde(default = "defaults::delay")]
    pub delay_ms: u64,

    /// Wait after scrolling before measuring again, in milliseconds
    #[serde(default = "defaults::settle")]
    pub settle_ms: u64,
}

impl ScraperConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            delay_ms: defaults::delay(),
            settle_ms: defaults::settle(),
        }
    }
}

/// Entry extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Attributes consulted for the entry id, in order
    #[serde(default = "defaults::id_attributes")]
    pub id_attributes: Vec<String>,

    /// Media locators starting with one of these are dropped
    #[serde(default = "defaults::exclude_media_prefixes")]
    pub exclude_media_prefixes: Vec<String>,

    /// Base for resolving relative media locators
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Entry strategies tried in order until one locates entries
    #[serde(default = "defaults::strategies")]
    pub strategies: Vec<EntrySelectors>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            id_attributes: defaults::id_attributes(),
            exclude_media_prefixes: defaults::exclude_media_prefixes(),
            base_url: None,
            strategies: defaults::strategies(),
        }
    }
}

/// Feed container lookup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Selector resolving the scrollable message list
    #[serde(default = "defaults::container_selector")]
    pub container_selector: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            container_selector: defaults::container_selector(),
        }
    }
}

/// Message strings shown to the user. `{count}` is replaced with the
/// number of collected records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Messages {
    #[serde(default = "defaults::msg_not_in_feed")]
    pub not_in_feed: String,
    #[serde(default = "defaults::msg_scraping")]
    pub scraping: String,
    #[serde(default = "defaults::msg_progress")]
    pub progress: String,
    #[serde(default = "defaults::msg_finished")]
    pub finished: String,
}

impl Messages {
    pub fn progress(&self, count: usize) -> String {
        self.progress.replace("{count}", &count.to_string())
    }

    pub fn finished(&self, count: usize) -> String {
        self.finished.replace("{count}", &count.to_string())
    }
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            not_in_feed: defaults::msg_not_in_feed(),
            scraping: defaults::msg_scraping(),
            progress: defaults::msg_progress(),
            finished: defaults::msg_finished(),
        }
    }
}

mod defaults {
    use crate::models::EntrySelectors;

    // Scraper defaults
    pub fn delay() -> u64 {
        1500
    }
    pub fn settle() -> u64 {
        100
    }

    // Extraction defaults
    pub fn id_attributes() -> Vec<String> {
        vec!["data-id".into(), "id".into(), "data-message-id".into()]
    }
    pub fn exclude_media_prefixes() -> Vec<String> {
        vec!["blob:".into()]
    }
    pub fn strategies() -> Vec<EntrySelectors> {
        vec![EntrySelectors::default(), EntrySelectors::fallback()]
    }

    // Feed defaults
    pub fn container_selector() -> String {
        r#"div[aria-label="Message list"]"#.into()
    }

    // Message defaults
    pub fn msg_not_in_feed() -> String {
        "Please open a Telegram channel, community or group before scraping.".into()
    }
    pub fn msg_scraping() -> String {
        "Scraping...".into()
    }
    pub fn msg_progress() -> String {
        "Scraped {count} messages".into()
    }
    pub fn msg_finished() -> String {
        "Finished. Collected {count} messages".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_settle() {
        let mut config = Config::default();
        config.scraper.settle_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_strategies() {
        let mut config = Config::default();
        config.extraction.strategies.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut config = Config::default();
        config.extraction.strategies[0].text = vec!["[[invalid".to_string()];
        assert!(matches!(
            config.validate(),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let mut config = Config::default();
        config.extraction.base_url = Some("not a url".to_string());
        assert!(matches!(config.validate(), Err(AppError::Url(_))));
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [scraper]
            delay_ms = 250
            "#,
        )
        .unwrap();
        assert_eq!(config.scraper.delay_ms, 250);
        assert_eq!(config.scraper.settle_ms, 100);
        assert_eq!(config.extraction.strategies.len(), 2);
        assert_eq!(config.extraction.id_attributes[0], "data-id");
    }

    #[test]
    fn load_or_default_falls_back() {
        let config = Config::load_or_default("/definitely/not/here.toml");
        assert_eq!(config.scraper.delay_ms, 1500);
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[feed]\ncontainer_selector = \"#feed\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.feed.container_selector, "#feed");
    }

    #[test]
    fn shipped_config_is_valid() {
        let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml")).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.extraction.strategies, ExtractionConfig::default().strategies);
    }

    #[test]
    fn messages_replace_count() {
        let messages = Messages::default();
        assert_eq!(messages.progress(3), "Scraped 3 messages");
        assert_eq!(messages.finished(7), "Finished. Collected 7 messages");
    }
}
