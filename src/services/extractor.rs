// src/services/extractor.rs

//! Record extractor service.
//!
//! Reads the entries currently rendered in the feed container and turns the
//! ones not yet in the ledger into records, newest first.

use scraper::Html;

use crate::error::{AppError, Result};
use crate::models::{ExtractionConfig, Record};
use crate::services::ledger::DedupLedger;
use crate::services::strategy::{EntryStrategy, SelectorStrategy};

/// Outcome of one extraction pass.
#[derive(Debug, Default)]
pub struct Extraction {
    /// New records, newest to oldest
    pub records: Vec<Record>,
    /// Entries that were dropped because building their record failed
    pub failures: Vec<AppError>,
    /// Strategy that located the entries, if any did
    pub strategy: Option<String>,
}

/// Service that extracts new records from rendered container markup.
pub struct Extractor {
    strategies: Vec<Box<dyn EntryStrategy>>,
}

impl Extractor {
    /// Build an extractor from configured selector strategies.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let strategies = config
            .strategies
            .iter()
            .map(|selectors| {
                SelectorStrategy::compile(selectors, config)
                    .map(|s| Box::new(s) as Box<dyn EntryStrategy>)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::with_strategies(strategies))
    }

    /// Build an extractor from an explicit, ordered strategy list.
    pub fn with_strategies(strategies: Vec<Box<dyn EntryStrategy>>) -> Self {
        Self { strategies }
    }

    /// Extract entries from `markup` whose ids are not yet in `ledger`.
    ///
    /// Entries are visited bottom-to-top, so the returned records run from
    /// newest to oldest. Every visited id is added to the ledger, including
    /// ids of entries whose record could not be built.
    pub fn extract(&self, markup: &str, ledger: &mut DedupLedger) -> Extraction {
        let document = Html::parse_fragment(markup);
        let root = document.root_element();

        let located = self.strategies.iter().find_map(|strategy| {
            let entries = strategy.locate(root);
            (!entries.is_empty()).then_some((strategy, entries))
        });

        let Some((strategy, entries)) = located else {
            log::debug!("No entries located by any of {} strategies", self.strategies.len());
            return Extraction::default();
        };

        log::debug!(
            "Strategy '{}' located {} entries",
            strategy.name(),
            entries.len()
        );

        let mut extraction = Extraction {
            strategy: Some(strategy.name().to_string()),
            ..Extraction::default()
        };

        for entry in entries.into_iter().rev() {
            let Some(id) = strategy.entry_id(entry) else {
                continue;
            };
            if !ledger.insert(id.as_str()) {
                continue;
            }

            match strategy.read(&id, entry) {
                Ok(record) => extraction.records.push(record),
                Err(error) => {
                    log::warn!("Dropping entry {}: {}", id, error);
                    extraction.failures.push(error);
                }
            }
        }

        extraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::ElementRef;

    fn message(id: &str, text: &str) -> String {
        format!(
            r#"<div data-testid="message" data-id="{id}"><div data-testid="message-text">{text}</div></div>"#
        )
    }

    fn ids(records: &[Record]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    fn extractor() -> Extractor {
        Extractor::from_config(&ExtractionConfig::default()).unwrap()
    }

    #[test]
    fn test_extracts_bottom_to_top() {
        let markup = [message("1", "oldest"), message("2", "middle"), message("3", "newest")].concat();
        let mut ledger = DedupLedger::new();

        let extraction = extractor().extract(&markup, &mut ledger);
        assert_eq!(ids(&extraction.records), vec!["3", "2", "1"]);
        assert_eq!(extraction.strategy.as_deref(), Some("message"));
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_second_pass_is_idempotent() {
        let markup = [message("1", "a"), message("2", "b")].concat();
        let extractor = extractor();
        let mut ledger = DedupLedger::new();

        assert_eq!(extractor.extract(&markup, &mut ledger).records.len(), 2);
        let again = extractor.extract(&markup, &mut ledger);
        assert!(again.records.is_empty());
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_skips_entries_without_id() {
        let markup = format!(
            r#"{}<div data-testid="message"><div data-testid="message-text">anon</div></div>"#,
            message("5", "x")
        );
        let mut ledger = DedupLedger::new();
        let extraction = extractor().extract(&markup, &mut ledger);
        assert_eq!(ids(&extraction.records), vec!["5"]);
    }

    #[test]
    fn test_falls_back_to_article_entries() {
        let markup = r#"<article data-id="a1"><p class="text">first</p></article>
                        <article data-id="a2"><p class="text">second</p></article>"#;
        let mut ledger = DedupLedger::new();
        let extraction = extractor().extract(markup, &mut ledger);
        assert_eq!(ids(&extraction.records), vec!["a2", "a1"]);
        assert_eq!(extraction.strategy.as_deref(), Some("article"));
        assert_eq!(extraction.records[0].text, "second");
    }

    #[test]
    fn test_empty_container_yields_nothing() {
        let mut ledger = DedupLedger::new();
        let extraction = extractor().extract("<div>loading</div>", &mut ledger);
        assert!(extraction.records.is_empty());
        assert!(extraction.strategy.is_none());
    }

    #[test]
    fn test_unresolvable_media_keeps_entry() {
        let config = ExtractionConfig {
            base_url: Some("https://web.example.com/".to_string()),
            ..ExtractionConfig::default()
        };
        let markup = format!(
            r#"{}<div data-testid="message" data-id="42">
                 <span data-testid="message-author">Bob</span>
                 <div data-testid="message-text">important text</div>
                 <a href="http://[::1">x</a>
               </div>{}"#,
            message("1", "ok"),
            message("3", "ok")
        );
        let mut ledger = DedupLedger::new();

        let extraction = Extractor::from_config(&config).unwrap().extract(&markup, &mut ledger);
        assert_eq!(ids(&extraction.records), vec!["3", "42", "1"]);
        assert!(extraction.failures.is_empty());

        let kept = &extraction.records[1];
        assert_eq!(kept.sender, "Bob");
        assert_eq!(kept.text, "important text");
        assert!(kept.media.is_empty());
    }

    /// Strategy whose field resolution fails for one chosen id.
    struct Flaky {
        inner: SelectorStrategy,
        poisoned: &'static str,
    }

    impl EntryStrategy for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn locate<'a>(&self, root: ElementRef<'a>) -> Vec<ElementRef<'a>> {
            self.inner.locate(root)
        }

        fn entry_id(&self, entry: ElementRef<'_>) -> Option<String> {
            self.inner.entry_id(entry)
        }

        fn read(&self, id: &str, entry: ElementRef<'_>) -> Result<Record> {
            if id == self.poisoned {
                return Err(AppError::extraction(id, "sub-element exploded"));
            }
            self.inner.read(id, entry)
        }
    }

    #[test]
    fn test_custom_strategy_failure_isolated() {
        let inner = SelectorStrategy::compile(
            &crate::models::EntrySelectors::default(),
            &ExtractionConfig::default(),
        )
        .unwrap();
        let extractor = Extractor::with_strategies(vec![Box::new(Flaky {
            inner,
            poisoned: "2",
        })]);
        let markup = [message("1", "a"), message("2", "b"), message("3", "c")].concat();
        let mut ledger = DedupLedger::new();

        let extraction = extractor.extract(&markup, &mut ledger);
        assert_eq!(ids(&extraction.records), vec!["3", "1"]);
        assert!(matches!(
            extraction.failures.as_slice(),
            [AppError::Extraction { entry, .. }] if entry == "2"
        ));
    }
}
