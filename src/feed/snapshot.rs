//! Replay container over saved page captures.
//!
//! Each capture is the host page saved after one more load of older history.
//! Captures are replayed in file-name order: the first one is what the user
//! saw when scraping started, and every scroll to the top reveals the next.
//!
//! ```text
//! captures/
//! ├── 000.html   # initial view (newest entries)
//! ├── 001.html   # after the first load of older entries
//! └── 002.html
//! ```

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use scraper::Html;

use crate::error::{AppError, Result};
use crate::feed::FeedContainer;
use crate::models::parse_selector;

#[derive(Debug, Default)]
struct Cursor {
    /// Index of the capture currently on screen
    current: usize,
    /// Container markup revealed so far, in bytes
    extent: u64,
}

/// [`FeedContainer`] that replays a sequence of saved captures.
#[derive(Debug)]
pub struct SnapshotFeed {
    container_selector: String,
    captures: Vec<String>,
    cursor: Mutex<Cursor>,
}

impl SnapshotFeed {
    /// Create a feed from in-memory captures, oldest load state first.
    pub fn from_captures(container_selector: &str, captures: Vec<String>) -> Result<Self> {
        parse_selector(container_selector)?;

        let feed = Self {
            container_selector: container_selector.to_string(),
            captures,
            cursor: Mutex::new(Cursor::default()),
        };
        let initial = feed.container_markup(0).map_or(0, |m| m.len() as u64);
        feed.cursor().extent = initial;
        Ok(feed)
    }

    /// Load every `.html`/`.htm` file in `dir`, sorted by file name.
    pub async fn load(dir: impl AsRef<Path>, container_selector: &str) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_capture = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"));
            if is_capture {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            log::warn!("No captures found in {}", dir.display());
        }

        let mut captures = Vec::with_capacity(paths.len());
        for path in &paths {
            log::debug!("Loading capture {}", path.display());
            captures.push(tokio::fs::read_to_string(path).await?);
        }

        log::info!("Loaded {} captures from {}", captures.len(), dir.display());
        Self::from_captures(container_selector, captures)
    }

    /// Number of captures available for replay.
    pub fn capture_count(&self) -> usize {
        self.captures.len()
    }

    fn cursor(&self) -> MutexGuard<'_, Cursor> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Inner markup of the container element in capture `index`.
    fn container_markup(&self, index: usize) -> Option<String> {
        let capture = self.captures.get(index)?;
        let selector = parse_selector(&self.container_selector).ok()?;
        let document = Html::parse_document(capture);
        document.select(&selector).next().map(|el| el.inner_html())
    }

    fn current_markup(&self) -> Result<String> {
        let current = self.cursor().current;
        self.container_markup(current).ok_or_else(|| {
            AppError::ContainerMissing(format!(
                "'{}' not found in capture {}",
                self.container_selector, current
            ))
        })
    }
}

#[async_trait]
impl FeedContainer for SnapshotFeed {
    async fn is_present(&self) -> bool {
        self.current_markup().is_ok()
    }

    async fn render(&self) -> Result<String> {
        self.current_markup()
    }

    async fn scroll_to_top(&self) -> Result<()> {
        self.current_markup()?;

        let next = self.cursor().current + 1;
        if next >= self.captures.len() {
            return Ok(());
        }

        let revealed = self.container_markup(next).map_or(0, |m| m.len() as u64);
        let mut cursor = self.cursor();
        cursor.current = next;
        cursor.extent += revealed;
        Ok(())
    }

    async fn scroll_height(&self) -> Result<u64> {
        self.current_markup()?;
        Ok(self.cursor().extent)
    }
}
