//! Feed container abstractions.
//!
//! The feed container is owned and mutated by the host UI. The harvester
//! only asks it whether it exists, what it currently renders, and to scroll
//! towards older history.

pub mod snapshot;

use async_trait::async_trait;

use crate::error::Result;

pub use snapshot::SnapshotFeed;

/// The externally-rendered, virtualized scroll region holding the feed.
#[async_trait]
pub trait FeedContainer: Send + Sync {
    /// Whether the container can currently be resolved.
    async fn is_present(&self) -> bool;

    /// Markup of the entries currently rendered inside the container.
    async fn render(&self) -> Result<String>;

    /// Move the scroll position to the top, asking the host for older entries.
    async fn scroll_to_top(&self) -> Result<()>;

    /// Total scrollable extent of the container.
    async fn scroll_height(&self) -> Result<u64>;
}
