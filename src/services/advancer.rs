//! Feed advancer service.
//!
//! Asks the container for older history and reports whether any arrived.

use std::time::Duration;

use crate::error::{AppError, Result};
use crate::feed::FeedContainer;

/// Service that scrolls the container to its top and measures growth.
#[derive(Debug, Clone)]
pub struct FeedAdvancer {
    settle: Duration,
}

impl FeedAdvancer {
    /// Create an advancer that waits `settle` after each scroll request.
    pub fn new(settle: Duration) -> Self {
        Self { settle }
    }

    /// Request older content. `Ok(true)` iff the scrollable extent grew.
    pub async fn try_advance(&self, container: &dyn FeedContainer) -> Result<bool> {
        if !container.is_present().await {
            return Err(AppError::advance("feed container is no longer present"));
        }

        let before = container.scroll_height().await?;
        container.scroll_to_top().await?;
        tokio::time::sleep(self.settle).await;
        let after = container.scroll_height().await?;

        log::debug!("Scroll extent {} -> {}", before, after);
        Ok(after > before)
    }

    /// Like [`FeedAdvancer::try_advance`], with any failure logged and read as
    /// "no more content".
    pub async fn advance(&self, container: &dyn FeedContainer) -> bool {
        self.try_advance(container).await.unwrap_or_else(|e| {
            log::warn!("Advance failed, treating feed as exhausted: {}", e);
            false
        })
    }
}
