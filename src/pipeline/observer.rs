//! Presentation-side signals emitted by the scrape loop.

use crate::models::Messages;
use crate::utils::log;

/// Receives progress signals from the scrape controller.
pub trait ScrapeObserver: Send + Sync {
    /// Records collected so far, published after every extraction pass.
    fn progress(&self, count: usize);

    /// The feed was exhausted and the session ended on its own.
    fn finished(&self, count: usize);

    /// Something went wrong that the user should hear about.
    fn error_notice(&self, message: &str);
}

/// Observer printing a progress readout to the terminal.
pub struct ConsoleObserver {
    messages: Messages,
}

impl ConsoleObserver {
    pub fn new(messages: Messages) -> Self {
        Self { messages }
    }
}

impl ScrapeObserver for ConsoleObserver {
    fn progress(&self, count: usize) {
        log::progress(&self.messages.progress(count));
    }

    fn finished(&self, count: usize) {
        log::success(&self.messages.finished(count));
    }

    fn error_notice(&self, message: &str) {
        log::error(&format!("Error: {}", message));
    }
}
