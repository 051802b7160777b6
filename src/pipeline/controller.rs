// src/pipeline/controller.rs

//! Scrape controller.
//!
//! A two-state machine (`Idle`, `Running`) driving the scrape loop:
//! advance, extract, publish progress, then either wait and repeat or stop
//! once the feed stops growing. At most one loop task exists at a time, and
//! the collected session survives a stop so it can still be exported.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};
use crate::feed::FeedContainer;
use crate::models::{Config, Messages, Record};
use crate::pipeline::export;
use crate::pipeline::observer::ScrapeObserver;
use crate::services::{DedupLedger, Extractor, FeedAdvancer};

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeState {
    Idle,
    Running,
}

/// Records and ledger of one scrape session.
#[derive(Debug, Default)]
pub struct Session {
    records: Vec<Record>,
    ledger: DedupLedger,
}

impl Session {
    pub fn records(&self) -> &[Record] {
        &self.records
    }
}

/// Start/stop-able, single-flight scrape loop over one feed container.
pub struct ScrapeController {
    container: Arc<dyn FeedContainer>,
    extractor: Arc<Extractor>,
    advancer: FeedAdvancer,
    observer: Arc<dyn ScrapeObserver>,
    messages: Messages,
    delay: Mutex<Duration>,
    state: Arc<watch::Sender<ScrapeState>>,
    session: Arc<Mutex<Session>>,
    task: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl ScrapeController {
    /// Create an idle controller.
    pub fn new(
        container: Arc<dyn FeedContainer>,
        extractor: Extractor,
        observer: Arc<dyn ScrapeObserver>,
        config: &Config,
    ) -> Self {
        let (state, _) = watch::channel(ScrapeState::Idle);
        Self {
            container,
            extractor: Arc::new(extractor),
            advancer: FeedAdvancer::new(config.scraper.settle()),
            observer,
            messages: config.messages.clone(),
            delay: Mutex::new(config.scraper.delay()),
            state: Arc::new(state),
            session: Arc::new(Mutex::new(Session::default())),
            task: tokio::sync::Mutex::new(None),
        }
    }

    pub fn state(&self) -> ScrapeState {
        *self.state.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.state() == ScrapeState::Running
    }

    /// Watch state transitions.
    pub fn subscribe(&self) -> watch::Receiver<ScrapeState> {
        self.state.subscribe()
    }

    /// Set the wait between iterations. Takes effect at the next start.
    pub fn set_delay(&self, delay: Duration) {
        *lock(&self.delay) = delay;
    }

    pub fn delay(&self) -> Duration {
        *lock(&self.delay)
    }

    /// Begin a fresh session.
    ///
    /// Returns `Ok(false)` if a session is already running. Fails with
    /// [`AppError::ContainerMissing`] (after notifying the observer) when no
    /// feed container can be resolved.
    pub async fn start(&self) -> Result<bool> {
        let mut task = self.task.lock().await;
        if self.is_running() {
            log::debug!("Start ignored: already running");
            return Ok(false);
        }

        // A stopped loop may still be finishing its last cycle.
        if let Some(previous) = task.take() {
            self.report_join(previous.await);
        }

        if !self.container.is_present().await {
            log::warn!("Start refused: no feed container");
            self.observer.error_notice(&self.messages.not_in_feed);
            return Err(AppError::ContainerMissing(self.messages.not_in_feed.clone()));
        }

        *lock(&self.session) = Session::default();
        let delay = self.delay();
        self.state.send_replace(ScrapeState::Running);

        let scrape_loop = ScrapeLoop {
            container: Arc::clone(&self.container),
            extractor: Arc::clone(&self.extractor),
            advancer: self.advancer.clone(),
            observer: Arc::clone(&self.observer),
            state: Arc::clone(&self.state),
            session: Arc::clone(&self.session),
            delay,
        };
        *task = Some(tokio::spawn(scrape_loop.run()));

        log::info!("{} (delay {:?})", self.messages.scraping, delay);
        Ok(true)
    }

    /// Request the running session to stop. Returns `false` if already idle.
    ///
    /// A cycle already in flight finishes; no new cycle begins.
    pub fn stop(&self) -> bool {
        let stopped = self.state.send_if_modified(|state| {
            if *state == ScrapeState::Running {
                *state = ScrapeState::Idle;
                true
            } else {
                false
            }
        });
        if stopped {
            log::info!("Stop requested ({} records so far)", self.record_count());
        }
        stopped
    }

    /// Wait until the session is idle and its loop task has exited.
    pub async fn wait(&self) -> Result<()> {
        let mut rx = self.subscribe();
        wait_idle(&mut rx).await;

        // Keep the handle until it has been joined.
        let mut task = self.task.lock().await;
        let Some(handle) = task.as_mut() else {
            return Ok(());
        };
        let joined = handle.await;
        *task = None;
        joined.map_err(|e| AppError::Task(e.to_string()))
    }

    /// Snapshot of the collected records, newest first.
    pub fn records(&self) -> Vec<Record> {
        lock(&self.session).records.clone()
    }

    pub fn record_count(&self) -> usize {
        lock(&self.session).records.len()
    }

    /// Records as an indented JSON array.
    pub fn export_json(&self) -> Result<Vec<u8>> {
        export::to_json(lock(&self.session).records())
    }

    /// Records as delimited text.
    pub fn export_delimited(&self) -> Vec<u8> {
        export::to_delimited(lock(&self.session).records())
    }

    fn report_join(&self, joined: std::result::Result<(), tokio::task::JoinError>) {
        if let Err(e) = joined {
            let error = AppError::Task(e.to_string());
            log::error!("{}", error);
            self.observer.error_notice(&error.to_string());
        }
    }
}

/// State moved into the spawned loop task.
struct ScrapeLoop {
    container: Arc<dyn FeedContainer>,
    extractor: Arc<Extractor>,
    advancer: FeedAdvancer,
    observer: Arc<dyn ScrapeObserver>,
    state: Arc<watch::Sender<ScrapeState>>,
    session: Arc<Mutex<Session>>,
    delay: Duration,
}

impl ScrapeLoop {
    async fn run(self) {
        let _idle = IdleOnExit(Arc::clone(&self.state));
        let mut rx = self.state.subscribe();

        loop {
            if *rx.borrow_and_update() != ScrapeState::Running {
                log::info!("Scrape stopped");
                break;
            }

            let loaded = match self.advancer.try_advance(self.container.as_ref()).await {
                Ok(loaded) => loaded,
                Err(e) => {
                    log::warn!("Advance failed, ending session: {}", e);
                    self.observer.error_notice(&e.to_string());
                    false
                }
            };

            // Always drain, even at the boundary.
            let count = self.extract_pass().await;
            self.observer.progress(count);

            if !loaded {
                self.state.send_replace(ScrapeState::Idle);
                log::info!("Feed exhausted, collected {} records", count);
                self.observer.finished(count);
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.delay) => {}
                _ = wait_idle(&mut rx) => {}
            }
        }
    }

    /// Extract the current render into the session. Returns the session size.
    async fn extract_pass(&self) -> usize {
        let markup = match self.container.render().await {
            Ok(markup) => Some(markup),
            Err(e) => {
                log::warn!("Could not read feed container: {}", e);
                self.observer.error_notice(&e.to_string());
                None
            }
        };

        let (count, failures) = {
            let mut session = lock(&self.session);
            let failures = match markup {
                Some(markup) => {
                    let Session { records, ledger } = &mut *session;
                    let extraction = self.extractor.extract(&markup, ledger);
                    log::debug!("Pass captured {} new records", extraction.records.len());
                    records.extend(extraction.records);
                    extraction.failures
                }
                None => Vec::new(),
            };
            (session.records.len(), failures)
        };

        for failure in failures {
            self.observer.error_notice(&failure.to_string());
        }
        count
    }
}

/// Forces the state back to `Idle` when the loop task ends, however it ends.
struct IdleOnExit(Arc<watch::Sender<ScrapeState>>);

impl Drop for IdleOnExit {
    fn drop(&mut self) {
        self.0.send_if_modified(|state| {
            let changed = *state != ScrapeState::Idle;
            *state = ScrapeState::Idle;
            changed
        });
    }
}

/// Resolve once the state is `Idle`.
async fn wait_idle(rx: &mut watch::Receiver<ScrapeState>) {
    while *rx.borrow_and_update() == ScrapeState::Running {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
