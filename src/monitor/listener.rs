//! Listener facade: lifecycle, background worker and control operations.
//!
//! A [`Listener`] owns one [`PollEngine`] and at most one background worker.
//! Every `start` opens a fresh stop channel, so a worker left over from a
//! previous run can never be revived by a later `start`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

use tokio::sync::watch;

use super::engine::{CycleOutcome, PollEngine};
use super::{CycleError, PollSchedule, PostingSink};
use crate::fetch::PageFetcher;
use crate::source::{ParserTable, Posting, RegistryError, Source, SourceRegistry, SourceTable};
use crate::time::{Clock, Sleeper, SystemClock, TokioSleeper};

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;

/// Builder for a [`Listener`].
///
/// # Example
///
/// ```ignore
/// use posting_listener::monitor::{Listener, PollSchedule};
/// use std::time::Duration;
///
/// let listener = Listener::builder(fetcher)
///     .sources(&table)
///     .schedule(PollSchedule::new(Duration::from_secs(300)))
///     .build();
/// ```
pub struct ListenerBuilder<F, C = SystemClock, S = TokioSleeper> {
    fetcher: F,
    clock: C,
    sleeper: S,
    schedule: PollSchedule,
    parsers: ParserTable,
    registry: SourceRegistry,
}

impl<F, C, S> ListenerBuilder<F, C, S>
where
    F: PageFetcher,
    C: Clock,
    S: Sleeper,
{
    /// Registers the initial sources.
    #[must_use]
    pub fn sources(mut self, table: &SourceTable) -> Self {
        self.registry = SourceRegistry::from_table(table);
        self
    }

    /// Replaces the parser table (defaults to [`ParserTable::default`]).
    #[must_use]
    pub fn parsers(mut self, parsers: ParserTable) -> Self {
        self.parsers = parsers;
        self
    }

    /// Replaces the poll schedule (defaults to [`PollSchedule::default`]).
    #[must_use]
    pub fn schedule(mut self, schedule: PollSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Uses a custom clock for timestamps.
    #[must_use]
    pub fn clock<C2: Clock>(self, clock: C2) -> ListenerBuilder<F, C2, S> {
        ListenerBuilder {
            fetcher: self.fetcher,
            clock,
            sleeper: self.sleeper,
            schedule: self.schedule,
            parsers: self.parsers,
            registry: self.registry,
        }
    }

    /// Uses a custom sleeper between cycles.
    #[must_use]
    pub fn sleeper<S2: Sleeper>(self, sleeper: S2) -> ListenerBuilder<F, C, S2> {
        ListenerBuilder {
            fetcher: self.fetcher,
            clock: self.clock,
            sleeper,
            schedule: self.schedule,
            parsers: self.parsers,
            registry: self.registry,
        }
    }

    /// Builds a stopped listener.
    #[must_use]
    pub fn build(self) -> Listener<F, C, S> {
        Listener {
            inner: Arc::new(Inner {
                engine: PollEngine::new(self.fetcher, self.clock, self.parsers, self.registry),
                sleeper: self.sleeper,
                schedule: self.schedule,
                lifecycle: Mutex::new(Lifecycle::default()),
            }),
        }
    }
}

/// Recurring-poll listener over a set of named sources.
///
/// Created stopped. [`start`](Self::start) spawns a tokio worker that polls
/// every source, records the postings not seen on the previous cycle and
/// sleeps a jittered delay before the next one. The first cycle of every run
/// only establishes the baseline and reports nothing.
///
/// Control operations may be called from any task while the worker runs.
/// Dropping the listener stops its worker.
///
/// # Type Parameters
///
/// * `F` - The [`PageFetcher`] used to download source pages
/// * `C` - The [`Clock`] for timestamps (defaults to [`SystemClock`])
/// * `S` - The [`Sleeper`] between cycles (defaults to [`TokioSleeper`])
pub struct Listener<F, C = SystemClock, S = TokioSleeper> {
    inner: Arc<Inner<F, C, S>>,
}

struct Inner<F, C, S> {
    engine: PollEngine<F, C>,
    sleeper: S,
    schedule: PollSchedule,
    lifecycle: Mutex<Lifecycle>,
}

#[derive(Default)]
struct Lifecycle {
    /// Present while running.
    stop_tx: Option<watch::Sender<bool>>,
    started_at: Option<SystemTime>,
}

impl<F: PageFetcher> Listener<F> {
    /// Creates a stopped listener over `sources` with default settings.
    #[must_use]
    pub fn new(fetcher: F, sources: &SourceTable) -> Self {
        Self::builder(fetcher).sources(sources).build()
    }

    /// Returns a builder with default clock, sleeper, schedule and parsers.
    #[must_use]
    pub fn builder(fetcher: F) -> ListenerBuilder<F> {
        ListenerBuilder {
            fetcher,
            clock: SystemClock,
            sleeper: TokioSleeper,
            schedule: PollSchedule::default(),
            parsers: ParserTable::default(),
            registry: SourceRegistry::new(),
        }
    }
}

impl<F, C, S> Listener<F, C, S> {
    /// Stops the worker. Returns false if the listener was not running.
    ///
    /// A worker in the middle of a cycle finishes that cycle and exits; a
    /// sleeping worker wakes up and exits immediately.
    pub fn stop(&self) -> bool {
        let mut lifecycle = self.lifecycle();
        let Some(stop_tx) = lifecycle.stop_tx.take() else {
            return false;
        };
        stop_tx.send_replace(true);
        lifecycle.started_at = None;
        tracing::info!("Listener stopped");
        true
    }

    /// Returns true while a worker is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lifecycle().stop_tx.is_some()
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.inner
            .lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<F, C, S> Listener<F, C, S>
where
    F: PageFetcher + 'static,
    C: Clock + 'static,
    S: Sleeper + 'static,
{
    /// Starts the background worker. Returns false if already running.
    ///
    /// Every start begins a new run whose first cycle only records the
    /// baseline. New postings from later cycles are appended to `sink`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, sink: Option<PostingSink>) -> bool {
        let mut lifecycle = self.lifecycle();
        if lifecycle.stop_tx.is_some() {
            tracing::debug!("Listener already running, ignoring start");
            return false;
        }

        let (stop_tx, stop_rx) = watch::channel(false);
        lifecycle.stop_tx = Some(stop_tx);
        lifecycle.started_at = Some(self.inner.engine.now());
        self.inner.engine.begin_run();
        drop(lifecycle);

        tracing::info!(
            "Listener started with {} source(s)",
            self.inner.engine.list_sources().len()
        );
        tokio::spawn(run_loop(Arc::clone(&self.inner), stop_rx, sink));
        true
    }

    /// Runs a single cycle on the caller's task and returns the new postings.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::Transport`] when a fetch fails at the transport
    /// level; the previous results and baseline are kept.
    pub async fn poll_once(&self) -> Result<Vec<Posting>, CycleError> {
        self.inner.engine.run_cycle().await
    }

    /// Registers a source.
    ///
    /// While running, the new source's current postings are fetched once and
    /// folded into the baseline so they are not reported as new. A failed
    /// seed is logged and the source is kept with an empty baseline.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::AlreadyExists`] if the name is taken; the
    /// registry is left unchanged.
    pub async fn add_source(
        &self,
        name: impl Into<String>,
        url: impl Into<String>,
    ) -> Result<(), RegistryError> {
        let (name, url) = (name.into(), url.into());
        let source = if self.is_running() {
            self.inner.engine.add_seeded_source(name, url).await?
        } else {
            self.inner.engine.add_source(name, url)?
        };
        tracing::info!("Added source '{}': {}", source.name, source.url);
        Ok(())
    }

    /// Deregisters a source and clears its disabled mark.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no source has that name.
    pub fn remove_source(&self, name: &str) -> Result<Source, RegistryError> {
        let source = self.inner.engine.remove_source(name)?;
        tracing::info!("Removed source '{}'", source.name);
        Ok(source)
    }

    /// Returns a snapshot of the registered sources.
    #[must_use]
    pub fn list_sources(&self) -> SourceTable {
        self.inner.engine.list_sources()
    }

    /// Returns the postings reported as new by the last committed cycle.
    #[must_use]
    pub fn last_results(&self) -> Vec<Posting> {
        self.inner.engine.last_results()
    }

    /// Returns when the last committed cycle started.
    #[must_use]
    pub fn last_poll_at(&self) -> Option<SystemTime> {
        self.inner.engine.last_poll_at()
    }

    /// Returns the outcome of the most recent cycle.
    #[must_use]
    pub fn last_outcome(&self) -> Option<CycleOutcome> {
        self.inner.engine.last_outcome()
    }

    /// Returns how long the current run has lasted, or `None` when stopped.
    #[must_use]
    pub fn uptime(&self) -> Option<Duration> {
        let started_at = self.lifecycle().started_at?;
        Some(
            self.inner
                .engine
                .now()
                .duration_since(started_at)
                .unwrap_or(Duration::ZERO),
        )
    }
}

impl<F, C, S> Drop for Listener<F, C, S> {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_loop<F, C, S>(
    inner: Arc<Inner<F, C, S>>,
    mut stop: watch::Receiver<bool>,
    sink: Option<PostingSink>,
) where
    F: PageFetcher,
    C: Clock,
    S: Sleeper,
{
    loop {
        if *stop.borrow() {
            break;
        }

        match inner.engine.run_cycle().await {
            Ok(postings) => {
                if let Some(sink) = &sink {
                    sink.append(&postings);
                }
            }
            Err(e) => tracing::warn!("{e}; retrying next cycle"),
        }

        if *stop.borrow() {
            break;
        }

        let delay = inner.schedule.next_delay();
        tracing::debug!("Next poll in {}s", delay.as_secs());
        tokio::select! {
            () = inner.sleeper.sleep(delay) => {}
            _ = stop.changed() => {}
        }
    }

    tracing::debug!("Poll worker exited");
}
