//! Poll cycle algorithm and deduplication state.
//!
//! [`PollEngine`] owns the source registry and the dedup state shared between
//! the poll worker and control callers. A cycle works on local copies and
//! publishes its result under a single write lock, so readers only ever see
//! a complete cycle.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::SystemTime;

use thiserror::Error;
use url::Url;

use super::CycleError;
use crate::fetch::{FetchError, PageFetcher};
use crate::source::{
    ParseError, ParserTable, Posting, RegistryError, SiteKind, SiteResolution, Source,
    SourceRegistry, SourceTable, resolve_site,
};
use crate::time::Clock;

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;

/// Summary of the most recent poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle committed its results.
    Completed {
        /// Number of postings reported as new.
        new: usize,
        /// Number of sources skipped (no parser, bad status, parse failure).
        skipped: usize,
    },

    /// Sources are registered but none of them matched a parser, so the
    /// cycle polled nothing.
    Degraded {
        /// Number of sources without a parser.
        unresolved: usize,
    },

    /// A transport failure aborted the cycle; dedup state was not touched.
    Aborted,
}

impl CycleOutcome {
    /// Returns true for [`CycleOutcome::Degraded`].
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded { .. })
    }
}

/// Why a single source produced no postings this cycle.
#[derive(Debug, Error)]
enum SourceFailure {
    #[error("no parser matches the source URL")]
    Unresolved,

    #[error(transparent)]
    Fetch(FetchError),

    #[error("server returned status {0}")]
    Status(http::StatusCode),

    #[error(transparent)]
    Parse(ParseError),
}

#[derive(Debug)]
struct PollState {
    last_results: Vec<Posting>,
    /// Ids observed on the previous committed cycle only.
    seen_ids: HashSet<String>,
    last_poll_at: Option<SystemTime>,
    first_poll: bool,
    last_outcome: Option<CycleOutcome>,
    /// Incremented on every start; cycles from an older run are discarded.
    run: u64,
    /// Seeds finished since the last commit.
    pending_seeds: Vec<PendingSeed>,
    /// Number of seeds finished so far; orders seeds against cycle starts.
    seeds_taken: u64,
    /// Sources whose seed fetch is still in flight.
    seeding: HashSet<String>,
}

#[derive(Debug)]
struct PendingSeed {
    name: String,
    /// Value of `seeds_taken` once this seed finished.
    seq: u64,
    ids: Vec<String>,
}

/// What a running cycle knows about the seed of one source.
enum SeedBaseline {
    None,
    /// The seed is still fetching; everything this cycle sees is baseline.
    InFlight,
    /// The seed finished after the cycle took its copy of `seen_ids`.
    Done(HashSet<String>),
}

impl SeedBaseline {
    fn is_new(&self, id: &str, previous: &HashSet<String>) -> bool {
        match self {
            Self::None => !previous.contains(id),
            Self::InFlight => false,
            Self::Done(seeded) => !previous.contains(id) && !seeded.contains(id),
        }
    }
}

impl Default for PollState {
    fn default() -> Self {
        Self {
            last_results: Vec::new(),
            seen_ids: HashSet::new(),
            last_poll_at: None,
            first_poll: true,
            last_outcome: None,
            run: 0,
            pending_seeds: Vec::new(),
            seeds_taken: 0,
            seeding: HashSet::new(),
        }
    }
}

/// Per-cycle accumulator.
#[derive(Default)]
struct CycleTally {
    ids: HashSet<String>,
    fresh: Vec<Posting>,
    skipped: usize,
    unresolved: usize,
}

impl CycleTally {
    fn record(&mut self, source: &Source, postings: Vec<Posting>, is_new: impl Fn(&str) -> bool) {
        let before = self.fresh.len();
        for posting in postings {
            self.ids.insert(posting.id.clone());
            if is_new(&posting.id) {
                self.fresh.push(posting);
            }
        }
        tracing::debug!(
            "Number of new postings for {}: {}",
            source.name,
            self.fresh.len() - before
        );
    }

    fn skip(&mut self, source: &Source, failure: &SourceFailure) {
        self.skipped += 1;
        if matches!(failure, SourceFailure::Unresolved) {
            self.unresolved += 1;
        } else {
            tracing::warn!("Skipping '{}' this cycle: {failure}", source.name);
        }
    }

    fn outcome(&self, source_count: usize) -> CycleOutcome {
        if source_count > 0 && self.unresolved == source_count {
            CycleOutcome::Degraded {
                unresolved: self.unresolved,
            }
        } else {
            CycleOutcome::Completed {
                new: self.fresh.len(),
                skipped: self.skipped,
            }
        }
    }
}

/// The poll engine: registry, parsers and dedup state.
pub(crate) struct PollEngine<F, C> {
    fetcher: F,
    clock: C,
    parsers: ParserTable,
    registry: RwLock<SourceRegistry>,
    state: RwLock<PollState>,
    /// Sources whose URL matched no parser; skipped until removed.
    disabled: Mutex<HashSet<String>>,
}

impl<F, C> PollEngine<F, C>
where
    F: PageFetcher,
    C: Clock,
{
    pub(crate) fn new(
        fetcher: F,
        clock: C,
        parsers: ParserTable,
        registry: SourceRegistry,
    ) -> Self {
        Self {
            fetcher,
            clock,
            parsers,
            registry: RwLock::new(registry),
            state: RwLock::new(PollState::default()),
            disabled: Mutex::new(HashSet::new()),
        }
    }

    pub(crate) fn now(&self) -> SystemTime {
        self.clock.now()
    }

    /// Marks the start of a new run: the next committed cycle is a first poll.
    pub(crate) fn begin_run(&self) {
        let mut state = write(&self.state);
        state.run += 1;
        state.first_poll = true;
        state.pending_seeds.clear();
    }

    /// Runs one cycle over every registered source and returns the new postings.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::Transport`] if any fetch fails at the transport
    /// level. Sources polled before the failure are discarded and the dedup
    /// state is left as it was.
    pub(crate) async fn run_cycle(&self) -> Result<Vec<Posting>, CycleError> {
        let started_at = self.clock.now();
        let sources = read(&self.registry).sources();
        let (run, first_poll, previous, seeds_before) = {
            let state = read(&self.state);
            (
                state.run,
                state.first_poll,
                state.seen_ids.clone(),
                state.seeds_taken,
            )
        };

        let mut tally = CycleTally::default();
        for source in &sources {
            match self.fetch_postings(source).await {
                Ok(postings) => {
                    let baseline = self.seed_baseline(&source.name, seeds_before);
                    tally.record(source, postings, |id| {
                        !first_poll && baseline.is_new(id, &previous)
                    });
                }
                Err(SourceFailure::Fetch(e)) if e.is_transport() => {
                    tracing::error!("Request for '{}' failed, aborting cycle: {e}", source.name);
                    let mut state = write(&self.state);
                    if state.run == run {
                        state.last_outcome = Some(CycleOutcome::Aborted);
                    }
                    return Err(CycleError::Transport {
                        source_name: source.name.clone(),
                        source: e,
                    });
                }
                Err(failure) => tally.skip(source, &failure),
            }
        }

        Ok(self.commit(run, seeds_before, started_at, &sources, tally))
    }

    fn seed_baseline(&self, name: &str, seeds_before: u64) -> SeedBaseline {
        let state = read(&self.state);
        if state.seeding.contains(name) {
            return SeedBaseline::InFlight;
        }
        let seeded: HashSet<String> = state
            .pending_seeds
            .iter()
            .filter(|seed| seed.name == name && seed.seq > seeds_before)
            .flat_map(|seed| seed.ids.iter().cloned())
            .collect();
        if seeded.is_empty() {
            SeedBaseline::None
        } else {
            SeedBaseline::Done(seeded)
        }
    }

    fn commit(
        &self,
        run: u64,
        seeds_before: u64,
        started_at: SystemTime,
        sources: &[Source],
        tally: CycleTally,
    ) -> Vec<Posting> {
        let outcome = tally.outcome(sources.len());
        let CycleTally {
            ids: mut seen, fresh, ..
        } = tally;

        let mut state = write(&self.state);
        if state.run != run {
            tracing::debug!("Discarding cycle results from a stopped run");
            return Vec::new();
        }

        // A seed taken before the cycle started is superseded by the cycle's
        // own fetch of that source; any other seed would otherwise be lost.
        for seed in std::mem::take(&mut state.pending_seeds) {
            if seed.seq > seeds_before || !sources.iter().any(|s| s.name == seed.name) {
                seen.extend(seed.ids);
            }
        }

        state.seen_ids = seen;
        state.last_results = fresh;
        state.last_poll_at = Some(started_at);
        state.first_poll = false;
        state.last_outcome = Some(outcome);

        match outcome {
            CycleOutcome::Degraded { unresolved } => tracing::warn!(
                "None of the {unresolved} registered source(s) matched a parser; nothing was polled"
            ),
            CycleOutcome::Completed { new, skipped } => {
                tracing::debug!("Checked postings: {new} new, {skipped} source(s) skipped");
            }
            CycleOutcome::Aborted => {}
        }

        state.last_results.clone()
    }

    /// Registers a source and fetches it once so its live postings become
    /// part of the baseline. A failed seed is logged and leaves the baseline
    /// empty.
    ///
    /// The source is marked as seeding before it becomes visible to a cycle,
    /// so a cycle that polls it before the seed lands reports nothing for it.
    pub(crate) async fn add_seeded_source(
        &self,
        name: String,
        url: String,
    ) -> Result<Source, RegistryError> {
        let source = Source::new(name, url);
        {
            let mut registry = write(&self.registry);
            if !registry.contains(&source.name) {
                write(&self.state).seeding.insert(source.name.clone());
            }
            registry.add(source.name.clone(), source.url.clone())?;
        }
        self.seed(&source).await;
        Ok(source)
    }

    async fn seed(&self, source: &Source) {
        let run = read(&self.state).run;
        let result = self.fetch_postings(source).await;

        let mut state = write(&self.state);
        state.seeding.remove(&source.name);
        match result {
            Ok(_) if state.run != run => {}
            Ok(postings) => {
                let ids: Vec<String> = postings.into_iter().map(|p| p.id).collect();
                tracing::debug!("Seeded {} id(s) for '{}'", ids.len(), source.name);
                state.seen_ids.extend(ids.iter().cloned());
                state.seeds_taken += 1;
                let seq = state.seeds_taken;
                state.pending_seeds.push(PendingSeed {
                    name: source.name.clone(),
                    seq,
                    ids,
                });
            }
            Err(failure) => tracing::warn!(
                "Could not seed '{}', starting with an empty baseline: {failure}",
                source.name
            ),
        }
    }

    async fn fetch_postings(&self, source: &Source) -> Result<Vec<Posting>, SourceFailure> {
        if lock(&self.disabled).contains(&source.name) {
            return Err(SourceFailure::Unresolved);
        }
        let Some((url, site)) = self.resolve(source) else {
            lock(&self.disabled).insert(source.name.clone());
            return Err(SourceFailure::Unresolved);
        };

        let page = self.fetcher.fetch(&url).await.map_err(SourceFailure::Fetch)?;
        if !page.is_success() {
            return Err(SourceFailure::Status(page.status));
        }

        self.parsers
            .parse(site, &page.text(), Some(&url))
            .map_err(SourceFailure::Parse)
    }

    fn resolve(&self, source: &Source) -> Option<(Url, SiteKind)> {
        let url = match Url::parse(&source.url) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(
                    "Cannot parse URL '{}' of '{}' ({e}); skipping it until it is re-added",
                    source.url,
                    source.name
                );
                return None;
            }
        };

        let resolution = resolve_site(&url, self.parsers.kinds());
        match &resolution {
            SiteResolution::NoMatch => tracing::warn!(
                "Couldn't find a parser for {url}; skipping '{}' until it is re-added",
                source.name
            ),
            SiteResolution::Ambiguous { chosen, candidates } => tracing::error!(
                "Multiple parsers {candidates:?} match {url}, using '{chosen}' for '{}'",
                source.name
            ),
            SiteResolution::Unique(_) => {}
        }
        resolution.kind().map(|site| (url, site))
    }

    pub(crate) fn add_source(&self, name: String, url: String) -> Result<Source, RegistryError> {
        let source = Source::new(name, url);
        write(&self.registry).add(source.name.clone(), source.url.clone())?;
        Ok(source)
    }

    pub(crate) fn remove_source(&self, name: &str) -> Result<Source, RegistryError> {
        let removed = write(&self.registry).remove(name)?;
        lock(&self.disabled).remove(name);
        Ok(removed)
    }

    pub(crate) fn list_sources(&self) -> SourceTable {
        read(&self.registry).list()
    }

    pub(crate) fn last_results(&self) -> Vec<Posting> {
        read(&self.state).last_results.clone()
    }

    pub(crate) fn last_poll_at(&self) -> Option<SystemTime> {
        read(&self.state).last_poll_at
    }

    pub(crate) fn last_outcome(&self) -> Option<CycleOutcome> {
        read(&self.state).last_outcome
    }

    #[cfg(test)]
    pub(crate) fn seen_ids(&self) -> HashSet<String> {
        read(&self.state).seen_ids.clone()
    }

    #[cfg(test)]
    pub(crate) fn is_disabled(&self, name: &str) -> bool {
        lock(&self.disabled).contains(name)
    }
}

fn read<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
