//! Collection loop: sample, fold into the aggregates, persist.
//!
//! A single control flow owns the [`AggregateStats`] for the lifetime of the
//! process and waits on one channel with a timeout, so a timer tick and a
//! shutdown request are handled in whichever order they arrive. Sampling and
//! save failures are logged and the loop keeps running; shutdown performs
//! exactly one final save.

use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local, TimeZone};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::collector::{CollectError, SampleSource};
use crate::stats::{AggregateStats, describe_sample, summarize};
use crate::storage::{StatsStore, StoreError};

/// Log a summary of the aggregates every this many ticks.
const SUMMARY_EVERY: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopping,
    Stopped,
}

/// Failure of one collect-and-store cycle. Never fatal to the loop.
#[derive(Debug, Error)]
pub enum TickError {
    #[error("collecting metrics: {0}")]
    Collect(#[from] CollectError),
    #[error("saving stats: {0}")]
    Save(#[from] StoreError),
}

pub struct Monitor<S: SampleSource> {
    source: S,
    store: StatsStore,
    stats: AggregateStats,
    interval: Duration,
    state: LoopState,
    ticks: u64,
    failures: u64,
}

impl<S: SampleSource> Monitor<S> {
    /// Takes ownership of `stats`; it is saved through `store` after each sample.
    pub fn new(source: S, store: StatsStore, stats: AggregateStats, interval: Duration) -> Self {
        Self {
            source,
            store,
            stats,
            interval,
            state: LoopState::Running,
            ticks: 0,
            failures: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    pub fn into_stats(self) -> AggregateStats {
        self.stats
    }

    /// Number of cycles attempted.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Number of cycles that failed to sample or save.
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Runs one collect, update and save cycle.
    ///
    /// A sampling failure leaves the aggregates untouched. A save failure
    /// keeps the in-memory update; the next successful save persists it.
    pub fn tick<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Result<(), TickError> {
        let sample = self.source.collect()?;
        self.stats.update(sample, now);
        info!(
            "Sample #{}: {}",
            self.stats.sample_count(),
            describe_sample(&sample, self.stats.config.initial_size)
        );
        self.store.save(&self.stats)?;
        Ok(())
    }

    /// Performs the final save and stops the loop.
    ///
    /// Only the first call saves; later calls return `Ok(())`.
    pub fn shutdown(&mut self) -> Result<(), StoreError> {
        if self.state != LoopState::Running {
            return Ok(());
        }

        self.state = LoopState::Stopping;
        info!("Saving stats before shutdown");
        let result = self.store.save(&self.stats);
        self.state = LoopState::Stopped;
        result
    }

    /// Ticks every `interval` until a message arrives on `shutdown` or its
    /// sender is dropped, then saves once more.
    pub fn run(&mut self, shutdown: &Receiver<()>) {
        info!(
            "Starting metrics collection every {}s",
            self.interval.as_secs_f64()
        );
        let mut next_tick = Instant::now().checked_add(self.interval);

        while self.state == LoopState::Running {
            let received = match next_tick {
                Some(deadline) => {
                    shutdown.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                }
                // Interval beyond the clock's range: nothing to tick, wait for shutdown.
                None => shutdown.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };

            match received {
                Ok(()) => {
                    info!("Received shutdown signal");
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    info!("Shutdown channel closed");
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {
                    self.handle_tick();
                    next_tick = self.next_deadline(next_tick);
                }
            }
        }

        match self.shutdown() {
            Ok(()) => info!("Final stats saved: {}", summarize(&self.stats)),
            Err(e) => error!("Saving final stats: {}", e),
        }
    }

    /// Advances a fixed-rate deadline, skipping ticks already missed.
    fn next_deadline(&self, previous: Option<Instant>) -> Option<Instant> {
        let now = Instant::now();
        match previous.and_then(|t| t.checked_add(self.interval)) {
            Some(next) if next > now => Some(next),
            _ => {
                debug!("Collection fell behind, skipping missed ticks");
                now.checked_add(self.interval)
            }
        }
    }

    fn handle_tick(&mut self) {
        self.ticks += 1;
        if let Err(e) = self.tick(&Local::now()) {
            self.failures += 1;
            error!("{}", e);
        }

        if self.ticks % SUMMARY_EVERY == 0 {
            info!("Stats: {}", summarize(&self.stats));
        }
    }
}
