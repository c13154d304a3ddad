use std::{future::Future, pin::Pin, sync::Arc, time::Instant};

use chrono::{DateTime, Local, TimeZone};
use futures::future::OptionFuture;
use shared::domain::DecisionIdentity;
use tokio::{
    sync::{broadcast, oneshot, watch},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tracing::{debug, info, warn};

use crate::{
    backend::{fetch_raw, SimulationBackend},
    config::PollerConfig,
    engine::{RawPoll, ReconcileEngine},
    error::FetchError,
    snapshot::{Snapshot, SnapshotStore},
};

type FetchFuture = Pin<Box<dyn Future<Output = Result<RawPoll, FetchError>> + Send>>;

pub trait Clock: Send + Sync {
    /// Monotonic time used for highlight deadlines.
    fn now(&self) -> Instant;
    /// Local wall time shown on the dashboard clock.
    fn wall_time(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_time(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollerEvent {
    SnapshotCommitted {
        decisions: usize,
        new_decisions: usize,
        disrupted: usize,
    },
    HighlightsExpired(Vec<DecisionIdentity>),
    /// The cycle was dropped and the previous snapshot kept.
    PollFailed(String),
    /// A poll tick arrived while the previous fetch was still running.
    PollSkipped,
}

pub fn format_clock<Tz: TimeZone>(time: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.format("%H:%M").to_string()
}

/// Drives poll cycles, highlight expiry and the dashboard clock from a single
/// task.
pub struct Poller {
    backend: Arc<dyn SimulationBackend>,
    config: PollerConfig,
    engine: ReconcileEngine,
    store: SnapshotStore,
    clock: Arc<dyn Clock>,
    clock_display: watch::Sender<String>,
    events: broadcast::Sender<PollerEvent>,
}

impl Poller {
    pub fn new(backend: Arc<dyn SimulationBackend>, config: PollerConfig) -> Self {
        Self::with_clock(backend, config, Arc::new(SystemClock))
    }

    pub fn with_clock(
        backend: Arc<dyn SimulationBackend>,
        config: PollerConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        let (clock_display, _) = watch::channel(format_clock(clock.wall_time()));
        Self {
            backend,
            engine: ReconcileEngine::new(config.highlight_ttl),
            config,
            store: SnapshotStore::new(),
            clock,
            clock_display,
            events,
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PollerEvent> {
        self.events.subscribe()
    }

    pub fn clock_display(&self) -> watch::Receiver<String> {
        self.clock_display.subscribe()
    }

    /// Runs one complete cycle inline. On failure the store keeps its previous
    /// snapshot and the error is returned as well as announced.
    pub async fn poll_once(&mut self) -> Result<Arc<Snapshot>, FetchError> {
        let result = fetch_raw(self.backend.as_ref()).await;
        self.finish_cycle(result)
    }

    /// Expires due highlights and returns the cleared identities. The current
    /// snapshot is recommitted only when one of them is still in its feed.
    pub fn expire_highlights(&mut self) -> Vec<DecisionIdentity> {
        let expired = self.engine.tick(self.clock.now());
        if !expired.is_empty() {
            let current = self.store.current();
            let visible = current
                .decisions
                .iter()
                .any(|decision| expired.contains(&decision.identity));
            if visible {
                self.store.commit(self.engine.apply_highlights(&current));
            }
            debug!(count = expired.len(), visible, "highlights expired");
            let _ = self.events.send(PollerEvent::HighlightsExpired(expired.clone()));
        }
        expired
    }

    pub fn spawn(self) -> PollerHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let store = self.store.clone();
        let clock_display = self.clock_display();
        let events = self.events.clone();
        let task = tokio::spawn(self.run(shutdown_rx));
        PollerHandle {
            store,
            clock_display,
            events,
            shutdown: Some(shutdown_tx),
            task,
        }
    }

    /// Polls immediately, then every `poll_interval`, until `shutdown` fires or
    /// its sender is dropped.
    pub async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        let mut poll_interval = tokio::time::interval(self.config.poll_interval);
        poll_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut clock_interval = tokio::time::interval(self.config.clock_interval);
        clock_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut in_flight: Option<FetchFuture> = None;

        info!(
            base_url = %self.config.base_url,
            poll_ms = self.config.poll_interval.as_millis() as u64,
            "poller started"
        );

        loop {
            let expiry: OptionFuture<_> = self
                .engine
                .next_expiry()
                .map(|deadline| tokio::time::sleep_until(deadline.into()))
                .into();

            tokio::select! {
                _ = &mut shutdown => break,
                _ = poll_interval.tick() => {
                    if in_flight.is_some() {
                        debug!("previous fetch still in flight; skipping poll tick");
                        let _ = self.events.send(PollerEvent::PollSkipped);
                    } else {
                        in_flight = Some(self.start_fetch());
                    }
                }
                Some(result) = OptionFuture::from(in_flight.as_mut()) => {
                    in_flight = None;
                    let _ = self.finish_cycle(result);
                }
                Some(()) = expiry => {
                    self.expire_highlights();
                }
                _ = clock_interval.tick() => self.publish_clock(),
            }
        }

        info!("poller stopped");
    }

    fn start_fetch(&self) -> FetchFuture {
        let backend = Arc::clone(&self.backend);
        Box::pin(async move { fetch_raw(backend.as_ref()).await })
    }

    fn finish_cycle(
        &mut self,
        result: Result<RawPoll, FetchError>,
    ) -> Result<Arc<Snapshot>, FetchError> {
        let raw = match result {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    endpoint = err.endpoint(),
                    error = %err,
                    "poll cycle failed; keeping previous snapshot"
                );
                let _ = self.events.send(PollerEvent::PollFailed(err.to_string()));
                return Err(err);
            }
        };

        let snapshot = self.engine.poll(raw, self.clock.now());
        let event = PollerEvent::SnapshotCommitted {
            decisions: snapshot.decisions.len(),
            new_decisions: snapshot.new_decisions().count(),
            disrupted: snapshot.disrupted.len(),
        };
        let committed = self.store.commit(snapshot);
        debug!(?event, "snapshot committed");
        let _ = self.events.send(event);
        Ok(committed)
    }

    fn publish_clock(&self) {
        let display = format_clock(self.clock.wall_time());
        self.clock_display.send_if_modified(|current| {
            if *current == display {
                return false;
            }
            *current = display;
            true
        });
    }
}

pub struct PollerHandle {
    store: SnapshotStore,
    clock_display: watch::Receiver<String>,
    events: broadcast::Sender<PollerEvent>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn subscribe_snapshots(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.store.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PollerEvent> {
        self.events.subscribe()
    }

    pub fn clock_display(&self) -> watch::Receiver<String> {
        self.clock_display.clone()
    }

    /// Stops both clocks and waits for the poller task to exit. Pending
    /// highlight deadlines are dropped with it.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Err(err) = (&mut self.task).await {
            warn!(error = %err, "poller task ended abnormally");
        }
    }
}

#[cfg(test)]
#[path = "tests/poller_tests.rs"]
mod tests;
