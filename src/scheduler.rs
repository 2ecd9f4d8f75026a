//! Fixed-interval polling with at most one cycle in flight.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{Instrument, debug, error, info, warn};

use crate::config::StationConfig;
use crate::error::{Error, Result};
use crate::fetch::FeedSource;
use crate::pipeline::{ArrivalBoard, poll_once};
use crate::projector::NullArrivalPolicy;

/// Receives every successfully computed board.
///
/// The board is borrowed; a consumer that keeps it across cycles clones it.
pub trait ArrivalSink: Send + Sync {
    fn publish(&self, board: &ArrivalBoard);
}

impl<F> ArrivalSink for F
where
    F: Fn(&ArrivalBoard) + Send + Sync,
{
    fn publish(&self, board: &ArrivalBoard) {
        self(board)
    }
}

enum Lifecycle {
    Idle,
    Active(JoinHandle<()>),
    Stopped,
}

/// Polls a [`FeedSource`] on a fixed interval and publishes arrival boards.
///
/// A timer tick that finds the previous cycle still running is skipped, so a
/// slow feed never causes concurrent fetches and boards are published in
/// cycle order. A failed cycle publishes nothing and the last good board stays
/// current.
pub struct Scheduler<S> {
    shared: Arc<Shared<S>>,
    lifecycle: Mutex<Lifecycle>,
}

struct Shared<S> {
    source: S,
    station: StationConfig,
    policy: NullArrivalPolicy,
    sink: Box<dyn ArrivalSink>,
    in_flight: AtomicBool,
    cycles: AtomicU64,
    latest: watch::Sender<Option<ArrivalBoard>>,
}

/// Clears the in-flight flag when a cycle ends, including by panic.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: FeedSource + 'static> Scheduler<S> {
    pub fn new(
        source: S,
        station: StationConfig,
        policy: NullArrivalPolicy,
        sink: impl ArrivalSink + 'static,
    ) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                source,
                station,
                policy,
                sink: Box::new(sink),
                in_flight: AtomicBool::new(false),
                cycles: AtomicU64::new(0),
                latest,
            }),
            lifecycle: Mutex::new(Lifecycle::Idle),
        }
    }

    /// Runs the first cycle immediately, then one every `period`.
    ///
    /// Starting an active scheduler does nothing, and a stopped scheduler
    /// stays stopped. Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `period` is zero.
    pub fn start(&self, period: Duration) -> Result<()> {
        if period.is_zero() {
            return Err(Error::config("poll interval must be greater than zero"));
        }

        let mut lifecycle = self.lifecycle();
        match *lifecycle {
            Lifecycle::Active(_) => {
                debug!("Scheduler already active, ignoring start");
                return Ok(());
            }
            Lifecycle::Stopped => {
                warn!("Scheduler has been stopped and cannot be restarted");
                return Ok(());
            }
            Lifecycle::Idle => {}
        }

        let shared = Arc::clone(&self.shared);
        let timer = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                Shared::trigger(&shared);
            }
        });
        *lifecycle = Lifecycle::Active(timer);

        info!(
            station = self.shared.station.station_id(),
            route = self.shared.station.route_id(),
            interval_secs = period.as_secs_f64(),
            "Scheduler started"
        );
        Ok(())
    }

    /// Cancels the timer. A cycle already in flight runs to completion and
    /// still publishes.
    pub fn stop(&self) {
        let mut lifecycle = self.lifecycle();
        if let Lifecycle::Active(timer) = std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            timer.abort();
            info!(
                cycles = self.shared.cycles.load(Ordering::Relaxed),
                "Scheduler stopped"
            );
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(*self.lifecycle(), Lifecycle::Active(_))
    }

    /// The most recently published board, if any cycle has succeeded.
    pub fn latest(&self) -> Option<ArrivalBoard> {
        self.shared.latest.borrow().clone()
    }

    /// Change notifications for the published board.
    pub fn subscribe(&self) -> watch::Receiver<Option<ArrivalBoard>> {
        self.shared.latest.subscribe()
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S> Drop for Scheduler<S> {
    fn drop(&mut self) {
        let lifecycle = self
            .lifecycle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        if let Lifecycle::Active(timer) = lifecycle {
            timer.abort();
        }
    }
}

impl<S: FeedSource + 'static> Shared<S> {
    /// Spawns a cycle unless one is already running.
    fn trigger(shared: &Arc<Self>) {
        if shared
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Previous cycle still in flight, skipping tick");
            return;
        }

        let cycle = shared.cycles.fetch_add(1, Ordering::Relaxed);
        let span = tracing::info_span!(
            "poll_cycle",
            cycle,
            station = shared.station.station_id(),
        );
        let shared = Arc::clone(shared);
        tokio::spawn(
            async move {
                let _in_flight = InFlight(&shared.in_flight);
                shared.run_cycle().await;
            }
            .instrument(span),
        );
    }

    async fn run_cycle(&self) {
        let started = Instant::now();
        match poll_once(&self.source, &self.station, self.policy).await {
            Ok(board) => {
                info!(
                    north = ?board.minutes.north,
                    south = ?board.minutes.south,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Publishing arrivals"
                );
                self.sink.publish(&board);
                self.latest.send_replace(Some(board));
            }
            Err(e) => {
                error!(
                    error = %e,
                    kind = e.kind(),
                    "Poll cycle failed, keeping previous arrivals"
                );
            }
        }
    }
}
