// src/application/usecase/polling_usecase.rs
// Periodic refresh of each snapshot kind on its own cadence

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::application::usecase::reconcile_usecase::SnapshotRefresher;
use crate::domain::model::SnapshotKind;

/// Refresh period per snapshot kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingCadence {
    pub status: Duration,
    pub stats: Duration,
    pub trades: Duration,
}

impl PollingCadence {
    pub fn period(&self, kind: SnapshotKind) -> Duration {
        match kind {
            SnapshotKind::Status => self.status,
            SnapshotKind::Stats => self.stats,
            SnapshotKind::Trades => self.trades,
        }
    }
}

impl Default for PollingCadence {
    fn default() -> Self {
        Self {
            status: Duration::from_secs(5),
            stats: Duration::from_secs(10),
            trades: Duration::from_secs(15),
        }
    }
}

/// Periodic tasks sharing one cancellation signal. Cancelling, or dropping
/// the set, ends each task at its next wait for a tick; a refresh already
/// running is allowed to finish.
#[derive(Debug, Default)]
pub struct TaskSet {
    handles: Vec<(SnapshotKind, JoinHandle<()>)>,
    cancel: Option<watch::Sender<bool>>,
}

impl TaskSet {
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Receiver that reports cancellation of this set
    pub fn cancellation(&mut self) -> watch::Receiver<bool> {
        self.cancel.get_or_insert_with(|| watch::channel(false).0).subscribe()
    }

    pub fn push(&mut self, kind: SnapshotKind, handle: JoinHandle<()>) {
        self.handles.push((kind, handle));
    }

    /// Signal every task to stop; returns how many were running
    pub fn cancel_all(&mut self) -> usize {
        // Dropping the sender closes every receiver
        self.cancel.take();
        let count = self.handles.len();
        for (kind, _handle) in self.handles.drain(..) {
            log::debug!("Cancelling {} polling", kind);
        }
        count
    }
}

pub struct PollingScheduler {
    refresher: Arc<dyn SnapshotRefresher>,
    cadence: PollingCadence,
    tasks: Mutex<TaskSet>,
}

impl PollingScheduler {
    pub fn new(refresher: Arc<dyn SnapshotRefresher>, cadence: PollingCadence) -> Self {
        Self {
            refresher,
            cadence,
            tasks: Mutex::new(TaskSet::default()),
        }
    }

    /// Spawn one periodic task per snapshot kind. No-op when already started.
    pub fn start(&self) {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if !tasks.is_empty() {
            log::debug!("Polling already running");
            return;
        }

        for kind in SnapshotKind::ALL {
            let period = self.cadence.period(kind);
            let refresher = self.refresher.clone();
            let cancel = tasks.cancellation();
            tasks.push(kind, tokio::spawn(poll(refresher, kind, period, cancel)));
            log::info!("Polling {} every {:?}", kind, period);
        }
    }

    /// Cancel all periodic tasks. Safe to call when not started.
    /// A refresh already in flight completes; no further ticks fire.
    pub fn stop(&self) {
        let cancelled = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel_all();
        if cancelled > 0 {
            log::info!("Stopped {} polling tasks", cancelled);
        }
    }

    pub fn is_running(&self) -> bool {
        !self.tasks.lock().unwrap_or_else(PoisonError::into_inner).is_empty()
    }
}

// Each tick awaits its own refresh, so a slow fetch delays that kind's next
// tick instead of overlapping it.
async fn poll(
    refresher: Arc<dyn SnapshotRefresher>,
    kind: SnapshotKind,
    period: Duration,
    mut cancel: watch::Receiver<bool>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.changed() => break,
            _ = ticker.tick() => {}
        }
        log::debug!("Polling {}", kind);
        refresher.refresh(kind).await;
    }

    log::debug!("{} polling stopped", kind);
}
