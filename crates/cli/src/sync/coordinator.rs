// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync coordinator: drains the action queue through a transport.
//!
//! A drain snapshots the queue and submits eligible actions in insertion
//! order. Delivered actions are removed; failed ones are marked and the drain
//! moves on to the next action. Only one drain runs at a time. Triggers that
//! arrive while a drain is running set a flag that causes exactly one
//! follow-up drain once the current one finishes. A manual retry folded in
//! this way makes the follow-up a manual one.
//!
//! When the store rejects the write that records a submission's outcome, the
//! drain aborts and the outcome is kept in memory. The next drain applies it
//! before looking at the queue.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use offq_core::{ActionId, ActionStatus, PendingAction};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;

use super::network::{NetworkObserver, Transition};
use super::queue::{ActionQueue, QueueEvent};
use super::transport::{Transport, TransportError};

/// Error type for sync operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The queue could not persist a status change.
    #[error("store error: {0}")]
    Store(#[from] offq_core::Error),

    /// Manual retry while the network is down.
    #[error("offline: no connectivity, nothing was submitted")]
    Offline,

    /// Manual retry while syncing is stopped.
    #[error("syncing is stopped")]
    Paused,
}

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Exponential backoff between attempts of a failed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Delay after the first failure.
    pub initial: Duration,
    /// Upper bound for the delay.
    pub max: Duration,
}

impl Backoff {
    /// Delay before the next attempt after `attempts` failures.
    pub fn delay_for(&self, attempts: u32) -> Duration {
        if attempts == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(attempts - 1).unwrap_or(u32::MAX);
        self.initial.saturating_mul(factor).min(self.max)
    }

    /// Whether `action` has waited out its backoff at `now`.
    pub fn is_due(&self, action: &PendingAction, now: DateTime<Utc>) -> bool {
        let Some(last) = action.last_attempt_at else {
            return true;
        };
        match now.signed_duration_since(last).to_std() {
            Ok(elapsed) => elapsed >= self.delay_for(action.attempts),
            // Last attempt is in the future (clock moved back): wait
            Err(_) => false,
        }
    }
}

/// Configuration for the sync coordinator.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Upper bound for one transport submission; exceeding it counts as a
    /// transport failure.
    pub submit_timeout: Duration,
    pub backoff: Backoff,
    /// Attempts after which automatic drains stop retrying an action
    /// (0 = unlimited). Such actions stay queued for a manual retry.
    pub max_attempts: u32,
    /// Period of the background retry tick.
    pub retry_interval: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        SyncConfig {
            submit_timeout: Duration::from_secs(10),
            backoff: Backoff { initial: Duration::from_millis(500), max: Duration::from_secs(300) },
            max_attempts: 0,
            retry_interval: Duration::from_secs(30),
        }
    }
}

impl SyncConfig {
    pub fn is_exhausted(&self, attempts: u32) -> bool {
        self.max_attempts > 0 && attempts >= self.max_attempts
    }
}

/// What started a drain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainTrigger {
    /// The network went from offline to online.
    CameOnline,
    /// An action was enqueued while online.
    Enqueued,
    /// Explicit "retry now" from a caller. Ignores backoff and attempt caps.
    Manual,
    /// Periodic retry tick.
    Timer,
}

/// Outcome of a drain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Actions handed to the transport.
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Actions left alone: in flight, backing off, exhausted or vanished.
    pub skipped: usize,
    /// The drain stopped early because the network went down or syncing was
    /// stopped.
    pub interrupted: bool,
    /// Another drain was running; this trigger was folded into its follow-up.
    pub coalesced: bool,
}

impl DrainReport {
    fn absorb(&mut self, cycle: &DrainReport) {
        self.attempted += cycle.attempted;
        self.succeeded += cycle.succeeded;
        self.failed += cycle.failed;
        self.skipped += cycle.skipped;
        self.interrupted |= cycle.interrupted;
    }
}

/// Marks a drain as running for as long as it is alive, including when the
/// drain future is dropped midway.
struct DrainingFlag<'a>(&'a AtomicBool);

impl<'a> DrainingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        DrainingFlag(flag)
    }
}

impl Drop for DrainingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

enum Outcome {
    Delivered,
    Failed,
    /// Removed by someone else between snapshot and submission.
    Vanished,
}

/// Submission outcome the store has not recorded yet.
#[derive(Debug)]
enum Unsettled {
    Delivered,
    Failed(String),
}

/// Drives queue drainage.
pub struct SyncCoordinator {
    queue: Arc<ActionQueue>,
    transport: Arc<dyn Transport>,
    network: NetworkObserver,
    config: SyncConfig,
    drain_lock: tokio::sync::Mutex<()>,
    draining: AtomicBool,
    follow_up: AtomicBool,
    /// A manual retry was folded into the running drain.
    manual_pending: AtomicBool,
    paused: AtomicBool,
    unsettled: Mutex<Vec<(ActionId, Unsettled)>>,
}

impl SyncCoordinator {
    pub fn new(
        queue: Arc<ActionQueue>,
        transport: Arc<dyn Transport>,
        network: NetworkObserver,
        config: SyncConfig,
    ) -> Self {
        SyncCoordinator {
            queue,
            transport,
            network,
            config,
            drain_lock: tokio::sync::Mutex::new(()),
            draining: AtomicBool::new(false),
            follow_up: AtomicBool::new(false),
            manual_pending: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            unsettled: Mutex::new(Vec::new()),
        }
    }

    pub fn queue(&self) -> &Arc<ActionQueue> {
        &self.queue
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn is_draining(&self) -> bool {
        self.draining.load(Ordering::SeqCst)
    }

    /// Lets in-flight submissions finish but starts no new ones.
    pub fn stop_syncing(&self) {
        self.paused.store(true, Ordering::SeqCst);
        tracing::info!("syncing stopped");
    }

    pub fn resume_syncing(&self) {
        self.paused.store(false, Ordering::SeqCst);
        tracing::info!("syncing resumed");
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Drains immediately, ignoring backoff. Fails fast with
    /// [`SyncError::Offline`] when there is no connectivity.
    pub async fn retry_now(&self) -> SyncResult<DrainReport> {
        if !self.network.current() {
            return Err(SyncError::Offline);
        }
        if self.is_paused() {
            return Err(SyncError::Paused);
        }
        self.drain(DrainTrigger::Manual).await
    }

    /// Runs a drain, or folds the trigger into the running one.
    pub async fn drain(&self, trigger: DrainTrigger) -> SyncResult<DrainReport> {
        let mut report = DrainReport::default();
        let mut ran = false;

        loop {
            let Ok(guard) = self.drain_lock.try_lock() else {
                if trigger == DrainTrigger::Manual {
                    self.manual_pending.store(true, Ordering::SeqCst);
                }
                self.follow_up.store(true, Ordering::SeqCst);
                if !ran {
                    tracing::debug!(?trigger, "drain already running, scheduling follow-up");
                    report.coalesced = true;
                }
                return Ok(report);
            };
            ran = true;

            let flag = DrainingFlag::raise(&self.draining);
            let result = self.run_cycles(trigger, &mut report).await;
            drop(flag);
            drop(guard);
            result?;

            // A trigger may have landed between the last check and the unlock.
            if report.interrupted || !self.follow_up.load(Ordering::SeqCst) {
                return Ok(report);
            }
        }
    }

    /// Runs cycles until no follow-up was requested during the last one.
    async fn run_cycles(&self, trigger: DrainTrigger, report: &mut DrainReport) -> SyncResult<()> {
        loop {
            self.follow_up.store(false, Ordering::SeqCst);
            let cycle_trigger = if self.manual_pending.swap(false, Ordering::SeqCst) {
                DrainTrigger::Manual
            } else {
                trigger
            };
            let cycle = self.run_cycle(cycle_trigger).await?;
            report.absorb(&cycle);
            if cycle.interrupted || !self.follow_up.swap(false, Ordering::SeqCst) {
                return Ok(());
            }
            tracing::debug!("running follow-up drain");
        }
    }

    fn can_submit(&self) -> bool {
        self.network.current() && !self.is_paused()
    }

    async fn run_cycle(&self, trigger: DrainTrigger) -> SyncResult<DrainReport> {
        self.settle()?;

        let mut report = DrainReport::default();
        let snapshot = self.queue.list();

        for action in snapshot {
            if !self.can_submit() {
                tracing::info!("offline or stopped, ending drain early");
                report.interrupted = true;
                break;
            }

            if !self.is_eligible(&action, trigger) {
                report.skipped += 1;
                continue;
            }

            match self.submit_one(action).await? {
                Outcome::Delivered => {
                    report.attempted += 1;
                    report.succeeded += 1;
                }
                Outcome::Failed => {
                    report.attempted += 1;
                    report.failed += 1;
                }
                Outcome::Vanished => report.skipped += 1,
            }
        }

        if report.attempted > 0 {
            tracing::info!(
                "drain ({:?}): {} delivered, {} failed, {} skipped",
                trigger,
                report.succeeded,
                report.failed,
                report.skipped
            );
        }
        Ok(report)
    }

    fn is_eligible(&self, action: &PendingAction, trigger: DrainTrigger) -> bool {
        match action.status {
            ActionStatus::Syncing => false,
            ActionStatus::Pending => true,
            ActionStatus::Failed if trigger == DrainTrigger::Manual => true,
            ActionStatus::Failed => {
                !self.config.is_exhausted(action.attempts)
                    && self.config.backoff.is_due(action, Utc::now())
            }
        }
    }

    async fn submit_one(&self, action: PendingAction) -> SyncResult<Outcome> {
        if action.status == ActionStatus::Failed {
            match self.queue.mark_pending(action.id) {
                Ok(_) => {}
                Err(e) if e.is_not_found() => return Ok(Outcome::Vanished),
                Err(e) => return Err(e.into()),
            }
        }

        let action = match self.queue.mark_syncing(action.id) {
            Ok(action) => action,
            Err(e) if e.is_not_found() => return Ok(Outcome::Vanished),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(id = %action.id, kind = %action.kind, "submitting action");

        let timeout = self.config.submit_timeout;
        let result = match tokio::time::timeout(timeout, self.transport.submit(&action)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout(timeout.as_millis() as u64)),
        };

        match result {
            Ok(()) => {
                if let Err(e) = self.queue.remove(action.id) {
                    self.defer(action.id, Unsettled::Delivered);
                    return Err(e.into());
                }
                tracing::debug!(id = %action.id, "action delivered");
                Ok(Outcome::Delivered)
            }
            Err(e) => {
                tracing::warn!(id = %action.id, kind = %action.kind, "submission failed: {}", e);
                let reason = e.to_string();
                match self.queue.mark_failed(action.id, &reason) {
                    Ok(failed) if self.config.is_exhausted(failed.attempts) => {
                        tracing::warn!(
                            id = %failed.id,
                            "action failed {} times, automatic retries stopped",
                            failed.attempts
                        );
                    }
                    Ok(_) => {}
                    Err(e) if e.is_not_found() => {}
                    Err(e) => {
                        self.defer(action.id, Unsettled::Failed(reason));
                        return Err(e.into());
                    }
                }
                Ok(Outcome::Failed)
            }
        }
    }

    fn defer(&self, id: ActionId, outcome: Unsettled) {
        tracing::warn!(id = %id, ?outcome, "could not record submission outcome, will retry");
        self.unsettled().push((id, outcome));
    }

    /// Records outcomes left over from a drain that hit a store error.
    fn settle(&self) -> SyncResult<()> {
        let mut unsettled = self.unsettled();
        while let Some((id, outcome)) = unsettled.first() {
            let result = match outcome {
                Unsettled::Delivered => self.queue.remove(*id).map(|_| ()),
                Unsettled::Failed(reason) => match self.queue.get(*id) {
                    Some(action) if action.status == ActionStatus::Syncing => {
                        self.queue.mark_failed(*id, reason).map(|_| ())
                    }
                    _ => Ok(()),
                },
            };
            match result {
                Ok(()) => tracing::info!(id = %id, ?outcome, "recorded earlier submission outcome"),
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }
            unsettled.remove(0);
        }
        Ok(())
    }

    fn unsettled(&self) -> MutexGuard<'_, Vec<(ActionId, Unsettled)>> {
        self.unsettled.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Starts the event loop: drains on reconnect, on enqueue while online
    /// and on every retry tick, until `cancel` fires.
    pub fn spawn(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.run(cancel).await })
    }

    async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let (trigger_tx, mut trigger_rx) = mpsc::unbounded_channel();
        let _online = self.network.subscribe(move |transition| {
            if transition == Transition::Online {
                let _ = trigger_tx.send(DrainTrigger::CameOnline);
            }
        });
        let mut queue_events = self.queue.subscribe();

        let mut ticker = tokio::time::interval(self.config.retry_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let mut drains = JoinSet::new();
        tracing::info!("sync coordinator started");

        loop {
            let trigger = tokio::select! {
                _ = cancel.cancelled() => break,
                Some(trigger) = trigger_rx.recv() => trigger,
                event = queue_events.recv() => match event {
                    Ok(QueueEvent::Enqueued(_)) => DrainTrigger::Enqueued,
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        tracing::debug!("missed {} queue events", missed);
                        DrainTrigger::Enqueued
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                // The first tick fires immediately and picks up actions left
                // from a previous run.
                _ = ticker.tick() => {
                    if self.queue.is_empty() {
                        continue;
                    }
                    DrainTrigger::Timer
                }
                Some(joined) = drains.join_next(), if !drains.is_empty() => {
                    log_drain_result(joined);
                    continue;
                }
            };

            if !self.network.current() {
                continue;
            }

            let this = Arc::clone(&self);
            drains.spawn(async move { this.drain(trigger).await });
        }

        // Let in-flight submissions finish without starting new ones.
        self.stop_syncing();
        while let Some(joined) = drains.join_next().await {
            log_drain_result(joined);
        }
        tracing::info!("sync coordinator stopped");
    }
}

fn log_drain_result(joined: Result<SyncResult<DrainReport>, tokio::task::JoinError>) {
    match joined {
        Ok(Ok(_)) => {}
        Ok(Err(e)) => tracing::error!("drain failed: {}", e),
        Err(e) => tracing::error!("drain task failed: {}", e),
    }
}
