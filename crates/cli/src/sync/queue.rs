// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory action queue mirrored to a durable store.
//!
//! Every mutation is applied to a copy of the queue, the copy is persisted as
//! a whole, and only then does it replace the in-memory state. A failed
//! persist therefore leaves both the store and the queue as they were.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use offq_core::{
    ActionId, ActionKind, ActionStatus, ActionStore, Error, IdClock, PendingAction, Result,
};
use serde_json::Value;
use tokio::sync::broadcast;

/// Reason recorded on actions that were in flight when the process died.
const INTERRUPTED: &str = "interrupted: process exited during submission";

/// Buffered queue events per subscriber before it starts lagging.
const EVENT_CAPACITY: usize = 64;

/// Change notifications for UI badges and the sync coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueEvent {
    Enqueued(ActionId),
    /// Status or attempt count changed.
    Updated(ActionId),
    Removed(ActionId),
    Cleared,
}

struct QueueInner {
    actions: Vec<PendingAction>,
    store: Box<dyn ActionStore>,
    /// Highest id known to have left the store.
    high_water: Option<ActionId>,
}

impl QueueInner {
    /// Persists `id` as the high-water mark before it leaves the store, so a
    /// later process never reissues it.
    fn raise_high_water(&mut self, id: ActionId) -> Result<()> {
        if self.high_water.is_some_and(|mark| mark >= id) {
            return Ok(());
        }
        self.store.persist_high_water(&id)?;
        self.high_water = Some(id);
        Ok(())
    }
}

/// The authoritative list of pending work.
///
/// All mutations are serialized by an internal lock, so concurrent producers
/// may share the queue behind an `Arc`.
pub struct ActionQueue {
    inner: Mutex<QueueInner>,
    clock: IdClock,
    events: broadcast::Sender<QueueEvent>,
}

impl ActionQueue {
    /// Loads the queue from `store`.
    ///
    /// `node` distinguishes writers in generated ids. Fails if the store
    /// cannot be read; corrupt data is reported, never skipped.
    pub fn open(store: impl ActionStore + 'static, node: u32) -> Result<Self> {
        let mut store: Box<dyn ActionStore> = Box::new(store);
        let mut actions = store.load()?;
        let high_water = store.load_high_water()?;

        let clock = IdClock::new(node);
        if let Some(newest) = actions.iter().map(|a| a.id).chain(high_water).max() {
            clock.observe(&newest);
        }

        // Anything still marked syncing was in flight when the previous
        // process stopped; its outcome is unknown.
        let now = Utc::now();
        let mut recovered = 0;
        for action in actions.iter_mut().filter(|a| a.status == ActionStatus::Syncing) {
            action.record_failure(INTERRUPTED, now)?;
            recovered += 1;
        }
        if recovered > 0 {
            store.persist(&actions)?;
            tracing::warn!("recovered {} interrupted action(s) as failed", recovered);
        }

        tracing::debug!("opened action queue with {} action(s)", actions.len());

        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Ok(ActionQueue {
            inner: Mutex::new(QueueInner { actions, store, high_water }),
            clock,
            events,
        })
    }

    /// Captures a new action. Returns only after it has been persisted.
    pub fn enqueue(&self, kind: ActionKind, payload: Value) -> Result<PendingAction> {
        self.enqueue_as(kind, payload, None)
    }

    /// Captures a new action carrying the caller's opaque identity.
    pub fn enqueue_as(
        &self,
        kind: ActionKind,
        payload: Value,
        identity: Option<String>,
    ) -> Result<PendingAction> {
        let action = {
            let mut inner = self.lock();
            let action = PendingAction::new(self.clock.next_id(), kind, payload, Utc::now())
                .with_identity(identity);

            let mut next = inner.actions.clone();
            next.push(action.clone());
            inner.store.persist(&next)?;
            inner.actions = next;
            action
        };

        tracing::debug!(id = %action.id, kind = %action.kind, "enqueued action");
        self.notify(QueueEvent::Enqueued(action.id));
        Ok(action)
    }

    /// Snapshot of the queue in insertion order.
    pub fn list(&self) -> Vec<PendingAction> {
        self.lock().actions.clone()
    }

    pub fn count(&self) -> usize {
        self.lock().actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn get(&self, id: ActionId) -> Option<PendingAction> {
        self.lock().actions.iter().find(|a| a.id == id).cloned()
    }

    /// pending → syncing.
    pub fn mark_syncing(&self, id: ActionId) -> Result<PendingAction> {
        self.update(id, |action| action.transition(ActionStatus::Syncing))
    }

    /// syncing → failed, counting the attempt and keeping `reason`.
    pub fn mark_failed(&self, id: ActionId, reason: &str) -> Result<PendingAction> {
        self.update(id, |action| action.record_failure(reason, Utc::now()))
    }

    /// failed → pending, re-arming the action for another attempt.
    pub fn mark_pending(&self, id: ActionId) -> Result<PendingAction> {
        self.update(id, |action| action.transition(ActionStatus::Pending))
    }

    /// Removes a delivered action.
    ///
    /// Idempotent: returns `Ok(false)` without touching the store when the
    /// action is already gone.
    pub fn remove(&self, id: ActionId) -> Result<bool> {
        {
            let mut inner = self.lock();
            let Some(index) = inner.actions.iter().position(|a| a.id == id) else {
                return Ok(false);
            };

            inner.raise_high_water(id)?;
            let mut next = inner.actions.clone();
            next.remove(index);
            inner.store.persist(&next)?;
            inner.actions = next;
        }

        self.notify(QueueEvent::Removed(id));
        Ok(true)
    }

    /// Discards every action, in memory and in the store.
    pub fn clear(&self) -> Result<()> {
        let discarded = {
            let mut inner = self.lock();
            if let Some(newest) = inner.actions.iter().map(|a| a.id).max() {
                inner.raise_high_water(newest)?;
            }
            inner.store.clear()?;
            std::mem::take(&mut inner.actions).len()
        };

        tracing::info!("cleared {} action(s) from the queue", discarded);
        self.notify(QueueEvent::Cleared);
        Ok(())
    }

    /// Subscribes to queue change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    fn update(
        &self,
        id: ActionId,
        apply: impl FnOnce(&mut PendingAction) -> Result<()>,
    ) -> Result<PendingAction> {
        let updated = {
            let mut inner = self.lock();
            let index = inner
                .actions
                .iter()
                .position(|a| a.id == id)
                .ok_or_else(|| Error::ActionNotFound(id.to_string()))?;

            let mut next = inner.actions.clone();
            apply(&mut next[index])?;
            let updated = next[index].clone();
            inner.store.persist(&next)?;
            inner.actions = next;
            updated
        };

        self.notify(QueueEvent::Updated(id));
        Ok(updated)
    }

    fn notify(&self, event: QueueEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    fn lock(&self) -> MutexGuard<'_, QueueInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
