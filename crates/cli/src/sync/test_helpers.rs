// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use offq_core::{ActionId, ActionKind, MemoryStore, PendingAction};
use serde_json::{json, Value};
use tokio::sync::watch;

use super::queue::ActionQueue;
use super::transport::{SubmitFuture, Transport, TransportError};

/// A report payload like the ones the field app captures.
pub fn report_payload(n: u32) -> Value {
    json!({
        "latitude": "14.5995",
        "longitude": "120.9842",
        "garbage_type": "mixed",
        "description": format!("report {n}"),
    })
}

/// Queue over a fresh in-memory store. The store handle shares contents with
/// the queue's copy.
pub fn memory_queue() -> (Arc<ActionQueue>, MemoryStore) {
    let store = MemoryStore::new();
    let queue = ActionQueue::open(store.clone(), 1).unwrap();
    (Arc::new(queue), store)
}

/// Enqueues `n` reports and returns their ids in order.
pub fn enqueue_reports(queue: &ActionQueue, n: u32) -> Vec<ActionId> {
    (0..n)
        .map(|i| queue.enqueue(ActionKind::SubmitReport, report_payload(i)).unwrap().id)
        .collect()
}

/// Scripted answer for one call to [`MockTransport::submit`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Accept,
    Reject(String),
    /// Never answers.
    Hang,
}

type Hook = Box<dyn Fn(&PendingAction) + Send + Sync>;

/// Transport double that records submissions.
///
/// Answers come from the script in call order, then default to accept.
/// Ids registered with [`MockTransport::fail_id`] are always rejected.
pub struct MockTransport {
    script: Mutex<VecDeque<MockReply>>,
    failing: Mutex<HashSet<ActionId>>,
    submitted: Mutex<Vec<PendingAction>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Mutex<Duration>,
    gate: watch::Sender<bool>,
    on_submit: Mutex<Option<Hook>>,
}

impl MockTransport {
    pub fn new() -> Self {
        let (gate, _) = watch::channel(true);
        MockTransport {
            script: Mutex::new(VecDeque::new()),
            failing: Mutex::new(HashSet::new()),
            submitted: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay: Mutex::new(Duration::ZERO),
            gate,
            on_submit: Mutex::new(None),
        }
    }

    pub fn script(&self, replies: impl IntoIterator<Item = MockReply>) {
        self.script.lock().unwrap().extend(replies);
    }

    pub fn fail_id(&self, id: ActionId) {
        self.failing.lock().unwrap().insert(id);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    /// Submissions wait until [`MockTransport::open`] is called.
    pub fn close(&self) {
        self.gate.send_replace(false);
    }

    pub fn open(&self) {
        self.gate.send_replace(true);
    }

    /// Runs `hook` at the start of every submission.
    pub fn on_submit(&self, hook: impl Fn(&PendingAction) + Send + Sync + 'static) {
        *self.on_submit.lock().unwrap() = Some(Box::new(hook));
    }

    pub fn submitted(&self) -> Vec<PendingAction> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn submitted_ids(&self) -> Vec<ActionId> {
        self.submitted().iter().map(|a| a.id).collect()
    }

    pub fn calls(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    /// Highest number of submissions observed running at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_reply(&self, id: ActionId) -> MockReply {
        let scripted = self.script.lock().unwrap().pop_front();
        if self.failing.lock().unwrap().contains(&id) {
            return MockReply::Reject(format!("{id} always fails"));
        }
        scripted.unwrap_or(MockReply::Accept)
    }
}

impl Transport for MockTransport {
    fn submit<'a>(&'a self, action: &'a PendingAction) -> SubmitFuture<'a> {
        Box::pin(async move {
            if let Some(hook) = self.on_submit.lock().unwrap().as_ref() {
                hook(action);
            }
            self.submitted.lock().unwrap().push(action.clone());
            let reply = self.next_reply(action.id);

            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(running, Ordering::SeqCst);

            let mut gate = self.gate.subscribe();
            let _ = gate.wait_for(|open| *open).await;

            let delay = *self.delay.lock().unwrap();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            let result = match reply {
                MockReply::Accept => Ok(()),
                MockReply::Reject(reason) => Err(TransportError::Rejected(reason)),
                MockReply::Hang => std::future::pending().await,
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        })
    }
}
